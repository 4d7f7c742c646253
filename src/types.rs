// src/types.rs
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::drivers::ConfigError;

/// One of the two scrolling graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphId {
    First,
    Second,
}

impl GraphId {
    pub const ALL: [GraphId; 2] = [GraphId::First, GraphId::Second];

    pub fn index(self) -> usize {
        match self {
            GraphId::First => 0,
            GraphId::Second => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(GraphId::First),
            1 => Some(GraphId::Second),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            GraphId::First => GraphId::Second,
            GraphId::Second => GraphId::First,
        }
    }

    pub fn as_slice(self) -> &'static [GraphId] {
        match self {
            GraphId::First => &[GraphId::First],
            GraphId::Second => &[GraphId::Second],
        }
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph {}", self.index() + 1)
    }
}

/// Stable identity of an imported signal (its import order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId(pub usize);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ConfigError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ConfigError::Color(text.to_owned()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ConfigError::Color(text.to_owned()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// Commands the control surface sends to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCommand {
    Import(Vec<PathBuf>),
    TogglePlayPause,
    Play,
    Pause,
    Reset,
    SetSpeed(i32),
    ZoomIn,
    ZoomOut,
    SetLinked(bool),
    SelectGraph(GraphId),
    SetVisible(SignalId, bool),
    SetColor(SignalId, Rgb),
    SwitchGraph(SignalId),
    TakeSnapshot,
    ExportReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_and_print() {
        let color = Rgb::from_hex("#FF00aa").unwrap();
        assert_eq!(color, Rgb::new(255, 0, 170));
        assert_eq!(color.to_hex(), "#FF00AA");
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
    }

    #[test]
    fn graph_ids_pair_up() {
        assert_eq!(GraphId::First.other(), GraphId::Second);
        assert_eq!(GraphId::from_index(1), Some(GraphId::Second));
        assert_eq!(GraphId::from_index(2), None);
        assert_eq!(GraphId::Second.to_string(), "Graph 2");
    }
}
