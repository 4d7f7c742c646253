use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::ConfigError;
use crate::types::Rgb;

pub const CONFIG_ENV: &str = "SIGNAL_VIEWER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "signal_viewer.json";

/// Tunables of the viewer. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Tick period at speed 0 and after every (re)start, in milliseconds.
    pub baseline_interval_ms: u64,
    /// Number of samples the x axis shows behind the cursor.
    pub visible_width: f64,
    /// Fraction of the y span added above and below the data.
    pub range_padding: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub speed_min: i32,
    pub speed_max: i32,
    pub initial_speed: i32,
    /// Colors for the first imports, `#RRGGBB`.
    pub palette: Vec<String>,
    /// Both viewports share their axis ranges.
    pub link_axes: bool,
    /// Upper bound of ticks fired for one graph by a single pump.
    pub max_catch_up_ticks: u32,
    pub csv_value_column: String,
    pub report: ReportConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub directory: PathBuf,
    pub document_name: String,
    pub pdf_name: String,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            baseline_interval_ms: 60,
            visible_width: 150.0,
            range_padding: 0.1,
            zoom_in_factor: 0.7,
            zoom_out_factor: 1.1,
            speed_min: -50,
            speed_max: 49,
            initial_speed: 1,
            palette: ["#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF"]
                .into_iter()
                .map(String::from)
                .collect(),
            link_axes: true,
            max_catch_up_ticks: 32,
            csv_value_column: "values".to_owned(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            document_name: "signal_snapshots.json".to_owned(),
            pdf_name: "signal_snapshots.pdf".to_owned(),
            image_width: 900,
            image_height: 400,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.palette_colors()?;
        Ok(config)
    }

    /// Reads the config named by `SIGNAL_VIEWER_CONFIG` (or the default file
    /// in the working directory). Falls back to defaults when the file is
    /// missing or broken.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default config");
                Self::default()
            }
        }
    }

    pub fn palette_colors(&self) -> Result<Vec<Rgb>, ConfigError> {
        self.palette.iter().map(|hex| Rgb::from_hex(hex)).collect()
    }

    pub fn baseline_interval(&self) -> Duration {
        Duration::from_millis(self.baseline_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "baseline_interval_ms": 40, "report": {{ "image_width": 640 }} }}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.baseline_interval_ms, 40);
        assert_eq!(config.visible_width, 150.0);
        assert_eq!(config.report.image_width, 640);
        assert_eq!(config.report.image_height, 400);
        assert_eq!(config.palette_colors().unwrap().len(), 6);
    }

    #[test]
    fn bad_palette_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{ "palette": ["#FF0000", "red"] }}"##).unwrap();
        assert!(matches!(
            ViewerConfig::load(file.path()),
            Err(ConfigError::Color(c)) if c == "red"
        ));
    }

    #[test]
    fn zero_interval_is_floored() {
        let config = ViewerConfig {
            baseline_interval_ms: 0,
            ..ViewerConfig::default()
        };
        assert_eq!(config.baseline_interval(), Duration::from_millis(1));
    }
}
