use rand::Rng;

use crate::drivers::{ImportError, ViewerError};
use crate::types::{GraphId, Rgb, SignalId};

/// Graph every import lands on. Graph 2 is only reachable by an explicit switch.
pub const IMPORT_GRAPH: GraphId = GraphId::First;

/// One imported sample sequence and its display settings.
#[derive(Clone, Debug)]
pub struct SignalRecord {
    pub id: SignalId,
    pub label: String,
    pub samples: Vec<f64>,
    pub color: Rgb,
    pub graph: GraphId,
    pub visible: bool,
}

impl SignalRecord {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Owns every imported signal. Ids are indices into `signals`, nothing is
/// ever removed.
#[derive(Debug)]
pub struct SignalRegistry {
    signals: Vec<SignalRecord>,
    palette: Vec<Rgb>,
}

impl SignalRegistry {
    pub fn new(palette: Vec<Rgb>) -> Self {
        Self {
            signals: Vec::new(),
            palette,
        }
    }

    /// Validates `samples` and appends them as a new signal on graph 1.
    pub fn import(
        &mut self,
        label: impl Into<String>,
        samples: Vec<f64>,
    ) -> Result<SignalId, ImportError> {
        if samples.is_empty() {
            return Err(ImportError::Empty);
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(ImportError::NonFinite { index });
        }
        let id = SignalId(self.signals.len());
        let color = self.assign_color(id.0);
        let label = label.into();
        log::info!(
            "imported {label} as signal {id} ({} samples, {})",
            samples.len(),
            color.to_hex()
        );
        self.signals.push(SignalRecord {
            id,
            label,
            samples,
            color,
            graph: IMPORT_GRAPH,
            visible: true,
        });
        Ok(id)
    }

    /// Palette color for the `ordinal`-th import, random once the palette is
    /// used up.
    pub fn assign_color(&self, ordinal: usize) -> Rgb {
        match self.palette.get(ordinal) {
            Some(color) => *color,
            None => {
                let mut rng = rand::thread_rng();
                Rgb::new(rng.gen(), rng.gen(), rng.gen())
            }
        }
    }

    /// Moves a signal to `graph` and returns the graph it came from.
    pub fn move_to_graph(&mut self, id: SignalId, graph: GraphId) -> Result<GraphId, ViewerError> {
        let record = self.get_mut(id)?;
        let previous = record.graph;
        record.graph = graph;
        Ok(previous)
    }

    pub fn set_visible(&mut self, id: SignalId, visible: bool) -> Result<(), ViewerError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_color(&mut self, id: SignalId, color: Rgb) -> Result<(), ViewerError> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    pub fn get(&self, id: SignalId) -> Result<&SignalRecord, ViewerError> {
        self.signals.get(id.0).ok_or(ViewerError::UnknownSignal(id))
    }

    fn get_mut(&mut self, id: SignalId) -> Result<&mut SignalRecord, ViewerError> {
        self.signals.get_mut(id.0).ok_or(ViewerError::UnknownSignal(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalRecord> {
        self.signals.iter()
    }

    pub fn in_graph(&self, graph: GraphId) -> impl Iterator<Item = &SignalRecord> {
        self.signals.iter().filter(move |s| s.graph == graph)
    }

    pub fn signals_in_graph(&self, graph: GraphId) -> Vec<SignalId> {
        self.in_graph(graph).map(|s| s.id).collect()
    }

    pub fn count_in_graph(&self, graph: GraphId) -> usize {
        self.in_graph(graph).count()
    }

    /// Sample count of the longest signal on `graph`.
    pub fn longest_in_graph(&self, graph: GraphId) -> usize {
        self.in_graph(graph).map(SignalRecord::len).max().unwrap_or(0)
    }

    /// Sample count of the longest visible signal on `graph`.
    pub fn longest_visible_in_graph(&self, graph: GraphId) -> usize {
        self.in_graph(graph)
            .filter(|s| s.visible)
            .map(SignalRecord::len)
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
