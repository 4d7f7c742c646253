// src/engine/mod.rs
// Playback state, windowing and viewports for the two graphs.
pub mod link;
pub mod playback;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod viewport;

pub use link::LinkCoordinator;
pub use playback::{speed_interval, GraphFrame, PlaybackController, SignalWindow, TickOutcome};
pub use registry::{SignalRecord, SignalRegistry, IMPORT_GRAPH};
pub use scheduler::{Clock, SystemClock, TickTimer, VirtualClock};
pub use session::{GraphStatus, ImportReport, Session, SignalRow};
pub use snapshot::{take_snapshot, SignalSummary, Snapshot};
pub use stats::{stats_for, SignalStats};
pub use viewport::{AxisRange, ViewRange, ViewportController};
