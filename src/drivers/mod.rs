// src/drivers/mod.rs
// File formats, rendering and report output around the playback engine.
pub mod csv;
pub mod error;
pub mod pdf;
pub mod plot;
pub mod report;
pub mod source;
pub mod wfdb;

pub use error::{ConfigError, EmptyDataError, ExportError, ImportError, ViewerError};
pub use plot::{PlotStyle, PlottersRenderer, Renderer};
pub use report::{DocumentReport, ReportDocument, ReportSection, ReportWriter};
pub use source::{FileSource, ManualSource, SignalSource, SourceFormat};
