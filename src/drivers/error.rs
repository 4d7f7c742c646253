use std::path::PathBuf;

use thiserror::Error;

use crate::types::SignalId;

/// A single file or sample sequence could not be turned into a signal.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("signal contains no samples")]
    Empty,
    #[error("sample {index} is not a finite number")]
    NonFinite { index: usize },
    #[error("non-numeric value {value:?} on line {line}")]
    Malformed { line: usize, value: String },
    #[error("column `{0}` not found in the header row")]
    MissingColumn(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid record header: {0}")]
    Header(String),
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Statistics were requested over zero played-back samples.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no samples have been played back yet")]
pub struct EmptyDataError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("failed to encode image: {0}")]
    Image(String),
    #[error("report document is invalid: {0}")]
    Document(#[from] serde_json::Error),
    #[error("report has no sections to export")]
    NothingToExport,
    #[error("report i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ExportError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ExportError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for ExportError {
    fn from(value: image::ImageError) -> Self {
        ExportError::Image(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid palette color {0:?}, expected #RRGGBB")]
    Color(String),
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    EmptyData(#[from] EmptyDataError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("unknown signal {0}")]
    UnknownSignal(SignalId),
}
