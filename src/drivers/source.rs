use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::drivers::error::ImportError;
use crate::drivers::{csv, wfdb};

/// Something that can turn a file into raw samples.
pub trait SignalSource {
    fn read_samples(&self, path: &Path) -> Result<Vec<f64>, ImportError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Table with a designated value column.
    Csv,
    /// PhysioNet record: `.hea` header plus `.dat` signal file.
    Wfdb,
}

impl SourceFormat {
    pub const EXTENSIONS: [&'static str; 3] = ["csv", "hea", "dat"];

    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "hea" | "dat" => Ok(SourceFormat::Wfdb),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads the formats the viewer understands, picked by file extension.
#[derive(Clone, Debug)]
pub struct FileSource {
    value_column: String,
}

impl FileSource {
    pub fn new(value_column: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
        }
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new("values")
    }
}

impl SignalSource for FileSource {
    fn read_samples(&self, path: &Path) -> Result<Vec<f64>, ImportError> {
        let samples = match SourceFormat::from_path(path)? {
            SourceFormat::Csv => {
                let text = std::fs::read_to_string(path).map_err(|source| ImportError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
                csv::parse_column(&text, &self.value_column)?
            }
            SourceFormat::Wfdb => wfdb::read_first_channel(path)?,
        };
        log::debug!("read {} samples from {}", samples.len(), path.display());
        Ok(samples)
    }
}

/// In-memory source useful for tests and deterministic playback.
#[derive(Clone, Debug, Default)]
pub struct ManualSource {
    files: HashMap<PathBuf, Vec<f64>>,
}

impl ManualSource {
    pub fn new(files: impl IntoIterator<Item = (PathBuf, Vec<f64>)>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

impl SignalSource for ManualSource {
    fn read_samples(&self, path: &Path) -> Result<Vec<f64>, ImportError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::Unreadable {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such signal"),
            })
    }
}
