use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::drivers::error::ExportError;
use crate::drivers::pdf::{PdfDocument, PdfPage};
use crate::engine::{SignalSummary, Snapshot};
use crate::types::GraphId;

pub const REPORT_TITLE: &str = "Signal Snapshots";

/// Destination for snapshots taken during a session.
pub trait ReportWriter {
    /// Adds a section for `snapshot`; returns the document it was added to.
    fn append(&mut self, snapshot: &Snapshot) -> Result<PathBuf, ExportError>;
    /// Converts everything appended so far into a PDF; returns its path.
    fn export_pdf(&self) -> Result<PathBuf, ExportError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl Default for ReportDocument {
    fn default() -> Self {
        Self {
            title: REPORT_TITLE.to_owned(),
            sections: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub graph: GraphId,
    pub cursor: usize,
    /// PNG file name, relative to the document.
    pub image: String,
    pub signals: Vec<SignalSummary>,
}

impl ReportSection {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} at sample {}", self.graph, self.cursor), String::new()];
        for signal in &self.signals {
            let shown = if signal.visible { "" } else { " (hidden)" };
            lines.push(format!("{}{shown}", signal.label));
            match &signal.stats {
                Some(stats) => lines.extend(
                    stats
                        .entries()
                        .iter()
                        .map(|(label, value)| format!("    {label}: {value:.2}")),
                ),
                None => lines.push("    no data".to_owned()),
            }
        }
        lines
    }
}

/// JSON report document with PNG files next to it.
#[derive(Clone, Debug)]
pub struct DocumentReport {
    directory: PathBuf,
    document_name: String,
    pdf_name: String,
}

impl DocumentReport {
    pub fn new(
        directory: impl Into<PathBuf>,
        document_name: impl Into<String>,
        pdf_name: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            document_name: document_name.into(),
            pdf_name: pdf_name.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(&config.directory, &config.document_name, &config.pdf_name)
    }

    pub fn document_path(&self) -> PathBuf {
        self.directory.join(&self.document_name)
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.directory.join(&self.pdf_name)
    }

    /// The current document, or a fresh one if none was written yet.
    pub fn load(&self) -> Result<ReportDocument, ExportError> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(ReportDocument::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, document: &ReportDocument) -> Result<(), ExportError> {
        fs::write(self.document_path(), serde_json::to_string_pretty(document)?)?;
        Ok(())
    }

    fn load_image(&self, name: &str) -> Result<image::RgbImage, ExportError> {
        Ok(image::open(self.directory.join(name))?.to_rgb8())
    }
}

impl ReportWriter for DocumentReport {
    fn append(&mut self, snapshot: &Snapshot) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.directory)?;
        let mut document = self.load()?;
        let image = next_image_name(&self.directory, document.sections.len());
        fs::write(self.directory.join(&image), &snapshot.image_png)?;
        document.sections.push(ReportSection {
            graph: snapshot.graph,
            cursor: snapshot.cursor,
            image,
            signals: snapshot.signals.clone(),
        });
        self.save(&document)?;
        let path = self.document_path();
        log::info!(
            "snapshot of {} added to {} ({} sections)",
            snapshot.graph,
            path.display(),
            document.sections.len()
        );
        Ok(path)
    }

    fn export_pdf(&self) -> Result<PathBuf, ExportError> {
        let document = self.load()?;
        if document.sections.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let mut pdf = PdfDocument::new();
        for (index, section) in document.sections.iter().enumerate() {
            let mut lines = vec![format!("Snapshot {}", index + 1)];
            lines.extend(section.lines());
            pdf.push_page(PdfPage {
                title: document.title.clone(),
                image: Some(self.load_image(&section.image)?),
                lines,
            });
        }
        let path = self.pdf_path();
        fs::write(&path, pdf.to_bytes())?;
        log::info!("exported {} pages to {}", pdf.page_count(), path.display());
        Ok(path)
    }
}

/// First free `snapshot_NNN.png` name, so reloaded documents never
/// overwrite an earlier picture.
fn next_image_name(directory: &Path, existing: usize) -> String {
    (existing + 1..)
        .map(|n| format!("snapshot_{n:03}.png"))
        .find(|name| !directory.join(name).exists())
        .unwrap_or_else(|| format!("snapshot_{:03}.png", existing + 1))
}
