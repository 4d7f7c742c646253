// src/worker.rs
// Report files are written off the UI thread so playback timing never waits on disk.
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::drivers::ReportWriter;
use crate::engine::Snapshot;

#[derive(Debug)]
pub enum ReportJob {
    Append(Snapshot),
    ExportPdf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Appended(PathBuf),
    Exported(PathBuf),
    Failed(String),
}

/// Starts the worker; it exits once the job sender is dropped.
pub fn spawn_report_worker<W>(mut writer: W) -> (Sender<ReportJob>, Receiver<ReportEvent>)
where
    W: ReportWriter + Send + 'static,
{
    let (job_tx, job_rx) = channel::<ReportJob>();
    let (event_tx, event_rx) = channel();
    thread::spawn(move || {
        for job in job_rx {
            let result = match job {
                ReportJob::Append(snapshot) => writer.append(&snapshot).map(ReportEvent::Appended),
                ReportJob::ExportPdf => writer.export_pdf().map(ReportEvent::Exported),
            };
            let event = result.unwrap_or_else(|err| {
                log::error!("report worker: {err}");
                ReportEvent::Failed(err.to_string())
            });
            if event_tx.send(event).is_err() {
                break;
            }
        }
        log::debug!("report worker stopped");
    });
    (job_tx, event_rx)
}
