use serde::{Deserialize, Serialize};

use crate::drivers::EmptyDataError;

/// Summary of the played-back part of a signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of samples covered, not wall-clock time.
    pub duration: usize,
    pub min: f64,
    pub max: f64,
}

impl SignalStats {
    /// Labelled values in report order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Mean", self.mean),
            ("Standard Deviation", self.std_dev),
            ("Duration", self.duration as f64),
            ("Min Value", self.min),
            ("Max Value", self.max),
        ]
    }
}

/// Statistics over `samples[..upto]` (clamped to the signal length).
pub fn stats_for(samples: &[f64], upto: usize) -> Result<SignalStats, EmptyDataError> {
    let played = &samples[..upto.min(samples.len())];
    if played.is_empty() {
        return Err(EmptyDataError);
    }
    let n = played.len() as f64;
    let mean = played.iter().sum::<f64>() / n;
    let variance = played.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let (min, max) = played
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Ok(SignalStats {
        mean,
        std_dev: variance.sqrt(),
        duration: played.len(),
        min,
        max,
    })
}
