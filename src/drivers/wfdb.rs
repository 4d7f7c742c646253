//! Reader for PhysioNet (WFDB) records: a text `.hea` header describing one
//! or more binary signal files. Only the first channel is extracted.

use std::path::{Path, PathBuf};

use crate::drivers::error::ImportError;

const DEFAULT_GAIN: f64 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RecordHeader {
    pub name: String,
    pub sampling_hz: Option<f64>,
    pub samples_per_signal: Option<usize>,
    pub signals: Vec<SignalSpec>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalSpec {
    pub file_name: String,
    pub format: u16,
    pub samples_per_frame: usize,
    pub byte_offset: usize,
    pub gain: f64,
    pub baseline: i32,
    pub description: String,
}

impl SignalSpec {
    /// Converts an ADC value into physical units.
    pub fn to_physical(&self, digital: i32) -> f64 {
        (f64::from(digital) - f64::from(self.baseline)) / self.gain
    }
}

pub fn parse_header(text: &str) -> Result<RecordHeader, ImportError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let record_line = lines
        .next()
        .ok_or_else(|| ImportError::Header("missing record line".into()))?;
    let mut fields = record_line.split_whitespace();
    let name = fields
        .next()
        .ok_or_else(|| ImportError::Header("missing record name".into()))?
        .to_owned();
    if name.contains('/') {
        return Err(ImportError::UnsupportedFormat(format!("multi-segment record {name}")));
    }
    let signal_count: usize = fields
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| ImportError::Header(format!("bad signal count in {record_line:?}")))?;
    let sampling_hz = fields.next().and_then(|f| leading_number(f).parse().ok());
    let samples_per_signal = fields.next().and_then(|n| n.parse().ok());

    let signals = lines
        .take(signal_count)
        .map(parse_signal_line)
        .collect::<Result<Vec<_>, _>>()?;
    if signals.is_empty() {
        return Err(ImportError::Header(format!("record {name} declares no signals")));
    }
    if signals.len() != signal_count {
        return Err(ImportError::Header(format!(
            "expected {signal_count} signal lines, found {}",
            signals.len()
        )));
    }
    Ok(RecordHeader {
        name,
        sampling_hz,
        samples_per_signal,
        signals,
    })
}

fn parse_signal_line(line: &str) -> Result<SignalSpec, ImportError> {
    let bad = || ImportError::Header(format!("bad signal line {line:?}"));
    let fields: Vec<&str> = line.split_whitespace().collect();
    let file_name = fields.first().ok_or_else(bad)?.to_string();

    // format[xspf][:skew][+offset]
    let format_spec = fields.get(1).ok_or_else(bad)?;
    let format: u16 = leading_number(format_spec).parse().map_err(|_| bad())?;
    let samples_per_frame = format_spec
        .split_once('x')
        .map(|(_, rest)| leading_number(rest).parse().map_err(|_| bad()))
        .transpose()?
        .unwrap_or(1usize)
        .max(1);
    let byte_offset = format_spec
        .split_once('+')
        .map(|(_, rest)| leading_number(rest).parse().map_err(|_| bad()))
        .transpose()?
        .unwrap_or(0usize);

    // gain[(baseline)][/units], adc resolution, adc zero
    let gain_spec = fields.get(2).copied().unwrap_or("");
    let gain = leading_number(gain_spec).parse::<f64>().unwrap_or(0.0);
    let gain = if gain == 0.0 { DEFAULT_GAIN } else { gain };
    let adc_zero: i32 = fields.get(4).and_then(|z| z.parse().ok()).unwrap_or(0);
    let baseline = gain_spec
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(b, _)| b.parse::<i32>().map_err(|_| bad()))
        .transpose()?
        .unwrap_or(adc_zero);
    let description = fields.get(8..).map(|d| d.join(" ")).unwrap_or_default();

    Ok(SignalSpec {
        file_name,
        format,
        samples_per_frame,
        byte_offset,
        gain,
        baseline,
        description,
    })
}

/// Prefix of `text` that looks like a number (`360` of `360/1000(0)`).
fn leading_number(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

/// Decodes a signal file into raw ADC values; `None` marks an invalid sample.
pub fn decode(bytes: &[u8], format: u16) -> Result<Vec<Option<i32>>, ImportError> {
    let samples = match format {
        16 => bytes
            .chunks_exact(2)
            .map(|b| i32::from(i16::from_le_bytes([b[0], b[1]])))
            .map(|v| (v != -32768).then_some(v))
            .collect(),
        61 => bytes
            .chunks_exact(2)
            .map(|b| i32::from(i16::from_be_bytes([b[0], b[1]])))
            .map(|v| (v != -32768).then_some(v))
            .collect(),
        80 => bytes
            .iter()
            .map(|b| i32::from(*b) - 128)
            .map(|v| (v != -128).then_some(v))
            .collect(),
        212 => {
            let mut out = Vec::with_capacity(bytes.len() / 3 * 2);
            for group in bytes.chunks_exact(3) {
                let (b0, b1, b2) = (i32::from(group[0]), i32::from(group[1]), i32::from(group[2]));
                for raw in [b0 | ((b1 & 0x0F) << 8), b2 | ((b1 & 0xF0) << 4)] {
                    let v = if raw & 0x800 != 0 { raw - 0x1000 } else { raw };
                    out.push((v != -2048).then_some(v));
                }
            }
            out
        }
        other => {
            return Err(ImportError::UnsupportedFormat(format!("wfdb format {other}")));
        }
    };
    Ok(samples)
}

/// Reads the first channel of the record `path` belongs to (either its
/// `.hea` or its `.dat`), in physical units.
pub fn read_first_channel(path: &Path) -> Result<Vec<f64>, ImportError> {
    let header_path = path.with_extension("hea");
    let header = parse_header(&read_text(&header_path)?)?;
    let first = &header.signals[0];
    if first.file_name == "~" {
        return Err(ImportError::UnsupportedFormat(format!(
            "record {} has no stored signal file",
            header.name
        )));
    }

    // Signals stored in the same file are interleaved frame by frame.
    let frame_width: usize = header
        .signals
        .iter()
        .filter(|s| s.file_name == first.file_name)
        .map(|s| s.samples_per_frame)
        .sum();
    let data_path = sibling(&header_path, &first.file_name);
    let bytes = std::fs::read(&data_path).map_err(|source| ImportError::Unreadable {
        path: data_path.clone(),
        source,
    })?;
    let raw = decode(bytes.get(first.byte_offset..).unwrap_or(&[]), first.format)?;

    let mut frames = raw.len() / frame_width;
    if let Some(declared) = header.samples_per_signal.filter(|n| *n > 0) {
        frames = frames.min(declared);
    }

    let mut last = 0.0;
    let mut samples = Vec::with_capacity(frames * first.samples_per_frame);
    for frame in raw.chunks_exact(frame_width).take(frames) {
        for value in &frame[..first.samples_per_frame] {
            // gaps repeat the previous value
            if let Some(digital) = value {
                last = first.to_physical(*digital);
            }
            samples.push(last);
        }
    }
    log::debug!(
        "wfdb record {}: {} samples at {:?} Hz ({})",
        header.name,
        samples.len(),
        header.sampling_hz,
        first.description
    );
    Ok(samples)
}

fn read_text(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn sibling(header_path: &Path, file_name: &str) -> PathBuf {
    header_path
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
