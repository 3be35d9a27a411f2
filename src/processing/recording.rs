use std::fs::File;
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// One named column of a synchronization recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Decoded nidaq matrix: named channels aligned 1:1 with a timestamp vector.
#[derive(Debug, Clone)]
pub struct Recording {
    sample_rate: f64,
    timestamps: Vec<f64>,
    channels: Vec<Channel>,
}

impl Recording {
    pub fn new(sample_rate: f64, timestamps: Vec<f64>, channels: Vec<Channel>) -> Result<Self> {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return Err(AnalysisError::InvalidParameter {
                name: "sample_rate",
                reason: format!("must be positive, got {}", sample_rate),
            });
        }
        check_strictly_increasing(&timestamps)?;
        for channel in &channels {
            if channel.values.len() != timestamps.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: format!("channel {}", channel.name),
                    expected: timestamps.len(),
                    actual: channel.values.len(),
                });
            }
        }
        Ok(Self {
            sample_rate,
            timestamps,
            channels,
        })
    }

    /// Reads a CSV export with a `timestamps` column followed by one column per channel.
    ///
    /// Timestamps are rounded to 4 decimals and the sample rate is estimated
    /// from the first and last timestamp. Raw timestamps must already increase;
    /// a file whose neighbours only collapse under rounding is reported as
    /// [`AnalysisError::TimestampResolution`].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(File::open(path.as_ref())?);
        let headers = rdr.headers()?.clone();

        let time_column = headers
            .iter()
            .position(|h| h.trim() == "timestamps")
            .ok_or_else(|| AnalysisError::UnknownChannel("timestamps".to_string()))?;

        let mut timestamps = Vec::new();
        let mut columns: Vec<(usize, Channel)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != time_column)
            .map(|(i, name)| (i, Channel::new(name.trim(), Vec::new())))
            .collect();

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            timestamps.push(parse_cell(record.get(time_column), row, "timestamps")?);
            for (i, channel) in columns.iter_mut() {
                channel
                    .values
                    .push(parse_cell(record.get(*i), row, &channel.name)?);
            }
        }

        check_strictly_increasing(&timestamps)?;
        let timestamps = round_timestamps(&timestamps)?;

        let sample_rate = estimate_sample_rate(&timestamps)?;
        let channels = columns.into_iter().map(|(_, c)| c).collect();
        log::info!(
            "Loaded recording {} ({} samples at {:.1} Hz)",
            path.as_ref().display(),
            timestamps.len(),
            sample_rate
        );
        Self::new(sample_rate, timestamps, channels)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn channel(&self, name: &str) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AnalysisError::UnknownChannel(name.to_string()))
    }

    pub fn channel_at(&self, index: usize) -> Result<&Channel> {
        self.channels
            .get(index)
            .ok_or_else(|| AnalysisError::UnknownChannel(format!("#{}", index)))
    }
}

pub(crate) fn check_strictly_increasing(timestamps: &[f64]) -> Result<()> {
    for (i, pair) in timestamps.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(AnalysisError::NonMonotonicTimestamps {
                index: i + 1,
                previous: pair[0],
                timestamp: pair[1],
            });
        }
    }
    Ok(())
}

fn parse_cell(cell: Option<&str>, row: usize, column: &str) -> Result<f64> {
    let raw = cell.unwrap_or("").trim();
    raw.parse::<f64>()
        .map_err(|e| AnalysisError::InvalidParameter {
            name: "recording",
            reason: format!("row {}, column {}: \"{}\" ({})", row + 1, column, raw, e),
        })
}

fn estimate_sample_rate(timestamps: &[f64]) -> Result<f64> {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if timestamps.len() > 1 && last > first => {
            Ok((timestamps.len() - 1) as f64 / (last - first))
        }
        _ => Err(AnalysisError::InvalidParameter {
            name: "timestamps",
            reason: "need at least two increasing samples to estimate a sample rate".to_string(),
        }),
    }
}

const TIMESTAMP_DECIMALS: u32 = 4;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round_timestamps(raw: &[f64]) -> Result<Vec<f64>> {
    let rounded: Vec<f64> = raw.iter().map(|&t| round4(t)).collect();
    for (i, pair) in rounded.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(AnalysisError::TimestampResolution {
                index: i + 1,
                previous: raw[i],
                timestamp: raw[i + 1],
                decimals: TIMESTAMP_DECIMALS,
            });
        }
    }
    Ok(rounded)
}
