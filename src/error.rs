use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("channel {channel}: {onsets} onsets vs {offsets} offsets after leading-offset correction")]
    EdgeCountMismatch {
        channel: String,
        onsets: usize,
        offsets: usize,
    },
    #[error("channel {channel}: offset at {offset} does not follow onset at {onset} (event {event})")]
    EdgeOrderViolation {
        channel: String,
        event: usize,
        onset: f64,
        offset: f64,
    },
    #[error("unsupported {kind} \"{value}\" (expected one of: {expected})")]
    UnsupportedOption {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    #[error("timestamps must increase: sample {index} at {timestamp} follows {previous}")]
    NonMonotonicTimestamps {
        index: usize,
        previous: f64,
        timestamp: f64,
    },
    #[error("timestamps {previous} and {timestamp} (sample {index}) collapse when rounded to {decimals} decimals; sample rate too high for that resolution")]
    TimestampResolution {
        index: usize,
        previous: f64,
        timestamp: f64,
        decimals: u32,
    },
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
