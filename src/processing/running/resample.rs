use super::PositionSample;
use crate::error::{AnalysisError, Result};

/// Longest grid a single stream may be resampled onto.
pub const MAX_GRID_POINTS: usize = 100_000_000;

/// Positions held on a fixed time grid starting at 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampledPositions {
    pub timestamps: Vec<f64>,
    pub positions: Vec<f64>,
}

/// Step/hold resampling onto `0, step, 2*step, ...` up to the last timestamp.
///
/// Each grid point takes the last raw value recorded at or before it, or keeps
/// the previous grid value (initially 0) when nothing new has arrived. Values
/// are never interpolated.
pub fn resample_positions(samples: &[PositionSample], step: f64) -> Result<ResampledPositions> {
    if step <= 0.0 || !step.is_finite() {
        return Err(AnalysisError::InvalidParameter {
            name: "step",
            reason: format!("must be positive, got {}", step),
        });
    }
    check_non_decreasing(samples)?;

    let last = match samples.last() {
        Some(sample) => sample.timestamp,
        None => return Ok(ResampledPositions::default()),
    };

    let points = (last / step).floor() + 1.0;
    if points > MAX_GRID_POINTS as f64 {
        return Err(AnalysisError::InvalidParameter {
            name: "step",
            reason: format!(
                "{} over a {} long stream gives {} grid points (limit {})",
                step, last, points, MAX_GRID_POINTS
            ),
        });
    }

    let mut resampled = ResampledPositions::default();
    let mut position = 0.0;
    let mut next = 0;
    let mut k: u64 = 0;
    loop {
        let t = k as f64 * step;
        if t > last {
            break;
        }
        while next < samples.len() && samples[next].timestamp <= t {
            position = samples[next].value;
            next += 1;
        }
        resampled.timestamps.push(t);
        resampled.positions.push(position);
        k += 1;
    }

    Ok(resampled)
}

fn check_non_decreasing(samples: &[PositionSample]) -> Result<()> {
    for (i, pair) in samples.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(AnalysisError::NonMonotonicTimestamps {
                index: i + 1,
                previous: pair[0].timestamp,
                timestamp: pair[1].timestamp,
            });
        }
    }
    Ok(())
}
