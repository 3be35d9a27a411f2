pub mod resample;
pub mod speed;

use serde::Serialize;

use self::resample::resample_positions;
use self::speed::running_speed;
use crate::config::WheelConfig;
use crate::error::{AnalysisError, Result};

/// One raw wheel encoder reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub timestamp: f64,
    pub value: f64,
}

/// One row of the exported running table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunningRow {
    pub position: f64,
    pub speed: f64,
    pub timestamp: f64,
}

/// Position and speed on a fixed time grid.
///
/// Only produced by the speed estimator or from a rig's precomputed trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunningTrack {
    timestamps: Vec<f64>,
    positions: Vec<f64>,
    speeds: Vec<f64>,
}

impl RunningTrack {
    /// Resamples a raw position stream and derives smoothed speed from it.
    pub fn from_positions(samples: &[PositionSample], wheel: &WheelConfig) -> Result<Self> {
        let resampled = resample_positions(samples, wheel.step)?;
        let speeds = running_speed(
            &resampled.positions,
            wheel.framerate,
            wheel.diameter,
            wheel.tabs_per_revolution,
        )?;
        Ok(Self {
            timestamps: resampled.timestamps,
            positions: resampled.positions,
            speeds,
        })
    }

    /// Wraps a position/speed trace the acquisition software already computed,
    /// spreading its samples evenly over `[0, duration]`.
    pub fn from_recorded(positions: Vec<f64>, speeds: Vec<f64>, duration: f64) -> Result<Self> {
        if positions.len() != speeds.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "recorded speed".to_string(),
                expected: positions.len(),
                actual: speeds.len(),
            });
        }
        let n = positions.len();
        let timestamps = match n {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => (0..n)
                .map(|i| duration * i as f64 / (n - 1) as f64)
                .collect(),
        };
        Ok(Self {
            timestamps,
            positions,
            speeds,
        })
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RunningRow> + '_ {
        self.timestamps
            .iter()
            .zip(&self.positions)
            .zip(&self.speeds)
            .map(|((&timestamp, &position), &speed)| RunningRow {
                position,
                speed,
                timestamp,
            })
    }
}
