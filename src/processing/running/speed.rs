use std::f64::consts::PI;

use crate::error::{AnalysisError, Result};

/// Widest smoothing kernel accepted, i.e. the largest usable `ceil(framerate)`.
pub const MAX_KERNEL_WIDTH: usize = i32::MAX as usize;

/// Linear distance covered per encoder tick.
///
/// Each tab produces two ticks (leading and trailing edge), so one revolution
/// is `tabs_per_revolution * 2` ticks.
pub fn step_size(diameter: f64, tabs_per_revolution: u32) -> f64 {
    let wheel_circumference = diameter * PI;
    wheel_circumference / (tabs_per_revolution as f64 * 2.0)
}

/// Converts a fixed-grid position trace to smoothed linear speed.
///
/// Speed is the per-bin tick delta (0 for the first bin) scaled by the tick
/// distance and `framerate`, then averaged with a boxcar `ceil(framerate)` wide.
pub fn running_speed(
    position: &[f64],
    framerate: f64,
    diameter: f64,
    tabs_per_revolution: u32,
) -> Result<Vec<f64>> {
    if framerate <= 0.0 || !framerate.is_finite() {
        return Err(AnalysisError::InvalidParameter {
            name: "framerate",
            reason: format!("must be positive, got {}", framerate),
        });
    }
    if framerate.ceil() > MAX_KERNEL_WIDTH as f64 {
        return Err(AnalysisError::InvalidParameter {
            name: "framerate",
            reason: format!("smoothing kernel of {} samples is too wide", framerate.ceil()),
        });
    }
    if diameter <= 0.0 || !diameter.is_finite() {
        return Err(AnalysisError::InvalidParameter {
            name: "diameter",
            reason: format!("must be positive, got {}", diameter),
        });
    }
    if tabs_per_revolution == 0 {
        return Err(AnalysisError::InvalidParameter {
            name: "tabs_per_revolution",
            reason: "must be at least 1".to_string(),
        });
    }

    let scale = step_size(diameter, tabs_per_revolution) * framerate;
    let mut speed = vec![0.0; position.len()];
    for (i, pair) in position.windows(2).enumerate() {
        speed[i + 1] = (pair[1] - pair[0]) * scale;
    }

    Ok(boxcar_same(&speed, framerate.ceil() as usize))
}

/// Moving average with a uniform kernel, output as long as the input.
///
/// Matches a centred "same" convolution: output `i` averages inputs
/// `i + (width - 1) / 2 - (width - 1) ..= i + (width - 1) / 2`, with samples
/// outside the signal counting as zero (so edge bins are damped).
pub fn boxcar_same(values: &[f64], width: usize) -> Vec<f64> {
    if width <= 1 {
        return values.to_vec();
    }

    let n = values.len() as isize;
    let half = isize::try_from((width - 1) / 2).unwrap_or(isize::MAX);
    let span = isize::try_from(width - 1).unwrap_or(isize::MAX);
    let weight = 1.0 / width as f64;

    (0..n)
        .map(|i| {
            let centre = i.saturating_add(half);
            let hi = centre.min(n - 1);
            let lo = centre.saturating_sub(span).max(0);
            if lo > hi {
                return 0.0;
            }
            values[lo as usize..=hi as usize].iter().sum::<f64>() * weight
        })
        .collect()
}
