use serde::{Deserialize, Serialize};

use super::recording::Recording;
use crate::config::ConditioningConfig;

/// How a sample is compared against the binarization cutoff.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CutoffRule {
    /// `value > cutoff` is high.
    Above,
    /// `value >= cutoff` is high.
    AtOrAbove,
}

impl CutoffRule {
    fn is_high(self, value: f64, cutoff: f64) -> bool {
        match self {
            CutoffRule::Above => value > cutoff,
            CutoffRule::AtOrAbove => value >= cutoff,
        }
    }
}

/// Maps every sample to `high` or `0.0`.
pub fn binarize(values: &mut [f64], cutoff: f64, high: f64, rule: CutoffRule) {
    for value in values.iter_mut() {
        *value = if rule.is_high(*value, cutoff) { high } else { 0.0 };
    }
}

/// Forces the last `count` samples low when the recording ends mid-pulse.
///
/// Returns whether the tail was modified.
pub fn clear_trailing_high(values: &mut [f64], cutoff: f64, count: usize) -> bool {
    match values.last() {
        Some(&last) if last > cutoff => {
            let start = values.len().saturating_sub(count.max(1));
            values[start..].iter_mut().for_each(|v| *v = 0.0);
            true
        }
        _ => false,
    }
}

/// Cleans every channel of a recording so that edges pair up downstream.
pub fn condition_recording(recording: &mut Recording, config: &ConditioningConfig) {
    for channel in recording.channels_mut() {
        binarize(
            &mut channel.values,
            config.cutoff,
            config.high_level,
            CutoffRule::Above,
        );
        if clear_trailing_high(&mut channel.values, config.cutoff, config.trailing_samples) {
            log::debug!("{}: recording ends high, tail forced low", channel.name);
        }
    }
}
