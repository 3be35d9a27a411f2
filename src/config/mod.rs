// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_WHEEL_DIAMETER: f64 = 14.0;
pub const DEFAULT_WHEEL_TABS: u32 = 44;
/// Framerate used when speed is derived from a resampled (100 ms grid) track.
pub const DEFAULT_RESAMPLED_FRAMERATE: f64 = 20.0;
/// Framerate used for traces already sampled at the acquisition rate.
pub const DEFAULT_RAW_FRAMERATE: f64 = 100.0;
pub const DEFAULT_RESAMPLE_STEP: f64 = 100.0;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub verbose: bool,
    pub session: SessionConfig,
    pub edges: EdgeConfig,
    pub conditioning: ConditioningConfig,
    pub wheel: WheelConfig,
    pub ephys: EphysConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub base_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EdgeConfig {
    pub threshold: f64,
    pub excluded_channels: Vec<String>,
    pub outlier_policy: Option<OutlierPolicy>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            excluded_channels: vec!["monitor_refresh".to_string()],
            outlier_policy: Some(OutlierPolicy::default()),
        }
    }
}

/// Which channel gets long-pulse rejection, and how aggressively.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutlierPolicy {
    pub channel: String,
    /// Events longer than `mean + sigma * stddev` are dropped.
    pub sigma: f64,
    /// Dropping more than this share of events marks the distribution as suspect.
    pub max_outlier_fraction: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            channel: "visual_stimulus".to_string(),
            sigma: 1.0,
            max_outlier_fraction: 0.25,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConditioningConfig {
    pub cutoff: f64,
    pub high_level: f64,
    pub trailing_samples: usize,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.5,
            high_level: 5.0,
            trailing_samples: 2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WheelConfig {
    /// Wheel diameter in cm.
    pub diameter: f64,
    pub tabs_per_revolution: u32,
    pub framerate: f64,
    /// Resampling interval, in the position stream's time unit.
    pub step: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_WHEEL_DIAMETER,
            tabs_per_revolution: DEFAULT_WHEEL_TABS,
            framerate: DEFAULT_RESAMPLED_FRAMERATE,
            step: DEFAULT_RESAMPLE_STEP,
        }
    }
}

/// Channel positions in the ephys rig's nidaq matrix.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EphysConfig {
    pub cutoff: f64,
    pub licks: usize,
    pub visual_stimulus: usize,
    pub shocks: usize,
    pub rewards: usize,
}

impl Default for EphysConfig {
    fn default() -> Self {
        Self {
            cutoff: 2.0,
            licks: 1,
            visual_stimulus: 3,
            shocks: 4,
            rewards: 5,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config_str = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&config_str)?)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml)?;
    Ok(())
}
