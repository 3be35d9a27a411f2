use std::str::FromStr;

use super::event_log::{EventCode, EventLog};
use crate::config::{EphysConfig, WheelConfig};
use crate::error::{AnalysisError, Result};
use crate::processing::conditioning::{binarize, CutoffRule};
use crate::processing::detectors::transitions::transition_times;
use crate::processing::recording::Recording;
use crate::processing::running::RunningTrack;

/// Span the ephys rig's stored running trace covers, in seconds.
pub const EPHYS_RUNNING_DURATION: f64 = 1000.0 / 15.0;

const EPHYS_HIGH_LEVEL: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rig {
    /// Behavior-only rigs writing a plain-text event log.
    EventLog,
    /// Electrophysiology rig with a nidaq sync recording.
    Ephys,
}

impl FromStr for Rig {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lbr" | "leftbottomrig" | "nn" | "noname" => Ok(Rig::EventLog),
            "ephys" => Ok(Rig::Ephys),
            _ => Err(AnalysisError::UnsupportedOption {
                kind: "rig",
                value: s.to_string(),
                expected: "lbr, leftbottomrig, nn, noname, ephys",
            }),
        }
    }
}

/// Running and discrete behavioral events of one session, whatever the rig.
#[derive(Debug, Clone)]
pub struct BehaviorEvents {
    pub running: RunningTrack,
    pub licks: Vec<f64>,
    pub visual_stimuli: Vec<f64>,
    pub shocks: Vec<f64>,
    pub rewards: Vec<f64>,
}

impl BehaviorEvents {
    pub fn from_event_log(log: &EventLog, wheel: &WheelConfig) -> Result<Self> {
        Ok(Self {
            running: RunningTrack::from_positions(&log.positions(), wheel)?,
            licks: log.times(EventCode::Lick),
            visual_stimuli: log.times(EventCode::VisualStimulus),
            shocks: log.times(EventCode::Shock),
            rewards: log.times(EventCode::Reward),
        })
    }

    /// Every level change on the configured nidaq channels counts as an event.
    pub fn from_ephys(
        recording: &Recording,
        running: RunningTrack,
        config: &EphysConfig,
    ) -> Result<Self> {
        let events = |index: usize| -> Result<Vec<f64>> {
            let mut values = recording.channel_at(index)?.values.clone();
            binarize(&mut values, config.cutoff, EPHYS_HIGH_LEVEL, CutoffRule::AtOrAbove);
            Ok(transition_times(recording.timestamps(), &values))
        };

        Ok(Self {
            running,
            licks: events(config.licks)?,
            visual_stimuli: events(config.visual_stimulus)?,
            shocks: events(config.shocks)?,
            rewards: events(config.rewards)?,
        })
    }
}
