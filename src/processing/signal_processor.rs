use rayon::prelude::*;

use super::detectors::outliers::{filter_long_pulses, OutlierReport};
use super::detectors::pulse_edges::PulseEdgeDetector;
use super::detectors::EdgeTable;
use super::recording::{Channel, Recording};
use crate::config::EdgeConfig;
use crate::error::Result;

// -----------------------------------------------------------------------------
// SYNC PROCESSOR
// -----------------------------------------------------------------------------

/// Edge table for one channel, plus what outlier filtering removed from it.
#[derive(Debug, Clone)]
pub struct ChannelEdges {
    pub table: EdgeTable,
    pub outliers: Option<OutlierReport>,
}

impl ChannelEdges {
    pub fn channel(&self) -> &str {
        &self.table.channel
    }
}

/// Runs edge detection over every channel of a sync recording.
pub struct SyncProcessor {
    detector: PulseEdgeDetector,
    config: EdgeConfig,
}

impl SyncProcessor {
    pub fn new(config: EdgeConfig) -> Self {
        Self {
            detector: PulseEdgeDetector::new(config.threshold),
            config,
        }
    }

    pub fn is_excluded(&self, channel: &str) -> bool {
        self.config.excluded_channels.iter().any(|c| c == channel)
    }

    pub fn process_channel(&self, channel: &Channel, timestamps: &[f64]) -> Result<ChannelEdges> {
        let mut table = self
            .detector
            .detect(&channel.name, timestamps, &channel.values)?;

        let outliers = match &self.config.outlier_policy {
            Some(policy) if policy.channel == channel.name => filter_long_pulses(&mut table, policy),
            _ => None,
        };

        Ok(ChannelEdges { table, outliers })
    }

    /// One result per non-excluded channel, in recording order.
    ///
    /// A channel that fails its integrity checks yields an error without
    /// affecting the others.
    pub fn detect_all(&self, recording: &Recording) -> Vec<Result<ChannelEdges>> {
        let timestamps = recording.timestamps();
        let results: Vec<Result<ChannelEdges>> = recording
            .channels()
            .par_iter()
            .filter(|channel| !self.is_excluded(&channel.name))
            .map(|channel| self.process_channel(channel, timestamps))
            .collect();

        for result in &results {
            match result {
                Ok(edges) => log::info!("{}: {} events", edges.channel(), edges.table.len()),
                Err(e) => log::error!("{}", e),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlierPolicy;
    use crate::error::AnalysisError;

    fn pulses(len: usize, spans: &[(usize, usize)]) -> Vec<f64> {
        let mut values = vec![0.0; len];
        for &(start, end) in spans {
            values[start..end].iter_mut().for_each(|v| *v = 5.0);
        }
        values
    }

    fn recording() -> Recording {
        let len = 200;
        let timestamps = (0..len).map(|i| i as f64 / 100.0).collect();
        let mut stimulus_spans: Vec<(usize, usize)> =
            (0..6).map(|k| (10 + k * 25, 15 + k * 25)).collect();
        stimulus_spans[5] = (135, 195);
        Recording::new(
            100.0,
            timestamps,
            vec![
                Channel::new("monitor_refresh", pulses(len, &[(0, 1), (50, 51)])),
                Channel::new("licks", pulses(len, &[(20, 22), (90, 95)])),
                Channel::new("visual_stimulus", pulses(len, &stimulus_spans)),
                Channel::new("reward", pulses(len, &[(190, 200)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn excluded_channels_are_skipped() {
        let processor = SyncProcessor::new(EdgeConfig::default());
        let results = processor.detect_all(&recording());
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .all(|edges| edges.channel() != "monitor_refresh"));
    }

    #[test]
    fn results_follow_channel_order_and_fail_independently() {
        let processor = SyncProcessor::new(EdgeConfig::default());
        let results = processor.detect_all(&recording());

        let licks = results[0].as_ref().unwrap();
        assert_eq!(licks.channel(), "licks");
        assert_eq!(licks.table.onsets(), vec![0.2, 0.9]);
        assert!(licks.outliers.is_none());

        assert_eq!(results[1].as_ref().unwrap().channel(), "visual_stimulus");

        // Reward line is still high when the recording stops.
        assert!(matches!(
            results[2],
            Err(AnalysisError::EdgeCountMismatch { ref channel, .. }) if channel == "reward"
        ));
    }

    #[test]
    fn outlier_policy_only_touches_its_channel() {
        let processor = SyncProcessor::new(EdgeConfig::default());
        let results = processor.detect_all(&recording());

        let stimulus = results[1].as_ref().unwrap();
        let report = stimulus.outliers.as_ref().unwrap();
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].onset_index, 135);
        assert_eq!(stimulus.table.len(), 5);
    }

    #[test]
    fn policy_can_target_another_channel() {
        let config = EdgeConfig {
            excluded_channels: vec![],
            outlier_policy: Some(OutlierPolicy {
                channel: "licks".to_string(),
                ..OutlierPolicy::default()
            }),
            ..EdgeConfig::default()
        };
        let processor = SyncProcessor::new(config);
        let results = processor.detect_all(&recording());

        assert_eq!(results.len(), 4);
        // monitor_refresh starts high: leading offset dropped, one pulse left.
        assert_eq!(results[0].as_ref().unwrap().table.len(), 1);
        assert!(results[1].as_ref().unwrap().outliers.is_some());
        assert_eq!(results[2].as_ref().unwrap().table.len(), 6);
    }
}
