use super::{Edge, EdgeEvent, EdgeTable};
use crate::error::{AnalysisError, Result};

/// Finds rising and falling edges of a two-level pulse channel.
///
/// The channel is expected to be conditioned already (binarized, trailing
/// high samples forced low); see [`crate::processing::conditioning`].
#[derive(Debug, Clone, Copy)]
pub struct PulseEdgeDetector {
    threshold: f64,
}

impl PulseEdgeDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Raw onsets and offsets, before any correction or pairing.
    ///
    /// Sample 0 has no preceding difference and never produces an edge.
    pub fn find_edges(&self, timestamps: &[f64], values: &[f64]) -> (Vec<Edge>, Vec<Edge>) {
        let mut onsets = Vec::new();
        let mut offsets = Vec::new();

        let steps = values.windows(2).zip(timestamps.iter().skip(1));
        for (i, (pair, &time)) in steps.enumerate() {
            let diff = pair[1] - pair[0];
            let edge = Edge { time, index: i + 1 };
            if diff > self.threshold {
                onsets.push(edge);
            } else if diff < -self.threshold {
                offsets.push(edge);
            }
        }

        (onsets, offsets)
    }

    /// Pairs onsets with offsets for one channel.
    ///
    /// A recording that starts mid-pulse yields one more offset than onsets;
    /// that leading offset is dropped once. Any remaining count mismatch, or a
    /// pair whose offset does not follow its onset, rejects the channel.
    pub fn detect(&self, channel: &str, timestamps: &[f64], values: &[f64]) -> Result<EdgeTable> {
        if timestamps.len() != values.len() {
            return Err(AnalysisError::LengthMismatch {
                what: format!("channel {}", channel),
                expected: timestamps.len(),
                actual: values.len(),
            });
        }

        let (onsets, mut offsets) = self.find_edges(timestamps, values);

        if onsets.len() < offsets.len() {
            log::debug!("{}: starts high, dropping leading offset", channel);
            offsets.remove(0);
        }

        if onsets.len() != offsets.len() {
            return Err(AnalysisError::EdgeCountMismatch {
                channel: channel.to_string(),
                onsets: onsets.len(),
                offsets: offsets.len(),
            });
        }

        let mut events = Vec::with_capacity(onsets.len());
        for (k, (on, off)) in onsets.iter().zip(offsets.iter()).enumerate() {
            if off.time <= on.time {
                return Err(AnalysisError::EdgeOrderViolation {
                    channel: channel.to_string(),
                    event: k,
                    onset: on.time,
                    offset: off.time,
                });
            }
            events.push(EdgeEvent {
                onset: on.time,
                offset: off.time,
                onset_index: on.index,
                offset_index: off.index,
            });
        }

        log::debug!("{}: {} pulses", channel, events.len());
        Ok(EdgeTable::new(channel, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: f64 = 5.0;

    fn timeline(len: usize, period: f64) -> Vec<f64> {
        (0..len).map(|i| i as f64 * period).collect()
    }

    /// `count` pulses of `width` samples, separated by `gap` low samples,
    /// starting after `lead` low samples.
    fn square_train(count: usize, width: usize, gap: usize, lead: usize) -> Vec<f64> {
        let mut values = vec![0.0; lead];
        for _ in 0..count {
            values.extend(std::iter::repeat(HIGH).take(width));
            values.extend(std::iter::repeat(0.0).take(gap));
        }
        values
    }

    #[test]
    fn quiet_channel_has_no_edges() {
        let values = vec![0.0, 1.0, 0.5, 1.5, 0.0, 1.9];
        let table = PulseEdgeDetector::new(2.0)
            .detect("licks", &timeline(values.len(), 0.001), &values)
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn empty_channel_is_not_an_error() {
        let table = PulseEdgeDetector::new(2.0).detect("licks", &[], &[]).unwrap();
        assert!(table.is_empty());

        let table = PulseEdgeDetector::new(2.0)
            .detect("licks", &[0.0], &[HIGH])
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn recovers_square_train() {
        let period = 0.001;
        let values = square_train(7, 40, 60, 25);
        let timestamps = timeline(values.len(), period);

        let table = PulseEdgeDetector::new(2.0)
            .detect("visual_stimulus", &timestamps, &values)
            .unwrap();

        assert_eq!(table.len(), 7);
        for (k, event) in table.events.iter().enumerate() {
            assert_eq!(event.onset_index, 25 + k * 100);
            assert_eq!(event.offset_index, 25 + k * 100 + 40);
            assert!((event.duration() - 40.0 * period).abs() <= period);
        }
    }

    #[test]
    fn leading_offset_is_dropped_when_starting_high() {
        let mut values = vec![HIGH; 10];
        values.extend(square_train(3, 20, 30, 15));
        let timestamps = timeline(values.len(), 0.01);

        let detector = PulseEdgeDetector::new(2.0);
        let (onsets, offsets) = detector.find_edges(&timestamps, &values);
        assert_eq!(onsets.len() + 1, offsets.len());

        let table = detector.detect("shock", &timestamps, &values).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.events[0].onset_index, 25);
        assert_eq!(table.events[0].offset_index, 45);
    }

    #[test]
    fn dangling_onset_rejects_channel() {
        let mut values = square_train(2, 10, 10, 5);
        values.extend([HIGH, HIGH]);
        let timestamps = timeline(values.len(), 1.0);

        let err = PulseEdgeDetector::new(2.0)
            .detect("reward", &timestamps, &values)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::EdgeCountMismatch { onsets: 3, offsets: 2, .. }
        ));
    }

    #[test]
    fn start_and_end_high_is_an_ordering_violation() {
        // Equal counts, but every offset precedes its paired onset.
        let values = vec![HIGH, HIGH, 0.0, 0.0, HIGH, HIGH];
        let timestamps = timeline(values.len(), 1.0);

        let err = PulseEdgeDetector::new(2.0)
            .detect("reward", &timestamps, &values)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EdgeOrderViolation { event: 0, .. }));
    }

    #[test]
    fn misaligned_input_is_rejected() {
        let err = PulseEdgeDetector::new(2.0)
            .detect("licks", &[0.0, 1.0], &[0.0])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }
}
