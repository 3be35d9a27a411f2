use super::{EdgeEvent, EdgeTable, Statistics};
use crate::config::OutlierPolicy;

/// Durations within this fraction of the mean above the cutoff are kept.
/// Differences of rounded timestamps carry a few ULP of noise that is not spread.
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// What the long-pulse filter removed from a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub removed: Vec<EdgeEvent>,
    pub mean_duration: f64,
    pub std_duration: f64,
    pub cutoff: f64,
    /// Too many events were over the cutoff for them to be stray stuck pulses.
    pub suspect_distribution: bool,
}

/// Drops events whose duration exceeds `mean + sigma * stddev`.
///
/// Returns `None` (and leaves the table untouched) when there are fewer than
/// two events, since no spread can be estimated.
pub fn filter_long_pulses(table: &mut EdgeTable, policy: &OutlierPolicy) -> Option<OutlierReport> {
    if table.len() < 2 {
        return None;
    }

    let statistics = Statistics::from_values(&table.durations());
    let cutoff = statistics.mean + policy.sigma * statistics.std_dev;

    let limit = cutoff + RELATIVE_TOLERANCE * statistics.mean.abs();

    let total = table.len();
    let (kept, removed): (Vec<EdgeEvent>, Vec<EdgeEvent>) = table
        .events
        .iter()
        .partition(|event| event.duration() <= limit);
    table.events = kept;

    let suspect_distribution = removed.len() as f64 / total as f64 > policy.max_outlier_fraction;
    if suspect_distribution {
        log::warn!(
            "{}: {} of {} pulses longer than {:.4}; durations look multimodal, check the rig",
            table.channel,
            removed.len(),
            total,
            cutoff
        );
    } else if !removed.is_empty() {
        log::debug!(
            "{}: dropped {} long pulse(s) over {:.4}",
            table.channel,
            removed.len(),
            cutoff
        );
    }

    Some(OutlierReport {
        removed,
        mean_duration: statistics.mean,
        std_duration: statistics.std_dev,
        cutoff,
        suspect_distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::detectors::pulse_edges::PulseEdgeDetector;

    fn table_from_durations(durations: &[f64]) -> EdgeTable {
        let mut t = 0.0;
        let events = durations
            .iter()
            .enumerate()
            .map(|(k, &d)| {
                let onset = t;
                t += d + 50.0;
                EdgeEvent {
                    onset,
                    offset: onset + d,
                    onset_index: 2 * k,
                    offset_index: 2 * k + 1,
                }
            })
            .collect();
        EdgeTable::new("visual_stimulus", events)
    }

    #[test]
    fn removes_single_stuck_pulse() {
        let mut durations = vec![10.0; 9];
        durations.insert(4, 100.0);
        let mut table = table_from_durations(&durations);

        let report = filter_long_pulses(&mut table, &OutlierPolicy::default()).unwrap();

        assert_eq!(table.len(), 9);
        assert!(table.durations().iter().all(|&d| d == 10.0));
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].duration(), 100.0);
        assert_eq!(report.removed[0].onset_index, 8);
        assert!(!report.suspect_distribution);
    }

    #[test]
    fn uniform_durations_are_kept() {
        let mut table = table_from_durations(&[10.0; 5]);
        let report = filter_long_pulses(&mut table, &OutlierPolicy::default()).unwrap();
        assert_eq!(table.len(), 5);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn uniform_train_on_rounded_timestamps_is_kept() {
        // 1 kHz timeline stored with 4 decimals, forty 50-sample pulses.
        let timestamps: Vec<f64> = (0..4000)
            .map(|i| (i as f64 / 1000.0 * 10_000.0).round() / 10_000.0)
            .collect();
        let values: Vec<f64> = (0..4000)
            .map(|i| if i % 100 >= 10 && i % 100 < 60 { 5.0 } else { 0.0 })
            .collect();
        let mut table = PulseEdgeDetector::new(2.0)
            .detect("visual_stimulus", &timestamps, &values)
            .unwrap();
        assert_eq!(table.len(), 40);

        let report = filter_long_pulses(&mut table, &OutlierPolicy::default()).unwrap();

        assert!(report.removed.is_empty());
        assert!(!report.suspect_distribution);
        assert_eq!(table.len(), 40);
        assert!(report.std_duration < 1e-12);
    }

    #[test]
    fn too_few_events_are_untouched() {
        let mut table = table_from_durations(&[500.0]);
        assert!(filter_long_pulses(&mut table, &OutlierPolicy::default()).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn bimodal_durations_are_flagged() {
        let mut durations = vec![10.0; 6];
        durations.extend([100.0; 4]);
        let mut table = table_from_durations(&durations);

        let report = filter_long_pulses(&mut table, &OutlierPolicy::default()).unwrap();

        assert_eq!(report.removed.len(), 4);
        assert!(report.suspect_distribution);
    }

    #[test]
    fn sigma_widens_the_cutoff() {
        let mut durations = vec![10.0; 9];
        durations.push(100.0);
        let mut table = table_from_durations(&durations);
        let policy = OutlierPolicy {
            sigma: 3.0,
            ..OutlierPolicy::default()
        };

        let report = filter_long_pulses(&mut table, &policy).unwrap();

        assert!(report.removed.is_empty());
        assert_eq!(table.len(), 10);
    }
}
