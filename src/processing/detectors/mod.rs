pub mod outliers;
pub mod pulse_edges;
pub mod transitions;

use serde::Serialize;

// EDGE COMPONENT --------------------------------------------------------------

/// A single threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub time: f64,
    pub index: usize,
}

/// One paired pulse. Field names double as the exported table's column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeEvent {
    pub onset: f64,
    pub offset: f64,
    pub onset_index: usize,
    pub offset_index: usize,
}

impl EdgeEvent {
    pub fn duration(&self) -> f64 {
        self.offset - self.onset
    }
}

/// Onset/offset table for one channel, in chronological order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeTable {
    pub channel: String,
    pub events: Vec<EdgeEvent>,
}

impl EdgeTable {
    pub fn new(channel: impl Into<String>, events: Vec<EdgeEvent>) -> Self {
        Self {
            channel: channel.into(),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn onsets(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.onset).collect()
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.offset).collect()
    }

    pub fn durations(&self) -> Vec<f64> {
        self.events.iter().map(EdgeEvent::duration).collect()
    }
}

// STATISTICS COMPONENT --------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub sum: f64,
    /// Sum of squared deviations from the running mean.
    pub m2: f64,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); zero until two values are seen.
    pub std_dev: f64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: &[f64]) -> Self {
        let mut statistics = Self::new();
        for &value in values {
            statistics.update_statistics(value);
        }
        statistics
    }

    /// Welford update; stays accurate when samples differ only in their last bits.
    pub fn update_statistics(&mut self, sample: f64) {
        self.sum += sample;
        self.count += 1;

        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean);

        self.std_dev = if self.count > 1 {
            (self.m2 / (self.count - 1) as f64).sqrt()
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_use_sample_deviation() {
        let stats = Statistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn large_offset_does_not_cancel_spread() {
        let stats = Statistics::from_values(&[1e9 + 1.0, 1e9 + 2.0, 1e9 + 3.0]);
        assert_eq!(stats.mean, 1e9 + 2.0);
        assert!((stats.std_dev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = Statistics::from_values(&[3.0]);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn table_accessors_follow_event_order() {
        let table = EdgeTable::new(
            "licks",
            vec![
                EdgeEvent { onset: 1.0, offset: 1.5, onset_index: 10, offset_index: 15 },
                EdgeEvent { onset: 3.0, offset: 4.0, onset_index: 30, offset_index: 40 },
            ],
        );
        assert_eq!(table.onsets(), vec![1.0, 3.0]);
        assert_eq!(table.offsets(), vec![1.5, 4.0]);
        assert_eq!(table.durations(), vec![0.5, 1.0]);
    }
}
