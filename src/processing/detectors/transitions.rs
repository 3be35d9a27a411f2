/// Timestamps of every sample whose value differs from the previous one.
///
/// Used on binarized channels where each change is an event, regardless of
/// direction. Sample 0 never counts.
pub fn transition_times(timestamps: &[f64], values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .zip(timestamps.iter().skip(1))
        .filter(|(pair, _)| pair[1] != pair[0])
        .map(|(_, &t)| t)
        .collect()
}
