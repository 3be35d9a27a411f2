use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{
    WheelConfig, DEFAULT_RAW_FRAMERATE, DEFAULT_RESAMPLED_FRAMERATE, DEFAULT_RESAMPLE_STEP,
    DEFAULT_WHEEL_DIAMETER, DEFAULT_WHEEL_TABS,
};
use crate::error::AnalysisError;
use crate::processing::detectors::pulse_edges::PulseEdgeDetector;
use crate::processing::running::speed;
use crate::processing::running::{PositionSample, RunningTrack};

impl From<AnalysisError> for PyErr {
    fn from(err: AnalysisError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Returns `(onset, offset, onset_index, offset_index)` tuples.
#[pyfunction]
#[pyo3(signature = (timestamps, values, threshold = 2.0))]
pub fn detect_edges(
    timestamps: Vec<f64>,
    values: Vec<f64>,
    threshold: f64,
) -> PyResult<Vec<(f64, f64, usize, usize)>> {
    let table = PulseEdgeDetector::new(threshold).detect("python", &timestamps, &values)?;
    Ok(table
        .events
        .iter()
        .map(|e| (e.onset, e.offset, e.onset_index, e.offset_index))
        .collect())
}

/// Speed of a position trace sampled at `framerate`, by default the acquisition rate.
#[pyfunction]
#[pyo3(signature = (
    position,
    framerate = DEFAULT_RAW_FRAMERATE,
    diameter = DEFAULT_WHEEL_DIAMETER,
    tabs = DEFAULT_WHEEL_TABS
))]
pub fn running_speed(position: Vec<f64>, framerate: f64, diameter: f64, tabs: u32) -> PyResult<Vec<f64>> {
    Ok(speed::running_speed(&position, framerate, diameter, tabs)?)
}

/// Resamples a raw wheel stream and returns `(timestamps, positions, speeds)`.
#[pyfunction]
#[pyo3(signature = (
    timestamps,
    values,
    step = DEFAULT_RESAMPLE_STEP,
    framerate = DEFAULT_RESAMPLED_FRAMERATE,
    diameter = DEFAULT_WHEEL_DIAMETER,
    tabs = DEFAULT_WHEEL_TABS
))]
pub fn resample_running(
    timestamps: Vec<f64>,
    values: Vec<f64>,
    step: f64,
    framerate: f64,
    diameter: f64,
    tabs: u32,
) -> PyResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    if timestamps.len() != values.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "values".to_string(),
            expected: timestamps.len(),
            actual: values.len(),
        }
        .into());
    }
    let samples: Vec<PositionSample> = timestamps
        .into_iter()
        .zip(values)
        .map(|(timestamp, value)| PositionSample { timestamp, value })
        .collect();
    let wheel = WheelConfig {
        diameter,
        tabs_per_revolution: tabs,
        framerate,
        step,
    };
    let track = RunningTrack::from_positions(&samples, &wheel)?;
    Ok((
        track.timestamps().to_vec(),
        track.positions().to_vec(),
        track.speeds().to_vec(),
    ))
}

/// A Python module implemented in Rust.
#[pymodule]
pub fn behavior_sync(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(detect_edges, m)?)?;
    m.add_function(wrap_pyfunction!(running_speed, m)?)?;
    m.add_function(wrap_pyfunction!(resample_running, m)?)?;
    Ok(())
}
