pub mod conditioning;
pub mod detectors;
pub mod recording;
pub mod running;
pub mod signal_processor;
