//! Synchronization and behavior analysis for the lab's mouse rigs.
//!
//! Turns nidaq sync recordings into per-channel pulse tables and wheel
//! encoder streams into running speed, and finds each session's files on disk.

pub mod behavior;
#[cfg(feature = "python")]
pub mod bindings;
pub mod config;
pub mod error;
pub mod local;
pub mod processing;
pub mod session;
pub mod utils;

pub use error::{AnalysisError, Result};
pub use processing::detectors::pulse_edges::PulseEdgeDetector;
pub use processing::detectors::{EdgeEvent, EdgeTable};
pub use processing::recording::{Channel, Recording};
pub use processing::running::{PositionSample, RunningTrack};
pub use processing::signal_processor::SyncProcessor;
pub use session::SessionKey;
