pub mod event_log;
pub mod rig;
pub mod trials;
