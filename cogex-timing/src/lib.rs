pub mod timer;

pub use timer::{DriftStats, HighPrecisionTimer, Timer, hold};
