//! Configuration module for stepper-loadtest.
//!
//! Provides the bench configuration loaded from TOML, the shared calibration
//! constants, and the unit types used across the crate.

mod bench;
pub mod calibration;
mod loader;
pub mod units;
mod validation;

pub use bench::{BenchConfig, SamplingConfig, MAX_LINE_LEN, MAX_PROGRAM_LINES};
pub use calibration::{CalibrationState, SharedCalibration};
pub use loader::{load_config, parse_config};
pub use validation::validate_config;

// Re-export unit types at config level
pub use units::{Distance, Feedrate, Steps, StepsPerSec};
