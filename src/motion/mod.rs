//! Motion module for stepper-loadtest.
//!
//! Provides move planning: step targets, actuator speed, and predicted duration.

mod profile;

pub use profile::{Direction, MovePlan};
