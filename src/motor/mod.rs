//! Motor module for stepper-loadtest.
//!
//! Provides the motion controller and the authoritative position it owns.

mod controller;
mod position;

pub use controller::{MotionController, MoveReport};
pub use position::MotionState;
