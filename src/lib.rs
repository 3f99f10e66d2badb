//! # stepper-loadtest
//!
//! Program-driven stepper motion with position-synchronized load sampling.
//!
//! ## Features
//!
//! - **Program-driven**: G-code-like command lines supplied through TOML configuration
//! - **Synchronized sampling**: load samples spread evenly across each move
//! - **Two execution contexts**: motion on the interpreter thread, acquisition on its own thread
//! - **Interactive calibration**: two-point load calibration and steps-per-unit calibration
//! - **Recoverable errors**: a failing command is logged and skipped, never aborting a run
//! - **Simulated hardware**: virtual-time stepper and load cell for tests and dry runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stepper_loadtest::{
//!     hal::{LogSink, OperatorChannel, SharedLoadCell, StdClock, StdDelay},
//!     sampling::{Mailbox, SamplingConsumer},
//!     MotionController, Program, ProgramExecutor,
//! };
//!
//! let config = stepper_loadtest::load_config("bench.toml")?;
//! let calibration = stepper_loadtest::SharedCalibration::new(config.calibration);
//! let mailbox = Arc::new(Mailbox::new());
//! let cell = SharedLoadCell::new(load_cell);
//!
//! let consumer = SamplingConsumer::new(
//!     Arc::clone(&mailbox), cell.clone(), LogSink, StdClock::new(), calibration.clone(),
//! )
//! .spawn();
//!
//! let motion = MotionController::new(stepper, StdClock::new(), mailbox);
//! let mut executor =
//!     ProgramExecutor::new(motion, cell, OperatorChannel::new(10), StdDelay, calibration);
//! let report = executor.run(&Program::parse(config.program_lines()));
//! consumer.stop();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// heapless diagnostics make the error enum large
#![allow(clippy::result_large_err)]

// Core modules
pub mod calibration;
pub mod config;
pub mod error;
pub mod gcode;
pub mod hal;
pub mod motion;
pub mod motor;
pub mod program;
pub mod sampling;
pub mod sim;

// Re-exports for ergonomic API
pub use config::{
    load_config, parse_config, validate_config, BenchConfig, CalibrationState, SharedCalibration,
};
pub use error::{Error, Result};
pub use gcode::{parse_line, Command, Program};
pub use motor::MotionController;
pub use program::{ProgramExecutor, RunReport, StartGate};

// Unit types
pub use config::units::{Distance, Feedrate, Steps, StepsPerSec};
