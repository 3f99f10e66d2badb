//! Program execution.
//!
//! Provides the start gate that holds a run until triggered and the
//! executor that interprets a parsed program.

mod executor;
mod start;

pub use executor::{ProgramExecutor, RunReport};
pub use start::{AckTrigger, StartGate, StartTrigger};
