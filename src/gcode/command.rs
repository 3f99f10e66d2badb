//! Typed command records.

use crate::config::units::{Distance, Feedrate};

/// One parsed program command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `G00`: change calibration constants or run a calibration procedure.
    Configure(Configure),
    /// `G01`: absolute move with optional sampling.
    Move(MoveCommand),
    /// `G02`: dwell.
    Wait {
        /// Dwell time in seconds.
        seconds: f32,
    },
    /// `G03`: replay every command before this one.
    Repeat {
        /// Number of replays.
        cycles: u32,
    },
}

/// Absolute move parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    /// Absolute target position.
    pub target: Distance,
    /// Cruise speed.
    pub feedrate: Feedrate,
    /// Number of load samples across the move; zero or negative disables sampling.
    pub samples: i32,
}

/// Configuration action selected by the fields present on a `G00` line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Configure {
    /// Overwrite any of the calibration constants.
    Constants {
        /// `SPI`
        steps_per_unit: Option<f32>,
        /// `DLC`
        scale_divider: Option<f32>,
        /// `OLC`
        offset: Option<f32>,
    },
    /// Interactive two-point load calibration against a reference load (`RLC`).
    LoadCalibration {
        /// Magnitude of the reference load.
        reference_load: f32,
    },
    /// Interactive distance calibration by moving to `X` at `F`.
    DistanceCalibration {
        /// Absolute target of the calibration move.
        target: Distance,
        /// Speed of the calibration move.
        feedrate: Feedrate,
    },
}

impl Command {
    /// Opcode text for this command.
    pub fn opcode(&self) -> &'static str {
        match self {
            Command::Configure(_) => "G00",
            Command::Move(_) => "G01",
            Command::Wait { .. } => "G02",
            Command::Repeat { .. } => "G03",
        }
    }
}
