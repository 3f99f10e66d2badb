//! Bench configuration - root configuration structure.

use heapless::{String, Vec};
use serde::Deserialize;

use crate::calibration::Procedure;

use super::calibration::CalibrationState;

/// Maximum number of program lines.
pub const MAX_PROGRAM_LINES: usize = 128;

/// Maximum length of one program line.
pub const MAX_LINE_LEN: usize = 64;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchConfig {
    /// Command lines executed in order.
    #[serde(default)]
    pub program: Vec<String<MAX_LINE_LEN>, MAX_PROGRAM_LINES>,

    /// Initial calibration constants.
    #[serde(default)]
    pub calibration: CalibrationState,

    /// Sampling consumer settings.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Calibration procedure settings.
    #[serde(default)]
    pub procedure: Procedure,

    /// Start the program without waiting for an operator trigger.
    #[serde(default)]
    pub autostart: bool,
}

impl BenchConfig {
    /// Program lines as string slices.
    pub fn program_lines(&self) -> impl Iterator<Item = &str> {
        self.program.iter().map(|s| s.as_str())
    }
}

/// Sampling consumer settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Raw readings averaged into one sample.
    pub readings_per_sample: u32,
    /// Consumer sleep between empty mailbox polls, in microseconds.
    pub poll_interval_us: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            readings_per_sample: 5,
            poll_interval_us: 200,
        }
    }
}
