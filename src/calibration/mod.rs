//! Interactive calibration procedures.
//!
//! Both procedures block on the operator channel between phases and write
//! the shared calibration state only once every input has been validated.

mod distance;
mod load;

pub use distance::{compute_steps_per_unit, DistanceCalibration, DistanceCalibrationReport};
pub use load::{compute_load_constants, LoadCalibration, LoadPhase};

use embedded_hal::delay::DelayNs;
use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::hal::{LoadCell, OperatorChannel};

/// Acquisition settings for calibration measurements.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Procedure {
    /// Raw readings averaged per measurement.
    pub readings: u32,
    /// Pause between consecutive readings.
    pub reading_spacing_ms: u32,
    /// Pause between polls of the operator inputs.
    pub input_poll_ms: u32,
}

impl Default for Procedure {
    fn default() -> Self {
        Self {
            readings: 5,
            reading_spacing_ms: 100,
            input_poll_ms: 10,
        }
    }
}

impl Procedure {
    /// Check the settings.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.readings == 0 {
            return Err(ConfigurationError::ZeroReadings("procedure.readings"));
        }
        Ok(())
    }
}

/// Hardware and operator access needed while a procedure runs.
pub struct CalibrationIo<'a, S, D> {
    /// Load cell.
    pub sensor: &'a mut S,
    /// Operator acknowledgement channel.
    pub operator: &'a mut OperatorChannel,
    /// Delay for reading spacing and input polling.
    pub delay: &'a mut D,
    /// Acquisition settings.
    pub procedure: &'a Procedure,
}

impl<S: LoadCell, D: DelayNs> CalibrationIo<'_, S, D> {
    /// Mean of the configured number of raw readings, spaced apart.
    pub fn mean_raw(&mut self) -> f32 {
        let n = self.procedure.readings.max(1);
        let mut sum = 0i64;
        for i in 0..n {
            if i > 0 {
                self.delay.delay_ms(self.procedure.reading_spacing_ms);
            }
            sum += i64::from(self.sensor.read_raw());
        }
        sum as f32 / n as f32
    }
}
