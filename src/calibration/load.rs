//! Two-point load calibration.
//!
//! `AwaitZero → MeasureZero → AwaitKnownLoad → MeasureKnownLoad → Compute → Apply`

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::calibration::{CalibrationState, SharedCalibration};
use crate::error::{CalibrationError, Result};
use crate::hal::LoadCell;

use super::CalibrationIo;

/// Phase of a load calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting for the operator to unload the cell.
    AwaitZero,
    /// Averaging the unloaded reading.
    MeasureZero,
    /// Waiting for the operator to apply the reference load.
    AwaitKnownLoad,
    /// Averaging the loaded reading.
    MeasureKnownLoad,
    /// Deriving offset and divider.
    Compute,
    /// Writing the constants.
    Apply,
    /// Finished.
    Done,
}

/// Offset and divider from the two averaged readings.
///
/// # Errors
///
/// Returns `CalibrationError::InvalidReferenceLoad` if `reference_load <= 0`.
pub fn compute_load_constants(
    zero_mean: f32,
    load_mean: f32,
    reference_load: f32,
) -> core::result::Result<(f32, f32), CalibrationError> {
    if !(reference_load > 0.0) {
        return Err(CalibrationError::InvalidReferenceLoad(reference_load));
    }
    Ok((zero_mean, (load_mean - zero_mean) / reference_load))
}

/// Load calibration state machine.
#[derive(Debug, Clone)]
pub struct LoadCalibration {
    reference_load: f32,
    phase: LoadPhase,
    zero_mean: f32,
    load_mean: f32,
    computed: Option<(f32, f32)>,
}

impl LoadCalibration {
    /// Start a calibration against a reference load of `reference_load` units.
    pub fn new(reference_load: f32) -> Self {
        Self {
            reference_load,
            phase: LoadPhase::AwaitZero,
            zero_mean: 0.0,
            load_mean: 0.0,
            computed: None,
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// `(offset, scale_divider)` once computed.
    #[inline]
    pub fn computed(&self) -> Option<(f32, f32)> {
        self.computed
    }

    /// Run one phase and move to the next.
    ///
    /// A failed `Compute` leaves the machine in `Compute` and the shared
    /// state untouched.
    pub fn step<S, D>(
        &mut self,
        io: &mut CalibrationIo<'_, S, D>,
        calibration: &SharedCalibration,
    ) -> Result<LoadPhase>
    where
        S: LoadCell,
        D: DelayNs,
    {
        self.phase = match self.phase {
            LoadPhase::AwaitZero => {
                info!("load calibration: remove all load from the cell and acknowledge");
                io.operator.wait_ack(io.delay);
                LoadPhase::MeasureZero
            }
            LoadPhase::MeasureZero => {
                self.zero_mean = io.mean_raw();
                info!("load calibration: zero reading {:.1}", self.zero_mean);
                LoadPhase::AwaitKnownLoad
            }
            LoadPhase::AwaitKnownLoad => {
                info!(
                    "load calibration: apply the reference load of {} and acknowledge",
                    self.reference_load
                );
                io.operator.wait_ack(io.delay);
                LoadPhase::MeasureKnownLoad
            }
            LoadPhase::MeasureKnownLoad => {
                self.load_mean = io.mean_raw();
                info!("load calibration: loaded reading {:.1}", self.load_mean);
                LoadPhase::Compute
            }
            LoadPhase::Compute => {
                let constants =
                    compute_load_constants(self.zero_mean, self.load_mean, self.reference_load)?;
                debug!(
                    "load calibration: offset {} divider {}",
                    constants.0, constants.1
                );
                self.computed = Some(constants);
                LoadPhase::Apply
            }
            LoadPhase::Apply => {
                if let Some((offset, divider)) = self.computed {
                    calibration.update(|s| {
                        s.set_scale_divider(divider)?;
                        s.set_offset(offset);
                        Ok(())
                    })?;
                    io.sensor.set_scale(divider);
                    io.sensor.set_offset(offset);
                    info!(
                        "load calibration applied: offset {:.1}, scale divider {:.4}",
                        offset, divider
                    );
                }
                LoadPhase::Done
            }
            LoadPhase::Done => LoadPhase::Done,
        };
        Ok(self.phase)
    }

    /// Run every remaining phase.
    pub fn run<S, D>(
        &mut self,
        io: &mut CalibrationIo<'_, S, D>,
        calibration: &SharedCalibration,
    ) -> Result<CalibrationState>
    where
        S: LoadCell,
        D: DelayNs,
    {
        while self.step(io, calibration)? != LoadPhase::Done {}
        Ok(calibration.snapshot())
    }
}
