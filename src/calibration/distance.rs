//! Distance (steps-per-unit) calibration.
//!
//! The operator confirms the commanded step delta, the actuator moves, and
//! the operator reports how far it actually went.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::calibration::SharedCalibration;
use crate::config::units::{Distance, Feedrate, Steps};
use crate::error::{CalibrationError, ConfigurationError, Result};
use crate::hal::{Actuator, Clock, LoadCell};
use crate::motor::MotionController;

use super::CalibrationIo;

/// Result of a distance calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceCalibrationReport {
    /// Signed steps commanded for the calibration move.
    pub commanded_steps: i64,
    /// Travel reported by the operator.
    pub observed_distance: f32,
    /// Steps per unit before the calibration.
    pub previous_steps_per_unit: f32,
    /// Steps per unit now in effect.
    pub steps_per_unit: f32,
}

/// Steps per unit from a commanded delta and the travel actually observed.
///
/// # Errors
///
/// Returns `CalibrationError::InvalidObservedDistance` if `observed <= 0`.
pub fn compute_steps_per_unit(
    commanded_steps: i64,
    observed: f32,
) -> core::result::Result<f32, CalibrationError> {
    if !(observed > 0.0) {
        return Err(CalibrationError::InvalidObservedDistance(observed));
    }
    Ok(commanded_steps.unsigned_abs() as f32 / observed)
}

/// Distance calibration move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceCalibration {
    /// Absolute target under the current steps per unit.
    pub target: Distance,
    /// Speed of the calibration move.
    pub feedrate: Feedrate,
}

impl DistanceCalibration {
    /// Create a calibration moving to `target` at `feedrate`.
    pub fn new(target: Distance, feedrate: Feedrate) -> Self {
        Self { target, feedrate }
    }

    /// Run the procedure to completion.
    ///
    /// Non-positive reported distances are rejected and the operator is asked
    /// again; there is no limit on attempts.
    pub fn run<A, C, S, D>(
        &self,
        motion: &mut MotionController<A, C>,
        io: &mut CalibrationIo<'_, S, D>,
        calibration: &SharedCalibration,
    ) -> Result<DistanceCalibrationReport>
    where
        A: Actuator,
        C: Clock,
        S: LoadCell,
        D: DelayNs,
    {
        let previous = calibration.steps_per_unit();
        let target_steps = Steps::from_distance(self.target, previous);
        let commanded_steps = (target_steps - motion.position_steps()).value();
        if commanded_steps == 0 {
            // Any observed distance would yield zero steps per unit
            return Err(ConfigurationError::NonPositiveScaleFactor {
                field: "steps_per_unit",
                value: 0.0,
            }
            .into());
        }

        info!(
            "distance calibration: moving {} steps; acknowledge to start",
            commanded_steps
        );
        io.operator.wait_ack(io.delay);

        motion.execute_move(self.target, self.feedrate, 0, previous)?;

        let (steps_per_unit, observed_distance) = loop {
            info!("distance calibration: enter the distance actually travelled");
            let observed = io.operator.wait_value(io.delay);
            match compute_steps_per_unit(commanded_steps, observed) {
                Ok(spu) => break (spu, observed),
                Err(e) => warn!("{}; try again", e),
            }
        };

        calibration.update(|s| s.set_steps_per_unit(steps_per_unit))?;
        motion.rebase_position(steps_per_unit);
        info!(
            "distance calibration applied: {} steps per unit (was {})",
            steps_per_unit, previous
        );

        Ok(DistanceCalibrationReport {
            commanded_steps,
            observed_distance,
            previous_steps_per_unit: previous,
            steps_per_unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Procedure;
    use crate::error::Error;
    use crate::hal::{OperatorChannel, OperatorReply};
    use crate::sampling::Mailbox;
    use crate::sim::{ScriptedInput, SimActuator, SimLoadCell, VirtualClock};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::sync::Arc;

    fn controller() -> MotionController<SimActuator, VirtualClock> {
        let clock = VirtualClock::new();
        MotionController::new(SimActuator::new(clock.clone()), clock, Arc::new(Mailbox::new()))
    }

    #[test]
    fn test_compute_steps_per_unit() {
        assert_eq!(compute_steps_per_unit(8000, 100.0), Ok(80.0));
        assert_eq!(compute_steps_per_unit(-8000, 80.0), Ok(100.0));
        assert_eq!(
            compute_steps_per_unit(8000, 0.0),
            Err(CalibrationError::InvalidObservedDistance(0.0))
        );
        assert_eq!(
            compute_steps_per_unit(8000, -3.0),
            Err(CalibrationError::InvalidObservedDistance(-3.0))
        );
    }

    #[test]
    fn test_reprompts_until_positive_distance() {
        let mut motion = controller();
        let input = ScriptedInput::new()
            .then(OperatorReply::Proceed)
            .then(OperatorReply::Value(-5.0))
            .then(OperatorReply::Value(0.0))
            .then(OperatorReply::Proceed)
            .then(OperatorReply::Value(80.0));
        let mut operator = OperatorChannel::new(1).with_source(input);
        let mut cell = SimLoadCell::new(0, 1.0);
        let mut delay = NoopDelay::new();
        let procedure = Procedure::default();
        let calibration = SharedCalibration::default();
        let mut io = CalibrationIo {
            sensor: &mut cell,
            operator: &mut operator,
            delay: &mut delay,
            procedure: &procedure,
        };

        let report = DistanceCalibration::new(Distance(100.0), Feedrate(50.0))
            .run(&mut motion, &mut io, &calibration)
            .unwrap();

        assert_eq!(report.commanded_steps, 8000);
        assert_eq!(report.observed_distance, 80.0);
        assert_eq!(report.previous_steps_per_unit, 80.0);
        assert_eq!(report.steps_per_unit, 100.0);
        assert_eq!(calibration.steps_per_unit(), 100.0);
        assert_eq!(motion.position_steps(), Steps(8000));
        assert!((motion.current_position().value() - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_delta_is_rejected_before_moving() {
        let mut motion = controller();
        let mut operator = OperatorChannel::new(1);
        let mut cell = SimLoadCell::new(0, 1.0);
        let mut delay = NoopDelay::new();
        let procedure = Procedure::default();
        let calibration = SharedCalibration::default();
        let mut io = CalibrationIo {
            sensor: &mut cell,
            operator: &mut operator,
            delay: &mut delay,
            procedure: &procedure,
        };

        let result = DistanceCalibration::new(Distance(0.0), Feedrate(5.0))
            .run(&mut motion, &mut io, &calibration);
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calibration.steps_per_unit(), 80.0);
    }

    #[test]
    fn test_invalid_feedrate_aborts_calibration() {
        let mut motion = controller();
        let mut operator =
            OperatorChannel::new(1).with_source(ScriptedInput::new().then(OperatorReply::Proceed));
        let mut cell = SimLoadCell::new(0, 1.0);
        let mut delay = NoopDelay::new();
        let procedure = Procedure::default();
        let calibration = SharedCalibration::default();
        let mut io = CalibrationIo {
            sensor: &mut cell,
            operator: &mut operator,
            delay: &mut delay,
            procedure: &procedure,
        };

        let result = DistanceCalibration::new(Distance(10.0), Feedrate(-1.0))
            .run(&mut motion, &mut io, &calibration);
        assert!(matches!(result, Err(Error::Motion(_))));
        assert_eq!(calibration.steps_per_unit(), 80.0);
    }
}
