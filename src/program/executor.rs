//! Program interpreter.
//!
//! Commands run strictly in order, each to completion before the next. A
//! `Repeat` at index `k` replays lines `[0, k)`; replayed repeats recurse, so
//! nested repeats multiply. Any failing command is logged and skipped.

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};

use crate::calibration::{CalibrationIo, DistanceCalibration, LoadCalibration, Procedure};
use crate::config::calibration::SharedCalibration;
use crate::error::{Error, Result};
use crate::gcode::{Command, Configure, Program};
use crate::hal::{Actuator, Clock, LoadCell, OperatorChannel};
use crate::motor::MotionController;

/// Summary of one program run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Commands that completed, replays included.
    pub executed: u64,
    /// Commands that failed and were skipped.
    pub skipped: u64,
    /// Completed moves.
    pub moves: u64,
    /// Sample requests posted across all moves.
    pub samples_requested: u64,
}

/// Runs programs against the motion controller, load cell, and operator.
pub struct ProgramExecutor<A, C, S, D>
where
    A: Actuator,
    C: Clock,
    S: LoadCell,
    D: DelayNs,
{
    motion: MotionController<A, C>,
    sensor: S,
    operator: OperatorChannel,
    delay: D,
    calibration: SharedCalibration,
    procedure: Procedure,
}

impl<A, C, S, D> ProgramExecutor<A, C, S, D>
where
    A: Actuator,
    C: Clock,
    S: LoadCell,
    D: DelayNs,
{
    /// Create an executor with the default calibration procedure settings.
    pub fn new(
        motion: MotionController<A, C>,
        sensor: S,
        operator: OperatorChannel,
        delay: D,
        calibration: SharedCalibration,
    ) -> Self {
        Self {
            motion,
            sensor,
            operator,
            delay,
            calibration,
            procedure: Procedure::default(),
        }
    }

    /// Acquisition settings for calibration commands.
    pub fn with_procedure(mut self, procedure: Procedure) -> Self {
        self.procedure = procedure;
        self
    }

    /// Borrow the motion controller.
    #[inline]
    pub fn motion(&self) -> &MotionController<A, C> {
        &self.motion
    }

    /// Shared calibration constants.
    #[inline]
    pub fn calibration(&self) -> &SharedCalibration {
        &self.calibration
    }

    /// Run a whole program.
    ///
    /// The driver is energized for the duration of the run. Never fails:
    /// per-command errors are counted in [`RunReport::skipped`].
    pub fn run(&mut self, program: &Program) -> RunReport {
        info!(
            "running program: {} lines, {} unparseable",
            program.len(),
            program.error_count()
        );
        let mut report = RunReport::default();
        self.motion.enable();
        self.execute_prefix(program, program.len(), &mut report);
        self.motion.disable();
        info!(
            "program finished: {} executed, {} skipped, {} moves, {} samples requested",
            report.executed, report.skipped, report.moves, report.samples_requested
        );
        report
    }

    /// Execute lines `[0, end)` once.
    fn execute_prefix(&mut self, program: &Program, end: usize, report: &mut RunReport) {
        for (index, line) in program.iter().take(end).enumerate() {
            let outcome = match &line.command {
                Ok(Command::Repeat { cycles }) => {
                    debug!("line {}: replaying lines 0..{} {} times", index, index, cycles);
                    for _ in 0..*cycles {
                        self.execute_prefix(program, index, report);
                    }
                    Ok(())
                }
                Ok(command) => self.execute(command, report),
                Err(e) => Err(Error::Parse(e.clone())),
            };
            match outcome {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    error!("line {} `{}` skipped: {}", index, line.source, e);
                    report.skipped += 1;
                }
            }
        }
    }

    /// Execute a single non-repeat command.
    pub fn execute(&mut self, command: &Command, report: &mut RunReport) -> Result<()> {
        match command {
            Command::Move(mv) => {
                let steps_per_unit = self.calibration.steps_per_unit();
                let done = self
                    .motion
                    .execute_move(mv.target, mv.feedrate, mv.samples, steps_per_unit)?;
                report.moves += 1;
                report.samples_requested += u64::from(done.samples_requested);
            }
            Command::Wait { seconds } => {
                debug!("waiting {} s", seconds);
                self.delay.delay_ms(wait_ms(*seconds));
            }
            Command::Configure(configure) => self.configure(configure)?,
            // Replays need the program; see execute_prefix
            Command::Repeat { .. } => {}
        }
        Ok(())
    }

    fn configure(&mut self, configure: &Configure) -> Result<()> {
        let mut io = CalibrationIo {
            sensor: &mut self.sensor,
            operator: &mut self.operator,
            delay: &mut self.delay,
            procedure: &self.procedure,
        };
        match *configure {
            Configure::Constants {
                steps_per_unit,
                scale_divider,
                offset,
            } => {
                let state = self.calibration.update(|s| {
                    if let Some(v) = steps_per_unit {
                        s.set_steps_per_unit(v)?;
                    }
                    if let Some(v) = scale_divider {
                        s.set_scale_divider(v)?;
                    }
                    if let Some(v) = offset {
                        s.set_offset(v);
                    }
                    Ok(())
                })?;
                if steps_per_unit.is_some() {
                    self.motion.rebase_position(state.steps_per_unit());
                }
                if scale_divider.is_some() {
                    io.sensor.set_scale(state.scale_divider());
                }
                if offset.is_some() {
                    io.sensor.set_offset(state.offset());
                }
                info!(
                    "constants: {} steps per unit, scale divider {}, offset {}",
                    state.steps_per_unit(),
                    state.scale_divider(),
                    state.offset()
                );
            }
            Configure::LoadCalibration { reference_load } => {
                LoadCalibration::new(reference_load).run(&mut io, &self.calibration)?;
            }
            Configure::DistanceCalibration { target, feedrate } => {
                DistanceCalibration::new(target, feedrate).run(
                    &mut self.motion,
                    &mut io,
                    &self.calibration,
                )?;
            }
        }
        Ok(())
    }
}

/// Dwell in whole milliseconds; negative and NaN dwell for zero.
fn wait_ms(seconds: f32) -> u32 {
    libm::roundf(seconds * 1000.0).max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Distance, Steps};
    use crate::error::{ConfigurationError, ParseError};
    use crate::hal::OperatorReply;
    use crate::sampling::Mailbox;
    use crate::sim::{ScriptedInput, SimActuator, SimLoadCell, VirtualClock};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::sync::Arc;

    type TestExecutor = ProgramExecutor<SimActuator, VirtualClock, SimLoadCell, NoopDelay>;

    fn executor(cell: SimLoadCell, operator: OperatorChannel) -> TestExecutor {
        let clock = VirtualClock::new();
        let motion = MotionController::new(
            SimActuator::new(clock.clone()),
            clock,
            Arc::new(Mailbox::new()),
        );
        ProgramExecutor::new(
            motion,
            cell,
            operator,
            NoopDelay::new(),
            SharedCalibration::default(),
        )
    }

    fn plain() -> TestExecutor {
        executor(SimLoadCell::new(0, 1.0), OperatorChannel::new(1))
    }

    #[test]
    fn test_wait_ms() {
        assert_eq!(wait_ms(5.0), 5000);
        assert_eq!(wait_ms(0.0015), 2);
        assert_eq!(wait_ms(-1.0), 0);
        assert_eq!(wait_ms(f32::NAN), 0);
    }

    #[test]
    fn test_moves_in_order() {
        let mut exec = plain();
        let program = Program::parse(["G01 X10 F100", "G01 X-5 F100"]);
        let report = exec.run(&program);
        assert_eq!(report.executed, 2);
        assert_eq!(report.moves, 2);
        assert_eq!(exec.motion().current_position(), Distance(-5.0));
        assert_eq!(exec.motion().position_steps(), Steps(-400));
        assert!(!exec.motion().actuator().is_enabled());
    }

    #[test]
    fn test_repeat_replays_prefix() {
        let mut exec = plain();
        let program = Program::parse(["G01 X1 F100", "G01 X0 F100", "G03 C3"]);
        let report = exec.run(&program);
        // 2 + 3 × 2 moves, plus the repeat itself
        assert_eq!(report.moves, 8);
        assert_eq!(report.executed, 9);
        assert_eq!(exec.motion().actuator().steps_taken(), 8 * 80);
    }

    #[test]
    fn test_zero_cycles_replays_nothing() {
        let mut exec = plain();
        let program = Program::parse(["G01 X1 F100", "G03 C0", "G03 C-4"]);
        let report = exec.run(&program);
        assert_eq!(report.moves, 1);
        assert_eq!(report.executed, 3);
    }

    #[test]
    fn test_nested_repeats_multiply() {
        let mut exec = plain();
        // Line 1 replays line 0 twice; line 2 replays lines 0..2 three times
        let program = Program::parse(["G02 W0", "G03 C2", "G03 C3"]);
        let report = exec.run(&program);
        // Lines [0, 2) execute 4 commands per pass: 1 + 4 + 3 × 4 + 1
        assert_eq!(report.executed, 17);
    }

    #[test]
    fn test_failed_commands_are_skipped() {
        let mut exec = plain();
        let program = Program::parse(["G01 X100", "G09 X1", "G01 X1 F0", "G01 X2 F100"]);
        let report = exec.run(&program);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.executed, 1);
        assert_eq!(exec.motion().current_position(), Distance(2.0));
    }

    #[test]
    fn test_constants_apply_all_or_nothing() {
        let cell = SimLoadCell::new(0, 1.0);
        let mut exec = executor(cell.clone(), OperatorChannel::new(1));
        let mut report = RunReport::default();

        let good = Command::Configure(Configure::Constants {
            steps_per_unit: Some(100.0),
            scale_divider: Some(20.0),
            offset: Some(3.0),
        });
        exec.execute(&good, &mut report).unwrap();
        let state = exec.calibration().snapshot();
        assert_eq!(state.steps_per_unit(), 100.0);
        assert_eq!(cell.driver_constants(), (20.0, 3.0));

        let bad = Command::Configure(Configure::Constants {
            steps_per_unit: Some(50.0),
            scale_divider: Some(0.0),
            offset: None,
        });
        assert!(matches!(
            exec.execute(&bad, &mut report),
            Err(Error::Configuration(ConfigurationError::NonPositiveScaleFactor { .. }))
        ));
        assert_eq!(exec.calibration().snapshot(), state);
        assert_eq!(cell.driver_constants(), (20.0, 3.0));
    }

    #[test]
    fn test_steps_per_unit_change_rebases_position() {
        let mut exec = plain();
        let program = Program::parse(["G01 X10 F100", "G00 SPI160"]);
        exec.run(&program);
        assert_eq!(exec.motion().position_steps(), Steps(800));
        assert_eq!(exec.motion().current_position(), Distance(5.0));
    }

    #[test]
    fn test_load_calibration_command() {
        let cell = SimLoadCell::new(2000, 10.0);
        let handle = cell.clone();
        let operator = OperatorChannel::new(1).with_source(
            ScriptedInput::new()
                .then(OperatorReply::Proceed)
                .then_with(OperatorReply::Proceed, move || handle.set_load(100.0)),
        );
        let mut exec = executor(cell, operator);
        let report = exec.run(&Program::parse(["G00 RLC100"]));
        assert_eq!(report.executed, 1);
        let state = exec.calibration().snapshot();
        assert_eq!(state.offset(), 2000.0);
        assert!((state.scale_divider() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_parse_error_is_counted_each_time_reached() {
        let mut exec = plain();
        let program = Program::parse(["G01 X5", "G03 C2"]);
        assert_eq!(
            program.get(0).map(|l| l.command.clone()),
            Some(Err(ParseError::MissingField("F")))
        );
        let report = exec.run(&program);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.executed, 1);
    }
}
