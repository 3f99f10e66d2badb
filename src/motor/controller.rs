//! Motion controller.
//!
//! Runs absolute moves to completion on an [`Actuator`], invoking the
//! sampling scheduler on every control tick.

use std::sync::Arc;

use log::{debug, trace};

use crate::config::units::{Distance, Feedrate, Steps};
use crate::error::MotionError;
use crate::hal::{Actuator, Clock};
use crate::motion::MovePlan;
use crate::sampling::{Mailbox, SamplingScheduler};

use super::position::MotionState;

/// Outcome of a completed move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// The executed plan.
    pub plan: MovePlan,
    /// Sample requests posted to the mailbox.
    pub samples_requested: u32,
    /// Control ticks spent in the move.
    pub ticks: u64,
}

/// Drives the actuator and owns the authoritative position.
pub struct MotionController<A, C>
where
    A: Actuator,
    C: Clock,
{
    /// Actuator capability.
    actuator: A,

    /// Time source for sample spacing.
    clock: C,

    /// Where sample requests are posted.
    mailbox: Arc<Mailbox>,

    /// Position of the last completed move.
    state: MotionState,
}

impl<A, C> MotionController<A, C>
where
    A: Actuator,
    C: Clock,
{
    /// Create a controller; the current actuator position is taken as the origin.
    pub fn new(actuator: A, clock: C, mailbox: Arc<Mailbox>) -> Self {
        Self {
            actuator,
            clock,
            mailbox,
            state: MotionState::default(),
        }
    }

    /// Position after the last completed move.
    #[inline]
    pub fn current_position(&self) -> Distance {
        self.state.current()
    }

    /// Actuator step count.
    #[inline]
    pub fn position_steps(&self) -> Steps {
        self.actuator.current_position_steps()
    }

    /// Borrow the actuator.
    #[inline]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Mutably borrow the actuator.
    #[inline]
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// The mailbox sample requests are posted to.
    #[inline]
    pub fn mailbox(&self) -> &Arc<Mailbox> {
        &self.mailbox
    }

    /// Recompute the position from the step count after a steps-per-unit change.
    pub fn rebase_position(&mut self, steps_per_unit: f32) {
        let steps = self.actuator.current_position_steps();
        self.state.rebase(steps, steps_per_unit);
    }

    /// Energize the driver.
    pub fn enable(&mut self) {
        self.actuator.enable();
    }

    /// De-energize the driver.
    pub fn disable(&mut self) {
        self.actuator.disable();
    }

    /// Move to an absolute position and block until the actuator arrives.
    ///
    /// With `samples > 0`, sample requests are posted to the mailbox while
    /// the move runs.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidFeedrate` if `feedrate <= 0`; the
    /// actuator is not touched.
    pub fn execute_move(
        &mut self,
        target: Distance,
        feedrate: Feedrate,
        samples: i32,
        steps_per_unit: f32,
    ) -> Result<MoveReport, MotionError> {
        let start = self.actuator.current_position_steps();
        let plan = MovePlan::new(start, target, feedrate, steps_per_unit)?;
        debug!(
            "move to {} ({} steps, delta {}) at {} steps/s, {:.3}s planned",
            target.value(),
            plan.target.value(),
            plan.delta_steps(),
            plan.speed.value(),
            plan.duration_secs()
        );

        self.actuator.set_max_speed(plan.speed);
        self.actuator.move_to(plan.target);

        let mut scheduler = SamplingScheduler::new(samples, &plan, self.clock.now_us());
        if let Some(sched) = scheduler.as_mut() {
            let position = start.to_distance(steps_per_unit);
            sched.on_start(&self.mailbox, position, self.clock.now_us());
        }

        let mut ticks = 0u64;
        while self.actuator.distance_to_go_steps() != 0 {
            self.actuator.advance_tick();
            ticks += 1;
            if let Some(sched) = scheduler.as_mut() {
                let position = self
                    .actuator
                    .current_position_steps()
                    .to_distance(steps_per_unit);
                if sched.on_tick(&self.mailbox, position, self.clock.now_us()) {
                    trace!("sample requested at {}", position.value());
                }
            }
        }

        let samples_requested = match scheduler.as_mut() {
            Some(sched) => {
                let position = self
                    .actuator
                    .current_position_steps()
                    .to_distance(steps_per_unit);
                sched.on_complete(&self.mailbox, position);
                sched.published()
            }
            None => 0,
        };

        self.state.complete_move(target);
        Ok(MoveReport {
            plan,
            samples_requested,
            ticks,
        })
    }
}
