//! Stepper actuator capability.

use crate::config::units::{Steps, StepsPerSec};

/// Step-counting actuator driven by repeated control ticks.
///
/// Modelled on tick-driven stepper libraries: `move_to` only records the
/// target, motion happens inside `advance_tick`.
pub trait Actuator {
    /// Set the cruise speed used by subsequent moves.
    fn set_max_speed(&mut self, speed: StepsPerSec);

    /// Set an absolute target position.
    fn move_to(&mut self, target: Steps);

    /// Current absolute position.
    fn current_position_steps(&self) -> Steps;

    /// Signed steps remaining to the target.
    fn distance_to_go_steps(&self) -> i64;

    /// Run one control tick, stepping at most once.
    fn advance_tick(&mut self);

    /// Energize the driver.
    fn enable(&mut self) {}

    /// De-energize the driver.
    fn disable(&mut self) {}
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn set_max_speed(&mut self, speed: StepsPerSec) {
        (**self).set_max_speed(speed)
    }

    fn move_to(&mut self, target: Steps) {
        (**self).move_to(target)
    }

    fn current_position_steps(&self) -> Steps {
        (**self).current_position_steps()
    }

    fn distance_to_go_steps(&self) -> i64 {
        (**self).distance_to_go_steps()
    }

    fn advance_tick(&mut self) {
        (**self).advance_tick()
    }

    fn enable(&mut self) {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable()
    }
}
