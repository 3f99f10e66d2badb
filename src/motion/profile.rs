//! Move planning.
//!
//! Moves run at a constant commanded speed. The predicted duration ignores
//! any acceleration ramp applied by the actuator, so sample spacing derived
//! from it drifts when ramps are long relative to the move.

use crate::config::units::{Distance, Feedrate, Steps, StepsPerSec};
use crate::error::MotionError;

/// Direction of actuator motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Increasing step count.
    Forward,
    /// Decreasing step count.
    Reverse,
}

impl Direction {
    /// Get direction from signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Computed plan for one absolute move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlan {
    /// Actuator position when the move starts.
    pub start: Steps,
    /// Absolute target.
    pub target: Steps,
    /// Commanded speed.
    pub speed: StepsPerSec,
}

impl MovePlan {
    /// Plan a move to `target` at `feedrate`.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidFeedrate` if the feedrate is not > 0.
    pub fn new(
        start: Steps,
        target: Distance,
        feedrate: Feedrate,
        steps_per_unit: f32,
    ) -> Result<Self, MotionError> {
        if !(feedrate.value() > 0.0) {
            return Err(MotionError::InvalidFeedrate(feedrate.value()));
        }
        Ok(Self {
            start,
            target: Steps::from_distance(target, steps_per_unit),
            speed: feedrate.to_steps_per_sec(steps_per_unit),
        })
    }

    /// Signed step delta.
    #[inline]
    pub fn delta_steps(&self) -> i64 {
        (self.target - self.start).value()
    }

    /// Direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_steps(self.delta_steps())
    }

    /// Whether the actuator is already at the target.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.delta_steps() == 0
    }

    /// Predicted duration at constant speed, in seconds.
    pub fn duration_secs(&self) -> f32 {
        (self.target - self.start).abs() as f32 / self.speed.value()
    }

    /// Predicted duration in microseconds.
    pub fn duration_us(&self) -> u64 {
        libm::roundf(self.duration_secs() * 1_000_000.0) as u64
    }
}
