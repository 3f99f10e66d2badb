//! Authoritative actuator position in engineering units.

use crate::config::units::{Distance, Steps};

/// Position of the last completed move.
///
/// Never updated while a move is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    current: Distance,
}

impl MotionState {
    /// Create a state at a known position.
    #[inline]
    pub fn at(position: Distance) -> Self {
        Self { current: position }
    }

    /// Position after the last completed move.
    #[inline]
    pub fn current(&self) -> Distance {
        self.current
    }

    /// Record a completed move.
    #[inline]
    pub(crate) fn complete_move(&mut self, target: Distance) {
        self.current = target;
    }

    /// Re-derive the position from a step count after steps-per-unit changed.
    #[inline]
    pub(crate) fn rebase(&mut self, steps: Steps, steps_per_unit: f32) {
        self.current = steps.to_distance(steps_per_unit);
    }
}
