//! Unit types for physical quantities.
//!
//! Keeps engineering distances, feedrates, and actuator steps apart so that a
//! steps-per-unit conversion is never skipped or applied twice.

use core::ops::{Add, Sub};

use serde::Deserialize;

/// Linear distance or position in engineering units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Distance(pub f32);

impl Distance {
    /// Create a new Distance value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Add for Distance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Linear speed in engineering units per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Feedrate(pub f32);

impl Feedrate {
    /// Create a new Feedrate value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Convert to actuator speed.
    #[inline]
    pub fn to_steps_per_sec(self, steps_per_unit: f32) -> StepsPerSec {
        StepsPerSec(self.0 * steps_per_unit)
    }
}

/// Actuator speed in steps per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct StepsPerSec(pub f32);

impl StepsPerSec {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Actuator position in steps (absolute from origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }

    /// Convert to a distance using the steps per unit ratio.
    #[inline]
    pub fn to_distance(self, steps_per_unit: f32) -> Distance {
        Distance(self.0 as f32 / steps_per_unit)
    }

    /// Create from a distance, rounding to the nearest whole step.
    #[inline]
    pub fn from_distance(distance: Distance, steps_per_unit: f32) -> Self {
        Self(libm::roundf(distance.0 * steps_per_unit) as i64)
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_steps_rounds() {
        assert_eq!(Steps::from_distance(Distance(100.0), 80.0), Steps(8000));
        assert_eq!(Steps::from_distance(Distance(-100.0), 80.0), Steps(-8000));
        assert_eq!(Steps::from_distance(Distance(0.0126), 80.0), Steps(1));
    }

    #[test]
    fn test_steps_to_distance() {
        let d = Steps::new(4000).to_distance(80.0);
        assert!((d.value() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_feedrate_conversion() {
        assert_eq!(Feedrate(10.0).to_steps_per_sec(80.0), StepsPerSec(800.0));
    }

    #[test]
    fn test_steps_arithmetic() {
        let delta = Steps(8000) - Steps(-8000);
        assert_eq!(delta.abs(), 16000);
        assert_eq!((Steps(1) + Steps(2)).value(), 3);
    }
}
