//! Calibration constants shared between the motion and sampling contexts.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::error::ConfigurationError;

/// Scale and offset constants for the actuator and the load cell.
///
/// `steps_per_unit` is always > 0 and `scale_divider` is never 0; both
/// invariants are enforced by [`CalibrationState::new`] and the setters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawCalibration")]
pub struct CalibrationState {
    steps_per_unit: f32,
    scale_divider: f32,
    offset: f32,
}

#[derive(Deserialize)]
struct RawCalibration {
    #[serde(default = "default_steps_per_unit")]
    steps_per_unit: f32,
    #[serde(default = "default_scale_divider")]
    scale_divider: f32,
    #[serde(default)]
    offset: f32,
}

fn default_steps_per_unit() -> f32 {
    80.0
}

fn default_scale_divider() -> f32 {
    1.0
}

impl TryFrom<RawCalibration> for CalibrationState {
    type Error = ConfigurationError;

    fn try_from(raw: RawCalibration) -> Result<Self, Self::Error> {
        Self::new(raw.steps_per_unit, raw.scale_divider, raw.offset)
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            steps_per_unit: default_steps_per_unit(),
            scale_divider: default_scale_divider(),
            offset: 0.0,
        }
    }
}

impl CalibrationState {
    /// Create a calibration state, validating both scale factors.
    pub fn new(
        steps_per_unit: f32,
        scale_divider: f32,
        offset: f32,
    ) -> Result<Self, ConfigurationError> {
        check_steps_per_unit(steps_per_unit)?;
        check_scale_divider(scale_divider)?;
        Ok(Self {
            steps_per_unit,
            scale_divider,
            offset,
        })
    }

    /// Actuator steps per engineering unit.
    #[inline]
    pub fn steps_per_unit(&self) -> f32 {
        self.steps_per_unit
    }

    /// Raw counts per unit of load.
    #[inline]
    pub fn scale_divider(&self) -> f32 {
        self.scale_divider
    }

    /// Raw reading at zero load.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Set steps per unit.
    pub fn set_steps_per_unit(&mut self, value: f32) -> Result<(), ConfigurationError> {
        check_steps_per_unit(value)?;
        self.steps_per_unit = value;
        Ok(())
    }

    /// Set the load scale divider.
    pub fn set_scale_divider(&mut self, value: f32) -> Result<(), ConfigurationError> {
        check_scale_divider(value)?;
        self.scale_divider = value;
        Ok(())
    }

    /// Set the load offset.
    #[inline]
    pub fn set_offset(&mut self, value: f32) {
        self.offset = value;
    }

    /// Convert a raw load reading to calibrated units.
    #[inline]
    pub fn to_load(&self, raw: f32) -> f32 {
        (raw - self.offset) / self.scale_divider
    }
}

pub(crate) fn check_steps_per_unit(value: f32) -> Result<(), ConfigurationError> {
    // NaN fails this comparison too
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveScaleFactor {
            field: "steps_per_unit",
            value,
        })
    }
}

pub(crate) fn check_scale_divider(value: f32) -> Result<(), ConfigurationError> {
    if value != 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveScaleFactor {
            field: "scale_divider",
            value,
        })
    }
}

/// Calibration state handle shared by the interpreter and the sampling consumer.
///
/// Writes happen only between moves; the lock keeps a reader from seeing a
/// half-applied calibration.
#[derive(Debug, Clone, Default)]
pub struct SharedCalibration {
    inner: Arc<RwLock<CalibrationState>>,
}

impl SharedCalibration {
    /// Wrap an initial state.
    pub fn new(state: CalibrationState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy out the current constants.
    #[inline]
    pub fn snapshot(&self) -> CalibrationState {
        *self.inner.read()
    }

    /// Current steps per unit.
    #[inline]
    pub fn steps_per_unit(&self) -> f32 {
        self.inner.read().steps_per_unit()
    }

    /// Apply a change atomically; on error the state is left untouched.
    pub fn update<F>(&self, f: F) -> Result<CalibrationState, ConfigurationError>
    where
        F: FnOnce(&mut CalibrationState) -> Result<(), ConfigurationError>,
    {
        let mut guard = self.inner.write();
        let mut next = *guard;
        f(&mut next)?;
        *guard = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_scale_factors() {
        assert!(CalibrationState::new(0.0, 1.0, 0.0).is_err());
        assert!(CalibrationState::new(-80.0, 1.0, 0.0).is_err());
        assert!(CalibrationState::new(f32::NAN, 1.0, 0.0).is_err());
        assert!(CalibrationState::new(80.0, 0.0, 0.0).is_err());
        // A negative divider is a reversed load cell, not an error
        assert!(CalibrationState::new(80.0, -420.0, 0.0).is_ok());
    }

    #[test]
    fn test_to_load() {
        let state = CalibrationState::new(80.0, 200.0, 1000.0).unwrap();
        assert!((state.to_load(3000.0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let shared = SharedCalibration::default();
        let result = shared.update(|s| {
            s.set_offset(12.0);
            s.set_steps_per_unit(-1.0)
        });
        assert!(result.is_err());
        assert_eq!(shared.snapshot(), CalibrationState::default());

        let applied = shared.update(|s| s.set_steps_per_unit(100.0)).unwrap();
        assert_eq!(applied.steps_per_unit(), 100.0);
        assert_eq!(shared.steps_per_unit(), 100.0);
    }

    #[test]
    fn test_deserialize_defaults() {
        let state: CalibrationState = toml::from_str("offset = 5.0").unwrap();
        assert_eq!(state.steps_per_unit(), 80.0);
        assert_eq!(state.scale_divider(), 1.0);
        assert_eq!(state.offset(), 5.0);
    }

    #[test]
    fn test_deserialize_rejects_zero_divider() {
        let result: Result<CalibrationState, _> = toml::from_str("scale_divider = 0.0");
        assert!(result.is_err());
    }
}
