//! Configuration validation.

use crate::error::{ConfigurationError, Result};

use super::calibration::{check_scale_divider, check_steps_per_unit};
use super::BenchConfig;

/// Validate a bench configuration.
///
/// Checks:
/// - Scale factors are in range (steps per unit > 0, divider != 0)
/// - Averaging counts are at least 1
///
/// Program lines are not checked here; each one reports its own parse
/// error when the executor reaches it.
pub fn validate_config(config: &BenchConfig) -> Result<()> {
    check_steps_per_unit(config.calibration.steps_per_unit())?;
    check_scale_divider(config.calibration.scale_divider())?;

    if config.sampling.readings_per_sample == 0 {
        return Err(ConfigurationError::ZeroReadings("sampling.readings_per_sample").into());
    }

    config.procedure.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfig;
    use crate::error::Error;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BenchConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_readings_per_sample() {
        let config = BenchConfig {
            sampling: SamplingConfig {
                readings_per_sample: 0,
                poll_interval_us: 200,
            },
            ..BenchConfig::default()
        };
        assert_eq!(
            validate_config(&config),
            Err(Error::Configuration(ConfigurationError::ZeroReadings(
                "sampling.readings_per_sample"
            )))
        );
    }

    #[test]
    fn test_unparseable_program_lines_are_accepted() {
        let mut config = BenchConfig::default();
        config
            .program
            .push(heapless::String::try_from("G09 nonsense").unwrap())
            .unwrap();
        assert!(validate_config(&config).is_ok());
    }
}
