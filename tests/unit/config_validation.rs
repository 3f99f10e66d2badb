//! Unit tests for configuration validation.

use stepper_loadtest::config::validate_config;
use stepper_loadtest::error::{ConfigurationError, Error};
use stepper_loadtest::parse_config;

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
program = ["G01 X100 F10 RLC10", "G02 W5"]

[calibration]
steps_per_unit = 80.0
scale_divider = -420.0
offset = 8000.0

[sampling]
readings_per_sample = 1
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test a zero divider is rejected.
#[test]
fn test_zero_scale_divider() {
    let result = parse_config("[calibration]\nscale_divider = 0.0\n");
    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::Toml(_)))
    ));
}

/// Test a negative divider is accepted (amplifiers may be wired inverted).
#[test]
fn test_negative_scale_divider() {
    let config = parse_config("[calibration]\nscale_divider = -3.5\n").expect("valid");
    assert_eq!(config.calibration.scale_divider(), -3.5);
}

/// Test zero averaging counts are rejected.
#[test]
fn test_zero_readings() {
    assert_eq!(
        parse_config("[sampling]\nreadings_per_sample = 0\n").map(|_| ()),
        Err(Error::Configuration(ConfigurationError::ZeroReadings(
            "sampling.readings_per_sample"
        )))
    );
    assert_eq!(
        parse_config("[procedure]\nreadings = 0\n").map(|_| ()),
        Err(Error::Configuration(ConfigurationError::ZeroReadings(
            "procedure.readings"
        )))
    );
}

/// Test unparseable program lines do not fail validation.
#[test]
fn test_bad_program_lines_pass_validation() {
    let config = parse_config(r#"program = ["G09", "G01 X1"]"#).expect("valid");
    assert!(validate_config(&config).is_ok());
}
