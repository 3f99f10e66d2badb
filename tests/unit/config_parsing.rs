//! Unit tests for configuration parsing.

use stepper_loadtest::config::{BenchConfig, MAX_LINE_LEN};
use stepper_loadtest::error::{ConfigurationError, Error};
use stepper_loadtest::parse_config;

/// A file with only a program picks up every default.
#[test]
fn test_defaults() {
    let config = parse_config(r#"program = ["G02 W1"]"#).expect("valid config");
    assert_eq!(config.program_lines().collect::<Vec<_>>(), vec!["G02 W1"]);
    assert_eq!(config.calibration.steps_per_unit(), 80.0);
    assert_eq!(config.calibration.scale_divider(), 1.0);
    assert_eq!(config.calibration.offset(), 0.0);
    assert_eq!(config.sampling.poll_interval_us, 200);
    assert_eq!(config.procedure.readings, 5);
    assert_eq!(config.procedure.input_poll_ms, 10);
    assert!(!config.autostart);
}

/// An empty file is a valid, empty bench.
#[test]
fn test_empty_file() {
    let config: BenchConfig = parse_config("").expect("empty config");
    assert!(config.program.is_empty());
}

/// Program lines keep their order and text.
#[test]
fn test_program_order_preserved() {
    let config = parse_config(
        r#"
program = [
    "G00 SPI80 DLC-420 OLC8000",
    "G01 X100 F10 RLC10",
    "G03 C2",
]
"#,
    )
    .expect("valid config");
    let lines: Vec<&str> = config.program_lines().collect();
    assert_eq!(lines, ["G00 SPI80 DLC-420 OLC8000", "G01 X100 F10 RLC10", "G03 C2"]);
}

/// Lines longer than the bounded string capacity are rejected at load.
#[test]
fn test_overlong_line_rejected() {
    let long = format!("G02 W{}", "1".repeat(MAX_LINE_LEN));
    let toml = format!("program = [\"{}\"]", long);
    assert!(matches!(
        parse_config(&toml),
        Err(Error::Configuration(ConfigurationError::Toml(_)))
    ));
}

/// Malformed TOML.
#[test]
fn test_syntax_error() {
    assert!(matches!(
        parse_config("program = [\"G01 X1 F1\""),
        Err(Error::Configuration(ConfigurationError::Toml(_)))
    ));
}

/// Wrong value types.
#[test]
fn test_wrong_types() {
    assert!(parse_config("autostart = \"yes\"").is_err());
    assert!(parse_config("[sampling]\nreadings_per_sample = -1\n").is_err());
}
