//! Unit tests for command line parsing.

use stepper_loadtest::config::units::{Distance, Feedrate};
use stepper_loadtest::error::ParseError;
use stepper_loadtest::gcode::{Configure, MoveCommand};
use stepper_loadtest::{parse_line, Command, Program};

/// Test the reference program parses completely.
#[test]
fn test_reference_program() {
    let program = Program::parse([
        "G01 X100 F10 RLC10",
        "G02 W5",
        "G01 X-100 F10 RLC10",
        "G02 W5",
        "G03 C1000",
    ]);
    assert_eq!(program.error_count(), 0);
    let commands: Vec<Command> = program
        .iter()
        .filter_map(|l| l.command.clone().ok())
        .collect();
    assert_eq!(
        commands[2],
        Command::Move(MoveCommand {
            target: Distance(-100.0),
            feedrate: Feedrate(10.0),
            samples: 10,
        })
    );
    assert_eq!(commands[4], Command::Repeat { cycles: 1000 });
    assert_eq!(commands[4].opcode(), "G03");
}

/// Test surrounding whitespace is ignored.
#[test]
fn test_whitespace() {
    assert_eq!(
        parse_line("   G02 W0.5  \t"),
        Ok(Command::Wait { seconds: 0.5 })
    );
}

/// Test fractional sample counts truncate.
#[test]
fn test_fractional_rlc_truncates() {
    match parse_line("G01 X1 F1 RLC3.9") {
        Ok(Command::Move(m)) => assert_eq!(m.samples, 3),
        other => panic!("unexpected {:?}", other),
    }
}

/// Test configure selection by present fields.
#[test]
fn test_configure_precedence() {
    assert!(matches!(
        parse_line("G00 DLC2 RLC100"),
        Ok(Command::Configure(Configure::Constants { .. }))
    ));
    assert!(matches!(
        parse_line("G00 RLC100 X5 F5"),
        Ok(Command::Configure(Configure::LoadCalibration { .. }))
    ));
    assert_eq!(
        parse_line("G00 F5"),
        Err(ParseError::MissingField("SPI|DLC|OLC|RLC|X"))
    );
}

/// Test parse errors render a readable diagnostic.
#[test]
fn test_error_display() {
    let err = parse_line("G01 X100").unwrap_err();
    assert!(err.to_string().contains('F'));
    let err = parse_line("Z99").unwrap_err();
    assert!(err.to_string().contains("Z99"));
}
