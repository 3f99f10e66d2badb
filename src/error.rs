//! Error types for stepper-loadtest.
//!
//! Every error is recoverable at the single-command boundary: the program
//! executor logs it and moves on to the next command.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-loadtest operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Command line could not be parsed
    Parse(ParseError),
    /// Move could not be executed
    Motion(MotionError),
    /// Calibration procedure failed
    Calibration(CalibrationError),
    /// Configuration value or file rejected
    Configuration(ConfigurationError),
}

/// Command parsing errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Opcode prefix is not one of G00, G01, G02, G03
    UnknownOpcode(heapless::String<8>),
    /// A mandatory field for the opcode is absent
    MissingField(&'static str),
    /// A field is present but its value is not a number
    InvalidValue {
        /// Field prefix
        field: &'static str,
        /// Offending value text (truncated)
        text: heapless::String<32>,
    },
}

/// Motion execution errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Feedrate must be > 0
    InvalidFeedrate(f32),
}

/// Calibration procedure errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Reference load magnitude must be > 0
    InvalidReferenceLoad(f32),
    /// Operator-reported travel must be > 0
    InvalidObservedDistance(f32),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Scale factor is out of range (steps per unit must be > 0, divider must be != 0)
    NonPositiveScaleFactor {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f32,
    },
    /// An averaging count of zero readings
    ZeroReadings(&'static str),
    /// Failed to parse TOML configuration
    Toml(heapless::String<128>),
    /// File I/O error
    Io(heapless::String<128>),
}

impl ParseError {
    pub(crate) fn invalid_value(field: &'static str, text: &str) -> Self {
        let mut truncated = heapless::String::new();
        for c in text.chars() {
            if truncated.push(c).is_err() {
                break;
            }
        }
        ParseError::InvalidValue { field, text: truncated }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Calibration(e) => write!(f, "Calibration error: {}", e),
            Error::Configuration(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownOpcode(op) => {
                write!(f, "Unknown opcode '{}'. Valid opcodes: G00, G01, G02, G03", op)
            }
            ParseError::MissingField(field) => write!(f, "Missing mandatory field {}", field),
            ParseError::InvalidValue { field, text } => {
                write!(f, "Field {} has non-numeric value '{}'", field, text)
            }
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidFeedrate(v) => write!(f, "Invalid feedrate: {}. Must be > 0", v),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::InvalidReferenceLoad(v) => {
                write!(f, "Invalid reference load: {}. Must be > 0", v)
            }
            CalibrationError::InvalidObservedDistance(v) => {
                write!(f, "Invalid observed distance: {}. Must be > 0", v)
            }
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::NonPositiveScaleFactor { field, value } => {
                write!(f, "Invalid scale factor {} = {}", field, value)
            }
            ConfigurationError::ZeroReadings(field) => {
                write!(f, "{} must be at least 1", field)
            }
            ConfigurationError::Toml(msg) => write!(f, "TOML error: {}", msg),
            ConfigurationError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Error::Calibration(e)
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::Configuration(e)
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ParseError {}

impl std::error::Error for MotionError {}

impl std::error::Error for CalibrationError {}

impl std::error::Error for ConfigurationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_truncates_long_text() {
        let long = "x".repeat(100);
        match ParseError::invalid_value("X", &long) {
            ParseError::InvalidValue { field, text } => {
                assert_eq!(field, "X");
                assert_eq!(text.len(), 32);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_display_wraps_category() {
        let e: Error = MotionError::InvalidFeedrate(0.0).into();
        assert_eq!(e.to_string(), "Motion error: Invalid feedrate: 0. Must be > 0");
    }
}
