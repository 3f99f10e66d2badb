//! Command line parser.
//!
//! Fields are located by walking [`FIELD_PREFIXES`] in order. Each prefix
//! claims its first occurrence that does not overlap an occurrence claimed
//! by an earlier prefix, so `C` is never found inside `RLC` and `F` is never
//! mistaken for part of a longer prefix. A value runs from the end of its
//! prefix to the start of the next claimed prefix in the line.

use crate::config::units::{Distance, Feedrate};
use crate::error::ParseError;

use super::command::{Command, Configure, MoveCommand};

/// Field prefixes in detection precedence order.
pub const FIELD_PREFIXES: [&str; 8] = ["SPI", "DLC", "OLC", "RLC", "X", "F", "W", "C"];

const OPCODE_LEN: usize = 3;

/// Parse one program line into a command.
///
/// # Errors
///
/// - [`ParseError::UnknownOpcode`] if the line does not start with `G00`..`G03`
/// - [`ParseError::MissingField`] if a mandatory field is absent
/// - [`ParseError::InvalidValue`] if a needed field is not a number
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let opcode = match line.get(..OPCODE_LEN) {
        Some(op) => op,
        None => return Err(unknown_opcode(line)),
    };
    let fields = Fields::scan(&line[OPCODE_LEN..]);

    match opcode {
        "G00" => parse_configure(&fields).map(Command::Configure),
        "G01" => Ok(Command::Move(MoveCommand {
            target: Distance(fields.require("X")?),
            feedrate: Feedrate(fields.require("F")?),
            samples: fields.number("RLC")?.map(|n| n as i32).unwrap_or(0),
        })),
        "G02" => Ok(Command::Wait {
            seconds: fields.require("W")?,
        }),
        "G03" => {
            let cycles = fields.require("C")?;
            Ok(Command::Repeat {
                cycles: if cycles > 0.0 { cycles as u32 } else { 0 },
            })
        }
        other => Err(unknown_opcode(other)),
    }
}

fn parse_configure(fields: &Fields<'_>) -> Result<Configure, ParseError> {
    let steps_per_unit = fields.number("SPI")?;
    let scale_divider = fields.number("DLC")?;
    let offset = fields.number("OLC")?;
    if steps_per_unit.is_some() || scale_divider.is_some() || offset.is_some() {
        return Ok(Configure::Constants {
            steps_per_unit,
            scale_divider,
            offset,
        });
    }

    if let Some(reference_load) = fields.number("RLC")? {
        return Ok(Configure::LoadCalibration { reference_load });
    }

    match fields.number("X")? {
        Some(target) => Ok(Configure::DistanceCalibration {
            target: Distance(target),
            feedrate: Feedrate(fields.require("F")?),
        }),
        None => Err(ParseError::MissingField("SPI|DLC|OLC|RLC|X")),
    }
}

fn unknown_opcode(text: &str) -> ParseError {
    let mut op = heapless::String::new();
    for c in text.chars().take(OPCODE_LEN) {
        // Capacity of 8 bytes holds any 3 chars up to 2 bytes wide
        if op.push(c).is_err() {
            break;
        }
    }
    ParseError::UnknownOpcode(op)
}

/// Raw field values located in the part of a line after the opcode.
struct Fields<'a> {
    values: [Option<&'a str>; FIELD_PREFIXES.len()],
}

impl<'a> Fields<'a> {
    fn scan(body: &'a str) -> Self {
        let bytes = body.as_bytes();
        let mut starts: [Option<usize>; FIELD_PREFIXES.len()] = [None; FIELD_PREFIXES.len()];

        for (idx, prefix) in FIELD_PREFIXES.iter().enumerate() {
            let prefix = prefix.as_bytes();
            let mut from = 0;
            while let Some(pos) = find_from(bytes, prefix, from) {
                let end = pos + prefix.len();
                let overlaps = starts.iter().zip(FIELD_PREFIXES.iter()).any(|(s, p)| {
                    s.map_or(false, |s| pos < s + p.len() && s < end)
                });
                if !overlaps {
                    starts[idx] = Some(pos);
                    break;
                }
                from = pos + 1;
            }
        }

        let mut values = [None; FIELD_PREFIXES.len()];
        for (idx, start) in starts.iter().enumerate() {
            if let Some(start) = *start {
                let value_start = start + FIELD_PREFIXES[idx].len();
                let value_end = starts
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|&s| s >= value_start)
                    .min()
                    .unwrap_or(body.len());
                // Prefixes are ASCII, so these offsets are char boundaries
                values[idx] = Some(&body[value_start..value_end]);
            }
        }

        Self { values }
    }

    fn raw(&self, prefix: &str) -> Option<&'a str> {
        FIELD_PREFIXES
            .iter()
            .position(|p| *p == prefix)
            .and_then(|idx| self.values[idx])
    }

    fn number(&self, prefix: &'static str) -> Result<Option<f32>, ParseError> {
        match self.raw(prefix) {
            None => Ok(None),
            Some(text) => {
                let text = text.trim();
                match text.parse::<f32>() {
                    // `parse` also accepts NaN and infinities
                    Ok(v) if v.is_finite() => Ok(Some(v)),
                    _ => Err(ParseError::invalid_value(prefix, text)),
                }
            }
        }
    }

    fn require(&self, prefix: &'static str) -> Result<f32, ParseError> {
        self.number(prefix)?.ok_or(ParseError::MissingField(prefix))
    }
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}
