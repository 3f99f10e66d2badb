//! Parsed command programs.

use crate::error::ParseError;

use super::command::Command;
use super::parser::parse_line;

/// One program line together with its parse outcome.
///
/// Lines that fail to parse are kept so that program indices (which
/// `Repeat` relies on) match the source, and so that the failure is
/// reported each time the line is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLine {
    /// Source text as supplied.
    pub source: String,
    /// Parsed command or the reason it was rejected.
    pub command: Result<Command, ParseError>,
}

/// Ordered, index-addressable command program, fixed for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    lines: Vec<ProgramLine>,
}

impl Program {
    /// Parse every line of a program.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|line| {
                let source = line.as_ref().to_owned();
                let command = parse_line(&source);
                ProgramLine { source, command }
            })
            .collect();
        Self { lines }
    }

    /// Number of lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the program has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ProgramLine> {
        self.lines.get(index)
    }

    /// Iterate over lines in order.
    pub fn iter(&self) -> impl Iterator<Item = &ProgramLine> {
        self.lines.iter()
    }

    /// Number of lines that failed to parse.
    pub fn error_count(&self) -> usize {
        self.lines.iter().filter(|l| l.command.is_err()).count()
    }
}
