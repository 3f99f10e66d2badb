//! Compact G-code dialect for actuator test programs.
//!
//! | Opcode | Command   | Fields                                  |
//! |--------|-----------|-----------------------------------------|
//! | `G00`  | Configure | `SPI`, `DLC`, `OLC` / `RLC` / `X` + `F` |
//! | `G01`  | Move      | `X`, `F`, optional `RLC`                |
//! | `G02`  | Wait      | `W`                                     |
//! | `G03`  | Repeat    | `C`                                     |

mod command;
mod parser;
mod program;

pub use command::{Command, Configure, MoveCommand};
pub use parser::{parse_line, FIELD_PREFIXES};
pub use program::{Program, ProgramLine};
