//! Capability interfaces for the hardware and transports the core drives.
//!
//! Pin setup, drivers, and network transports live outside this crate; they
//! are reached only through these traits.

mod actuator;
mod clock;
mod operator;
mod sensor;
mod telemetry;

pub use actuator::Actuator;
pub use clock::{Clock, StdClock, StdDelay};
pub use operator::{ChannelInput, OperatorChannel, OperatorInput, OperatorReply};
pub use sensor::{LoadCell, SharedLoadCell};
pub use telemetry::{LogSink, MeasurementSample, TelemetrySink};
