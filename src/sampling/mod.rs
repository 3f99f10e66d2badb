//! Position-synchronized load sampling.
//!
//! The interpreter context runs the [`SamplingScheduler`] inside each move and
//! posts requests to a single-slot [`Mailbox`]. The [`SamplingConsumer`] runs on
//! its own thread, drains the mailbox, reads the load cell, and publishes
//! measurements to a telemetry sink.

mod consumer;
mod mailbox;
mod scheduler;

pub use consumer::{ConsumerHandle, SamplingConsumer};
pub use mailbox::{Mailbox, MailboxStats, SampleRequest};
pub use scheduler::SamplingScheduler;
