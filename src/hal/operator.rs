//! Operator acknowledgement channel.
//!
//! A wait is satisfied by whichever input source delivers a reply first.
//! Sources are polled round-robin so none of them is preferred.

use std::sync::mpsc::{Receiver, TryRecvError};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

/// A reply from the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatorReply {
    /// Empty acknowledgement.
    Proceed,
    /// A numeric answer, such as the measured travel distance.
    Value(f32),
}

impl OperatorReply {
    /// Interpret one line of operator text.
    ///
    /// An empty line acknowledges, a number is a value, anything else is
    /// rejected with `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Some(OperatorReply::Proceed);
        }
        line.parse::<f32>().ok().map(OperatorReply::Value)
    }
}

/// One independent source of operator replies.
pub trait OperatorInput {
    /// Non-blocking check for a reply.
    fn poll(&mut self) -> Option<OperatorReply>;
}

/// Operator input fed through an mpsc channel by a transport thread.
#[derive(Debug)]
pub struct ChannelInput {
    rx: Receiver<OperatorReply>,
    closed: bool,
}

impl ChannelInput {
    /// Wrap the receiving end of a channel.
    pub fn new(rx: Receiver<OperatorReply>) -> Self {
        Self { rx, closed: false }
    }
}

impl OperatorInput for ChannelInput {
    fn poll(&mut self) -> Option<OperatorReply> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                debug!("operator input channel closed");
                self.closed = true;
                None
            }
        }
    }
}

/// Blocking wait over several operator input sources.
pub struct OperatorChannel {
    sources: Vec<Box<dyn OperatorInput + Send>>,
    poll_interval_ms: u32,
    next: usize,
}

impl OperatorChannel {
    /// Create a channel with no sources.
    pub fn new(poll_interval_ms: u32) -> Self {
        Self {
            sources: Vec::new(),
            poll_interval_ms,
            next: 0,
        }
    }

    /// Add an input source.
    pub fn with_source<I>(mut self, source: I) -> Self
    where
        I: OperatorInput + Send + 'static,
    {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of attached sources.
    #[inline]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Poll every source once, starting after the one polled first last time.
    pub fn try_reply(&mut self) -> Option<OperatorReply> {
        let count = self.sources.len();
        if count == 0 {
            return None;
        }
        let start = self.next % count;
        self.next = start + 1;
        (0..count)
            .map(|i| (start + i) % count)
            .find_map(|idx| self.sources[idx].poll())
    }

    /// Block until any source replies.
    ///
    /// There is no timeout: with no sources attached this never returns.
    pub fn wait_reply<D: DelayNs>(&mut self, delay: &mut D) -> OperatorReply {
        loop {
            if let Some(reply) = self.try_reply() {
                return reply;
            }
            delay.delay_ms(self.poll_interval_ms);
        }
    }

    /// Block until the operator acknowledges. A value also counts.
    pub fn wait_ack<D: DelayNs>(&mut self, delay: &mut D) {
        if let OperatorReply::Value(v) = self.wait_reply(delay) {
            debug!("acknowledgement carried value {}, ignored", v);
        }
    }

    /// Block until the operator sends a numeric value.
    pub fn wait_value<D: DelayNs>(&mut self, delay: &mut D) -> f32 {
        loop {
            match self.wait_reply(delay) {
                OperatorReply::Value(v) => return v,
                OperatorReply::Proceed => warn!("a numeric value is required"),
            }
        }
    }
}

impl core::fmt::Debug for OperatorChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OperatorChannel")
            .field("sources", &self.sources.len())
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}
