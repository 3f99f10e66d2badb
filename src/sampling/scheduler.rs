//! Sample timing across one move.
//!
//! For a requested count `n`:
//! - `n <= 0`: nothing is requested
//! - `n == 1`: one request at the end of the move
//! - `n == 2`: one at the start and one at the end
//! - `n > 2`: index 1 at the start, `n - 2` intermediates spaced by
//!   `duration / (n - 1)`, index `n` at the end
//!
//! Intermediates fall due at whole multiples of the interval after the
//! start, so tick quantization does not accumulate. The interval comes from
//! the planned duration, not the actual one.

use crate::config::units::Distance;
use crate::motion::MovePlan;

use super::mailbox::{Mailbox, SampleRequest};

/// Runtime sampling state for one move.
#[derive(Debug, Clone)]
pub struct SamplingScheduler {
    /// Total requested samples (>= 1).
    total: u32,
    /// Index of the next request to publish.
    next_index: u32,
    /// Spacing between intermediate requests.
    interval_us: u64,
    /// Clock time at which the next intermediate falls due, minus one interval.
    anchor_us: u64,
    /// Requests published so far.
    published: u32,
}

impl SamplingScheduler {
    /// Plan sampling for a move. Returns `None` when no samples are requested.
    pub fn new(samples: i32, plan: &MovePlan, now_us: u64) -> Option<Self> {
        if samples <= 0 {
            return None;
        }
        let total = samples as u32;
        let interval_us = if total > 2 {
            plan.duration_us() / u64::from(total - 1)
        } else {
            0
        };
        Some(Self {
            total,
            next_index: 1,
            interval_us,
            anchor_us: now_us,
            published: 0,
        })
    }

    /// Total requested samples.
    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Spacing between intermediate requests in microseconds (0 when `n <= 2`).
    #[inline]
    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }

    /// Requests published so far.
    #[inline]
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Publish the start request, if this count has one.
    pub fn on_start(&mut self, mailbox: &Mailbox, position: Distance, now_us: u64) {
        if self.total >= 2 && self.next_index == 1 {
            self.publish(mailbox, position);
            self.anchor_us = now_us;
        }
    }

    /// Check the intermediate timer after a control tick.
    ///
    /// Returns `true` if a request was published.
    pub fn on_tick(&mut self, mailbox: &Mailbox, position: Distance, now_us: u64) -> bool {
        if self.total <= 2 || self.next_index >= self.total || self.next_index == 1 {
            return false;
        }
        if now_us.saturating_sub(self.anchor_us) < self.interval_us {
            return false;
        }
        self.publish(mailbox, position);
        self.anchor_us += self.interval_us;
        true
    }

    /// Publish the end request once the move has completed.
    ///
    /// Intermediates the move finished too early to trigger are skipped; the
    /// end request always carries index `n`.
    pub fn on_complete(&mut self, mailbox: &Mailbox, position: Distance) {
        if self.next_index <= self.total {
            self.next_index = self.total;
            self.publish(mailbox, position);
        }
    }

    fn publish(&mut self, mailbox: &Mailbox, position: Distance) {
        mailbox.publish(SampleRequest {
            sequence_index: self.next_index,
            position,
        });
        self.next_index += 1;
        self.published += 1;
    }
}
