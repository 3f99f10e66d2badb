//! Single-slot request mailbox.

use log::debug;
use parking_lot::Mutex;

use crate::config::units::Distance;

/// Request for one load sample at a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRequest {
    /// 1-based index within the current move.
    pub sequence_index: u32,
    /// Actuator position when the request was made.
    pub position: Distance,
}

/// Mailbox counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Requests posted.
    pub published: u64,
    /// Requests replaced before they were taken.
    pub overwritten: u64,
    /// Requests taken by the consumer.
    pub taken: u64,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<SampleRequest>,
    stats: MailboxStats,
}

/// Holds at most one pending [`SampleRequest`].
///
/// A publish replaces any request the consumer has not taken yet; the
/// replaced request is lost. Index and position always travel together
/// under one lock.
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: Mutex<Slot>,
}

impl Mailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a request. Returns `true` if an unconsumed request was replaced.
    pub fn publish(&self, request: SampleRequest) -> bool {
        let mut slot = self.slot.lock();
        slot.stats.published += 1;
        let replaced = slot.pending.replace(request);
        if let Some(lost) = replaced {
            slot.stats.overwritten += 1;
            debug!(
                "sample request #{} overwritten by #{} before it was consumed",
                lost.sequence_index, request.sequence_index
            );
        }
        replaced.is_some()
    }

    /// Take the pending request, leaving the slot empty.
    pub fn take(&self) -> Option<SampleRequest> {
        let mut slot = self.slot.lock();
        let request = slot.pending.take();
        if request.is_some() {
            slot.stats.taken += 1;
        }
        request
    }

    /// Whether a request is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> MailboxStats {
        self.slot.lock().stats
    }
}
