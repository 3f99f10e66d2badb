//! Start trigger gating program execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;

use crate::hal::OperatorInput;

/// One independent start signal.
pub trait StartTrigger {
    /// Whether the signal is asserted.
    fn is_triggered(&mut self) -> bool;
}

impl StartTrigger for Arc<AtomicBool> {
    fn is_triggered(&mut self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<F> StartTrigger for F
where
    F: FnMut() -> bool,
{
    fn is_triggered(&mut self) -> bool {
        self()
    }
}

/// Treats any operator reply as a start signal.
#[derive(Debug)]
pub struct AckTrigger<I>(pub I);

impl<I: OperatorInput> StartTrigger for AckTrigger<I> {
    fn is_triggered(&mut self) -> bool {
        self.0.poll().is_some()
    }
}

/// Blocks until any of its triggers asserts.
pub struct StartGate {
    triggers: Vec<Box<dyn StartTrigger + Send>>,
    poll_interval_ms: u32,
}

impl StartGate {
    /// Create a gate with no triggers.
    pub fn new(poll_interval_ms: u32) -> Self {
        Self {
            triggers: Vec::new(),
            poll_interval_ms,
        }
    }

    /// Add a trigger.
    pub fn with_trigger<T>(mut self, trigger: T) -> Self
    where
        T: StartTrigger + Send + 'static,
    {
        self.triggers.push(Box::new(trigger));
        self
    }

    /// Block until a trigger asserts; returns its index.
    ///
    /// Every trigger is checked on each pass, so none is preferred.
    pub fn wait<D: DelayNs>(&mut self, delay: &mut D) -> usize {
        loop {
            let fired = self
                .triggers
                .iter_mut()
                .enumerate()
                .filter_map(|(idx, t)| t.is_triggered().then_some(idx))
                .min();
            if let Some(idx) = fired {
                log::info!("start trigger {} asserted", idx);
                return idx;
            }
            delay.delay_ms(self.poll_interval_ms);
        }
    }
}

impl core::fmt::Debug for StartGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StartGate")
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::OperatorReply;
    use crate::sim::ScriptedInput;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_either_channel_opens_the_gate() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut polls = 0;
        let countdown = move || {
            polls += 1;
            polls > 3
        };
        let mut gate = StartGate::new(1)
            .with_trigger(Arc::clone(&flag))
            .with_trigger(countdown);
        assert_eq!(gate.wait(&mut NoopDelay::new()), 1);

        flag.store(true, Ordering::Release);
        let mut gate = StartGate::new(1).with_trigger(flag).with_trigger(|| false);
        assert_eq!(gate.wait(&mut NoopDelay::new()), 0);
    }

    #[test]
    fn test_operator_reply_starts() {
        let input = ScriptedInput::new().then(OperatorReply::Proceed);
        let mut gate = StartGate::new(1).with_trigger(AckTrigger(input));
        assert_eq!(gate.wait(&mut NoopDelay::new()), 0);
    }
}
