//! Simulated hardware.
//!
//! A virtual-time stepper, a linear load cell, an in-memory telemetry sink,
//! and a scripted operator. Running a program against these needs no
//! hardware and, without pacing, no real time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::units::{Steps, StepsPerSec};
use crate::hal::{
    Actuator, Clock, LoadCell, MeasurementSample, OperatorInput, OperatorReply, TelemetrySink,
};

/// Shared clock advanced explicitly, in microseconds.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_us: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance_us(&self, us: u64) {
        self.now_us.fetch_add(us, Ordering::AcqRel);
    }
}

impl Clock for VirtualClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }
}

/// Stepper that takes exactly one step per tick at the commanded speed,
/// advancing a [`VirtualClock`] by one step period each time.
#[derive(Debug)]
pub struct SimActuator {
    clock: VirtualClock,
    position: i64,
    target: i64,
    speed: f32,
    /// Sub-microsecond remainder carried between steps.
    carry_us: f64,
    pace: bool,
    enabled: bool,
    steps_taken: u64,
    spring: Option<(SimLoadCell, f32)>,
}

impl SimActuator {
    /// Create an actuator at step 0 driving `clock`.
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            position: 0,
            target: 0,
            speed: 0.0,
            carry_us: 0.0,
            pace: false,
            enabled: false,
            steps_taken: 0,
            spring: None,
        }
    }

    /// Also sleep one real step period per tick.
    pub fn with_pacing(mut self, pace: bool) -> Self {
        self.pace = pace;
        self
    }

    /// Load `cell` like a spring: load = position in steps × `load_per_step`.
    pub fn with_spring(mut self, cell: SimLoadCell, load_per_step: f32) -> Self {
        cell.set_load(self.position as f32 * load_per_step);
        self.spring = Some((cell, load_per_step));
        self
    }

    /// Whether the driver is energized.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Total steps taken since creation.
    #[inline]
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }
}

impl Actuator for SimActuator {
    fn set_max_speed(&mut self, speed: StepsPerSec) {
        self.speed = speed.value();
    }

    fn move_to(&mut self, target: Steps) {
        self.target = target.value();
    }

    fn current_position_steps(&self) -> Steps {
        Steps(self.position)
    }

    fn distance_to_go_steps(&self) -> i64 {
        self.target - self.position
    }

    fn advance_tick(&mut self) {
        let to_go = self.distance_to_go_steps();
        if to_go == 0 || !(self.speed > 0.0) {
            return;
        }
        self.position += to_go.signum();
        self.steps_taken += 1;

        let period = 1_000_000.0 / f64::from(self.speed) + self.carry_us;
        let whole = period.floor();
        self.carry_us = period - whole;
        self.clock.advance_us(whole as u64);
        if self.pace {
            std::thread::sleep(Duration::from_micros(whole as u64));
        }

        if let Some((cell, load_per_step)) = &self.spring {
            cell.set_load(self.position as f32 * *load_per_step);
        }
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Linear load cell: raw = zero_counts + load × counts_per_unit.
///
/// Clones share the applied load, the stored driver constants, and the read
/// counter.
#[derive(Debug, Clone)]
pub struct SimLoadCell {
    zero_counts: i32,
    counts_per_unit: f32,
    load_bits: Arc<AtomicU32>,
    reads: Arc<AtomicU64>,
    driver_constants: Arc<Mutex<(f32, f32)>>,
}

impl SimLoadCell {
    /// Create an unloaded cell.
    pub fn new(zero_counts: i32, counts_per_unit: f32) -> Self {
        Self {
            zero_counts,
            counts_per_unit,
            load_bits: Arc::new(AtomicU32::new(0f32.to_bits())),
            reads: Arc::new(AtomicU64::new(0)),
            driver_constants: Arc::new(Mutex::new((1.0, 0.0))),
        }
    }

    /// Apply a load.
    pub fn set_load(&self, load: f32) {
        self.load_bits.store(load.to_bits(), Ordering::Release);
    }

    /// Currently applied load.
    pub fn load(&self) -> f32 {
        f32::from_bits(self.load_bits.load(Ordering::Acquire))
    }

    /// Counter of raw reads, shared with every clone.
    pub fn read_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.reads)
    }

    /// `(scale, offset)` last pushed to the driver.
    pub fn driver_constants(&self) -> (f32, f32) {
        *self.driver_constants.lock()
    }
}

impl LoadCell for SimLoadCell {
    fn read_raw(&mut self) -> i32 {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.zero_counts + libm::roundf(self.load() * self.counts_per_unit) as i32
    }

    fn set_scale(&mut self, scale: f32) {
        self.driver_constants.lock().0 = scale;
    }

    fn set_offset(&mut self, offset: f32) {
        self.driver_constants.lock().1 = offset;
    }
}

/// Telemetry sink collecting samples in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    samples: Arc<Mutex<Vec<MeasurementSample>>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    pub fn samples(&self) -> Vec<MeasurementSample> {
        self.samples.lock().clone()
    }

    /// Number of samples received.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn publish(&mut self, sample: &MeasurementSample) {
        self.samples.lock().push(*sample);
    }
}

type ScriptAction = Box<dyn FnOnce() + Send>;

/// Operator replaying a fixed list of replies, one per poll.
#[derive(Default)]
pub struct ScriptedInput {
    steps: VecDeque<(OperatorReply, Option<ScriptAction>)>,
}

impl ScriptedInput {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reply.
    pub fn then(mut self, reply: OperatorReply) -> Self {
        self.steps.push_back((reply, None));
        self
    }

    /// Append a reply preceded by an action, e.g. placing a load on the cell.
    pub fn then_with<F>(mut self, reply: OperatorReply, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.steps.push_back((reply, Some(Box::new(action))));
        self
    }

    /// Replies not yet delivered.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl OperatorInput for ScriptedInput {
    fn poll(&mut self) -> Option<OperatorReply> {
        let (reply, action) = self.steps.pop_front()?;
        if let Some(action) = action {
            action();
        }
        Some(reply)
    }
}

impl core::fmt::Debug for ScriptedInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedInput")
            .field("remaining", &self.steps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_steps_in_virtual_time() {
        let clock = VirtualClock::new();
        let mut act = SimActuator::new(clock.clone());
        act.set_max_speed(StepsPerSec(800.0));
        act.move_to(Steps(-8));
        while act.distance_to_go_steps() != 0 {
            act.advance_tick();
        }
        assert_eq!(act.current_position_steps(), Steps(-8));
        assert_eq!(act.steps_taken(), 8);
        assert_eq!(clock.now_us(), 10_000);
    }

    #[test]
    fn test_fractional_periods_do_not_drift() {
        let clock = VirtualClock::new();
        let mut act = SimActuator::new(clock.clone());
        act.set_max_speed(StepsPerSec(3.0));
        act.move_to(Steps(3));
        for _ in 0..3 {
            act.advance_tick();
        }
        // 3 × 333333.33 us
        assert!((999_999..=1_000_000).contains(&clock.now_us()));
    }

    #[test]
    fn test_spring_load_follows_position() {
        let cell = SimLoadCell::new(100, 10.0);
        let mut act = SimActuator::new(VirtualClock::new()).with_spring(cell.clone(), 0.5);
        act.set_max_speed(StepsPerSec(1000.0));
        act.move_to(Steps(4));
        while act.distance_to_go_steps() != 0 {
            act.advance_tick();
        }
        assert_eq!(cell.load(), 2.0);
        let mut reader = cell.clone();
        assert_eq!(reader.read_raw(), 120);
    }

    #[test]
    fn test_load_cell_average() {
        let mut cell = SimLoadCell::new(-50, 4.0);
        cell.set_load(2.5);
        assert_eq!(cell.read_averaged(5), -40.0);
        assert_eq!(cell.read_counter().load(Ordering::Relaxed), 5);
        assert_eq!(cell.read_averaged(0), 0.0);
    }

    #[test]
    fn test_scripted_input_runs_actions_in_order() {
        let cell = SimLoadCell::new(0, 1.0);
        let handle = cell.clone();
        let mut input = ScriptedInput::new()
            .then(OperatorReply::Proceed)
            .then_with(OperatorReply::Value(3.0), move || handle.set_load(7.0));
        assert_eq!(input.poll(), Some(OperatorReply::Proceed));
        assert_eq!(cell.load(), 0.0);
        assert_eq!(input.poll(), Some(OperatorReply::Value(3.0)));
        assert_eq!(cell.load(), 7.0);
        assert_eq!(input.poll(), None);
    }
}
