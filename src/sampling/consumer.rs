//! Sampling consumer, the second execution context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};

use crate::config::calibration::SharedCalibration;
use crate::hal::{Clock, LoadCell, MeasurementSample, TelemetrySink};

use super::mailbox::Mailbox;

/// Drains the mailbox, acquires load readings, and publishes measurements.
pub struct SamplingConsumer<S, T, C> {
    mailbox: Arc<Mailbox>,
    sensor: S,
    sink: T,
    clock: C,
    calibration: SharedCalibration,
    readings_per_sample: u32,
    poll_interval: Duration,
    delivered: u64,
}

impl<S, T, C> SamplingConsumer<S, T, C>
where
    S: LoadCell,
    T: TelemetrySink,
    C: Clock,
{
    /// Create a consumer.
    pub fn new(
        mailbox: Arc<Mailbox>,
        sensor: S,
        sink: T,
        clock: C,
        calibration: SharedCalibration,
    ) -> Self {
        Self {
            mailbox,
            sensor,
            sink,
            clock,
            calibration,
            readings_per_sample: 5,
            poll_interval: Duration::from_micros(200),
            delivered: 0,
        }
    }

    /// Number of raw readings averaged into each sample.
    pub fn readings_per_sample(mut self, readings: u32) -> Self {
        self.readings_per_sample = readings.max(1);
        self
    }

    /// Sleep between empty polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Samples delivered to the sink so far.
    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Handle one pending request, if any.
    ///
    /// Returns `true` if a sample was published.
    pub fn poll_once(&mut self) -> bool {
        let Some(request) = self.mailbox.take() else {
            return false;
        };
        let raw_value = self.sensor.read_averaged(self.readings_per_sample);
        let sample = MeasurementSample {
            sequence_index: request.sequence_index,
            position: request.position,
            raw_value,
            value: self.calibration.snapshot().to_load(raw_value),
            timestamp_us: self.clock.now_us(),
        };
        self.sink.publish(&sample);
        self.delivered += 1;
        true
    }

    /// Poll until `stop` is raised.
    pub fn run(&mut self, stop: &AtomicBool) {
        debug!("sampling consumer started");
        while !stop.load(Ordering::Acquire) {
            if !self.poll_once() {
                thread::sleep(self.poll_interval);
            }
        }
        // Anything posted right before the stop still gets delivered
        while self.poll_once() {}
        info!("sampling consumer stopped after {} samples", self.delivered);
    }
}

impl<S, T, C> SamplingConsumer<S, T, C>
where
    S: LoadCell + Send + 'static,
    T: TelemetrySink + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Run the consumer on its own thread.
    pub fn spawn(mut self) -> ConsumerHandle<S, T, C> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("sampling".into())
            .spawn(move || {
                self.run(&thread_stop);
                self
            });
        ConsumerHandle { stop, handle }
    }
}

/// Handle to a consumer running on its own thread.
pub struct ConsumerHandle<S, T, C> {
    stop: Arc<AtomicBool>,
    handle: std::io::Result<JoinHandle<SamplingConsumer<S, T, C>>>,
}

impl<S, T, C> ConsumerHandle<S, T, C> {
    /// Whether the thread was started.
    pub fn is_running(&self) -> bool {
        matches!(&self.handle, Ok(h) if !h.is_finished())
    }

    /// Signal the consumer to stop and wait for it.
    ///
    /// Returns the consumer so its sink can be inspected, or `None` if the
    /// thread could not be spawned or panicked.
    pub fn stop(self) -> Option<SamplingConsumer<S, T, C>> {
        self.stop.store(true, Ordering::Release);
        match self.handle {
            Ok(handle) => handle.join().ok(),
            Err(e) => {
                error!("sampling thread was never started: {}", e);
                None
            }
        }
    }
}

impl<S, T, C> SamplingConsumer<S, T, C> {
    /// Borrow the telemetry sink.
    pub fn sink(&self) -> &T {
        &self.sink
    }

    /// Unwrap into the telemetry sink.
    pub fn into_sink(self) -> T {
        self.sink
    }
}
