//! Telemetry sink capability.

use log::info;

use crate::config::units::Distance;

/// One position-synchronized load measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSample {
    /// 1-based index within the move.
    pub sequence_index: u32,
    /// Actuator position when the sample was requested.
    pub position: Distance,
    /// Mean of the raw readings.
    pub raw_value: f32,
    /// Calibrated load.
    pub value: f32,
    /// Clock time at acquisition, in microseconds.
    pub timestamp_us: u64,
}

/// Downstream consumer of measurements.
///
/// Delivery is fire-and-forget: implementations swallow their own failures.
pub trait TelemetrySink {
    /// Hand over one sample.
    fn publish(&mut self, sample: &MeasurementSample);
}

impl<F> TelemetrySink for F
where
    F: FnMut(&MeasurementSample),
{
    fn publish(&mut self, sample: &MeasurementSample) {
        self(sample)
    }
}

/// Sink that writes every sample to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish(&mut self, sample: &MeasurementSample) {
        info!(
            "sample #{} pos={:.3} load={:.3} raw={:.1} t={}us",
            sample.sequence_index,
            sample.position.value(),
            sample.value,
            sample.raw_value,
            sample.timestamp_us
        );
    }
}
