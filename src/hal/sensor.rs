//! Load cell capability.

/// Load cell amplifier interface.
pub trait LoadCell {
    /// One raw, unscaled reading.
    fn read_raw(&mut self) -> i32;

    /// Store the scale divider in the amplifier driver.
    fn set_scale(&mut self, scale: f32);

    /// Store the zero offset in the amplifier driver.
    fn set_offset(&mut self, offset: f32);

    /// Mean of `n` raw readings. Returns 0.0 for `n == 0`.
    fn read_averaged(&mut self, n: u32) -> f32 {
        if n == 0 {
            return 0.0;
        }
        let sum: i64 = (0..n).map(|_| i64::from(self.read_raw())).sum();
        sum as f32 / n as f32
    }
}

/// Load cell shared between the interpreter context (calibration) and the
/// sampling consumer.
#[derive(Debug, Default)]
pub struct SharedLoadCell<S> {
    inner: std::sync::Arc<parking_lot::Mutex<S>>,
}

impl<S> Clone for SharedLoadCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: std::sync::Arc::clone(&self.inner),
        }
    }
}

impl<S: LoadCell> SharedLoadCell<S> {
    /// Wrap a load cell.
    pub fn new(sensor: S) -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(sensor)),
        }
    }
}

impl<S: LoadCell> LoadCell for SharedLoadCell<S> {
    fn read_raw(&mut self) -> i32 {
        self.inner.lock().read_raw()
    }

    fn set_scale(&mut self, scale: f32) {
        self.inner.lock().set_scale(scale)
    }

    fn set_offset(&mut self, offset: f32) {
        self.inner.lock().set_offset(offset)
    }

    // One lock for the whole burst so readings are not interleaved
    fn read_averaged(&mut self, n: u32) -> f32 {
        self.inner.lock().read_averaged(n)
    }
}

impl<S: LoadCell + ?Sized> LoadCell for &mut S {
    fn read_raw(&mut self) -> i32 {
        (**self).read_raw()
    }

    fn set_scale(&mut self, scale: f32) {
        (**self).set_scale(scale)
    }

    fn set_offset(&mut self, offset: f32) {
        (**self).set_offset(offset)
    }

    fn read_averaged(&mut self, n: u32) -> f32 {
        (**self).read_averaged(n)
    }
}
