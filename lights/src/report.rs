use std::time::Instant;

/// Logs the loop rate every `interval` frames.
pub struct FpsReporter {
    interval: u32,
    counter: u32,
    lap_start: Instant,
}

impl FpsReporter {
    /// `interval == 0` disables reporting.
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            counter: 0,
            lap_start: Instant::now(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Counts one frame. Returns the measured rate when a lap completes.
    ///
    /// `levels` are the grouped values before normalisation, `intensities` the values after.
    pub fn tick(&mut self, levels: &[f32], intensities: &[u8]) -> Option<f64> {
        if self.interval == 0 {
            return None;
        }

        self.counter += 1;
        if self.counter < self.interval {
            return None;
        }

        let elapsed = self.lap_start.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.interval as f64 / elapsed
        } else {
            f64::INFINITY
        };
        log::info!(
            "[report] {} frames in {elapsed:.3} s, {fps:.1} fps",
            self.interval
        );
        log::debug!("[report] levels: {levels:?}");
        log::debug!("[report] intensities: {intensities:?}");

        self.counter = 0;
        self.lap_start = Instant::now();
        Some(fps)
    }
}
