use std::sync::Arc;

use apodize::{hamming_iter, hanning_iter};
use common::config::{MagnitudeMode, WindowKind};
use rustfft::{Fft, FftPlanner, num_complex::Complex32};

/// Magnitudes are floored to this before `log10`, so silence maps to 0 instead of `-inf`.
/// Samples stay in raw `i16` units, where 1.0 is below one quantisation step.
pub const LOG_MAGNITUDE_FLOOR: f32 = 1.0;

pub fn window_coefficients(kind: WindowKind, size: usize) -> Vec<f32> {
    match kind {
        WindowKind::Rectangular => vec![1.0; size],
        WindowKind::Hann => hanning_iter(size).map(|x| x as f32).collect(),
        WindowKind::Hamming => hamming_iter(size).map(|x| x as f32).collect(),
    }
}

/// Window + forward FFT + one-sided magnitude, with all buffers allocated up front.
pub struct Transform {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    mode: MagnitudeMode,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl Transform {
    pub fn new(frame_size: usize, window: WindowKind, mode: MagnitudeMode) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch_len = fft.get_inplace_scratch_len();

        log::debug!("[transform] planned fft: size={frame_size}, window={window:?}, mode={mode:?}");

        Self {
            fft,
            window: window_coefficients(window, frame_size),
            mode,
            buffer: vec![Complex32::new(0.0, 0.0); frame_size],
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Returns `frame_size / 2` bins. Missing samples count as silence, extra samples are ignored.
    pub fn spectrum(&mut self, samples: &[i16]) -> Vec<f32> {
        for (i, (slot, w)) in self.buffer.iter_mut().zip(&self.window).enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0) as f32;
            *slot = Complex32::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // the upper half mirrors the lower half for real input
        let half = self.buffer.len() / 2;
        self.buffer[..half]
            .iter()
            .map(|c| match self.mode {
                MagnitudeMode::Magnitude => c.norm(),
                MagnitudeMode::LogPower => {
                    let log = c.norm().max(LOG_MAGNITUDE_FLOOR).log10();
                    log * log
                }
            })
            .collect()
    }
}
