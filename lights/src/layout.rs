use common::config::SpectrumConfig;

/// Mapping from frequencies to FFT bins and from bins to pixels, fixed for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct BandLayout {
    pub hz_per_bin: f64,
    pub start_bin: usize,
    /// `floor(cutoff_freq_hz / hz_per_bin)` before rounding to a whole number of groups
    pub requested_cutoff_bin: usize,
    /// exclusive; always `start_bin + group_size * num_pixels`
    pub cutoff_bin: usize,
    pub group_size: usize,
    pub num_pixels: usize,
    pub spectrum_len: usize,
}

pub fn hz_per_bin(sample_rate: u32, frame_size: usize) -> f64 {
    (sample_rate as f64 / 2.0) / (frame_size as f64 / 2.0)
}

pub fn bin_for_freq(freq_hz: f32, hz_per_bin: f64) -> usize {
    (freq_hz as f64 / hz_per_bin).floor() as usize
}

impl BandLayout {
    pub fn new(
        sample_rate: u32,
        frame_size: usize,
        start_freq_hz: f32,
        cutoff_freq_hz: f32,
        num_pixels: usize,
    ) -> Self {
        let hz_per_bin = hz_per_bin(sample_rate, frame_size);
        let start_bin = bin_for_freq(start_freq_hz, hz_per_bin);
        let requested_cutoff_bin = bin_for_freq(cutoff_freq_hz, hz_per_bin).max(start_bin);
        let group_size = ((requested_cutoff_bin - start_bin) / num_pixels.max(1)).max(1);

        Self {
            hz_per_bin,
            start_bin,
            requested_cutoff_bin,
            cutoff_bin: start_bin + group_size * num_pixels,
            group_size,
            num_pixels,
            spectrum_len: frame_size / 2,
        }
    }

    pub fn from_config(config: &SpectrumConfig) -> Self {
        Self::new(
            config.sample_rate,
            config.frame_size,
            config.start_freq_hz,
            config.cutoff_freq_hz,
            config.num_pixels,
        )
    }

    /// Pixels past the end of the spectrum; they never receive data.
    pub fn dark_pixels(&self) -> usize {
        let available = self.spectrum_len.saturating_sub(self.start_bin);
        self.num_pixels
            .saturating_sub(available.div_ceil(self.group_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_band_falls_back_to_single_bins() {
        let layout = BandLayout::new(44100, 512, 300.0, 8000.0, 100);
        assert!((layout.hz_per_bin - 86.1328125).abs() < 1e-9);
        assert_eq!(layout.start_bin, 3);
        assert_eq!(layout.requested_cutoff_bin, 92);
        assert_eq!(layout.group_size, 1);
        assert_eq!(layout.cutoff_bin, 103);
    }

    #[test]
    fn same_band_at_1024_samples() {
        let layout = BandLayout::new(44100, 1024, 300.0, 8000.0, 100);
        assert!((layout.hz_per_bin - 43.06640625).abs() < 1e-9);
        assert_eq!(layout.start_bin, 6);
        assert_eq!(layout.requested_cutoff_bin, 185);
        assert_eq!(layout.group_size, 1);
        assert_eq!(layout.cutoff_bin, 106);
        assert_eq!(layout.dark_pixels(), 0);
    }

    #[test]
    fn wide_band_is_grouped_and_trimmed() {
        // 14 kHz at 1024 samples is bin 325, which trims to 3 bins per pixel
        let layout = BandLayout::new(44100, 1024, 0.0, 14000.0, 100);
        assert_eq!(layout.requested_cutoff_bin, 325);
        assert_eq!(layout.group_size, 3);
        assert_eq!(layout.cutoff_bin, 300);
        assert_eq!(layout.dark_pixels(), 0);
    }

    #[test]
    fn pixels_past_the_spectrum_are_dark() {
        let layout = BandLayout::new(8000, 64, 1000.0, 4000.0, 40);
        // 125 Hz per bin, bins 8..32 exist, 40 single-bin pixels requested
        assert_eq!(layout.start_bin, 8);
        assert_eq!(layout.group_size, 1);
        assert_eq!(layout.dark_pixels(), 16);
    }
}
