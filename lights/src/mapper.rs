use common::config::{
    AggregationMethod, BandingMode, ConfigError, SpectrumConfig, ThresholdConfig,
};
use smart_leds::RGB8;

use crate::bands::{BandPlan, group_bins, spread_bins, three_band_plans};
use crate::beat::BeatDetector;
use crate::color::ColorMap;
use crate::layout::BandLayout;
use crate::source::AudioFrame;
use crate::threshold::{gate, normalize, suppress};
use crate::transform::Transform;

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// exactly `num_pixels` colours
    Render(Vec<RGB8>),
    /// nothing to show; the strand keeps its previous state
    Skip(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// every bin of the (beat-differenced) spectrum is zero
    Silent,
    /// there was signal, but thresholding removed all of it
    BelowThreshold,
}

enum Banding {
    Uniform,
    ThreeBand([BandPlan; 3]),
}

/// The whole audio-to-colour pipeline for one fixed configuration.
pub struct SpectrumMapper {
    config: SpectrumConfig,
    transform: Transform,
    layout: BandLayout,
    banding: Banding,
    colors: ColorMap,
    beat: Option<BeatDetector>,
    levels: Vec<f32>,
    intensities: Vec<u8>,
}

impl SpectrumMapper {
    pub fn new(config: SpectrumConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let layout = BandLayout::from_config(&config);
        let banding = match &config.banding {
            BandingMode::Uniform => Banding::Uniform,
            BandingMode::ThreeBand(bands) => Banding::ThreeBand(three_band_plans(
                bands,
                layout.hz_per_bin,
                layout.spectrum_len,
                config.num_pixels,
            )),
        };
        let colors = ColorMap::from_mode(&config.color, config.num_pixels)?;
        if colors.len() != config.num_pixels {
            return Err(ConfigError::GradientLength {
                expected: config.num_pixels,
                actual: colors.len(),
            });
        }
        let beat = config
            .beat
            .map(|beat| BeatDetector::new(layout.spectrum_len, beat.min_delta));

        log::info!(
            "[mapper] {} pixels, {:.2} Hz per bin, bins {}..{} in groups of {}",
            config.num_pixels,
            layout.hz_per_bin,
            layout.start_bin,
            layout.cutoff_bin,
            layout.group_size
        );
        if layout.dark_pixels() > 0 {
            log::warn!(
                "[mapper] {} pixels lie past the end of the spectrum and stay dark",
                layout.dark_pixels()
            );
        }
        if let Banding::ThreeBand(plans) = &banding {
            for plan in plans {
                log::info!(
                    "[mapper] {} band: bins {:?} spread over pixels {:?}",
                    plan.name,
                    plan.bins,
                    plan.pixels
                );
            }
        }

        Ok(Self {
            transform: Transform::new(config.frame_size, config.window, config.magnitude),
            levels: vec![0.0; config.num_pixels],
            intensities: vec![0; config.num_pixels],
            config,
            layout,
            banding,
            colors,
            beat,
        })
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    /// Grouped levels of the last frame after thresholding, before normalisation.
    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Intensities (0-255) of the last rendered frame.
    pub fn intensities(&self) -> &[u8] {
        &self.intensities
    }

    pub fn process(&mut self, frame: &AudioFrame) -> FrameOutcome {
        if frame.len() != self.transform.frame_size() {
            log::trace!(
                "[mapper] frame has {} samples, expected {}",
                frame.len(),
                self.transform.frame_size()
            );
        }
        let spectrum = self.transform.spectrum(frame.samples());
        self.process_spectrum(&spectrum)
    }

    /// Everything after the transform: beat differencing, banding, thresholding and colour.
    pub fn process_spectrum(&mut self, spectrum: &[f32]) -> FrameOutcome {
        let beat;
        let spectrum = match self.beat.as_mut() {
            Some(detector) => {
                beat = detector.apply(spectrum);
                &beat[..]
            }
            None => spectrum,
        };

        let threshold = &self.config.threshold;
        let aggregate = self.config.aggregate;
        let (levels, intensities) = match &self.banding {
            Banding::Uniform => {
                let levels = uniform_levels(spectrum, &self.layout, threshold, aggregate);
                let intensities = normalize(&levels);
                (levels, intensities)
            }
            Banding::ThreeBand(plans) => {
                let levels =
                    three_band_levels(spectrum, plans, self.config.num_pixels, threshold, aggregate);
                let intensities = normalize_bands(&levels, plans);
                (levels, intensities)
            }
        };
        self.levels = levels;

        match intensities.and_then(|intensities| gate(intensities, threshold.reference)) {
            Some(intensities) => {
                let pixels = self.colors.paint(&intensities);
                self.intensities = intensities;
                FrameOutcome::Render(pixels)
            }
            None => {
                let reason = if spectrum.iter().all(|v| *v == 0.0) {
                    SkipReason::Silent
                } else {
                    SkipReason::BelowThreshold
                };
                log::debug!("[mapper] frame skipped: {reason:?}");
                FrameOutcome::Skip(reason)
            }
        }
    }
}

/// One continuous band over all pixels: `[start_bin, cutoff_bin)` thresholded, then
/// reduced to one level per pixel.
pub fn uniform_levels(
    spectrum: &[f32],
    layout: &BandLayout,
    threshold: &ThresholdConfig,
    aggregate: AggregationMethod,
) -> Vec<f32> {
    let end = layout.cutoff_bin.min(spectrum.len());
    let start = layout.start_bin.min(end);

    let mut band = spectrum[start..end].to_vec();
    suppress(&mut band, threshold);
    group_bins(&band, layout.group_size, layout.num_pixels, aggregate)
}

/// Each band thresholded against its own reference and spread over its whole third.
pub fn three_band_levels(
    spectrum: &[f32],
    plans: &[BandPlan; 3],
    num_pixels: usize,
    threshold: &ThresholdConfig,
    aggregate: AggregationMethod,
) -> Vec<f32> {
    let mut levels = vec![0.0; num_pixels];
    for plan in plans {
        let end = plan.bins.end.min(spectrum.len());
        let start = plan.bins.start.min(end);

        let mut band = spectrum[start..end].to_vec();
        suppress(&mut band, threshold);
        levels[plan.pixels.clone()]
            .copy_from_slice(&spread_bins(&band, plan.pixels.len(), aggregate));
    }
    levels
}

/// Normalises every band by its own maximum. `None` only if all three are dark.
pub fn normalize_bands(levels: &[f32], plans: &[BandPlan; 3]) -> Option<Vec<u8>> {
    let mut intensities = vec![0; levels.len()];
    let mut lit = false;
    for plan in plans {
        if let Some(band) = normalize(&levels[plan.pixels.clone()]) {
            intensities[plan.pixels.clone()].copy_from_slice(&band);
            lit = true;
        }
    }
    lit.then_some(intensities)
}
