use crate::config::*;

pub const PRESET_NAMES: [&str; 6] = [
    "index_banded",
    "three_band",
    "rainbow",
    "beat",
    "greyscale",
    "level_hue",
];

const L: Tone = Tone::LEVEL;
const O: Tone = Tone::OFF;

/// Ten bands of ten pixels each, the last band catching everything above.
pub fn ten_band_palette() -> (Vec<IndexBand>, ColorTemplate) {
    let band = |below_index, r, g, b| IndexBand {
        below_index,
        color: ColorTemplate::rgb(r, g, b),
    };
    let bands = vec![
        band(10, L, O, O),
        band(20, O, L, O),
        band(30, O, O, L),
        band(40, L, L, O),
        band(50, L, O, L),
        band(60, Tone::Fixed(128), L, Tone::Fixed(128)),
        band(70, Tone::Fixed(64), L, Tone::Fixed(64)),
        band(80, Tone::Fixed(32), Tone::Fixed(32), L),
        band(90, Tone::Fixed(64), Tone::Fixed(64), L),
    ];
    (bands, ColorTemplate::rgb(L, L, L))
}

impl SpectrumConfig {
    pub fn index_banded() -> Self {
        let (bands, fallback) = ten_band_palette();
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 44100,
            frame_size: 1024,
            start_freq_hz: 0.0,
            cutoff_freq_hz: 14000.0,
            num_pixels: 100,
            window: WindowKind::Hamming,
            magnitude: MagnitudeMode::LogPower,
            banding: BandingMode::Uniform,
            aggregate: AggregationMethod::Average,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Mean,
                multiplier: 1.8,
            },
            color: ColorMode::IndexBanded { bands, fallback },
            beat: None,
            report_interval: 400,
        }
    }

    pub fn three_band() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 44100,
            frame_size: 1024,
            start_freq_hz: 0.0,
            cutoff_freq_hz: 8000.0,
            num_pixels: 100,
            window: WindowKind::Hamming,
            magnitude: MagnitudeMode::Magnitude,
            banding: BandingMode::ThreeBand(ThreeBandConfig {
                bass: FrequencyRange::new(0.0, 299.0),
                mid: FrequencyRange::new(350.0, 3000.0),
                treble: FrequencyRange::new(4000.0, 22050.0),
            }),
            aggregate: AggregationMethod::Average,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Mean,
                multiplier: 1.5,
            },
            color: ColorMode::Thirds { scaled: false },
            beat: None,
            report_interval: 400,
        }
    }

    pub fn rainbow() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 44100,
            frame_size: 1024,
            start_freq_hz: 300.0,
            cutoff_freq_hz: 8000.0,
            num_pixels: 100,
            window: WindowKind::Hann,
            magnitude: MagnitudeMode::Magnitude,
            banding: BandingMode::Uniform,
            aggregate: AggregationMethod::Average,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Mean,
                multiplier: 2.0,
            },
            color: ColorMode::WavelengthGradient,
            beat: None,
            report_interval: 400,
        }
    }

    pub fn beat() -> Self {
        let (bands, fallback) = ten_band_palette();
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 44100,
            frame_size: 1024,
            start_freq_hz: 40.0,
            cutoff_freq_hz: 5000.0,
            num_pixels: 100,
            window: WindowKind::Hamming,
            magnitude: MagnitudeMode::Magnitude,
            banding: BandingMode::Uniform,
            aggregate: AggregationMethod::Max,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Mean,
                multiplier: 1.3,
            },
            color: ColorMode::IndexBanded { bands, fallback },
            beat: Some(BeatConfig { min_delta: 1000.0 }),
            report_interval: 400,
        }
    }

    /// Plain grey bars, gated at 40 after normalisation.
    pub fn greyscale() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 44100,
            frame_size: 1024,
            start_freq_hz: 0.0,
            cutoff_freq_hz: 22050.0,
            num_pixels: 100,
            window: WindowKind::Rectangular,
            magnitude: MagnitudeMode::Magnitude,
            banding: BandingMode::Uniform,
            aggregate: AggregationMethod::Average,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Absolute(40),
                multiplier: 1.0,
            },
            color: ColorMode::IndexBanded {
                bands: Vec::new(),
                fallback: ColorTemplate::rgb(L, L, L),
            },
            beat: None,
            report_interval: 100,
        }
    }

    /// Loudness picks the hue over 60 dB, below 8 kHz.
    pub fn level_hue() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            sample_rate: 22050,
            frame_size: 4096,
            start_freq_hz: 0.0,
            cutoff_freq_hz: 8000.0,
            num_pixels: 100,
            window: WindowKind::Hann,
            magnitude: MagnitudeMode::Magnitude,
            banding: BandingMode::Uniform,
            aggregate: AggregationMethod::Average,
            threshold: ThresholdConfig {
                reference: ThresholdReference::Max,
                multiplier: 0.001,
            },
            color: ColorMode::LevelToWavelength { max_db: 60.0 },
            beat: None,
            report_interval: 400,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "index_banded" => Some(Self::index_banded()),
            "three_band" => Some(Self::three_band()),
            "rainbow" => Some(Self::rainbow()),
            "beat" => Some(Self::beat()),
            "greyscale" => Some(Self::greyscale()),
            "level_hue" => Some(Self::level_hue()),
            _ => None,
        }
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self::rainbow()
    }
}
