use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregationMethod {
    Sum,
    Max,
    Average,
}

/// Analysis window applied to every frame before the transform.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    Rectangular,
    Hann,
    Hamming,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MagnitudeMode {
    /// `|X[k]|`
    Magnitude,
    /// `log10(|X[k]|)^2`, with the magnitude floored before the log
    LogPower,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdReference {
    Mean,
    Max,
    /// no gate before normalisation; normalised values below this (0-255) are zeroed afterwards
    Absolute(u8),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ThresholdConfig {
    pub reference: ThresholdReference,
    /// the reference level is multiplied by this; bins strictly below the product are zeroed.
    /// Unused with `ThresholdReference::Absolute`.
    pub multiplier: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FrequencyRange {
    pub low_hz: f32,
    pub high_hz: f32,
}

impl FrequencyRange {
    pub const fn new(low_hz: f32, high_hz: f32) -> Self {
        Self { low_hz, high_hz }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ThreeBandConfig {
    pub bass: FrequencyRange,
    pub mid: FrequencyRange,
    pub treble: FrequencyRange,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum BandingMode {
    /// one continuous band `[start_freq_hz, cutoff_freq_hz)` split evenly over all pixels
    Uniform,
    /// bass / mid / treble, each on its own third of the strand
    ThreeBand(ThreeBandConfig),
}

/// Source of one output channel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Tone {
    /// the pixel intensity multiplied by this factor (0.0 - 1.0)
    Scaled(f32),
    /// a constant channel value, independent of the intensity
    Fixed(u8),
}

impl Tone {
    pub const LEVEL: Tone = Tone::Scaled(1.0);
    pub const OFF: Tone = Tone::Fixed(0);
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ColorTemplate(pub [Tone; 3]);

impl ColorTemplate {
    pub const fn rgb(r: Tone, g: Tone, b: Tone) -> Self {
        Self([r, g, b])
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct IndexBand {
    /// pixels with an index strictly below this (and not claimed by an earlier band) use `color`
    pub below_index: usize,
    pub color: ColorTemplate,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ColorMode {
    /// fixed hue per index range, first match wins
    IndexBanded {
        bands: Vec<IndexBand>,
        fallback: ColorTemplate,
    },
    /// red (750 nm) at pixel 0 to violet (380 nm) at the last pixel
    WavelengthGradient,
    /// red / green / blue thirds; `scaled == false` lights a pixel at full brightness whenever
    /// its intensity is non-zero
    Thirds { scaled: bool },
    /// hue from loudness: a pixel at the frame maximum is violet (380 nm), one `max_db`
    /// below it is red (750 nm), anything quieter stays dark
    LevelToWavelength { max_db: f32 },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BeatConfig {
    /// frame-to-frame rises smaller than this are ignored
    pub min_delta: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpectrumConfig {
    pub config_version: u32,
    pub sample_rate: u32,
    /// samples per frame, a power of two
    pub frame_size: usize,
    pub start_freq_hz: f32,
    pub cutoff_freq_hz: f32,
    pub num_pixels: usize,
    pub window: WindowKind,
    pub magnitude: MagnitudeMode,
    pub banding: BandingMode,
    pub aggregate: AggregationMethod,
    pub threshold: ThresholdConfig,
    pub color: ColorMode,
    pub beat: Option<BeatConfig>,
    /// frames between diagnostic reports, 0 disables them
    pub report_interval: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported config version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("frame size {0} is not a power of two >= 2")]
    FrameSize(usize),
    #[error("frequency range {start} Hz .. {cutoff} Hz must satisfy 0 <= start < cutoff <= {nyquist} Hz")]
    FrequencyRange { start: f32, cutoff: f32, nyquist: f32 },
    #[error("{name} band {low} Hz .. {high} Hz must satisfy 0 <= low < high <= {nyquist} Hz")]
    BandRange {
        name: &'static str,
        low: f32,
        high: f32,
        nyquist: f32,
    },
    #[error("pixel count must be positive")]
    NoPixels,
    #[error("three band mode needs at least 3 pixels, got {0}")]
    TooFewPixelsForBands(usize),
    #[error("threshold multiplier {0} must be finite and positive")]
    Multiplier(f32),
    #[error("beat delta {0} must be finite and non-negative")]
    BeatDelta(f32),
    #[error("index band {position} does not start after the previous band")]
    IndexBandOrder { position: usize },
    #[error("colour factor {0} is outside 0.0 ..= 1.0")]
    ColorFactor(f32),
    #[error("level range {0} dB must be finite and positive")]
    MaxDb(f32),
    #[error("gradient has {actual} samples for {expected} pixels")]
    GradientLength { expected: usize, actual: usize },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config file: {0}")]
    Io(#[from] std::io::Error),
}

impl SpectrumConfig {
    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Checks everything the pipeline relies on; a config that passes never makes it panic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.config_version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.config_version,
                expected: CONFIG_VERSION,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.frame_size < 2 || !self.frame_size.is_power_of_two() {
            return Err(ConfigError::FrameSize(self.frame_size));
        }

        let nyquist = self.nyquist_hz();
        let (start, cutoff) = (self.start_freq_hz, self.cutoff_freq_hz);
        if !(start.is_finite() && cutoff.is_finite() && 0.0 <= start && start < cutoff && cutoff <= nyquist) {
            return Err(ConfigError::FrequencyRange {
                start,
                cutoff,
                nyquist,
            });
        }

        if self.num_pixels == 0 {
            return Err(ConfigError::NoPixels);
        }

        let multiplier = self.threshold.multiplier;
        let scaled = !matches!(self.threshold.reference, ThresholdReference::Absolute(_));
        if scaled && (!multiplier.is_finite() || multiplier <= 0.0) {
            return Err(ConfigError::Multiplier(multiplier));
        }

        if let BandingMode::ThreeBand(bands) = &self.banding {
            if self.num_pixels < 3 {
                return Err(ConfigError::TooFewPixelsForBands(self.num_pixels));
            }
            for (name, range) in [("bass", bands.bass), ("mid", bands.mid), ("treble", bands.treble)] {
                let ok = range.low_hz.is_finite()
                    && range.high_hz.is_finite()
                    && 0.0 <= range.low_hz
                    && range.low_hz < range.high_hz
                    && range.high_hz <= nyquist;
                if !ok {
                    return Err(ConfigError::BandRange {
                        name,
                        low: range.low_hz,
                        high: range.high_hz,
                        nyquist,
                    });
                }
            }
        }

        if let ColorMode::IndexBanded { bands, fallback } = &self.color {
            let mut previous = 0;
            for (position, band) in bands.iter().enumerate() {
                if band.below_index <= previous {
                    return Err(ConfigError::IndexBandOrder { position });
                }
                previous = band.below_index;
                check_template(&band.color)?;
            }
            check_template(fallback)?;
        }

        if let ColorMode::LevelToWavelength { max_db } = self.color {
            if !max_db.is_finite() || max_db <= 0.0 {
                return Err(ConfigError::MaxDb(max_db));
            }
        }

        if let Some(beat) = &self.beat {
            if !beat.min_delta.is_finite() || beat.min_delta < 0.0 {
                return Err(ConfigError::BeatDelta(beat.min_delta));
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn check_template(template: &ColorTemplate) -> Result<(), ConfigError> {
    for tone in template.0 {
        if let Tone::Scaled(factor) = tone {
            if !(0.0..=1.0).contains(&factor) {
                return Err(ConfigError::ColorFactor(factor));
            }
        }
    }
    Ok(())
}
