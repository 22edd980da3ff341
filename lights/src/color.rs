use common::config::{ColorMode, ColorTemplate, ConfigError, IndexBand, Tone};
use smart_leds::RGB8;

pub const RED_NM: f32 = 750.0;
pub const VIOLET_NM: f32 = 380.0;

const GAMMA: f32 = 0.8;

/// Approximate visible-light colour of a wavelength, each channel in `0.0..=1.0`.
/// Outside 380..=750 nm the result is black.
pub fn wavelength_to_rgb(nm: f32) -> [f32; 3] {
    let (r, g, b) = if (380.0..=440.0).contains(&nm) {
        let attenuation = 0.3 + 0.7 * (nm - 380.0) / (440.0 - 380.0);
        (((440.0 - nm) / (440.0 - 380.0)) * attenuation, 0.0, attenuation)
    } else if (440.0..=490.0).contains(&nm) {
        (0.0, (nm - 440.0) / (490.0 - 440.0), 1.0)
    } else if (490.0..=510.0).contains(&nm) {
        (0.0, 1.0, (510.0 - nm) / (510.0 - 490.0))
    } else if (510.0..=580.0).contains(&nm) {
        ((nm - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if (580.0..=645.0).contains(&nm) {
        (1.0, (645.0 - nm) / (645.0 - 580.0), 0.0)
    } else if (645.0..=750.0).contains(&nm) {
        let attenuation = 0.3 + 0.7 * (750.0 - nm) / (750.0 - 645.0);
        (attenuation, 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0)
    };
    [r, g, b].map(|c: f32| c.powf(GAMMA))
}

/// `num_pixels` evenly spaced wavelengths from red to violet, both ends included.
pub fn gradient(num_pixels: usize) -> Vec<[f32; 3]> {
    let last = num_pixels.saturating_sub(1).max(1) as f32;
    (0..num_pixels)
        .map(|i| {
            let nm = RED_NM - (RED_NM - VIOLET_NM) * i as f32 / last;
            wavelength_to_rgb(nm.clamp(VIOLET_NM, RED_NM))
        })
        .collect()
}

/// Wavelength for a normalised level. Full scale is violet, `max_db` below it is red,
/// and anything quieter falls past the red end.
pub fn level_wavelength(intensity: u8, max_db: f32) -> f32 {
    let db = 20.0 * (intensity.max(1) as f32 / 255.0).log10();
    VIOLET_NM - db * (RED_NM - VIOLET_NM) / max_db
}

fn apply_tone(tone: Tone, intensity: u8) -> u8 {
    match tone {
        Tone::Scaled(factor) => (factor * intensity as f32).round().clamp(0.0, 255.0) as u8,
        Tone::Fixed(value) => value,
    }
}

/// Per-pixel colour templates, computed once at start-up.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    templates: Vec<ColorTemplate>,
    level_hue: Option<f32>,
}

impl ColorMap {
    pub fn from_mode(mode: &ColorMode, num_pixels: usize) -> Result<Self, ConfigError> {
        match mode {
            ColorMode::IndexBanded { bands, fallback } => {
                Ok(Self::index_banded(bands, *fallback, num_pixels))
            }
            ColorMode::WavelengthGradient => Self::wavelength_gradient(num_pixels),
            ColorMode::Thirds { scaled } => Ok(Self::thirds(num_pixels, *scaled)),
            ColorMode::LevelToWavelength { max_db } => {
                Ok(Self::level_to_wavelength(num_pixels, *max_db))
            }
        }
    }

    /// The first band whose `below_index` is above the pixel index wins.
    pub fn index_banded(bands: &[IndexBand], fallback: ColorTemplate, num_pixels: usize) -> Self {
        let templates = (0..num_pixels)
            .map(|i| {
                bands
                    .iter()
                    .find(|band| i < band.below_index)
                    .map_or(fallback, |band| band.color)
            })
            .collect();
        Self {
            templates,
            level_hue: None,
        }
    }

    pub fn wavelength_gradient(num_pixels: usize) -> Result<Self, ConfigError> {
        if num_pixels == 0 {
            return Err(ConfigError::NoPixels);
        }
        let samples = gradient(num_pixels);
        if samples.len() != num_pixels {
            return Err(ConfigError::GradientLength {
                expected: num_pixels,
                actual: samples.len(),
            });
        }
        let templates = samples
            .into_iter()
            .map(|[r, g, b]| ColorTemplate::rgb(Tone::Scaled(r), Tone::Scaled(g), Tone::Scaled(b)))
            .collect();
        Ok(Self {
            templates,
            level_hue: None,
        })
    }

    pub fn thirds(num_pixels: usize, scaled: bool) -> Self {
        let on = if scaled { Tone::LEVEL } else { Tone::Fixed(255) };
        let off = Tone::OFF;
        let third = num_pixels / 3;
        let templates = (0..num_pixels)
            .map(|i| {
                if i < third {
                    ColorTemplate::rgb(on, off, off)
                } else if i < 2 * third {
                    ColorTemplate::rgb(off, on, off)
                } else {
                    ColorTemplate::rgb(off, off, on)
                }
            })
            .collect();
        Self {
            templates,
            level_hue: None,
        }
    }

    /// Hue follows loudness rather than position.
    pub fn level_to_wavelength(num_pixels: usize, max_db: f32) -> Self {
        let off = ColorTemplate::rgb(Tone::OFF, Tone::OFF, Tone::OFF);
        Self {
            templates: vec![off; num_pixels],
            level_hue: Some(max_db),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn color(&self, index: usize, intensity: u8) -> RGB8 {
        if let Some(max_db) = self.level_hue {
            let [r, g, b] = wavelength_to_rgb(level_wavelength(intensity, max_db))
                .map(|c| (c * 255.0).round() as u8);
            return RGB8::new(r, g, b);
        }
        let [r, g, b] = self.templates[index].0.map(|tone| apply_tone(tone, intensity));
        RGB8::new(r, g, b)
    }

    /// Fills black, then colours every pixel with a non-zero intensity.
    pub fn paint(&self, intensities: &[u8]) -> Vec<RGB8> {
        let mut pixels = vec![RGB8::default(); self.templates.len()];
        for (i, (pixel, &level)) in pixels.iter_mut().zip(intensities).enumerate() {
            if level == 0 {
                continue;
            }
            *pixel = self.color(i, level);
        }
        pixels
    }
}
