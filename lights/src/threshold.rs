use common::config::{ThresholdConfig, ThresholdReference};

pub const MAX_LED_VALUE: u8 = 255;

pub fn reference_level(values: &[f32], reference: ThresholdReference) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    match reference {
        ThresholdReference::Mean => values.iter().sum::<f32>() / values.len() as f32,
        ThresholdReference::Max => values.iter().copied().fold(0.0, f32::max),
        ThresholdReference::Absolute(_) => 0.0,
    }
}

/// Zeroes every value strictly below `reference * multiplier` and returns that level.
pub fn suppress(values: &mut [f32], config: &ThresholdConfig) -> f32 {
    let level = reference_level(values, config.reference) * config.multiplier;
    for v in values.iter_mut() {
        if *v < level {
            *v = 0.0;
        }
    }
    level
}

/// The post-normalisation cutoff of `ThresholdReference::Absolute`: intensities strictly below
/// it are zeroed. `None` if nothing is left.
pub fn gate(mut intensities: Vec<u8>, reference: ThresholdReference) -> Option<Vec<u8>> {
    if let ThresholdReference::Absolute(cutoff) = reference {
        for v in intensities.iter_mut() {
            if *v < cutoff {
                *v = 0;
            }
        }
    }
    intensities.iter().any(|v| *v > 0).then_some(intensities)
}

/// Scales so the loudest value becomes 255. `None` when nothing is left to show.
pub fn normalize(values: &[f32]) -> Option<Vec<u8>> {
    let max = values.iter().copied().fold(0.0, f32::max);
    if max > 0.0 {
        Some(normalize_to(values, max))
    } else {
        None
    }
}

/// `round(v * 255 / max)` clamped to `0..=255`. A positive value never rounds down to 0,
/// so only thresholding decides which pixels go dark.
pub fn normalize_to(values: &[f32], max: f32) -> Vec<u8> {
    let scale = MAX_LED_VALUE as f32 / max;
    values
        .iter()
        .map(|&v| {
            if v > 0.0 {
                (v * scale).round().clamp(1.0, MAX_LED_VALUE as f32) as u8
            } else {
                0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_times(multiplier: f32) -> ThresholdConfig {
        ThresholdConfig {
            reference: ThresholdReference::Mean,
            multiplier,
        }
    }

    #[test]
    fn strictly_below_is_zeroed() {
        let mut values = [1.0, 2.0, 3.0, 6.0];
        // mean 3.0
        let level = suppress(&mut values, &mean_times(1.0));
        assert_eq!(level, 3.0);
        assert_eq!(values, [0.0, 0.0, 3.0, 6.0]);
    }

    #[test]
    fn max_reference() {
        let mut values = [1.0, 5.0, 10.0];
        suppress(
            &mut values,
            &ThresholdConfig {
                reference: ThresholdReference::Max,
                multiplier: 0.5,
            },
        );
        assert_eq!(values, [0.0, 5.0, 10.0]);
    }

    #[test]
    fn normalizes_to_full_scale() {
        let normalized = normalize(&[0.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(normalized, vec![0, 64, 128, 255]);
    }

    #[test]
    fn positive_levels_never_round_to_zero() {
        // plain round(v * 255 / max) would turn 0.001 into 0 and darken a pixel that
        // survived thresholding
        assert_eq!((0.001f32 * 255.0 / 1000.0).round(), 0.0);
        let normalized = normalize(&[0.001, 1000.0]).unwrap();
        assert_eq!(normalized, vec![1, 255]);
    }

    #[test]
    fn absolute_reference_keeps_everything_before_normalising() {
        let mut values = [0.5, 2.0, 9.0];
        let level = suppress(
            &mut values,
            &ThresholdConfig {
                reference: ThresholdReference::Absolute(40),
                multiplier: 1.0,
            },
        );
        assert_eq!(level, 0.0);
        assert_eq!(values, [0.5, 2.0, 9.0]);
    }

    #[test]
    fn absolute_gate_after_normalising() {
        let gated = gate(vec![0, 10, 39, 40, 255], ThresholdReference::Absolute(40));
        assert_eq!(gated, Some(vec![0, 0, 0, 40, 255]));
        // relative references leave intensities alone
        assert_eq!(gate(vec![3, 0], ThresholdReference::Mean), Some(vec![3, 0]));
        assert_eq!(gate(vec![0, 39], ThresholdReference::Absolute(40)), None);
    }

    #[test]
    fn silence_is_not_normalized() {
        assert_eq!(normalize(&[0.0; 8]), None);
        assert_eq!(normalize(&[]), None);
    }

    #[test]
    fn everything_thresholded_away() {
        // a flat spectrum never reaches 1.5x its own mean
        let mut values = [7.0; 16];
        suppress(&mut values, &mean_times(1.5));
        assert!(values.iter().all(|v| *v == 0.0));
        assert_eq!(normalize(&values), None);
    }

    #[test]
    fn renormalizing_is_identity() {
        let values: Vec<u8> = (0..=255).collect();
        let as_float: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        assert_eq!(normalize_to(&as_float, 255.0), values);
    }
}
