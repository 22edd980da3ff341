use common::config::{AggregationMethod, SpectrumConfig, ThresholdConfig, ThresholdReference};
use proptest::prelude::*;
use spectrum_lights::bands::group_bins;
use spectrum_lights::color::{ColorMap, gradient};
use spectrum_lights::layout::BandLayout;
use spectrum_lights::threshold::{normalize_to, suppress};

prop_compose! {
    fn valid_config()(
        sample_rate in prop::sample::select(vec![8000u32, 16000, 22050, 44100, 48000, 96000]),
        frame_bits in 5u32..13,
        start_fraction in 0.0f32..0.9,
        width_fraction in 0.01f32..1.0,
        num_pixels in 1usize..400,
    ) -> SpectrumConfig {
        let mut config = SpectrumConfig::rainbow();
        let nyquist = sample_rate as f32 / 2.0;
        config.sample_rate = sample_rate;
        config.frame_size = 1 << frame_bits;
        config.start_freq_hz = (start_fraction * nyquist).floor();
        config.cutoff_freq_hz =
            (config.start_freq_hz + width_fraction * (nyquist - config.start_freq_hz)).ceil().min(nyquist);
        config.num_pixels = num_pixels;
        config
    }
}

fn aggregation() -> impl Strategy<Value = AggregationMethod> {
    prop_oneof![
        Just(AggregationMethod::Sum),
        Just(AggregationMethod::Max),
        Just(AggregationMethod::Average),
    ]
}

proptest! {
    #[test]
    fn layout_groups_evenly(config in valid_config()) {
        prop_assume!(config.validate().is_ok());
        let layout = BandLayout::from_config(&config);

        prop_assert!(layout.start_bin < layout.cutoff_bin);
        prop_assert_eq!((layout.cutoff_bin - layout.start_bin) % config.num_pixels, 0);
        prop_assert_eq!(
            (layout.cutoff_bin - layout.start_bin) / config.num_pixels,
            layout.group_size
        );
        prop_assert!(layout.group_size >= 1);
    }

    #[test]
    fn grouping_yields_one_value_per_pixel(
        config in valid_config(),
        method in aggregation(),
        level in 0.0f32..1e6,
    ) {
        prop_assume!(config.validate().is_ok());
        let layout = BandLayout::from_config(&config);
        let spectrum = vec![level; layout.spectrum_len];
        let end = layout.cutoff_bin.min(spectrum.len());
        let start = layout.start_bin.min(end);

        let grouped = group_bins(&spectrum[start..end], layout.group_size, config.num_pixels, method);
        prop_assert_eq!(grouped.len(), config.num_pixels);
    }

    #[test]
    fn normalizing_full_scale_is_identity(values in prop::collection::vec(any::<u8>(), 1..300)) {
        let as_float: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        prop_assert_eq!(normalize_to(&as_float, 255.0), values);
    }

    #[test]
    fn higher_multiplier_never_lights_more(
        values in prop::collection::vec(0.0f32..1e5, 1..200),
        low in 0.1f32..4.0,
        extra in 0.0f32..4.0,
        use_max in any::<bool>(),
    ) {
        let reference = if use_max { ThresholdReference::Max } else { ThresholdReference::Mean };
        let mut loose = values.clone();
        let mut strict = values;
        suppress(&mut loose, &ThresholdConfig { reference, multiplier: low });
        suppress(&mut strict, &ThresholdConfig { reference, multiplier: low + extra });

        for (l, s) in loose.iter().zip(&strict) {
            // anything that survives the stricter threshold also survives the looser one
            if *s > 0.0 {
                prop_assert!(*l > 0.0);
            }
        }
    }

    #[test]
    fn gradient_has_one_colour_per_pixel(n in 1usize..2000) {
        let samples = gradient(n);
        prop_assert_eq!(samples.len(), n);
        prop_assert!(samples.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
        prop_assert_eq!(ColorMap::wavelength_gradient(n).unwrap().len(), n);
    }
}

#[test]
fn empty_gradient_is_rejected() {
    assert!(ColorMap::wavelength_gradient(0).is_err());
}
