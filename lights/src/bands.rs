use std::ops::Range;

use common::config::{AggregationMethod, FrequencyRange, ThreeBandConfig};

use crate::layout::bin_for_freq;

pub fn aggregate(values: &[f32], method: AggregationMethod) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    match method {
        AggregationMethod::Sum => values.iter().sum(),
        AggregationMethod::Max => values.iter().copied().fold(0.0, f32::max),
        AggregationMethod::Average => values.iter().sum::<f32>() / values.len() as f32,
    }
}

/// Reduces `values` to exactly `groups` buckets of `group_size` adjacent values.
/// Values past `groups * group_size` are dropped; buckets past the end of `values` are 0.
pub fn group_bins(
    values: &[f32],
    group_size: usize,
    groups: usize,
    method: AggregationMethod,
) -> Vec<f32> {
    let group_size = group_size.max(1);
    (0..groups)
        .map(|group| {
            let start = (group * group_size).min(values.len());
            let end = (start + group_size).min(values.len());
            aggregate(&values[start..end], method)
        })
        .collect()
}

/// Reduces all of `values` to exactly `groups` buckets. Bucket `g` covers
/// `[g * len / groups, (g + 1) * len / groups)`, widened to at least one value, so a short
/// band repeats its values over several buckets instead of leaving them dark.
pub fn spread_bins(values: &[f32], groups: usize, method: AggregationMethod) -> Vec<f32> {
    let len = values.len();
    if len == 0 {
        return vec![0.0; groups];
    }
    (0..groups)
        .map(|group| aggregate(&values[spread_range(len, groups, group)], method))
        .collect()
}

fn spread_range(len: usize, groups: usize, group: usize) -> Range<usize> {
    let start = (group * len / groups).min(len - 1);
    let end = ((group + 1) * len / groups).clamp(start + 1, len);
    start..end
}

/// One of the three named bands: which bins it reads and which pixels it drives.
#[derive(Clone, Debug, PartialEq)]
pub struct BandPlan {
    pub name: &'static str,
    pub bins: Range<usize>,
    pub pixels: Range<usize>,
}

impl BandPlan {
    fn new(
        name: &'static str,
        range: FrequencyRange,
        hz_per_bin: f64,
        spectrum_len: usize,
        pixels: Range<usize>,
    ) -> Self {
        let end = bin_for_freq(range.high_hz, hz_per_bin).min(spectrum_len);
        let start = bin_for_freq(range.low_hz, hz_per_bin).min(end);
        Self {
            name,
            bins: start..end,
            pixels,
        }
    }

    /// Absolute bins shown on the `index`-th pixel of this band.
    pub fn bins_for_pixel(&self, index: usize) -> Range<usize> {
        if self.bins.is_empty() {
            return self.bins.clone();
        }
        let local = spread_range(self.bins.len(), self.pixels.len(), index);
        self.bins.start + local.start..self.bins.start + local.end
    }
}

/// Bass, mid and treble on consecutive thirds of the strand; treble takes the remainder.
pub fn three_band_plans(
    bands: &ThreeBandConfig,
    hz_per_bin: f64,
    spectrum_len: usize,
    num_pixels: usize,
) -> [BandPlan; 3] {
    let third = num_pixels / 3;
    [
        BandPlan::new("bass", bands.bass, hz_per_bin, spectrum_len, 0..third),
        BandPlan::new("mid", bands.mid, hz_per_bin, spectrum_len, third..2 * third),
        BandPlan::new(
            "treble",
            bands.treble,
            hz_per_bin,
            spectrum_len,
            2 * third..num_pixels,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::hz_per_bin;

    #[test]
    fn groups_by_mean() {
        let values = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 100.0];
        let grouped = group_bins(&values, 2, 3, AggregationMethod::Average);
        assert_eq!(grouped, vec![2.0, 6.0, 10.0]);
    }

    #[test]
    fn other_aggregations() {
        let values = [1.0, 3.0, 5.0, 7.0];
        assert_eq!(group_bins(&values, 2, 2, AggregationMethod::Max), vec![3.0, 7.0]);
        assert_eq!(group_bins(&values, 2, 2, AggregationMethod::Sum), vec![4.0, 12.0]);
    }

    #[test]
    fn missing_groups_are_zero_filled() {
        let grouped = group_bins(&[4.0, 4.0, 4.0], 2, 4, AggregationMethod::Average);
        assert_eq!(grouped, vec![4.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn three_band_split() {
        let bands = ThreeBandConfig {
            bass: FrequencyRange::new(0.0, 299.0),
            mid: FrequencyRange::new(350.0, 3000.0),
            treble: FrequencyRange::new(4000.0, 22050.0),
        };
        let plans = three_band_plans(&bands, hz_per_bin(44100, 1024), 512, 100);

        assert_eq!(plans[0].pixels, 0..33);
        assert_eq!(plans[1].pixels, 33..66);
        assert_eq!(plans[2].pixels, 66..100);

        assert_eq!(plans[0].bins, 0..6);
        assert_eq!(plans[1].bins, 8..69);
        assert_eq!(plans[2].bins, 92..512);

        // every band is shown end to end on its own pixels
        for plan in &plans {
            let last = plan.pixels.len() - 1;
            assert_eq!(plan.bins_for_pixel(0).start, plan.bins.start);
            assert_eq!(plan.bins_for_pixel(last).end, plan.bins.end);
        }
        // 6 bass bins over 33 pixels: each bin on five or six pixels
        assert_eq!(plans[0].bins_for_pixel(5), 0..1);
        assert_eq!(plans[0].bins_for_pixel(6), 1..2);
        // 61 mid bins over 33 pixels: one or two bins each
        assert_eq!(plans[1].bins_for_pixel(32), 67..69);
    }

    #[test]
    fn spread_covers_every_value() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(
            spread_bins(&values, 3, AggregationMethod::Max),
            vec![2.0, 4.0, 7.0]
        );
        // fewer values than buckets: values repeat, nothing stays dark
        assert_eq!(
            spread_bins(&[1.0, 9.0], 5, AggregationMethod::Average),
            vec![1.0, 1.0, 1.0, 9.0, 9.0]
        );
        assert_eq!(spread_bins(&[], 2, AggregationMethod::Sum), vec![0.0, 0.0]);
    }
}
