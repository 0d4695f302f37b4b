use gr_config::{BinningStrategy, ColorScaleConfig};

/// Drop the points a log scale cannot draw (zero and negative values),
/// counting what was dropped so the caller can surface it. The declared
/// policy for log scales: clip, never emit `-inf`/`NaN`.
pub fn clip_for_log_scale<T>(
    points: impl IntoIterator<Item = T>,
    value_of: impl Fn(&T) -> f64,
) -> (Vec<T>, usize) {
    let mut kept = Vec::new();
    let mut excluded = 0;
    for point in points {
        if value_of(&point) > 0.0 {
            kept.push(point);
        } else {
            excluded += 1;
        }
    }
    (kept, excluded)
}

// ----------------------------------------------------------------------------

/// Compute ascending bin edges for a color scale over the given values.
///
/// Returns `n + 1` edges for `n` bins (or the manual edges verbatim).
/// Empty/degenerate inputs produce an empty edge list, which callers render
/// as "no data".
pub fn compute_bin_edges(config: &ColorScaleConfig, values: &[f64]) -> Vec<f64> {
    match config.binning_strategy {
        BinningStrategy::Manual => config.custom_bin_edges.clone(),

        BinningStrategy::EqualInterval => {
            let (Some(min), Some(max)) = (min_of(values), max_of(values)) else {
                return Vec::new();
            };
            if min == max {
                return vec![min, max];
            }
            let n = config.num_bins.max(1);
            (0..=n)
                .map(|i| min + (max - min) * (i as f64) / (n as f64))
                .collect()
        }

        BinningStrategy::Quantiles => {
            if values.is_empty() {
                return Vec::new();
            }
            let mut sorted = values.to_vec();
            sorted.sort_unstable_by(f64::total_cmp);
            let n = config.num_bins.max(1);
            (0..=n)
                .map(|i| {
                    let pos = (sorted.len() - 1) * i / n;
                    sorted[pos]
                })
                .collect()
        }
    }
}

/// The bin index of a value given ascending edges; values at an edge belong
/// to the lower bin, values outside the range clamp to the end bins.
pub fn bin_for(value: f64, edges: &[f64]) -> Option<usize> {
    if edges.len() < 2 {
        return None;
    }
    let num_bins = edges.len() - 1;
    let bin = edges[1..].partition_point(|&edge| edge < value);
    Some(bin.min(num_bins - 1))
}

fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(f64::total_cmp)
}

fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(f64::total_cmp)
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_clip_drops_nonpositive_values() {
        let (kept, excluded) = clip_for_log_scale(vec![1.0, 0.0, -3.0, 2.0], |&v| v);
        assert_eq!(kept, vec![1.0, 2.0]);
        assert_eq!(excluded, 2);
    }

    #[test]
    fn equal_interval_edges() {
        let config = ColorScaleConfig {
            num_bins: 4,
            ..Default::default()
        };
        let edges = compute_bin_edges(&config, &[0.0, 10.0, 5.0]);
        assert_eq!(edges, vec![0.0, 2.5, 5.0, 7.5, 10.0]);

        assert_eq!(bin_for(1.0, &edges), Some(0));
        assert_eq!(bin_for(2.5, &edges), Some(0)); // on-edge goes low
        assert_eq!(bin_for(9.9, &edges), Some(3));
        assert_eq!(bin_for(99.0, &edges), Some(3)); // clamped
        assert_eq!(bin_for(-5.0, &edges), Some(0)); // clamped
    }

    #[test]
    fn manual_edges_pass_through() {
        let config = ColorScaleConfig {
            binning_strategy: BinningStrategy::Manual,
            custom_bin_edges: vec![0.0, 1.0, 10.0, 100.0],
            ..Default::default()
        };
        assert_eq!(compute_bin_edges(&config, &[5.0]), vec![0.0, 1.0, 10.0, 100.0]);
    }

    #[test]
    fn degenerate_inputs_produce_no_bins() {
        let config = ColorScaleConfig::default();
        assert_eq!(compute_bin_edges(&config, &[]), Vec::<f64>::new());
        assert_eq!(bin_for(1.0, &[]), None);
        assert_eq!(bin_for(1.0, &[5.0]), None);
    }
}
