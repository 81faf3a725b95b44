//! Weighted descriptive statistics over `(value, weight)` pairs.
//!
//! Every function here masks out pairs whose value is absent or non-finite, or whose
//! weight is non-finite, before computing anything. When no pair survives the result is
//! `None` rather than a numeric placeholder.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Iterates over the `(value, weight)` pairs where both sides are present and finite.
fn finite_pairs<'a>(
    values: &'a [Option<f64>],
    weights: &'a [f64],
) -> impl Iterator<Item = (f64, f64)> + 'a {
    values
        .iter()
        .zip(weights)
        .filter_map(|(value, weight)| match value {
            Some(v) if v.is_finite() && weight.is_finite() => Some((*v, *weight)),
            _ => None,
        })
}

/// Weighted arithmetic mean `Σ(w·v) / Σw` over the finite pairs.
///
/// Returns `None` when no pair survives masking or when the surviving weights sum to zero.
///
/// # Examples
///
/// ```
/// use seasonal_outlook::weighted_mean;
///
/// let mean = weighted_mean(&[Some(10.0), None, Some(20.0)], &[1.0, 1.0, 3.0]);
/// assert_eq!(mean, Some(17.5));
/// assert_eq!(weighted_mean(&[None, Some(f64::NAN)], &[1.0, 1.0]), None);
/// ```
pub fn weighted_mean(values: &[Option<f64>], weights: &[f64]) -> Option<f64> {
    let (weighted_sum, weight_sum) = finite_pairs(values, weights)
        .fold((0.0, 0.0), |(sum, total), (v, w)| (sum + w * v, total + w));
    if weight_sum == 0.0 {
        return None;
    }
    Some(weighted_sum / weight_sum).filter(|mean| mean.is_finite())
}

/// Weighted nearest-rank quantiles.
///
/// The finite pairs are sorted by value, their cumulative weight fraction is computed, and
/// for every probability `p` the value at the first position whose cumulative fraction is
/// at least `p` is returned. No interpolation takes place, so every output is one of the
/// observed values. When round-off leaves `p` above every cumulative fraction the largest
/// value is used.
///
/// The output has one entry per element of `probs`, in the same order. All entries are
/// `None` when nothing survives masking or the weights sum to zero.
pub fn weighted_quantiles(
    values: &[Option<f64>],
    weights: &[f64],
    probs: &[f64],
) -> Vec<Option<f64>> {
    let mut pairs: Vec<(f64, f64)> = finite_pairs(values, weights).collect();
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if pairs.is_empty() || total == 0.0 {
        return vec![None; probs.len()];
    }

    pairs.sort_by_key(|(v, _)| OrderedFloat(*v));
    let cumulative: Vec<f64> = pairs
        .iter()
        .scan(0.0, |running, (_, w)| {
            *running += w;
            Some(*running / total)
        })
        .collect();

    let last = pairs.len() - 1;
    probs
        .iter()
        .map(|&p| {
            let idx = cumulative.partition_point(|&fraction| fraction < p);
            Some(pairs[idx.min(last)].0)
        })
        .collect()
}

/// Label carrying the largest summed weight.
///
/// Samples with an absent label or a non-finite weight are ignored. Ties resolve to the
/// lexicographically smallest label, so the same input always yields the same answer.
/// Returns `None` for empty input or when the total weight is zero.
///
/// # Examples
///
/// ```
/// use seasonal_outlook::weighted_mode;
///
/// let labels = [Some("Sunny"), Some("Cloudy"), Some("Sunny"), None];
/// assert_eq!(weighted_mode(&labels, &[0.4, 0.5, 0.3, 1.0]), Some("Sunny".to_string()));
/// ```
pub fn weighted_mode<S: AsRef<str>>(labels: &[Option<S>], weights: &[f64]) -> Option<String> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (label, weight) in labels.iter().zip(weights) {
        if let Some(label) = label {
            if weight.is_finite() {
                *totals.entry(label.as_ref()).or_insert(0.0) += weight;
            }
        }
    }

    let total_weight: f64 = totals.values().sum();
    if totals.is_empty() || total_weight == 0.0 {
        return None;
    }

    // BTreeMap iterates in label order; only a strictly larger weight replaces the leader.
    let mut best: Option<(&str, f64)> = None;
    for (label, weight) in totals {
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((label, weight)),
        }
    }
    best.map(|(label, _)| label.to_string())
}

/// Maps an observation to a 0/1 indicator. Absent or non-finite values count as "the
/// event did not happen".
///
/// The weighted mean of indicators is the weighted probability of the event across all
/// records, so the probabilities of a partition only sum to 1 when every record observed
/// the quantity.
pub fn indicator(value: Option<f64>, event: impl Fn(f64) -> bool) -> f64 {
    match value {
        Some(v) if v.is_finite() && event(v) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn mean_of_single_value_ignores_weight() {
        for weight in [1.0, 0.2, 1e-6] {
            assert!(close(weighted_mean(&[Some(7.3)], &[weight]), 7.3));
        }
    }

    #[test]
    fn mean_masks_non_finite_pairs() {
        let values = [Some(1.0), Some(f64::NAN), None, Some(3.0), Some(100.0)];
        let weights = [1.0, 5.0, 5.0, 1.0, f64::INFINITY];
        assert!(close(weighted_mean(&values, &weights), 2.0));
    }

    #[test]
    fn mean_with_zero_total_weight_is_absent() {
        assert_eq!(weighted_mean(&[Some(1.0), Some(2.0)], &[0.0, 0.0]), None);
        assert_eq!(weighted_mean(&[], &[]), None);
    }

    #[test]
    fn quantile_of_constant_data_is_that_value() {
        let values = [Some(4.2); 5];
        let weights = [0.1, 0.9, 0.3, 0.0001, 1.0];
        assert_eq!(weighted_quantiles(&values, &weights, &[0.5]), vec![Some(4.2)]);
    }

    #[test]
    fn quantiles_use_nearest_rank_on_cumulative_weight() {
        let values = [Some(30.0), Some(10.0), Some(20.0)];
        let weights = [1.0, 1.0, 1.0];
        let q = weighted_quantiles(&values, &weights, &[0.05, 0.25, 0.5, 0.75, 0.95]);
        assert_eq!(
            q,
            vec![Some(10.0), Some(10.0), Some(20.0), Some(30.0), Some(30.0)]
        );
    }

    #[test]
    fn quantiles_follow_weight_mass() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        let weights = [0.1, 0.1, 0.8];
        assert_eq!(weighted_quantiles(&values, &weights, &[0.25]), vec![Some(3.0)]);
        assert_eq!(weighted_quantiles(&values, &weights, &[0.1]), vec![Some(1.0)]);
    }

    #[test]
    fn quantiles_are_monotonic_and_order_preserving() {
        let values: Vec<Option<f64>> = (0..50).map(|i| Some(((i * 37) % 50) as f64)).collect();
        let weights: Vec<f64> = (0..50).map(|i| 1.0 / (1.0 + i as f64)).collect();
        let q = weighted_quantiles(&values, &weights, &[0.95, 0.05, 0.75, 0.25]);
        let [hi, lo, upper, lower] = [q[0], q[1], q[2], q[3]].map(Option::unwrap);
        assert!(lo <= lower && lower <= upper && upper <= hi);
    }

    #[test]
    fn quantile_of_one_never_overruns() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        let weights = [0.1, 0.2, 0.3];
        assert_eq!(weighted_quantiles(&values, &weights, &[1.0]), vec![Some(3.0)]);
    }

    #[test]
    fn quantiles_without_data_are_absent() {
        assert_eq!(
            weighted_quantiles(&[None, Some(f64::NAN)], &[1.0, 1.0], &[0.25, 0.75]),
            vec![None, None]
        );
    }

    #[test]
    fn mode_picks_heaviest_label() {
        let labels = [Some("Rain"), Some("Sunny"), Some("Sunny"), Some("Rain")];
        let weights = [0.9, 0.3, 0.3, 0.2];
        assert_eq!(weighted_mode(&labels, &weights), Some("Rain".to_string()));
    }

    #[test]
    fn mode_ties_resolve_lexicographically() {
        let labels = [Some("Sunny"), Some("Overcast"), Some("Mist")];
        let weights = [0.5, 0.5, 0.5];
        assert_eq!(weighted_mode(&labels, &weights), Some("Mist".to_string()));

        let reversed = [Some("Mist"), Some("Overcast"), Some("Sunny")];
        assert_eq!(weighted_mode(&reversed, &weights), Some("Mist".to_string()));
    }

    #[test]
    fn mode_of_nothing_is_absent() {
        let empty: [Option<&str>; 0] = [];
        assert_eq!(weighted_mode(&empty, &[]), None);
        assert_eq!(weighted_mode(&[Some("Sunny")], &[0.0]), None);
        assert_eq!(weighted_mode(&[None::<&str>], &[1.0]), None);
    }

    #[test]
    fn indicator_counts_missing_values_as_no_event() {
        assert_eq!(indicator(Some(0.4), |mm| mm > 0.0), 1.0);
        assert_eq!(indicator(Some(0.0), |mm| mm > 0.0), 0.0);
        assert_eq!(indicator(None, |mm| mm > 0.0), 0.0);
        assert_eq!(indicator(Some(f64::NAN), |mm| mm > 0.0), 0.0);
        // A predicate that would accept NaN still sees no event.
        assert_eq!(indicator(Some(f64::NAN), |_| true), 0.0);
    }
}
