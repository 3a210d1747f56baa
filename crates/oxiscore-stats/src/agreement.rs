//! Inter-rater agreement statistics.
//!
//! Two raters (one may be a machine) score the same items; these routines
//! quantify how often they agree and how much of that agreement exceeds
//! chance. Kappa follows the convention of treating scores as integer
//! labels on the contiguous range spanning both raters' observed values, so
//! quadratic weights penalize a two-point disagreement four times as hard as
//! a one-point disagreement even when an intermediate label was never
//! observed.

use std::collections::BTreeSet;

/// Weighting scheme for chance-corrected agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KappaWeights {
    /// All disagreements weigh equally.
    Unweighted,
    /// Disagreement between labels `i` and `j` weighs `(i - j)^2`.
    Quadratic,
}

/// Percentage of pairs agreeing within the given tolerance.
///
/// Exact agreement uses tolerance 0; adjacent agreement uses tolerance 1.
/// NaN for empty input.
///
/// # Panics
///
/// Panics if the slices differ in length.
///
/// # Examples
///
/// ```
/// use oxiscore_stats::agreement::agreement_percent;
///
/// let human = [1.0, 2.0, 3.0, 4.0];
/// let system = [1.0, 2.0, 4.0, 2.0];
/// assert_eq!(agreement_percent(&human, &system, 0.0), 50.0);
/// assert_eq!(agreement_percent(&human, &system, 1.0), 75.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn agreement_percent(rater1: &[f64], rater2: &[f64], tolerance: f64) -> f64 {
    assert_eq!(
        rater1.len(),
        rater2.len(),
        "agreement inputs must be equal length"
    );
    if rater1.is_empty() {
        return f64::NAN;
    }
    let agreeing = rater1
        .iter()
        .zip(rater2)
        .filter(|(a, b)| (*a - *b).abs() <= tolerance)
        .count();
    agreeing as f64 / rater1.len() as f64 * 100.0
}

/// Chance-corrected agreement (Cohen's kappa, optionally quadratic-weighted).
///
/// Scores are rounded to the nearest integer label; the label set is the
/// contiguous range from the smallest to the largest observed label across
/// both raters. Returns `1 - sum(w * observed) / sum(w * expected)` where
/// `expected` is the outer product of the two raters' marginal
/// distributions. NaN for empty input or when both raters assign a single
/// identical label (chance disagreement is zero and the statistic is
/// undefined).
///
/// # Panics
///
/// Panics if the slices differ in length.
///
/// # Examples
///
/// ```
/// use oxiscore_stats::agreement::{KappaWeights, kappa};
///
/// let human = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(kappa(&human, &human, KappaWeights::Unweighted), 1.0);
/// assert_eq!(kappa(&human, &human, KappaWeights::Quadratic), 1.0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn kappa(rater1: &[f64], rater2: &[f64], weights: KappaWeights) -> f64 {
    assert_eq!(rater1.len(), rater2.len(), "kappa inputs must be equal length");
    if rater1.is_empty() {
        return f64::NAN;
    }

    let labels1: Vec<i64> = rater1.iter().map(|v| v.round() as i64).collect();
    let labels2: Vec<i64> = rater2.iter().map(|v| v.round() as i64).collect();

    let min_label = labels1.iter().chain(&labels2).min().copied().unwrap_or(0);
    let max_label = labels1.iter().chain(&labels2).max().copied().unwrap_or(0);
    let num_labels = (max_label - min_label + 1) as usize;
    let n = labels1.len() as f64;

    let mut observed = vec![vec![0.0; num_labels]; num_labels];
    for (a, b) in labels1.iter().zip(&labels2) {
        let i = (a - min_label) as usize;
        let j = (b - min_label) as usize;
        observed[i][j] += 1.0 / n;
    }

    let marginal1: Vec<f64> = (0..num_labels)
        .map(|i| observed[i].iter().sum())
        .collect();
    let marginal2: Vec<f64> = (0..num_labels)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();

    let weight = |i: usize, j: usize| -> f64 {
        match weights {
            KappaWeights::Unweighted => {
                if i == j {
                    0.0
                } else {
                    1.0
                }
            }
            KappaWeights::Quadratic => {
                let diff = i as f64 - j as f64;
                diff * diff
            }
        }
    };

    let mut weighted_observed = 0.0;
    let mut weighted_expected = 0.0;
    for i in 0..num_labels {
        for j in 0..num_labels {
            let w = weight(i, j);
            weighted_observed += w * observed[i][j];
            weighted_expected += w * marginal1[i] * marginal2[j];
        }
    }

    if weighted_expected == 0.0 {
        return f64::NAN;
    }
    1.0 - weighted_observed / weighted_expected
}

/// Confusion counts between two integer-labeled raters.
///
/// Scores are rounded to integer labels; the label set is the sorted union
/// of both raters' observed labels. Returns the labels and the count matrix
/// with `counts[i][j]` = number of items rater 1 labeled `labels[i]` and
/// rater 2 labeled `labels[j]`. Labels observed by only one rater appear
/// with zero-filled rows or columns.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[expect(clippy::cast_possible_truncation)]
#[must_use]
pub fn confusion_counts(rater1: &[f64], rater2: &[f64]) -> (Vec<i64>, Vec<Vec<u64>>) {
    assert_eq!(
        rater1.len(),
        rater2.len(),
        "confusion inputs must be equal length"
    );
    let labels1: Vec<i64> = rater1.iter().map(|v| v.round() as i64).collect();
    let labels2: Vec<i64> = rater2.iter().map(|v| v.round() as i64).collect();

    let labels: Vec<i64> = labels1
        .iter()
        .chain(&labels2)
        .copied()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();
    let index_of = |label: i64| labels.binary_search(&label).unwrap();

    let mut counts = vec![vec![0_u64; labels.len()]; labels.len()];
    for (a, b) in labels1.iter().zip(&labels2) {
        counts[index_of(*a)][index_of(*b)] += 1;
    }
    (labels, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_raters_have_full_agreement() {
        let scores = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(agreement_percent(&scores, &scores, 0.0), 100.0);
        assert_eq!(kappa(&scores, &scores, KappaWeights::Unweighted), 1.0);
        assert_eq!(kappa(&scores, &scores, KappaWeights::Quadratic), 1.0);
    }

    #[test]
    fn adjacent_agreement_uses_tolerance() {
        let human = [1.0, 2.0, 3.0, 4.0];
        let system = [2.0, 3.0, 4.0, 1.0];
        assert_eq!(agreement_percent(&human, &system, 0.0), 0.0);
        assert_eq!(agreement_percent(&human, &system, 1.0), 75.0);
    }

    #[test]
    fn unweighted_kappa_matches_hand_computation() {
        // 2x2 case: observed agreement 0.6, chance agreement 0.5.
        let rater1 = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let rater2 = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        let value = kappa(&rater1, &rater2, KappaWeights::Unweighted);
        assert!((value - 0.2).abs() < 1e-12);
    }

    #[test]
    fn quadratic_kappa_penalizes_distance() {
        let rater1 = [1.0, 2.0, 3.0, 4.0];
        let near = [2.0, 1.0, 4.0, 3.0];
        let far = [4.0, 3.0, 2.0, 1.0];
        let kappa_near = kappa(&rater1, &near, KappaWeights::Quadratic);
        let kappa_far = kappa(&rater1, &far, KappaWeights::Quadratic);
        assert!(kappa_near > kappa_far);
    }

    #[test]
    fn kappa_rounds_to_integer_labels() {
        let human = [1.0, 2.0, 3.0, 4.0];
        let system = [1.2, 1.8, 3.4, 3.6];
        assert_eq!(kappa(&human, &system, KappaWeights::Unweighted), 1.0);
    }

    #[test]
    fn single_shared_label_is_undefined() {
        let scores = [2.0, 2.0, 2.0];
        assert!(kappa(&scores, &scores, KappaWeights::Unweighted).is_nan());
    }

    #[test]
    fn confusion_counts_zero_fill_unseen_pairs() {
        let rater1 = [1.0, 2.0, 2.0];
        let rater2 = [1.0, 2.0, 4.0];
        let (labels, counts) = confusion_counts(&rater1, &rater2);
        assert_eq!(labels, vec![1, 2, 4]);
        assert_eq!(counts[0], vec![1, 0, 0]);
        assert_eq!(counts[1], vec![0, 1, 1]);
        // Label 4 was never assigned by rater 1: zero row.
        assert_eq!(counts[2], vec![0, 0, 0]);
    }
}
