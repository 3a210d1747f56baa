//! Moment-based descriptive statistics.
//!
//! These are the scalar summaries the feature-descriptives tables are built
//! from. All functions take unsorted `f64` slices and return NaN for inputs
//! too small (or too degenerate) for the statistic to be defined, so callers
//! can propagate degenerate cases into result tables without special-casing.

/// Arithmetic mean. NaN for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with one delta degree of freedom. NaN for fewer than two
/// values.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample standard deviation with one delta degree of freedom.
///
/// # Examples
///
/// ```
/// use oxiscore_stats::descriptive::sample_std;
///
/// let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((sample_std(&values) - 2.138089935299395).abs() < 1e-12);
/// ```
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Adjusted Fisher–Pearson skewness coefficient (the sample-corrected `G1`
/// definition). NaN for fewer than three values or a constant input.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return f64::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
}

/// Kurtosis in the population (Pearson) definition: the fourth standardized
/// moment, *not* excess kurtosis. A normal distribution scores 3.0. NaN for
/// an empty or constant input.
///
/// # Examples
///
/// ```
/// use oxiscore_stats::descriptive::kurtosis;
///
/// // A symmetric two-point distribution has kurtosis exactly 1.
/// assert_eq!(kurtosis(&[-1.0, 1.0, -1.0, 1.0]), 1.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kurtosis(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let nf = values.len() as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return f64::NAN;
    }
    m4 / (m2 * m2)
}

/// Minimum that propagates NaN: any NaN input (or an empty slice) yields NaN.
#[must_use]
pub fn minimum(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Maximum that propagates NaN: any NaN input (or an empty slice) yields NaN.
#[must_use]
pub fn maximum(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&values), 3.0);
        assert!((sample_std(&values) - (2.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
        assert!(skewness(&[1.0, 2.0]).is_nan());
        assert!(skewness(&[5.0, 5.0, 5.0]).is_nan());
        assert!(kurtosis(&[5.0, 5.0, 5.0]).is_nan());
    }

    #[test]
    fn skewness_of_symmetric_data_is_zero() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(skewness(&values).abs() < 1e-12);
    }

    #[test]
    fn skewness_matches_reference() {
        // pandas Series.skew() of this data.
        let values = [1.0, 2.0, 2.0, 3.0, 10.0];
        assert!((skewness(&values) - 2.0286991020803327).abs() < 1e-12);
    }

    #[test]
    fn kurtosis_matches_reference() {
        // scipy.stats.kurtosis(values, fisher=False)
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert!((kurtosis(&values) - 3.2467164893001637).abs() < 1e-12);
    }

    #[test]
    fn minimum_maximum_propagate_nan() {
        assert_eq!(minimum(&[3.0, 1.0, 2.0]), 1.0);
        assert_eq!(maximum(&[3.0, 1.0, 2.0]), 3.0);
        assert!(minimum(&[1.0, f64::NAN]).is_nan());
        assert!(maximum(&[]).is_nan());
    }
}
