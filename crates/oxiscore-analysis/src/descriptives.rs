//! Per-feature descriptive statistics.
//!
//! Three views over the same feature columns: moment-based summaries with
//! their correlation against the primary human score, a percentile/outlier
//! profile built on lower-interpolation percentiles, and a count of
//! observations outside the mean ± 4 SD band. Each returns one table row
//! per feature, in the caller's feature order.

use oxiscore_frame::{
    frame::ItemFrame,
    table::{Cell, Table},
};
use oxiscore_stats::{
    correlation::pearson_with_pvalue,
    descriptive::{kurtosis, maximum, mean, minimum, sample_std, skewness},
    percentiles::Percentiles,
};

use crate::error::AnalysisError;

/// Percentile points of the profile table, in presentation order.
const PROFILE_PERCENTILES: [f64; 7] = [1.0, 5.0, 25.0, 50.0, 75.0, 95.0, 99.0];

/// Basic descriptives for every feature: moments, range, shape, and the
/// Pearson correlation (with two-sided p-value) against the primary human
/// score.
///
/// Columns are exactly
/// `[mean, std. dev., min, max, skewness, kurtosis, Correlation, p, N]`.
/// A constant feature yields NaN correlation and p-value; that is a
/// reportable outcome, not an error.
pub fn basic_descriptives(
    frame: &ItemFrame,
    features: &[String],
) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "basic descriptives".to_string(),
        });
    }
    let scores = frame.sc1_column()?;

    let mut table = Table::new(
        "feature",
        [
            "mean",
            "std. dev.",
            "min",
            "max",
            "skewness",
            "kurtosis",
            "Correlation",
            "p",
            "N",
        ],
    );
    for feature in features {
        let values = frame.feature_column(feature)?;
        let (correlation, p_value) = pearson_with_pvalue(&values, &scores);
        table.push_row(
            feature.clone(),
            vec![
                Cell::Num(mean(&values)),
                Cell::Num(sample_std(&values)),
                Cell::Num(minimum(&values)),
                Cell::Num(maximum(&values)),
                Cell::Num(skewness(&values)),
                Cell::Num(kurtosis(&values)),
                Cell::Num(correlation),
                Cell::Num(p_value),
                Cell::from(values.len()),
            ],
        );
    }
    Ok(table)
}

/// Percentile and outlier profile for every feature.
///
/// Percentiles use lower interpolation. IQR is P75 − P25; an observation is
/// an *extreme* outlier at or beyond 3·IQR from the nearer quartile and a
/// *mild* outlier between the 1.5·IQR and 3·IQR fences.
pub fn percentile_profile(
    frame: &ItemFrame,
    features: &[String],
) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "percentile profile".to_string(),
        });
    }

    let mut columns: Vec<String> = PROFILE_PERCENTILES.iter().map(|p| format!("{p}%")).collect();
    columns.extend(
        ["IQR", "Mild outliers", "Extreme outliers"]
            .into_iter()
            .map(str::to_string),
    );
    let mut table = Table::new("feature", columns);

    for feature in features {
        let values = frame.feature_column(feature)?;
        let percentiles = Percentiles::new(&values, &PROFILE_PERCENTILES);
        let p25 = percentiles.get(25.0).unwrap_or(f64::NAN);
        let p75 = percentiles.get(75.0).unwrap_or(f64::NAN);
        let iqr = p75 - p25;

        let mild_lower = p25 - 1.5 * iqr;
        let mild_upper = p75 + 1.5 * iqr;
        let extreme_lower = p25 - 3.0 * iqr;
        let extreme_upper = p75 + 3.0 * iqr;

        let extreme = values
            .iter()
            .filter(|v| **v <= extreme_lower || **v >= extreme_upper)
            .count();
        let mild = values
            .iter()
            .filter(|v| {
                (**v > extreme_lower && **v <= mild_lower)
                    || (**v >= mild_upper && **v < extreme_upper)
            })
            .count();

        let mut cells: Vec<Cell> = percentiles.iter().map(|(_, value)| Cell::Num(value)).collect();
        cells.push(Cell::Num(iqr));
        cells.push(Cell::from(mild));
        cells.push(Cell::from(extreme));
        table.push_row(feature.clone(), cells);
    }
    Ok(table)
}

/// Counts of observations outside mean ± 4 sample standard deviations.
///
/// `lower`/`upper`/`both` are raw counts; the `*perc` columns are
/// percentages of N rounded to two decimals.
pub fn sd_outliers(frame: &ItemFrame, features: &[String]) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "standard-deviation outliers".to_string(),
        });
    }

    let mut table = Table::new(
        "feature",
        ["lower", "upper", "both", "lowerperc", "upperperc", "bothperc"],
    );
    for feature in features {
        let values = frame.feature_column(feature)?;
        let m = mean(&values);
        let sd = sample_std(&values);
        let lower = values.iter().filter(|v| **v < m - 4.0 * sd).count();
        let upper = values.iter().filter(|v| **v > m + 4.0 * sd).count();
        let both = lower + upper;
        table.push_row(
            feature.clone(),
            vec![
                Cell::from(lower),
                Cell::from(upper),
                Cell::from(both),
                Cell::Num(as_rounded_percent(lower, values.len())),
                Cell::Num(as_rounded_percent(upper, values.len())),
                Cell::Num(as_rounded_percent(both, values.len())),
            ],
        );
    }
    Ok(table)
}

/// Percentage of `count / total`, rounded to two decimals.
#[expect(clippy::cast_precision_loss)]
fn as_rounded_percent(count: usize, total: usize) -> f64 {
    (count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use oxiscore_frame::frame::Item;

    use super::*;

    fn frame_with_feature(values: &[f64]) -> ItemFrame {
        let items = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mut item = Item::new(format!("item_{i}"));
                item.sc1 = Some(i as f64);
                item.features.insert("f".to_string(), *value);
                item
            })
            .collect();
        ItemFrame::new(items).unwrap()
    }

    #[test]
    fn descriptives_column_order() {
        let frame = frame_with_feature(&[1.0, 2.0, 3.0, 4.0]);
        let table = basic_descriptives(&frame, &["f".to_string()]).unwrap();
        assert_eq!(
            table.columns(),
            [
                "mean",
                "std. dev.",
                "min",
                "max",
                "skewness",
                "kurtosis",
                "Correlation",
                "p",
                "N"
            ]
        );
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.get("f", "mean"), Some(&Cell::Num(2.5)));
        assert_eq!(table.get("f", "N"), Some(&Cell::Int(4)));
        // sc1 runs 0..3 in lockstep with the feature: perfect correlation.
        assert_eq!(table.get("f", "Correlation"), Some(&Cell::Num(1.0)));
    }

    #[test]
    fn constant_feature_propagates_nan() {
        let frame = frame_with_feature(&[5.0, 5.0, 5.0, 5.0]);
        let table = basic_descriptives(&frame, &["f".to_string()]).unwrap();
        let Some(Cell::Num(corr)) = table.get("f", "Correlation") else {
            panic!("missing correlation cell");
        };
        assert!(corr.is_nan());
    }

    #[test]
    fn percentile_profile_detects_extreme_outlier() {
        let frame =
            frame_with_feature(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0]);
        let table = percentile_profile(&frame, &["f".to_string()]).unwrap();
        assert_eq!(table.get("f", "25%"), Some(&Cell::Num(3.0)));
        assert_eq!(table.get("f", "75%"), Some(&Cell::Num(8.0)));
        assert_eq!(table.get("f", "IQR"), Some(&Cell::Num(5.0)));
        // Mild fences are [-4.5, 15.5], extreme fences [-12, 23]; the value
        // 100 is the single extreme outlier and nothing is mild.
        assert_eq!(table.get("f", "Mild outliers"), Some(&Cell::Int(0)));
        assert_eq!(table.get("f", "Extreme outliers"), Some(&Cell::Int(1)));
    }

    #[test]
    fn sd_outlier_percentages_round_to_two_decimals() {
        let mut values = vec![0.0; 29];
        values.push(1000.0);
        let frame = frame_with_feature(&values);
        let table = sd_outliers(&frame, &["f".to_string()]).unwrap();
        assert_eq!(table.get("f", "upper"), Some(&Cell::Int(1)));
        assert_eq!(table.get("f", "lower"), Some(&Cell::Int(0)));
        // 1/30 = 3.3333...% rounds to 3.33.
        assert_eq!(table.get("f", "upperperc"), Some(&Cell::Num(3.33)));
        assert_eq!(table.get("f", "bothperc"), Some(&Cell::Num(3.33)));
    }

    #[test]
    fn empty_frame_fails_fast() {
        let frame = ItemFrame::empty();
        assert!(matches!(
            basic_descriptives(&frame, &["f".to_string()]),
            Err(AnalysisError::EmptyFrame { .. })
        ));
    }
}
