//! Marginal and partial correlations of features against a target.
//!
//! Correlations are computed per group through the frame's partition
//! machinery, so whole-sample numbers always come from the synthetic
//! `"All data"` partition and never from a separate code path. For each
//! group the module computes:
//!
//! - the marginal Pearson correlation of every feature against the target,
//! - the partial correlation of every feature against the target controlling
//!   for all other selected features, and
//! - optionally, the bivariate partial correlation of every feature against
//!   the primary human score controlling for the length covariate alone.
//!
//! Output tables have one row per feature and one column per group; the
//! target's self-correlation row is never emitted.

use oxiscore_frame::{
    frame::{ALL_DATA_GROUP, ItemFrame},
    table::{Cell, Table},
};
use oxiscore_stats::correlation::{partial_correlations, pearson};

use crate::error::AnalysisError;

/// The variable the features are correlated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CorrelationTarget {
    /// The primary human score.
    #[display("sc1")]
    Sc1,
    /// The length covariate.
    #[display("length")]
    Length,
}

impl CorrelationTarget {
    fn column(self, frame: &ItemFrame) -> Result<Vec<f64>, AnalysisError> {
        match self {
            CorrelationTarget::Sc1 => Ok(frame.sc1_column()?),
            CorrelationTarget::Length => Ok(frame.length_column()?),
        }
    }
}

/// Marginal and partial correlation tables, one column per group.
#[derive(Debug, Clone)]
pub struct CorrelationByGroup {
    /// Marginal Pearson correlation of each feature against the target.
    pub marginal: Table,
    /// Partial correlation of each feature against the target, controlling
    /// for all other selected features.
    pub partial: Table,
    /// Bivariate partial correlation of each feature against the primary
    /// score, controlling for length alone. Present only when the length
    /// covariate was included.
    pub partial_no_length: Option<Table>,
}

/// Correlations per subgroup value, always including the synthetic
/// `"All data"` group.
pub fn correlation_by_group(
    frame: &ItemFrame,
    features: &[String],
    target: CorrelationTarget,
    subgroup: &str,
    include_length: bool,
) -> Result<CorrelationByGroup, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "correlations by group".to_string(),
        });
    }
    let partitions = frame.group_partitions(subgroup)?;
    correlation_tables(features, target, include_length, &partitions)
}

/// Whole-sample correlations only, as a single `"All data"` column.
pub fn correlation_all_data(
    frame: &ItemFrame,
    features: &[String],
    target: CorrelationTarget,
    include_length: bool,
) -> Result<CorrelationByGroup, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "correlations".to_string(),
        });
    }
    let partitions = vec![(ALL_DATA_GROUP.to_string(), frame.clone())];
    correlation_tables(features, target, include_length, &partitions)
}

/// Full pairwise Pearson correlation matrix over the selected features, the
/// primary human score, and (optionally) the length covariate.
pub fn pairwise_correlations(
    frame: &ItemFrame,
    features: &[String],
    include_length: bool,
) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "pairwise correlations".to_string(),
        });
    }

    let mut names: Vec<String> = features.to_vec();
    names.push("sc1".to_string());
    if include_length {
        names.push("length".to_string());
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(names.len());
    for feature in features {
        columns.push(frame.feature_column(feature)?);
    }
    columns.push(frame.sc1_column()?);
    if include_length {
        columns.push(frame.length_column()?);
    }

    let mut table = Table::new("", names.clone());
    for (i, name) in names.iter().enumerate() {
        let cells = (0..names.len())
            .map(|j| Cell::Num(pearson(&columns[i], &columns[j])))
            .collect();
        table.push_row(name.clone(), cells);
    }
    Ok(table)
}

fn correlation_tables(
    features: &[String],
    target: CorrelationTarget,
    include_length: bool,
    partitions: &[(String, ItemFrame)],
) -> Result<CorrelationByGroup, AnalysisError> {
    let group_names: Vec<String> = partitions.iter().map(|(name, _)| name.clone()).collect();
    let mut marginal_columns = Vec::with_capacity(partitions.len());
    let mut partial_columns = Vec::with_capacity(partitions.len());
    let mut no_length_columns = Vec::with_capacity(partitions.len());

    for (_, group_frame) in partitions {
        let vectors = correlation_vectors(group_frame, features, target, include_length)?;
        marginal_columns.push(vectors.marginal);
        partial_columns.push(vectors.partial);
        if let Some(no_length) = vectors.partial_no_length {
            no_length_columns.push(no_length);
        }
    }

    let build = |columns: &[Vec<f64>]| {
        let mut table = Table::new("feature", group_names.clone());
        for (row, feature) in features.iter().enumerate() {
            let cells = columns.iter().map(|column| Cell::Num(column[row])).collect();
            table.push_row(feature.clone(), cells);
        }
        table
    };

    Ok(CorrelationByGroup {
        marginal: build(&marginal_columns),
        partial: build(&partial_columns),
        partial_no_length: if no_length_columns.is_empty() {
            None
        } else {
            Some(build(&no_length_columns))
        },
    })
}

struct CorrelationVectors {
    marginal: Vec<f64>,
    partial: Vec<f64>,
    partial_no_length: Option<Vec<f64>>,
}

/// Correlations of every feature against the target within one frame.
///
/// The length column never participates in the marginal or all-feature
/// partial computation; it only appears in the dedicated bivariate partial
/// that controls for length alone.
fn correlation_vectors(
    frame: &ItemFrame,
    features: &[String],
    target: CorrelationTarget,
    include_length: bool,
) -> Result<CorrelationVectors, AnalysisError> {
    let target_values = target.column(frame)?;
    let feature_columns: Vec<Vec<f64>> = features
        .iter()
        .map(|feature| frame.feature_column(feature))
        .collect::<Result<_, _>>()?;

    let marginal = feature_columns
        .iter()
        .map(|column| pearson(column, &target_values))
        .collect();

    // Partial correlations against the target, controlling for all other
    // features: the target is appended as the final column of the matrix.
    let mut with_target = feature_columns.clone();
    with_target.push(target_values.clone());
    let partial_matrix = partial_correlations(&with_target);
    let target_index = with_target.len() - 1;
    let partial = (0..features.len())
        .map(|i| partial_matrix[i][target_index])
        .collect();

    let partial_no_length = if include_length && target == CorrelationTarget::Sc1 {
        let length_values = frame.length_column()?;
        let values = feature_columns
            .iter()
            .map(|column| {
                let triple = vec![
                    column.clone(),
                    target_values.clone(),
                    length_values.clone(),
                ];
                partial_correlations(&triple)[0][1]
            })
            .collect();
        Some(values)
    } else {
        None
    };

    Ok(CorrelationVectors {
        marginal,
        partial,
        partial_no_length,
    })
}

#[cfg(test)]
mod tests {
    use oxiscore_frame::frame::Item;

    use super::*;

    fn test_frame() -> ItemFrame {
        let f1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let f2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let sc1 = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let length = [10.0, 30.0, 20.0, 50.0, 40.0, 55.0];
        let groups = ["a", "a", "a", "b", "b", "b"];
        let items = (0..6)
            .map(|i| {
                let mut item = Item::new(format!("item_{i}"));
                item.sc1 = Some(sc1[i]);
                item.length = Some(length[i]);
                item.features.insert("f1".to_string(), f1[i]);
                item.features.insert("f2".to_string(), f2[i]);
                item.subgroups
                    .insert("l1".to_string(), groups[i].to_string());
                item
            })
            .collect();
        ItemFrame::new(items).unwrap()
    }

    #[test]
    fn all_data_column_matches_ungrouped_computation() {
        let frame = test_frame();
        let features = ["f1".to_string(), "f2".to_string()];

        let grouped =
            correlation_by_group(&frame, &features, CorrelationTarget::Sc1, "l1", false).unwrap();
        let ungrouped =
            correlation_all_data(&frame, &features, CorrelationTarget::Sc1, false).unwrap();

        for feature in &features {
            assert_eq!(
                grouped.marginal.get(feature, ALL_DATA_GROUP),
                ungrouped.marginal.get(feature, ALL_DATA_GROUP)
            );
            assert_eq!(
                grouped.partial.get(feature, ALL_DATA_GROUP),
                ungrouped.partial.get(feature, ALL_DATA_GROUP)
            );
        }
    }

    #[test]
    fn each_group_column_matches_the_subset_computation() {
        let frame = test_frame();
        let features = ["f1".to_string(), "f2".to_string()];
        let grouped =
            correlation_by_group(&frame, &features, CorrelationTarget::Sc1, "l1", false).unwrap();

        for group in ["a", "b"] {
            let subset = frame.filtered(|item| item.subgroups["l1"] == group);
            let direct =
                correlation_all_data(&subset, &features, CorrelationTarget::Sc1, false).unwrap();
            for feature in &features {
                assert_eq!(
                    grouped.marginal.get(feature, group),
                    direct.marginal.get(feature, ALL_DATA_GROUP),
                    "marginal mismatch for {feature} in group {group}"
                );
                assert_eq!(
                    grouped.partial.get(feature, group),
                    direct.partial.get(feature, ALL_DATA_GROUP),
                    "partial mismatch for {feature} in group {group}"
                );
            }
        }
    }

    #[test]
    fn rows_are_features_and_columns_are_groups() {
        let frame = test_frame();
        let features = ["f1".to_string(), "f2".to_string()];
        let result =
            correlation_by_group(&frame, &features, CorrelationTarget::Sc1, "l1", false).unwrap();

        assert_eq!(result.marginal.columns(), [ALL_DATA_GROUP, "a", "b"]);
        let labels: Vec<&str> = result
            .marginal
            .rows()
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, ["f1", "f2"]);
        assert!(result.partial_no_length.is_none());
    }

    #[test]
    fn marginal_matches_direct_pearson() {
        let frame = test_frame();
        let features = ["f1".to_string()];
        let result =
            correlation_all_data(&frame, &features, CorrelationTarget::Sc1, false).unwrap();
        let expected = pearson(
            &frame.feature_column("f1").unwrap(),
            &frame.sc1_column().unwrap(),
        );
        assert_eq!(
            result.marginal.get("f1", ALL_DATA_GROUP),
            Some(&Cell::Num(expected))
        );
    }

    #[test]
    fn include_length_adds_bivariate_partials() {
        let frame = test_frame();
        let features = ["f1".to_string(), "f2".to_string()];
        let result =
            correlation_all_data(&frame, &features, CorrelationTarget::Sc1, true).unwrap();
        let no_length = result.partial_no_length.expect("length partials expected");

        let expected = partial_correlations(&[
            frame.feature_column("f1").unwrap(),
            frame.sc1_column().unwrap(),
            frame.length_column().unwrap(),
        ])[0][1];
        assert_eq!(
            no_length.get("f1", ALL_DATA_GROUP),
            Some(&Cell::Num(expected))
        );
    }

    #[test]
    fn length_target_correlates_features_against_length() {
        let frame = test_frame();
        let features = ["f1".to_string()];
        let result =
            correlation_all_data(&frame, &features, CorrelationTarget::Length, false).unwrap();
        let expected = pearson(
            &frame.feature_column("f1").unwrap(),
            &frame.length_column().unwrap(),
        );
        assert_eq!(
            result.marginal.get("f1", ALL_DATA_GROUP),
            Some(&Cell::Num(expected))
        );
    }

    #[test]
    fn pairwise_matrix_has_unit_diagonal() {
        let frame = test_frame();
        let features = ["f1".to_string(), "f2".to_string()];
        let table = pairwise_correlations(&frame, &features, true).unwrap();
        assert_eq!(table.columns(), ["f1", "f2", "sc1", "length"]);
        assert_eq!(table.get("f1", "f1"), Some(&Cell::Num(1.0)));
        assert_eq!(table.get("sc1", "sc1"), Some(&Cell::Num(1.0)));
    }
}
