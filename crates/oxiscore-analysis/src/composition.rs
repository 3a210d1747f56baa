//! Data composition and exclusion analysis.
//!
//! These tables document *which* items the main analyses ran on: why
//! excluded items were excluded (missing or zero human score vs missing
//! feature values), and how items and respondents distribute over the
//! training and evaluation partitions, overall and per subgroup.
//!
//! The exclusion crosstabs distinguish cells that are zero *by construction*
//! from cells that merely observed zero items: an item with a legitimate
//! score and fully numeric features is never excluded, so that cell renders
//! the placeholder marker. A count ever showing up there means the caller's
//! exclusion filter and this analysis disagree, which is reported as a
//! contract violation rather than silently tabulated.

use std::collections::BTreeSet;

use oxiscore_frame::{
    frame::{Item, ItemFrame},
    score::ScoreType,
    table::{Cell, Table},
};

use crate::error::AnalysisError;

/// Row labels of the exclusion crosstab, in presentation order.
const SCORE_CATEGORIES: [&str; 3] = [
    "numeric non-zero human score",
    "zero human score",
    "non-numeric human score",
];

/// Crosstab of excluded items: score category × feature category.
///
/// `header` names the leading column (e.g. `Score/Features`). The
/// (numeric-non-zero × all-numeric) cell is structurally impossible and
/// renders the marker; so is the (zero × all-numeric) cell when zero scores
/// are *not* excluded, because a zero-score item with numeric features is
/// only ever excluded under the exclude-zero policy.
pub fn excluded_crosstab(
    frame: &ItemFrame,
    features: &[String],
    header: &str,
    exclude_zero_scores: bool,
) -> Result<Table, AnalysisError> {
    let feature_category = |item: &Item| -> usize {
        let missing = features.iter().any(|feature| {
            item.features
                .get(feature)
                .is_none_or(|value| value.is_nan())
        });
        usize::from(missing)
    };
    crosstab(
        frame,
        header,
        ["all features numeric", "non-numeric feature values"],
        exclude_zero_scores,
        feature_category,
    )
}

/// The exclusion crosstab for prediction-only runs, classifying the raw
/// system score instead of feature columns.
pub fn excluded_crosstab_for_predictions(
    frame: &ItemFrame,
    exclude_zero_scores: bool,
) -> Result<Table, AnalysisError> {
    let score_category = |item: &Item| -> usize {
        let missing = item
            .scores
            .get(&ScoreType::Raw)
            .is_none_or(|value| value.is_nan());
        usize::from(missing)
    };
    crosstab(
        frame,
        "Human/System",
        ["numeric system score", "non-numeric system score"],
        exclude_zero_scores,
        score_category,
    )
}

fn crosstab<F>(
    frame: &ItemFrame,
    header: &str,
    column_labels: [&str; 2],
    exclude_zero_scores: bool,
    column_category: F,
) -> Result<Table, AnalysisError>
where
    F: Fn(&Item) -> usize,
{
    let mut counts = [[0_usize; 2]; 3];
    for item in frame.items() {
        let score_category = match item.sc1 {
            None => 2,
            Some(value) if value.is_nan() => 2,
            Some(value) if value == 0.0 => 1,
            Some(_) => 0,
        };
        counts[score_category][column_category(item)] += 1;
    }

    // A non-zero-scored item with nothing missing cannot have been
    // excluded; when zeros are kept in the analysis the same holds for
    // zero-scored items.
    let mut structural = vec![(0, 0)];
    if !exclude_zero_scores {
        structural.push((1, 0));
    }
    for (row, column) in &structural {
        if counts[*row][*column] > 0 {
            return Err(AnalysisError::StructuralCellViolation {
                row: SCORE_CATEGORIES[*row].to_string(),
                column: column_labels[*column].to_string(),
                count: counts[*row][*column],
            });
        }
    }

    let mut table = Table::new(header, column_labels);
    for (row, label) in SCORE_CATEGORIES.iter().enumerate() {
        let cells = (0..2)
            .map(|column| {
                if structural.contains(&(row, column)) {
                    Cell::Marker
                } else {
                    Cell::from(counts[row][column])
                }
            })
            .collect();
        table.push_row(*label, cells);
    }
    Ok(table)
}

/// Counts of items (and optionally distinct respondents) in the training
/// and evaluation partitions, their overlap, and their union, plus distinct
/// subgroup-value counts per partition.
pub fn composition_summary(
    train: &ItemFrame,
    test: &ItemFrame,
    subgroups: &[String],
    has_candidate: bool,
) -> Result<Table, AnalysisError> {
    let train_ids: BTreeSet<&str> = train.ids().collect();
    let test_ids: BTreeSet<&str> = test.ids().collect();

    let mut columns = vec!["responses".to_string()];
    if has_candidate {
        columns.push("candidates".to_string());
    }
    columns.extend(subgroups.iter().cloned());

    // Each row's cells: count for train, test, intersection, union.
    let mut cell_sets: Vec<[usize; 4]> = Vec::new();
    cell_sets.push(set_counts(&train_ids, &test_ids));
    if has_candidate {
        let train_candidates = train.distinct_candidates();
        let test_candidates = test.distinct_candidates();
        cell_sets.push(set_counts(
            &train_candidates.iter().map(String::as_str).collect(),
            &test_candidates.iter().map(String::as_str).collect(),
        ));
    }
    for subgroup in subgroups {
        let train_values = train.distinct_subgroup_values(subgroup)?;
        let test_values = test.distinct_subgroup_values(subgroup)?;
        cell_sets.push(set_counts(
            &train_values.iter().map(String::as_str).collect(),
            &test_values.iter().map(String::as_str).collect(),
        ));
    }

    let mut table = Table::new("partition", columns);
    for (row, partition) in ["Training", "Evaluation", "Overlapping", "Total"]
        .into_iter()
        .enumerate()
    {
        let cells = cell_sets.iter().map(|counts| Cell::from(counts[row])).collect();
        table.push_row(partition, cells);
    }
    Ok(table)
}

/// The evaluation-only composition summary: a single `Evaluation` row.
pub fn prediction_composition_summary(
    test: &ItemFrame,
    subgroups: &[String],
    has_candidate: bool,
) -> Result<Table, AnalysisError> {
    let mut columns = vec!["responses".to_string()];
    if has_candidate {
        columns.push("candidates".to_string());
    }
    columns.extend(subgroups.iter().cloned());

    let mut cells = vec![Cell::from(test.len())];
    if has_candidate {
        cells.push(Cell::from(test.distinct_candidates().len()));
    }
    for subgroup in subgroups {
        cells.push(Cell::from(test.distinct_subgroup_values(subgroup)?.len()));
    }

    let mut table = Table::new("partition", columns);
    table.push_row("Evaluation", cells);
    Ok(table)
}

/// Training-vs-evaluation item counts per subgroup value.
pub fn composition_by_group(
    train: &ItemFrame,
    test: &ItemFrame,
    subgroup: &str,
) -> Result<Table, AnalysisError> {
    let train_labels = train.subgroup_column(subgroup)?;
    let test_labels = test.subgroup_column(subgroup)?;

    let all_labels: BTreeSet<&String> = train_labels.iter().chain(&test_labels).collect();
    let count = |labels: &[String], label: &str| labels.iter().filter(|l| *l == label).count();

    let mut table = Table::new(subgroup, ["Training set", "Evaluation set"]);
    for label in all_labels {
        table.push_row(
            label.clone(),
            vec![
                Cell::from(count(&train_labels, label)),
                Cell::from(count(&test_labels, label)),
            ],
        );
    }
    Ok(table)
}

/// Response counts per subgroup value for the evaluation partition only.
pub fn prediction_composition_by_group(
    test: &ItemFrame,
    subgroup: &str,
) -> Result<Table, AnalysisError> {
    let labels = test.subgroup_column(subgroup)?;
    let distinct: BTreeSet<&String> = labels.iter().collect();

    let mut table = Table::new(subgroup, ["N responses"]);
    for label in distinct {
        let count = labels.iter().filter(|l| *l == label).count();
        table.push_row(label.clone(), vec![Cell::from(count)]);
    }
    Ok(table)
}

fn set_counts(left: &BTreeSet<&str>, right: &BTreeSet<&str>) -> [usize; 4] {
    [
        left.len(),
        right.len(),
        left.intersection(right).count(),
        left.union(right).count(),
    ]
}
