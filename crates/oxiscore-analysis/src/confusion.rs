//! Confusion matrix and score-distribution tables.
//!
//! Both compare the primary human score against the trimmed-and-rounded
//! system score of the chosen pipeline branch. Score labels are the sorted
//! union of the labels observed on either side; a label seen by only one
//! side appears with zero counts, never as a missing row or a NaN.

use std::collections::BTreeSet;

use oxiscore_frame::{
    frame::ItemFrame,
    score::ScoreType,
    table::{Cell, Table},
};
use oxiscore_stats::agreement::confusion_counts;

use crate::error::AnalysisError;

/// Confusion matrix between the system's trimmed-and-rounded score (rows)
/// and the primary human score (columns).
#[expect(clippy::cast_possible_truncation)]
pub fn confusion_matrix_table(
    frame: &ItemFrame,
    use_scaled: bool,
) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "confusion matrix".to_string(),
        });
    }
    let human = frame.sc1_column()?;
    let system = frame.score_column(ScoreType::trim_round(use_scaled))?;

    let (labels, counts) = confusion_counts(&system, &human);
    let mut table = Table::new("", labels.iter().map(ToString::to_string));
    for (label, row) in labels.iter().zip(counts) {
        let cells = row.into_iter().map(|count| Cell::from(count as usize)).collect();
        table.push_row(label.to_string(), cells);
    }
    Ok(table)
}

/// Percentage distribution of human and system score labels, with their
/// difference, sorted by score label.
///
/// Percentages are relative to the full frame size; labels missing on one
/// side get an exact zero frequency.
pub fn score_distribution(frame: &ItemFrame, use_scaled: bool) -> Result<Table, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "score distribution".to_string(),
        });
    }
    let human = frame.sc1_column()?;
    let system = frame.score_column(ScoreType::trim_round(use_scaled))?;

    #[expect(clippy::cast_possible_truncation)]
    let to_labels = |values: &[f64]| -> Vec<i64> { values.iter().map(|v| v.round() as i64).collect() };
    let human_labels = to_labels(&human);
    let system_labels = to_labels(&system);

    let all_labels: BTreeSet<i64> = human_labels.iter().chain(&system_labels).copied().collect();

    let system_column = format!("sys_{}", if use_scaled { "scale" } else { "raw" });
    let mut table = Table::new(
        "score",
        ["human".to_string(), system_column, "difference".to_string()],
    );

    #[expect(clippy::cast_precision_loss)]
    let percent = |labels: &[i64], label: i64| -> f64 {
        labels.iter().filter(|l| **l == label).count() as f64 / frame.len() as f64 * 100.0
    };
    for label in all_labels {
        let human_percent = percent(&human_labels, label);
        let system_percent = percent(&system_labels, label);
        table.push_row(
            label.to_string(),
            vec![
                Cell::Num(human_percent),
                Cell::Num(system_percent),
                Cell::Num(system_percent - human_percent),
            ],
        );
    }
    Ok(table)
}
