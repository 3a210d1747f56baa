//! Error taxonomy for the analysis engine.
//!
//! Only two kinds of failure abort an analysis: input-contract violations
//! (the caller's data does not match the documented column contract) and
//! configuration inconsistencies (the caller asked for subgroups, metrics,
//! or score types that do not exist). Both fail fast and name the offending
//! columns or values. Numerically degenerate computations are *not* errors:
//! a constant feature or a singular covariance matrix surfaces as NaN in the
//! result tables.

use oxiscore_frame::{frame::FrameError, score::ScoreType};

/// Error returned by the analysis routines and drivers.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    /// Frame-level contract violation (duplicate ids, missing columns or
    /// values, mismatched joins).
    #[display("{_0}")]
    Frame(#[error(source)] FrameError),
    /// An analysis was invoked on an empty frame.
    #[display("cannot run {context} on an empty item frame")]
    EmptyFrame { context: String },
    /// Requested subgroups are not present in the data.
    #[display("unknown subgroups: [{}]; available: [{}]", invalid.join(", "), valid.join(", "))]
    UnknownSubgroups {
        invalid: Vec<String>,
        valid: Vec<String>,
    },
    /// A custom metric selection names unknown metrics.
    #[display("unknown metrics: [{}]; valid metrics: [{}]", invalid.join(", "), valid.join(", "))]
    UnknownMetrics {
        invalid: Vec<String>,
        valid: Vec<String>,
    },
    /// A custom metric selection names unknown score types.
    #[display("unknown score types: [{}]; valid score types: [{}]", invalid.join(", "), valid.join(", "))]
    UnknownScoreTypes {
        invalid: Vec<String>,
        valid: Vec<String>,
    },
    /// A metric selection asks for a score type the evaluation did not
    /// produce.
    #[display("score type '{score_type}' required by the metric selection is not in the evaluation")]
    MissingSelectedScoreType { score_type: ScoreType },
    /// No system-score column is present on the prediction frame.
    #[display("no system score columns present in the frame")]
    NoScoreColumns,
    /// A crosstab cell that is impossible by construction holds items.
    #[display("structurally-impossible crosstab cell ('{row}' x '{column}') holds {count} items")]
    StructuralCellViolation {
        row: String,
        column: String,
        count: usize,
    },
}

impl From<FrameError> for AnalysisError {
    fn from(error: FrameError) -> Self {
        AnalysisError::Frame(error)
    }
}
