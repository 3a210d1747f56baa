//! Metrics and analysis engine for automated-scoring evaluation.
//!
//! This crate takes machine-predicted scores and human reference scores for
//! a set of scored items and computes the statistics a scoring-evaluation
//! report is built from. All routines consume [`oxiscore_frame::frame::ItemFrame`]
//! tables and return ordered result tables; file I/O and configuration
//! parsing live with the caller.
//!
//! # Overview
//!
//! The engine runs three workflows, each sequenced by a driver in
//! [`drivers`]:
//!
//! ## Training-Data Analysis
//!
//! 1. **Descriptives** ([`descriptives`]): per-feature moments, percentile
//!    and outlier profiles
//! 2. **Correlations** ([`correlations`]): marginal and partial correlations
//!    of features against the human score (and length covariate), globally
//!    and per subgroup
//! 3. **Principal components** ([`pca`]): loadings and explained variance
//!    over the selected features
//!
//! ## Prediction Analysis
//!
//! 1. **Evaluation** ([`evaluation`]): per-score-type human-machine
//!    agreement metrics, shortened summaries, human-human baselines, and
//!    degradation
//! 2. **Confusion** ([`confusion`]): confusion matrix and score-label
//!    distributions
//!
//! ## Data-Composition Analysis
//!
//! 1. **Composition** ([`composition`]): exclusion crosstabs and
//!    training/evaluation partition summaries, overall and per subgroup
//!
//! # Grouping
//!
//! Subgroup analyses never special-case the whole sample: frames partition
//! through [`oxiscore_frame::frame::ItemFrame::group_partitions`], which
//! always injects a synthetic `"All data"` pseudo-group, so per-group and
//! whole-sample numbers come from the same code path.
//!
//! # Errors
//!
//! Input-contract violations and configuration inconsistencies fail fast
//! with an [`error::AnalysisError`] naming the offenders; numerically
//! degenerate computations (constant features, singular covariance
//! matrices) surface as NaN inside the result tables instead.
//!
//! # Examples
//!
//! ```
//! use oxiscore_analysis::descriptives::basic_descriptives;
//! use oxiscore_frame::frame::{Item, ItemFrame};
//!
//! let items = (0..4)
//!     .map(|i| {
//!         let mut item = Item::new(format!("item_{i}"));
//!         item.sc1 = Some(f64::from(i));
//!         item.features.insert("grammar".to_string(), f64::from(i) * 0.5);
//!         item
//!     })
//!     .collect();
//! let frame = ItemFrame::new(items).unwrap();
//!
//! let table = basic_descriptives(&frame, &["grammar".to_string()]).unwrap();
//! assert_eq!(table.num_rows(), 1);
//! assert_eq!(table.columns()[0], "mean");
//! ```

pub mod composition;
pub mod confusion;
pub mod correlations;
pub mod descriptives;
pub mod drivers;
pub mod error;
pub mod evaluation;
pub mod pca;
