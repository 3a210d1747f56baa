//! Statistical primitives for the Oxiscore evaluation toolkit.
//!
//! This crate provides the numeric building blocks the analysis engine is
//! assembled from:
//!
//! - **Descriptive statistics**: mean, sample standard deviation, skewness,
//!   kurtosis
//! - **Percentiles**: lower-interpolation percentile computation and storage
//! - **Correlation**: Pearson correlation with two-sided p-values, full
//!   correlation matrices, and partial correlations via the precision matrix
//! - **Agreement**: exact/adjacent agreement rates and chance-corrected
//!   (weighted) kappa between two raters
//! - **Principal components**: deterministic full-rank PCA
//!
//! All routines operate on plain `f64` slices and carry no domain knowledge.
//! Numerically degenerate inputs (constant columns, singular matrices)
//! produce NaN rather than errors: they are legitimate analysis outcomes
//! that the report reader should see.
//!
//! # Modules
//!
//! - [`descriptive`]: moment-based summary statistics
//! - [`percentiles`]: percentile computation and storage
//! - [`correlation`]: marginal and partial correlation
//! - [`matrix`]: the small dense-matrix support the correlation code needs
//! - [`agreement`]: inter-rater agreement and kappa
//! - [`pca`]: principal component decomposition
//!
//! # Examples
//!
//! ## Computing a correlation with its p-value
//!
//! ```
//! use oxiscore_stats::correlation::pearson_with_pvalue;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 6.0, 8.0, 10.0];
//! let (r, p) = pearson_with_pvalue(&x, &y);
//! assert!((r - 1.0).abs() < 1e-12);
//! assert!(p < 1e-12);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use oxiscore_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(75.0), Some(8.0));
//! ```
//!
//! ## Measuring rater agreement
//!
//! ```
//! use oxiscore_stats::agreement::{KappaWeights, agreement_percent, kappa};
//!
//! let human = [1.0, 2.0, 3.0, 4.0];
//! let system = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(agreement_percent(&human, &system, 0.0), 100.0);
//! assert_eq!(kappa(&human, &system, KappaWeights::Unweighted), 1.0);
//! ```

pub mod agreement;
pub mod correlation;
pub mod descriptive;
pub mod matrix;
pub mod pca;
pub mod percentiles;
