//! Principal component tables over a feature set.
//!
//! The decomposition itself lives in `oxiscore_stats::pca`; this module
//! extracts the feature columns in their model-selection order (order
//! affects the sign convention, so it must never be re-sorted) and shapes
//! the result into the two reporting tables.

use oxiscore_frame::{
    frame::ItemFrame,
    table::{Cell, Table},
};
use oxiscore_stats::pca::PrincipalComponents;

use crate::error::AnalysisError;

/// Component loadings and explained-variance tables.
#[derive(Debug, Clone)]
pub struct PcaAnalysis {
    /// Loadings: one row per feature, one column per component.
    pub components: Table,
    /// Eigenvalues and (cumulative) explained-variance percentages: one
    /// column per component.
    pub variance: Table,
}

/// Fit a full-rank PCA over the given feature columns.
///
/// Components are labeled `PC1..PCk` in decreasing-variance order. The
/// decomposition is deterministic for identical input order.
pub fn pca(frame: &ItemFrame, features: &[String]) -> Result<PcaAnalysis, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "principal component analysis".to_string(),
        });
    }
    let columns: Vec<Vec<f64>> = features
        .iter()
        .map(|feature| frame.feature_column(feature))
        .collect::<Result<_, _>>()?;

    let Some(decomposition) = PrincipalComponents::fit(&columns) else {
        return Err(AnalysisError::EmptyFrame {
            context: "principal component analysis".to_string(),
        });
    };

    let component_labels: Vec<String> = (1..=features.len()).map(|i| format!("PC{i}")).collect();

    let mut components = Table::new("feature", component_labels.clone());
    for (row, feature) in features.iter().enumerate() {
        let cells = decomposition
            .components
            .iter()
            .map(|loadings| Cell::Num(loadings[row]))
            .collect();
        components.push_row(feature.clone(), cells);
    }

    let mut variance = Table::new("statistic", component_labels);
    variance.push_row(
        "Eigenvalues",
        decomposition.eigenvalues.iter().map(|e| Cell::Num(*e)).collect(),
    );
    variance.push_row(
        "Percentage of variance",
        decomposition
            .explained_variance_ratio
            .iter()
            .map(|r| Cell::Num(*r))
            .collect(),
    );
    variance.push_row(
        "Cumulative percentage of variance",
        decomposition
            .cumulative_variance_ratio
            .iter()
            .map(|r| Cell::Num(*r))
            .collect(),
    );

    Ok(PcaAnalysis {
        components,
        variance,
    })
}
