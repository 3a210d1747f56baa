//! Orchestration drivers.
//!
//! Three routines sequence the individual analyses: training-data analysis,
//! prediction/evaluation analysis, and data-composition analysis (plus the
//! evaluation-only composition variant). Each merges its input frames by
//! item id, validates the requested configuration up front, and dispatches
//! to the sub-computations based on which optional columns (length, second
//! human score, subgroups) are present. Results are plain structs of named
//! tables; writing them anywhere is the caller's business.

use std::collections::BTreeSet;

use oxiscore_frame::{frame::ItemFrame, table::Table};
use tracing::debug;

use crate::{
    composition::{
        composition_by_group, composition_summary, excluded_crosstab,
        excluded_crosstab_for_predictions, prediction_composition_by_group,
        prediction_composition_summary,
    },
    confusion::{confusion_matrix_table, score_distribution},
    correlations::{
        CorrelationByGroup, CorrelationTarget, correlation_all_data, correlation_by_group,
        pairwise_correlations,
    },
    descriptives::{basic_descriptives, percentile_profile, sd_outliers},
    error::AnalysisError,
    evaluation::{EvaluationOptions, GroupEvaluation, compute_metrics, degradation,
        evaluate_by_group},
    pca::{PcaAnalysis, pca},
};

/// Results of the training-data analysis.
#[derive(Debug, Clone)]
pub struct TrainingAnalyses {
    pub descriptives: Table,
    pub percentiles: Table,
    pub outliers: Table,
    /// Pairwise correlations over the original feature values.
    pub pairwise_cors_orig: Table,
    /// Pairwise correlations over the preprocessed feature values.
    pub pairwise_cors_preprocessed: Table,
    /// Whole-sample marginal correlations against the primary score.
    pub margcor_sc1: Table,
    /// Whole-sample partial correlations against the primary score.
    pub pcor_sc1: Table,
    /// Whole-sample bivariate partials controlling for length alone.
    pub pcor_sc1_no_length: Option<Table>,
    /// Whole-sample marginal correlations against length.
    pub margcor_length: Option<Table>,
    /// Whole-sample partial correlations against length.
    pub pcor_length: Option<Table>,
    /// Score correlations per requested subgroup.
    pub cors_by_group: Vec<(String, CorrelationByGroup)>,
    /// Length correlations per requested subgroup.
    pub length_cors_by_group: Vec<(String, CorrelationByGroup)>,
    pub pca: PcaAnalysis,
}

/// Run all analyses on the training data.
///
/// `train` holds the original feature values, `train_preprocessed` the
/// preprocessed ones; both carry `sc1`. `metadata` contributes subgroup
/// labels, `length` the optional length covariate. Feature order is
/// preserved exactly as given; it affects the PCA sign convention.
pub fn run_training_analyses(
    train: &ItemFrame,
    train_preprocessed: &ItemFrame,
    metadata: &ItemFrame,
    length: Option<&ItemFrame>,
    features: &[String],
    subgroups: &[String],
) -> Result<TrainingAnalyses, AnalysisError> {
    if train.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "training analyses".to_string(),
        });
    }
    let preprocessed = train_preprocessed.merge(metadata)?;
    validate_subgroups(&preprocessed, subgroups)?;
    debug!(
        items = train.len(),
        features = features.len(),
        subgroups = subgroups.len(),
        "running training analyses"
    );

    let descriptives = basic_descriptives(train, features)?;
    let percentiles = percentile_profile(train, features)?;
    let outliers = sd_outliers(train, features)?;

    let include_length = length.is_some_and(|frame| !frame.is_empty());
    let (train_with_length, preprocessed_with_length) = match length {
        Some(length_frame) if include_length => (
            train.merge(length_frame)?,
            preprocessed.merge(length_frame)?,
        ),
        _ => (train.clone(), preprocessed.clone()),
    };

    let pairwise_cors_orig = pairwise_correlations(&train_with_length, features, include_length)?;
    let pairwise_cors_preprocessed =
        pairwise_correlations(&preprocessed_with_length, features, include_length)?;

    let score_cors = correlation_all_data(
        &preprocessed_with_length,
        features,
        CorrelationTarget::Sc1,
        include_length,
    )?;

    let (margcor_length, pcor_length) = if include_length {
        let length_cors = correlation_all_data(
            &preprocessed_with_length,
            features,
            CorrelationTarget::Length,
            false,
        )?;
        (Some(length_cors.marginal), Some(length_cors.partial))
    } else {
        (None, None)
    };

    let mut cors_by_group = Vec::with_capacity(subgroups.len());
    let mut length_cors_by_group = Vec::new();
    for subgroup in subgroups {
        let by_group = correlation_by_group(
            &preprocessed_with_length,
            features,
            CorrelationTarget::Sc1,
            subgroup,
            include_length,
        )?;
        cors_by_group.push((subgroup.clone(), by_group));
        if include_length {
            let length_by_group = correlation_by_group(
                &preprocessed_with_length,
                features,
                CorrelationTarget::Length,
                subgroup,
                false,
            )?;
            length_cors_by_group.push((subgroup.clone(), length_by_group));
        }
    }

    let pca = pca(&preprocessed, features)?;

    Ok(TrainingAnalyses {
        descriptives,
        percentiles,
        outliers,
        pairwise_cors_orig,
        pairwise_cors_preprocessed,
        margcor_sc1: score_cors.marginal,
        pcor_sc1: score_cors.partial,
        pcor_sc1_no_length: score_cors.partial_no_length,
        margcor_length,
        pcor_length,
        cors_by_group,
        length_cors_by_group,
        pca,
    })
}

/// Results of the prediction/evaluation analysis.
#[derive(Debug, Clone)]
pub struct PredictionAnalyses {
    /// Full evaluation: one row per score type, fifteen metric columns.
    pub evaluation: Table,
    /// The shortened one-row evaluation.
    pub evaluation_short: Table,
    /// Human-human baseline row, when double-scored data exists.
    pub human_human: Option<Table>,
    /// Shortened evaluation per subgroup.
    pub eval_by_group: Vec<(String, GroupEvaluation)>,
    /// Degradation against the human-human baseline.
    pub degradation: Option<Table>,
    /// Confusion matrix of system vs human score labels.
    pub confusion: Table,
    /// Percentage distribution of human vs system score labels.
    pub score_distribution: Table,
}

/// Run all analyses on the predictions.
///
/// `predictions` carries `sc1` and the system-score columns; `metadata`
/// contributes subgroup labels; `second_scores` (when present) contributes
/// `sc2` values for the double-scored subset and switches on the
/// human-human baseline and degradation analyses.
pub fn run_prediction_analyses(
    predictions: &ItemFrame,
    metadata: &ItemFrame,
    second_scores: Option<&ItemFrame>,
    subgroups: &[String],
    use_scaled: bool,
) -> Result<PredictionAnalyses, AnalysisError> {
    if predictions.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "prediction analyses".to_string(),
        });
    }
    let merged = predictions.merge(metadata)?;
    validate_subgroups(&merged, subgroups)?;

    let include_second_score = second_scores.is_some_and(ItemFrame::has_second_score);
    let merged = match second_scores {
        Some(scores) => merged.merge(scores)?,
        None => merged,
    };
    debug!(
        items = merged.len(),
        include_second_score, use_scaled, "running prediction analyses"
    );

    let evaluation = compute_metrics(
        &merged,
        EvaluationOptions {
            compute_shortened: true,
            use_scaled,
            include_second_score,
        },
    )?;

    let mut eval_by_group = Vec::with_capacity(subgroups.len());
    for subgroup in subgroups {
        let group_eval = evaluate_by_group(&merged, subgroup, use_scaled, include_second_score)?;
        eval_by_group.push((subgroup.clone(), group_eval));
    }

    let degradation_table = if include_second_score {
        Some(degradation(&merged, true)?)
    } else {
        None
    };

    let confusion = confusion_matrix_table(&merged, use_scaled)?;
    let distribution = score_distribution(&merged, use_scaled)?;

    let evaluation_short = evaluation
        .shortened
        .as_ref()
        .expect("shortened metrics were requested")
        .to_table("", "");
    let human_human = evaluation.human_human_table();

    Ok(PredictionAnalyses {
        evaluation: evaluation.full_table(),
        evaluation_short,
        human_human,
        eval_by_group,
        degradation: degradation_table,
        confusion,
        score_distribution: distribution,
    })
}

/// Options shared by the composition drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionOptions {
    /// Whether a respondent (candidate) column is present.
    pub has_candidate: bool,
    /// Whether zero human scores were excluded from the analysis.
    pub exclude_zero_scores: bool,
}

/// Results of the data-composition analysis.
#[derive(Debug, Clone)]
pub struct CompositionAnalyses {
    pub train_excluded: Table,
    pub test_excluded: Table,
    pub composition: Table,
    pub by_group: Vec<(String, Table)>,
}

/// Run all data-composition analyses over both partitions.
pub fn run_data_composition_analyses(
    train_metadata: &ItemFrame,
    test_metadata: &ItemFrame,
    train_excluded: &ItemFrame,
    test_excluded: &ItemFrame,
    features: &[String],
    subgroups: &[String],
    options: CompositionOptions,
) -> Result<CompositionAnalyses, AnalysisError> {
    validate_subgroups_in_either(train_metadata, test_metadata, subgroups)?;
    debug!(
        train_items = train_metadata.len(),
        test_items = test_metadata.len(),
        "running data composition analyses"
    );

    let train_excluded_table = excluded_crosstab(
        train_excluded,
        features,
        "Score/Features",
        options.exclude_zero_scores,
    )?;
    let test_excluded_table = excluded_crosstab(
        test_excluded,
        features,
        "Score/Features",
        options.exclude_zero_scores,
    )?;
    let composition = composition_summary(
        train_metadata,
        test_metadata,
        subgroups,
        options.has_candidate,
    )?;

    let mut by_group = Vec::with_capacity(subgroups.len());
    for subgroup in subgroups {
        by_group.push((
            subgroup.clone(),
            composition_by_group(train_metadata, test_metadata, subgroup)?,
        ));
    }

    Ok(CompositionAnalyses {
        train_excluded: train_excluded_table,
        test_excluded: test_excluded_table,
        composition,
        by_group,
    })
}

/// Results of the evaluation-only composition analysis.
#[derive(Debug, Clone)]
pub struct PredictionCompositionAnalyses {
    pub excluded: Table,
    pub composition: Table,
    pub by_group: Vec<(String, Table)>,
}

/// Run the composition analyses for a prediction-only experiment.
pub fn run_prediction_composition_analyses(
    test_metadata: &ItemFrame,
    test_excluded: &ItemFrame,
    subgroups: &[String],
    options: CompositionOptions,
) -> Result<PredictionCompositionAnalyses, AnalysisError> {
    validate_subgroups(test_metadata, subgroups)?;

    let excluded =
        excluded_crosstab_for_predictions(test_excluded, options.exclude_zero_scores)?;
    let composition =
        prediction_composition_summary(test_metadata, subgroups, options.has_candidate)?;

    let mut by_group = Vec::with_capacity(subgroups.len());
    for subgroup in subgroups {
        by_group.push((
            subgroup.clone(),
            prediction_composition_by_group(test_metadata, subgroup)?,
        ));
    }

    Ok(PredictionCompositionAnalyses {
        excluded,
        composition,
        by_group,
    })
}

/// Fail fast when requested subgroups are missing, enumerating the invalid
/// names against the subgroups actually present.
fn validate_subgroups(frame: &ItemFrame, subgroups: &[String]) -> Result<(), AnalysisError> {
    let invalid: Vec<String> = subgroups
        .iter()
        .filter(|subgroup| !frame.has_subgroup(subgroup))
        .cloned()
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    Err(AnalysisError::UnknownSubgroups {
        invalid,
        valid: available_subgroups(frame).into_iter().collect(),
    })
}

fn validate_subgroups_in_either(
    train: &ItemFrame,
    test: &ItemFrame,
    subgroups: &[String],
) -> Result<(), AnalysisError> {
    let invalid: Vec<String> = subgroups
        .iter()
        .filter(|subgroup| !train.has_subgroup(subgroup) || !test.has_subgroup(subgroup))
        .cloned()
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    let mut valid = available_subgroups(train);
    valid.extend(available_subgroups(test));
    Err(AnalysisError::UnknownSubgroups {
        invalid,
        valid: valid.into_iter().collect(),
    })
}

fn available_subgroups(frame: &ItemFrame) -> BTreeSet<String> {
    frame
        .items()
        .iter()
        .flat_map(|item| item.subgroups.keys().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use oxiscore_frame::{frame::Item, score::ScoreType};

    use super::*;

    fn training_frames() -> (ItemFrame, ItemFrame, ItemFrame, ItemFrame) {
        let f1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let f2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let sc1 = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let length = [10.0, 30.0, 20.0, 50.0, 40.0, 55.0];
        let groups = ["a", "a", "a", "b", "b", "b"];

        let mut train_items = Vec::new();
        let mut preprocessed_items = Vec::new();
        let mut metadata_items = Vec::new();
        let mut length_items = Vec::new();
        for i in 0..6 {
            let id = format!("item_{i}");

            let mut item = Item::new(&id);
            item.sc1 = Some(sc1[i]);
            item.features.insert("f1".to_string(), f1[i]);
            item.features.insert("f2".to_string(), f2[i]);
            train_items.push(item.clone());
            // The preprocessed values happen to equal the originals here.
            preprocessed_items.push(item);

            let mut meta = Item::new(&id);
            meta.subgroups.insert("l1".to_string(), groups[i].to_string());
            metadata_items.push(meta);

            let mut with_length = Item::new(&id);
            with_length.length = Some(length[i]);
            length_items.push(with_length);
        }
        (
            ItemFrame::new(train_items).unwrap(),
            ItemFrame::new(preprocessed_items).unwrap(),
            ItemFrame::new(metadata_items).unwrap(),
            ItemFrame::new(length_items).unwrap(),
        )
    }

    #[test]
    fn training_driver_produces_all_tables() {
        let (train, preprocessed, metadata, length) = training_frames();
        let features = ["f1".to_string(), "f2".to_string()];
        let subgroups = ["l1".to_string()];

        let analyses = run_training_analyses(
            &train,
            &preprocessed,
            &metadata,
            Some(&length),
            &features,
            &subgroups,
        )
        .unwrap();

        assert_eq!(analyses.descriptives.num_rows(), 2);
        assert_eq!(analyses.percentiles.num_rows(), 2);
        assert_eq!(analyses.outliers.num_rows(), 2);
        assert_eq!(
            analyses.pairwise_cors_orig.columns(),
            ["f1", "f2", "sc1", "length"]
        );
        assert_eq!(analyses.margcor_sc1.columns(), ["All data"]);
        assert!(analyses.pcor_sc1_no_length.is_some());
        assert!(analyses.margcor_length.is_some());
        assert!(analyses.pcor_length.is_some());
        assert_eq!(analyses.cors_by_group.len(), 1);
        assert_eq!(analyses.length_cors_by_group.len(), 1);
        assert_eq!(analyses.pca.components.columns(), ["PC1", "PC2"]);
    }

    #[test]
    fn training_driver_without_length_skips_length_tables() {
        let (train, preprocessed, metadata, _) = training_frames();
        let features = ["f1".to_string(), "f2".to_string()];

        let analyses =
            run_training_analyses(&train, &preprocessed, &metadata, None, &features, &[])
                .unwrap();

        assert!(analyses.pcor_sc1_no_length.is_none());
        assert!(analyses.margcor_length.is_none());
        assert!(analyses.pcor_length.is_none());
        assert!(analyses.length_cors_by_group.is_empty());
        assert_eq!(analyses.pairwise_cors_orig.columns(), ["f1", "f2", "sc1"]);
    }

    #[test]
    fn unknown_subgroup_is_enumerated() {
        let (train, preprocessed, metadata, _) = training_frames();
        let features = ["f1".to_string()];
        let subgroups = ["l1".to_string(), "gender".to_string()];

        let err = run_training_analyses(
            &train,
            &preprocessed,
            &metadata,
            None,
            &features,
            &subgroups,
        )
        .unwrap_err();
        let AnalysisError::UnknownSubgroups { invalid, valid } = err else {
            panic!("expected UnknownSubgroups");
        };
        assert_eq!(invalid, vec!["gender".to_string()]);
        assert_eq!(valid, vec!["l1".to_string()]);
    }

    fn prediction_frames() -> (ItemFrame, ItemFrame, ItemFrame) {
        let sc1 = [1.0, 2.0, 3.0, 4.0];
        let sc2 = [1.0, 3.0, 3.0, 4.0];
        let raw = [1.2, 2.1, 2.9, 3.7];
        let groups = ["a", "a", "b", "b"];

        let mut prediction_items = Vec::new();
        let mut metadata_items = Vec::new();
        let mut second_items = Vec::new();
        for i in 0..4 {
            let id = format!("item_{i}");

            let mut item = Item::new(&id);
            item.sc1 = Some(sc1[i]);
            item.scores.insert(ScoreType::Raw, raw[i]);
            item.scores.insert(ScoreType::RawTrim, raw[i]);
            item.scores.insert(ScoreType::RawTrimRound, raw[i].round());
            prediction_items.push(item);

            let mut meta = Item::new(&id);
            meta.subgroups.insert("l1".to_string(), groups[i].to_string());
            metadata_items.push(meta);

            let mut second = Item::new(&id);
            second.sc2 = Some(sc2[i]);
            second_items.push(second);
        }
        (
            ItemFrame::new(prediction_items).unwrap(),
            ItemFrame::new(metadata_items).unwrap(),
            ItemFrame::new(second_items).unwrap(),
        )
    }

    #[test]
    fn prediction_driver_produces_all_tables() {
        let (predictions, metadata, second) = prediction_frames();
        let subgroups = ["l1".to_string()];

        let analyses =
            run_prediction_analyses(&predictions, &metadata, Some(&second), &subgroups, false)
                .unwrap();

        assert_eq!(analyses.evaluation.num_rows(), 3);
        assert_eq!(analyses.evaluation_short.num_rows(), 1);
        assert!(analyses.human_human.is_some());
        assert!(analyses.degradation.is_some());
        assert_eq!(analyses.eval_by_group.len(), 1);
        assert!(!analyses.confusion.columns().is_empty());
        assert_eq!(
            analyses.score_distribution.columns(),
            ["human", "sys_raw", "difference"]
        );
    }

    #[test]
    fn prediction_driver_without_second_score() {
        let (predictions, metadata, _) = prediction_frames();
        let analyses =
            run_prediction_analyses(&predictions, &metadata, None, &[], false).unwrap();
        assert!(analyses.human_human.is_none());
        assert!(analyses.degradation.is_none());
    }

    #[test]
    fn composition_driver_produces_all_tables() {
        let (_, metadata, _) = prediction_frames();
        let excluded = ItemFrame::empty();
        let analyses = run_data_composition_analyses(
            &metadata,
            &metadata,
            &excluded,
            &excluded,
            &["f1".to_string()],
            &["l1".to_string()],
            CompositionOptions {
                has_candidate: false,
                exclude_zero_scores: true,
            },
        )
        .unwrap();
        assert_eq!(analyses.composition.columns(), ["responses", "l1"]);
        assert_eq!(analyses.by_group.len(), 1);
        assert_eq!(analyses.train_excluded.num_rows(), 3);
    }

    #[test]
    fn prediction_composition_driver() {
        let (_, metadata, _) = prediction_frames();
        let excluded = ItemFrame::empty();
        let analyses = run_prediction_composition_analyses(
            &metadata,
            &excluded,
            &["l1".to_string()],
            CompositionOptions::default(),
        )
        .unwrap();
        assert_eq!(analyses.composition.num_rows(), 1);
        assert_eq!(analyses.excluded.index_name(), "Human/System");
        assert_eq!(analyses.by_group.len(), 1);
    }
}
