use std::path::PathBuf;

use clap::Args;
use oxiscore_analysis::drivers::run_training_analyses;
use tracing::info;

use crate::{data, report::ReportWriter};

#[derive(Debug, Clone, Args)]
pub struct AnalyzeTrainingArg {
    /// Experiment configuration (JSON)
    #[arg(long)]
    config: PathBuf,
    /// Training items with original feature values and sc1 (JSON)
    #[arg(long)]
    train: PathBuf,
    /// Training items with preprocessed feature values and sc1 (JSON)
    #[arg(long)]
    train_preprocessed: PathBuf,
    /// Per-item metadata with subgroup labels (JSON)
    #[arg(long)]
    metadata: PathBuf,
    /// Optional per-item length covariate table (JSON)
    #[arg(long)]
    length: Option<PathBuf>,
    /// Output directory for the result tables
    #[arg(long, short)]
    output: PathBuf,
}

pub fn run(arg: &AnalyzeTrainingArg) -> anyhow::Result<()> {
    let config = data::load_config(&arg.config)?;
    let train = data::load_frame(&arg.train)?;
    let train_preprocessed = data::load_frame(&arg.train_preprocessed)?;
    let metadata = data::load_frame(&arg.metadata)?;
    let length = arg.length.as_deref().map(data::load_frame).transpose()?;
    info!(
        items = train.len(),
        features = config.features.len(),
        "loaded training data"
    );

    let analyses = run_training_analyses(
        &train,
        &train_preprocessed,
        &metadata,
        length.as_ref(),
        &config.features,
        &config.subgroups,
    )?;

    let mut writer = ReportWriter::new(&arg.output, &config.experiment_id)?;
    writer.write_table("feature_descriptives", &analyses.descriptives)?;
    writer.write_table("feature_outliers", &analyses.percentiles)?;
    writer.write_table("feature_extreme_values", &analyses.outliers)?;
    writer.write_table("cors_orig", &analyses.pairwise_cors_orig)?;
    writer.write_table("cors_processed", &analyses.pairwise_cors_preprocessed)?;
    writer.write_table("margcor_score_all_data", &analyses.margcor_sc1)?;
    writer.write_table("pcor_score_all_data", &analyses.pcor_sc1)?;
    writer.write_optional_table(
        "pcor_score_no_length_all_data",
        analyses.pcor_sc1_no_length.as_ref(),
    )?;
    writer.write_optional_table("margcor_length_all_data", analyses.margcor_length.as_ref())?;
    writer.write_optional_table("pcor_length_all_data", analyses.pcor_length.as_ref())?;

    for (subgroup, cors) in &analyses.cors_by_group {
        writer.write_table(&format!("margcor_score_by_{subgroup}"), &cors.marginal)?;
        writer.write_table(&format!("pcor_score_by_{subgroup}"), &cors.partial)?;
        writer.write_optional_table(
            &format!("pcor_score_no_length_by_{subgroup}"),
            cors.partial_no_length.as_ref(),
        )?;
    }
    for (subgroup, cors) in &analyses.length_cors_by_group {
        writer.write_table(&format!("margcor_length_by_{subgroup}"), &cors.marginal)?;
        writer.write_table(&format!("pcor_length_by_{subgroup}"), &cors.partial)?;
    }

    writer.write_table("pca_components", &analyses.pca.components)?;
    writer.write_table("pca_variance", &analyses.pca.variance)?;

    writer.finish("analyze-training")
}
