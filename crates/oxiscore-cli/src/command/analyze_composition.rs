use std::path::PathBuf;

use clap::Args;
use oxiscore_analysis::drivers::{
    CompositionOptions, run_data_composition_analyses, run_prediction_composition_analyses,
};
use tracing::info;

use crate::{data, report::ReportWriter};

#[derive(Debug, Clone, Args)]
pub struct AnalyzeCompositionArg {
    /// Experiment configuration (JSON)
    #[arg(long)]
    config: PathBuf,
    /// Evaluation-partition metadata (JSON)
    #[arg(long)]
    test_metadata: PathBuf,
    /// Items excluded from the evaluation partition (JSON)
    #[arg(long)]
    test_excluded: PathBuf,
    /// Training-partition metadata (JSON); omit for prediction-only runs
    #[arg(long, requires = "train_excluded")]
    train_metadata: Option<PathBuf>,
    /// Items excluded from the training partition (JSON)
    #[arg(long, requires = "train_metadata")]
    train_excluded: Option<PathBuf>,
    /// Output directory for the result tables
    #[arg(long, short)]
    output: PathBuf,
}

pub fn run(arg: &AnalyzeCompositionArg) -> anyhow::Result<()> {
    let config = data::load_config(&arg.config)?;
    let test_metadata = data::load_frame(&arg.test_metadata)?;
    let test_excluded = data::load_frame(&arg.test_excluded)?;
    info!(
        test_items = test_metadata.len(),
        excluded_items = test_excluded.len(),
        "loaded composition data"
    );
    let options = CompositionOptions {
        has_candidate: config.has_candidate,
        exclude_zero_scores: config.exclude_zero_scores,
    };

    let mut writer = ReportWriter::new(&arg.output, &config.experiment_id)?;
    match (&arg.train_metadata, &arg.train_excluded) {
        (Some(train_metadata), Some(train_excluded)) => {
            let train_metadata = data::load_frame(train_metadata)?;
            let train_excluded = data::load_frame(train_excluded)?;
            let analyses = run_data_composition_analyses(
                &train_metadata,
                &test_metadata,
                &train_excluded,
                &test_excluded,
                &config.features,
                &config.subgroups,
                options,
            )?;
            writer.write_table("train_excluded_composition", &analyses.train_excluded)?;
            writer.write_table("test_excluded_composition", &analyses.test_excluded)?;
            writer.write_table("data_composition", &analyses.composition)?;
            for (subgroup, table) in &analyses.by_group {
                writer.write_table(&format!("data_composition_by_{subgroup}"), table)?;
            }
        }
        _ => {
            let analyses = run_prediction_composition_analyses(
                &test_metadata,
                &test_excluded,
                &config.subgroups,
                options,
            )?;
            writer.write_table("test_excluded_composition", &analyses.excluded)?;
            writer.write_table("data_composition", &analyses.composition)?;
            for (subgroup, table) in &analyses.by_group {
                writer.write_table(&format!("data_composition_by_{subgroup}"), table)?;
            }
        }
    }

    writer.finish("analyze-composition")
}
