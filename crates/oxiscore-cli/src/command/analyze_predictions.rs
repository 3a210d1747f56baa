use std::path::PathBuf;

use clap::Args;
use oxiscore_analysis::drivers::run_prediction_analyses;
use tracing::info;

use crate::{data, report::ReportWriter};

#[derive(Debug, Clone, Args)]
pub struct AnalyzePredictionsArg {
    /// Experiment configuration (JSON)
    #[arg(long)]
    config: PathBuf,
    /// Per-item predictions with sc1 and the system-score columns (JSON)
    #[arg(long)]
    predictions: PathBuf,
    /// Per-item metadata with subgroup labels (JSON)
    #[arg(long)]
    metadata: PathBuf,
    /// Optional per-item second human scores (JSON)
    #[arg(long)]
    second_scores: Option<PathBuf>,
    /// Output directory for the result tables
    #[arg(long, short)]
    output: PathBuf,
}

pub fn run(arg: &AnalyzePredictionsArg) -> anyhow::Result<()> {
    let config = data::load_config(&arg.config)?;
    let predictions = data::load_frame(&arg.predictions)?;
    let metadata = data::load_frame(&arg.metadata)?;
    let second_scores = arg
        .second_scores
        .as_deref()
        .map(data::load_frame)
        .transpose()?;
    info!(
        items = predictions.len(),
        double_scored = second_scores.is_some(),
        "loaded prediction data"
    );

    let analyses = run_prediction_analyses(
        &predictions,
        &metadata,
        second_scores.as_ref(),
        &config.subgroups,
        config.use_scaled_predictions,
    )?;

    let mut writer = ReportWriter::new(&arg.output, &config.experiment_id)?;
    writer.write_table("eval", &analyses.evaluation)?;
    writer.write_table("eval_short", &analyses.evaluation_short)?;
    writer.write_optional_table("consistency", analyses.human_human.as_ref())?;
    for (subgroup, group_eval) in &analyses.eval_by_group {
        writer.write_table(&format!("eval_by_{subgroup}"), &group_eval.shortened)?;
        writer.write_optional_table(
            &format!("consistency_by_{subgroup}"),
            group_eval.human_human.as_ref(),
        )?;
    }
    writer.write_optional_table("degradation", analyses.degradation.as_ref())?;
    writer.write_table("confusion_matrix", &analyses.confusion)?;
    writer.write_table("score_dist", &analyses.score_distribution)?;

    writer.finish("analyze-predictions")
}
