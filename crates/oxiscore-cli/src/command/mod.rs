use clap::{Parser, Subcommand};

use self::{
    analyze_composition::AnalyzeCompositionArg, analyze_predictions::AnalyzePredictionsArg,
    analyze_training::AnalyzeTrainingArg,
};

mod analyze_composition;
mod analyze_predictions;
mod analyze_training;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Analyze the training data: descriptives, correlations, PCA
    AnalyzeTraining(#[clap(flatten)] AnalyzeTrainingArg),
    /// Analyze the predictions: evaluation, degradation, confusion
    AnalyzePredictions(#[clap(flatten)] AnalyzePredictionsArg),
    /// Analyze data composition: exclusions and partition overlap
    AnalyzeComposition(#[clap(flatten)] AnalyzeCompositionArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AnalyzeTraining(arg) => analyze_training::run(&arg)?,
        Mode::AnalyzePredictions(arg) => analyze_predictions::run(&arg)?,
        Mode::AnalyzeComposition(arg) => analyze_composition::run(&arg)?,
    }
    Ok(())
}
