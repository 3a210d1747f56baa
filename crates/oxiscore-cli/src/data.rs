//! Input loading for the analysis commands.
//!
//! Item tables arrive as JSON arrays of item records; the experiment
//! configuration is an explicit object passed by value into every command,
//! never ambient state. All loaders attach the offending path to their
//! errors.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use oxiscore_frame::frame::{Item, ItemFrame};
use serde::Deserialize;

/// Experiment configuration shared by the analysis commands.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    /// Identifier used to prefix every output file.
    pub experiment_id: String,
    /// Selected features in model order; the order is significant and is
    /// never re-sorted.
    pub features: Vec<String>,
    /// Subgroup columns to break analyses down by.
    #[serde(default)]
    pub subgroups: Vec<String>,
    /// Evaluate the scaled branch of the score pipeline.
    #[serde(default)]
    pub use_scaled_predictions: bool,
    /// Whether zero human scores were excluded from the analysis data.
    #[serde(default = "default_exclude_zero_scores")]
    pub exclude_zero_scores: bool,
    /// Whether a respondent (candidate) column is present.
    #[serde(default)]
    pub has_candidate: bool,
}

fn default_exclude_zero_scores() -> bool {
    true
}

/// Load the experiment configuration from a JSON file.
pub fn load_config(path: &Path) -> anyhow::Result<ExperimentConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load an item frame from a JSON array of item records.
///
/// Duplicate item ids are rejected here, before any analysis runs.
pub fn load_frame(path: &Path) -> anyhow::Result<ItemFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open item table: {}", path.display()))?;
    let items: Vec<Item> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse item table: {}", path.display()))?;
    ItemFrame::new(items)
        .with_context(|| format!("Invalid item table: {}", path.display()))
}
