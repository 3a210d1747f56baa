//! Result-table output.
//!
//! Every analysis table is persisted as `<experiment_id>_<name>.csv` in the
//! output directory, and a `run_metadata.json` records what was written and
//! when.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use oxiscore_frame::table::Table;
use serde::Serialize;

/// Accumulates written tables for one analysis run.
#[derive(Debug)]
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment_id: String,
    written: Vec<String>,
}

/// Contents of `run_metadata.json`.
#[derive(Debug, Serialize)]
struct RunMetadata<'a> {
    experiment_id: &'a str,
    command: &'a str,
    timestamp: DateTime<Utc>,
    tables: &'a [String],
}

impl ReportWriter {
    /// Create the output directory if needed.
    pub fn new(output_dir: &Path, experiment_id: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        Ok(ReportWriter {
            output_dir: output_dir.to_path_buf(),
            experiment_id: experiment_id.to_string(),
            written: Vec::new(),
        })
    }

    /// Write one table as `<experiment_id>_<name>.csv`.
    pub fn write_table(&mut self, name: &str, table: &Table) -> anyhow::Result<()> {
        let file_name = format!("{}_{}.csv", self.experiment_id, name);
        let path = self.output_dir.join(&file_name);
        fs::write(&path, table.to_csv())
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        self.written.push(file_name);
        Ok(())
    }

    /// Write an optional table, skipping silently when absent.
    pub fn write_optional_table(
        &mut self,
        name: &str,
        table: Option<&Table>,
    ) -> anyhow::Result<()> {
        if let Some(table) = table {
            self.write_table(name, table)?;
        }
        Ok(())
    }

    /// Write `run_metadata.json` and print a short summary.
    pub fn finish(self, command: &str) -> anyhow::Result<()> {
        let metadata = RunMetadata {
            experiment_id: &self.experiment_id,
            command,
            timestamp: Utc::now(),
            tables: &self.written,
        };
        let path = self.output_dir.join("run_metadata.json");
        let json = serde_json::to_string_pretty(&metadata)
            .context("Failed to serialize run metadata")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write run metadata: {}", path.display()))?;

        println!(
            "Wrote {} tables to: {}",
            self.written.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}
