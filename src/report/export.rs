//! JSON export of the submitted configuration

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cloud::FittedModel;
use crate::form::ModelConfig;

#[derive(Serialize)]
struct ExportRecord<'a> {
    model: &'a FittedModel,
    target: &'a str,
    id_columns: &'a [String],
    config: &'a ModelConfig,
}

/// Write the submitted configuration and the resulting model handle as
/// pretty JSON
pub fn export_config(
    path: &Path,
    model: &FittedModel,
    target: &str,
    id_columns: &[String],
    config: &ModelConfig,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create config file: {}", path.display()))?;
    let record = ExportRecord {
        model,
        target,
        id_columns,
        config,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &record)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
