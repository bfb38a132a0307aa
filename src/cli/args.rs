//! Command-line argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cloud::DEFAULT_HOST;
use crate::dataset::CandidateThresholds;
use crate::form::Machine;

/// xtrain - Configure and train a remote binary classifier from a dataset
#[derive(Parser, Debug)]
#[command(name = "xtrain")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Training data (CSV or Parquet), including the target column
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Base URL of the cloud service
    #[arg(long, global = true, env = "XTRAIN_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// API key for the cloud service. Prompted for when absent.
    #[arg(long, global = true, env = "XTRAIN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Columns with fewer distinct values than this are offered as targets
    #[arg(long, default_value = "20", value_parser = validate_cardinality)]
    pub target_threshold: usize,

    /// Columns with fewer distinct values than this are offered as partitions
    #[arg(long, default_value = "11", value_parser = validate_cardinality)]
    pub partition_threshold: usize,

    /// Compute machine as LABEL=ID; repeat for several. The first is selected.
    #[arg(long = "machine", value_parser = parse_machine)]
    pub machines: Vec<Machine>,

    /// Write the submitted configuration and model handle to this JSON file
    #[arg(long)]
    pub config_out: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Directory for log files. Defaults to the platform data directory.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List existing binary classification models
    Models,
    /// Check connectivity to the cloud service
    Ping,
}

impl Cli {
    pub fn thresholds(&self) -> CandidateThresholds {
        CandidateThresholds {
            target: self.target_threshold,
            partition: self.partition_threshold,
        }
    }
}

/// Validator for candidate cardinality thresholds
fn validate_cardinality(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value < 2 {
        Err(format!(
            "threshold must be at least 2 to admit any column, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Parser for LABEL=ID machine specs
fn parse_machine(s: &str) -> Result<Machine, String> {
    let (label, id) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' should look like LABEL=ID", s))?;
    let (label, id) = (label.trim(), id.trim());
    if label.is_empty() || id.is_empty() {
        return Err(format!("'{}' has an empty label or id", s));
    }
    Ok(Machine {
        label: label.to_string(),
        id: id.to_string(),
    })
}
