//! Shared test utilities, fixtures and collaborator doubles

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use polars::prelude::*;
use tempfile::TempDir;

use xtrain::cloud::{
    CloudError, FetchError, FittedModel, HealthProbe, ModelCatalog, ProbeError, Trainer,
    TrainingRequest, BINARY_CLASSIFICATION,
};
use xtrain::dataset::{CandidateThresholds, ColumnCandidates, ColumnStats};
use xtrain::form::{FormController, Machine, ModelConfig, ModelListing};

pub const HOST: &str = "http://localhost:9";

/// Create a small customer table with known cardinalities
///
/// - `churn`: 2 distinct values (target and partition candidate)
/// - `region`: 3 distinct values (target and partition candidate)
/// - `plan`: 12 distinct values (target candidate only)
/// - `age`: 24 distinct values (not selectable)
/// - `source`: constant (ID candidate)
pub fn create_customer_dataframe() -> DataFrame {
    let rows = 24usize;
    let churn: Vec<i32> = (0..rows).map(|i| (i % 2) as i32).collect();
    let region: Vec<&str> = (0..rows).map(|i| ["north", "south", "east"][i % 3]).collect();
    let plan: Vec<String> = (0..rows).map(|i| format!("plan_{}", i % 12)).collect();
    let age: Vec<i64> = (0..rows).map(|i| 20 + i as i64).collect();
    let source: Vec<&str> = vec!["web"; rows];

    df! {
        "churn" => churn,
        "region" => region,
        "plan" => plan,
        "age" => age,
        "source" => source,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Column statistics given directly as (name, distinct count) pairs
pub struct StaticStats(pub Vec<(&'static str, usize)>);

impl ColumnStats for StaticStats {
    fn column_names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.to_string()).collect()
    }

    fn distinct_count(&self, column: &str) -> PolarsResult<usize> {
        self.0
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, n)| *n)
            .ok_or_else(|| PolarsError::ColumnNotFound(column.to_string().into()))
    }
}

pub fn listing(name: &str, description: &str, model_type: &str) -> ModelListing {
    ModelListing {
        name: name.to_string(),
        description: description.to_string(),
        model_type: model_type.to_string(),
    }
}

/// Model catalog returning a fixed listing, or failing when `models` is None
pub struct MockCatalog {
    pub models: Option<Vec<ModelListing>>,
    pub calls: Cell<usize>,
}

impl MockCatalog {
    pub fn with_models(models: Vec<ModelListing>) -> Self {
        Self {
            models: Some(models),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            models: None,
            calls: Cell::new(0),
        }
    }

    pub fn standard() -> Self {
        Self::with_models(vec![
            listing("churn-v1", "First churn model", BINARY_CLASSIFICATION),
            listing("price", "Price regressor", "regression"),
            listing("churn-v2", "Second churn model", BINARY_CLASSIFICATION),
        ])
    }
}

impl ModelCatalog for MockCatalog {
    fn list_models(&self) -> Result<Vec<ModelListing>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.models
            .clone()
            .ok_or_else(|| FetchError(CloudError::Transport("connection refused".to_string())))
    }
}

/// Probe with a canned answer; `None` simulates a transport failure
pub struct MockProbe(pub Option<bool>);

impl HealthProbe for MockProbe {
    fn probe(&self, _host: &str) -> Result<bool, ProbeError> {
        self.0
            .ok_or_else(|| ProbeError(CloudError::Transport("timed out".to_string())))
    }
}

/// What a trainer was handed for one fit
#[derive(Debug, Clone)]
pub struct RecordedFit {
    pub feature_columns: Vec<String>,
    pub label_name: String,
    pub label_len: usize,
    pub id_columns: Vec<String>,
    pub config: ModelConfig,
}

/// Trainer that records every request and succeeds
#[derive(Default)]
pub struct RecordingTrainer {
    pub fits: RefCell<Vec<RecordedFit>>,
}

impl Trainer for RecordingTrainer {
    fn fit(&self, request: TrainingRequest<'_>) -> Result<FittedModel, CloudError> {
        self.fits.borrow_mut().push(RecordedFit {
            feature_columns: request
                .features
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            label_name: request.labels.name().to_string(),
            label_len: request.labels.len(),
            id_columns: request.id_columns.to_vec(),
            config: request.config.clone(),
        });
        Ok(FittedModel {
            model_id: "mdl-1".to_string(),
            version_id: "ver-1".to_string(),
            model_name: request.config.model_name.clone(),
        })
    }
}

/// Trainer that always fails with a server error
#[derive(Default)]
pub struct FailingTrainer {
    pub calls: Cell<usize>,
}

impl Trainer for FailingTrainer {
    fn fit(&self, _request: TrainingRequest<'_>) -> Result<FittedModel, CloudError> {
        self.calls.set(self.calls.get() + 1);
        Err(CloudError::Status {
            status: 500,
            body: "internal error".to_string(),
        })
    }
}

pub fn machines() -> Vec<Machine> {
    vec![
        Machine {
            label: "cpu-small".to_string(),
            id: "m-cpu".to_string(),
        },
        Machine {
            label: "gpu-large".to_string(),
            id: "m-gpu".to_string(),
        },
    ]
}

/// Open a form over the customer table with default thresholds
pub fn customer_form() -> (FormController, DataFrame) {
    let df = create_customer_dataframe();
    let candidates = ColumnCandidates::from_stats(&df, CandidateThresholds::default()).unwrap();
    (FormController::new(candidates, machines(), HOST), df)
}
