//! Tests for the training summary and configuration export

use std::time::Duration;

use chrono::Local;
use tempfile::TempDir;
use xtrain::cloud::FittedModel;
use xtrain::form::{Hyperparameters, ModelConfig, OptimiseMetric, ParameterSet, SearchSpace};
use xtrain::report::{export_config, TrainingSummary};

fn fixed_config() -> ModelConfig {
    ModelConfig {
        model_name: "churn".to_string(),
        model_description: "monthly churn".to_string(),
        partition_on: None,
        bin_alpha: 0.05,
        validation_size: 0.2,
        parameters: ParameterSet::Fixed(Hyperparameters {
            max_depth: 12,
            min_leaf_size: 0.015,
            min_info_gain: 0.015,
        }),
    }
}

fn model() -> FittedModel {
    FittedModel {
        model_id: "mdl-9".to_string(),
        version_id: "ver-3".to_string(),
        model_name: "churn".to_string(),
    }
}

fn lookup<'a>(rows: &'a [(String, String)], key: &str) -> Option<&'a str> {
    rows.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_summary_rows_fixed_mode() {
    let summary = TrainingSummary {
        model: model(),
        config: fixed_config(),
        target: "churn".to_string(),
        id_columns: vec![],
        rows: 1200,
        elapsed: Duration::from_millis(2500),
        finished_at: Local::now(),
    };
    let rows = summary.rows();

    assert_eq!(lookup(&rows, "Model ID"), Some("mdl-9"));
    assert_eq!(lookup(&rows, "Version ID"), Some("ver-3"));
    assert_eq!(lookup(&rows, "ID Columns"), Some("-"));
    assert_eq!(lookup(&rows, "max_depth"), Some("12"));
    assert_eq!(lookup(&rows, "Duration"), Some("2.5s"));
    assert!(lookup(&rows, "metric").is_none());
}

#[test]
fn test_summary_rows_search_mode() {
    let mut config = fixed_config();
    config.parameters = ParameterSet::Search(SearchSpace {
        max_depth_range: (4, 22),
        max_depth_step: 1,
        min_leaf_size_range: (0.005, 0.08),
        min_leaf_size_step: 0.005,
        min_info_gain_range: (0.005, 0.08),
        min_info_gain_step: 0.005,
        n_trials: 30,
        early_stopping: 15,
        optimise_metric: OptimiseMetric::MacroF1,
    });
    let summary = TrainingSummary {
        model: model(),
        config,
        target: "churn".to_string(),
        id_columns: vec!["source".to_string()],
        rows: 10,
        elapsed: Duration::from_secs(1),
        finished_at: Local::now(),
    };
    let rows = summary.rows();

    assert_eq!(lookup(&rows, "metric"), Some("macro-f1"));
    assert_eq!(lookup(&rows, "ID Columns"), Some("source"));
    assert!(lookup(&rows, "max_depth").is_none());
}

#[test]
fn test_export_config_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    export_config(&path, &model(), "churn", &["source".to_string()], &fixed_config()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["model"]["model_id"], "mdl-9");
    assert_eq!(value["target"], "churn");
    assert_eq!(value["id_columns"][0], "source");
    assert_eq!(value["config"]["parameters"]["mode"], "fixed");
    assert_eq!(value["config"]["parameters"]["max_depth"], 12);

    let restored: ModelConfig = serde_json::from_value(value["config"].clone()).unwrap();
    assert_eq!(restored, fixed_config());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nope").join("config.json");

    let result = export_config(&path, &model(), "churn", &[], &fixed_config());
    assert!(result.is_err());
}
