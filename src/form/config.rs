//! Model configuration assembled from the form at submission time

use std::fmt;

use serde::{Deserialize, Serialize};

/// Metric the remote optimiser maximises during a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimiseMetric {
    WeightedF1,
    MacroF1,
    Accuracy,
    Recall,
    Precision,
}

impl OptimiseMetric {
    pub const ALL: [OptimiseMetric; 5] = [
        OptimiseMetric::WeightedF1,
        OptimiseMetric::MacroF1,
        OptimiseMetric::Accuracy,
        OptimiseMetric::Recall,
        OptimiseMetric::Precision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimiseMetric::WeightedF1 => "weighted-f1",
            OptimiseMetric::MacroF1 => "macro-f1",
            OptimiseMetric::Accuracy => "accuracy",
            OptimiseMetric::Recall => "recall",
            OptimiseMetric::Precision => "precision",
        }
    }
}

impl fmt::Display for OptimiseMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed hyperparameters used when optimisation is off
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub max_depth: i64,
    pub min_leaf_size: f64,
    pub min_info_gain: f64,
}

/// Search space explored when optimisation is on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub max_depth_range: (i64, i64),
    pub max_depth_step: i64,
    pub min_leaf_size_range: (f64, f64),
    pub min_leaf_size_step: f64,
    pub min_info_gain_range: (f64, f64),
    pub min_info_gain_step: f64,
    pub n_trials: i64,
    pub early_stopping: i64,
    pub optimise_metric: OptimiseMetric,
}

/// Exactly one parameter group travels with a configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParameterSet {
    Fixed(Hyperparameters),
    Search(SearchSpace),
}

/// Configuration record handed to the trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    pub model_description: String,
    pub partition_on: Option<String>,
    pub bin_alpha: f64,
    pub validation_size: f64,
    pub parameters: ParameterSet,
}

impl ModelConfig {
    pub fn is_optimised(&self) -> bool {
        matches!(self.parameters, ParameterSet::Search(_))
    }

    pub fn hyperparameters(&self) -> Option<&Hyperparameters> {
        match &self.parameters {
            ParameterSet::Fixed(hp) => Some(hp),
            ParameterSet::Search(_) => None,
        }
    }

    pub fn search_space(&self) -> Option<&SearchSpace> {
        match &self.parameters {
            ParameterSet::Search(space) => Some(space),
            ParameterSet::Fixed(_) => None,
        }
    }
}
