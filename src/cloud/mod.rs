//! Cloud module - the remote collaborators behind the training form
//!
//! The form only talks to these traits. `CloudSession` implements all of
//! them over HTTP; tests substitute in-memory doubles.

mod error;
mod models;
mod probe;
mod session;
mod trainer;

use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};

use crate::form::{ModelConfig, ModelListing};

pub use error::{CloudError, FetchError, ProbeError};
pub use models::BINARY_CLASSIFICATION;
pub use session::{CloudSession, DEFAULT_HOST};
pub use trainer::config_payload;

/// Handle to a model trained by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedModel {
    pub model_id: String,
    pub version_id: String,
    #[serde(default)]
    pub model_name: String,
}

/// Everything the trainer receives for one fit
#[derive(Debug, Clone, Copy)]
pub struct TrainingRequest<'a> {
    pub features: &'a DataFrame,
    pub labels: &'a Column,
    pub id_columns: &'a [String],
    pub config: &'a ModelConfig,
}

/// Lists models already stored in the service
pub trait ModelCatalog {
    fn list_models(&self) -> Result<Vec<ModelListing>, FetchError>;
}

/// Checks whether the service host is reachable
pub trait HealthProbe {
    fn probe(&self, host: &str) -> Result<bool, ProbeError>;
}

/// Fits a binary classifier remotely
pub trait Trainer {
    fn fit(&self, request: TrainingRequest<'_>) -> Result<FittedModel, CloudError>;
}
