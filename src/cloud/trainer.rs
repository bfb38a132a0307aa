//! Remote fit of a binary classifier

use polars::prelude::*;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use super::{CloudError, CloudSession, FittedModel, Trainer, TrainingRequest};
use crate::form::{ModelConfig, ParameterSet};

const TRAIN_PATH: &str = "v1/models/binary-classification/train";

#[derive(Debug, Deserialize)]
struct TrainResponse {
    model_id: String,
    version_id: String,
}

/// Flatten a configuration into the attribute names the service expects.
///
/// Only the active parameter group is included; search ranges travel as
/// `[low, high, step]` triples.
pub fn config_payload(config: &ModelConfig) -> Value {
    let mut payload = Map::new();
    payload.insert("model_name".into(), json!(config.model_name));
    payload.insert("model_description".into(), json!(config.model_description));
    payload.insert("partition_on".into(), json!(config.partition_on));
    payload.insert("bin_alpha".into(), json!(config.bin_alpha));
    payload.insert("validation_size".into(), json!(config.validation_size));
    payload.insert("optimise".into(), json!(config.is_optimised()));

    match &config.parameters {
        ParameterSet::Fixed(hp) => {
            payload.insert("max_depth".into(), json!(hp.max_depth));
            payload.insert("min_leaf_size".into(), json!(hp.min_leaf_size));
            payload.insert("min_info_gain".into(), json!(hp.min_info_gain));
        }
        ParameterSet::Search(space) => {
            let (lo, hi) = space.max_depth_range;
            payload.insert(
                "max_depth_space".into(),
                json!([lo, hi, space.max_depth_step]),
            );
            let (lo, hi) = space.min_leaf_size_range;
            payload.insert(
                "min_leaf_size_space".into(),
                json!([lo, hi, space.min_leaf_size_step]),
            );
            let (lo, hi) = space.min_info_gain_range;
            payload.insert(
                "min_info_gain_space".into(),
                json!([lo, hi, space.min_info_gain_step]),
            );
            payload.insert("n_trials".into(), json!(space.n_trials));
            payload.insert("early_stopping".into(), json!(space.early_stopping));
            payload.insert("opt_metric".into(), json!(space.optimise_metric.as_str()));
        }
    }

    Value::Object(payload)
}

/// Re-join features and labels and render them as CSV for upload
fn encode_training_data(request: &TrainingRequest<'_>) -> Result<String, CloudError> {
    let mut frame = request.features.clone();
    frame.with_column(request.labels.clone())?;

    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(&mut frame)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// A 2xx reply that doesn't name the trained model is still a failed fit
fn decode_train_response(body: &str) -> Result<TrainResponse, CloudError> {
    serde_json::from_str(body)
        .map_err(|err| CloudError::Rejected(format!("unexpected train response: {err}")))
}

impl Trainer for CloudSession {
    #[instrument(skip_all, fields(model = %request.config.model_name, rows = request.features.height()))]
    fn fit(&self, request: TrainingRequest<'_>) -> Result<FittedModel, CloudError> {
        let data_csv = encode_training_data(&request)?;
        let body = json!({
            "config": config_payload(request.config),
            "target": request.labels.name().as_str(),
            "id_columns": request.id_columns,
            "data_csv": data_csv,
        });

        let response = self.post(TRAIN_PATH).send_json(body)?;
        let trained = decode_train_response(&response.into_string()?)?;
        info!(model_id = %trained.model_id, version_id = %trained.version_id, "model trained");

        Ok(FittedModel {
            model_id: trained.model_id,
            version_id: trained.version_id,
            model_name: request.config.model_name.clone(),
        })
    }
}
