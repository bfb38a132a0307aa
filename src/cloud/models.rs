//! Listing existing models

use serde::Deserialize;
use tracing::debug;

use super::{CloudError, CloudSession, FetchError, ModelCatalog};
use crate::form::ModelListing;

/// Model type the form trains and offers for reuse
pub const BINARY_CLASSIFICATION: &str = "binary_classification";

#[derive(Debug, Deserialize)]
struct RemoteModel {
    model_name: String,
    #[serde(default)]
    model_description: Option<String>,
    #[serde(default)]
    model_type: String,
}

impl From<RemoteModel> for ModelListing {
    fn from(remote: RemoteModel) -> Self {
        ModelListing {
            name: remote.model_name,
            description: remote.model_description.unwrap_or_default(),
            model_type: remote.model_type,
        }
    }
}

impl ModelCatalog for CloudSession {
    fn list_models(&self) -> Result<Vec<ModelListing>, FetchError> {
        let response = self.get("v1/models").call().map_err(CloudError::from)?;
        let models: Vec<RemoteModel> = response.into_json().map_err(CloudError::from)?;
        debug!(count = models.len(), "fetched model listing");
        Ok(models.into_iter().map(ModelListing::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_list_models_decodes_listing() {
        let body = r#"[
            {"model_name": "churn", "model_description": "Churn v2", "model_type": "binary_classification"},
            {"model_name": "price", "model_description": null, "model_type": "regression"}
        ]"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let session = CloudSession::new(serve_once(response), "key");

        let models = session.list_models().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "churn");
        assert_eq!(models[0].description, "Churn v2");
        assert_eq!(models[1].description, "", "null description should decode as empty");
        assert_eq!(models[1].model_type, "regression");
    }

    #[test]
    fn test_list_models_surfaces_status_errors() {
        let response =
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 7\r\n\r\ndenied!".to_string();
        let session = CloudSession::new(serve_once(response), "bad-key");

        let err = session.list_models().unwrap_err();
        assert!(
            matches!(err.0, CloudError::Status { status: 401, .. }),
            "expected status error, got {err:?}"
        );
    }
}
