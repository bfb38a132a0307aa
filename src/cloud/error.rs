//! Errors raised by calls into the cloud service

use polars::prelude::PolarsError;
use thiserror::Error;

/// Failure of a single request against the cloud API
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(#[from] std::io::Error),
    #[error("failed to encode training data: {0}")]
    Encode(#[from] PolarsError),
    #[error("service rejected the request: {0}")]
    Rejected(String),
}

impl From<ureq::Error> for CloudError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => CloudError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => CloudError::Transport(transport.to_string()),
        }
    }
}

/// Listing existing models failed; the selector degrades to empty
#[derive(Debug, Error)]
#[error("failed to fetch models: {0}")]
pub struct FetchError(#[from] pub CloudError);

/// Connectivity probe failed; the status degrades to offline
#[derive(Debug, Error)]
#[error("connectivity probe failed: {0}")]
pub struct ProbeError(#[from] pub CloudError);
