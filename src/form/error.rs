//! Errors raised by form edits and submission

use polars::prelude::PolarsError;
use thiserror::Error;

use super::state::SubmissionState;
use crate::cloud::CloudError;

/// An edit the form refused; state is left unchanged
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("form is no longer editable ({0:?})")]
    NotEditing(SubmissionState),
    #[error("model identity is frozen while the model is submitted")]
    IdentityFrozen,
    #[error("{0} is not shown in the current mode")]
    Hidden(&'static str),
    #[error("'{column}' is not a valid {role} column")]
    NotACandidate { column: String, role: &'static str },
    #[error("'{0}' cannot be both the target and an ID column")]
    TargetIdOverlap(String),
    #[error("no entry at position {0}")]
    NoSuchEntry(usize),
}

/// Submission failure; fatal to the form instance that raised it
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("submission is disabled until a target column is selected")]
    TargetNotSelected,
    #[error("form cannot be submitted from the {0:?} state")]
    NotEditing(SubmissionState),
    #[error("failed to split dataset on target '{target}': {source}")]
    Dataset {
        target: String,
        #[source]
        source: PolarsError,
    },
    #[error("model '{model_name}' failed to fit: {source}")]
    Fit {
        model_name: String,
        #[source]
        source: CloudError,
    },
}
