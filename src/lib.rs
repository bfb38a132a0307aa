//! xtrain: remote binary classifier training from the terminal
//!
//! Profiles a local dataset, lets the user configure a model in an
//! interactive form and submits the training job to the cloud service.

pub mod cli;
pub mod cloud;
pub mod dataset;
pub mod form;
pub mod report;
pub mod utils;
