//! Form module - the training form's state machine
//!
//! - `FormState`: every control's value plus lifecycle state
//! - `FormController`: the only writer of `FormState`
//! - `ModelConfig`: the record assembled at submission

pub mod config;
pub mod controller;
pub mod controls;
pub mod error;
pub mod state;

pub use config::*;
pub use controller::{FormController, ParamField};
pub use error::{FormError, TrainingError};
pub use state::*;
