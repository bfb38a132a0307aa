//! Utilities - terminal styling, progress spinners and logging

pub mod logging;
pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
