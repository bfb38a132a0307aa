//! CLI module - argument parsing, prompts and the training form screen

mod args;
mod prompts;
pub mod screen;

pub use args::{Cli, Commands};
pub use prompts::*;
pub use screen::{run_form, ScreenExit};
