//! Interactive prompts using dialoguer

use std::path::Path;

use anyhow::Result;
use dialoguer::{Confirm, Password};

/// Ask for the API key without echoing it
pub fn prompt_api_key() -> Result<String> {
    let key = Password::new()
        .with_prompt("API key")
        .allow_empty_password(false)
        .interact()?;
    Ok(key.trim().to_string())
}

/// Confirm replacing an existing output file
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!("{} exists. Overwrite?", path.display()))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
