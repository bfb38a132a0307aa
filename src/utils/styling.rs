//! Terminal styling utilities for output printed outside the form

use std::path::Path;

use console::{style, Emoji};

use crate::form::ConnectionStatus;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static CLOUD: Emoji<'_, '_> = Emoji("☁️  ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("xtrain").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Train explainable classifiers from the terminal").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the dataset/host card shown before the form opens
pub fn print_dataset_card(input: &Path, host: &str, rows: usize, cols: usize, memory_mb: f64) {
    println!("    {} Input:  {}", FOLDER, truncate_string(&input.display().to_string(), 44));
    println!("    {} Host:   {}", CLOUD, truncate_string(host, 44));
    println!(
        "    {} Shape:  {} rows × {} columns ({:.2} MB)",
        CHART,
        style(rows).yellow(),
        style(cols).yellow(),
        memory_mb
    );
    println!();
}

/// Print a connectivity status line
pub fn print_connection(host: &str, status: ConnectionStatus) {
    let badge = match status {
        ConnectionStatus::Connected => style(format!("[{}]", status)).green().bold(),
        ConnectionStatus::Offline => style(format!("[{}]", status)).red().bold(),
        ConnectionStatus::Unknown => style(format!("[{}]", status)).yellow(),
    };
    println!("    {} {}", badge, host);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Training complete!").green().bold()
    );
    println!();
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - max_len.saturating_sub(3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("/very/long/path/data.csv", 12), ".../data.csv");
    }
}
