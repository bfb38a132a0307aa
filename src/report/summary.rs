//! Training summary and model listing tables

use std::time::Duration;

use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::cloud::FittedModel;
use crate::form::{ModelConfig, ModelListing, ParameterSet};

/// What was trained, on what, and how long it took
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub model: FittedModel,
    pub config: ModelConfig,
    pub target: String,
    pub id_columns: Vec<String>,
    pub rows: usize,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

impl TrainingSummary {
    /// Key/value rows shown in the summary table
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("Model".to_string(), self.config.model_name.clone()),
            ("Model ID".to_string(), self.model.model_id.clone()),
            ("Version ID".to_string(), self.model.version_id.clone()),
            ("Target".to_string(), self.target.clone()),
            (
                "ID Columns".to_string(),
                if self.id_columns.is_empty() {
                    "-".to_string()
                } else {
                    self.id_columns.join(", ")
                },
            ),
            (
                "Partition".to_string(),
                self.config
                    .partition_on
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Rows".to_string(), self.rows.to_string()),
        ];

        match &self.config.parameters {
            ParameterSet::Fixed(hp) => {
                rows.push(("Mode".to_string(), "fixed hyperparameters".to_string()));
                rows.push(("max_depth".to_string(), hp.max_depth.to_string()));
                rows.push(("min_leaf_size".to_string(), format!("{:.3}", hp.min_leaf_size)));
                rows.push(("min_info_gain".to_string(), format!("{:.3}", hp.min_info_gain)));
            }
            ParameterSet::Search(space) => {
                rows.push(("Mode".to_string(), "optimised search".to_string()));
                rows.push(("metric".to_string(), space.optimise_metric.to_string()));
                rows.push((
                    "trials".to_string(),
                    format!("{} (early stop {})", space.n_trials, space.early_stopping),
                ));
            }
        }

        rows.push(("bin_alpha".to_string(), format!("{:.2}", self.config.bin_alpha)));
        rows.push((
            "validation_size".to_string(),
            format!("{:.2}", self.config.validation_size),
        ));
        rows.push((
            "Duration".to_string(),
            format!("{:.1}s", self.elapsed.as_secs_f64()),
        ));
        rows.push((
            "Finished".to_string(),
            self.finished_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ));
        rows
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        for (key, value) in self.rows() {
            let cell = if key == "Model ID" {
                Cell::new(value).fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                Cell::new(value)
            };
            table.add_row(vec![Cell::new(key), cell]);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Print existing models as a table
pub fn display_models(models: &[ModelListing]) {
    if models.is_empty() {
        println!("    {}", style("No binary classification models found").dim());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Description").add_attribute(Attribute::Bold),
    ]);
    for (i, model) in models.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&model.name).fg(Color::Cyan),
            Cell::new(&model.description),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
