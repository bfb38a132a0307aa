//! xtrain: Train explainable binary classifiers from the terminal
//!
//! Loads a dataset, opens the training form and submits the configured
//! model to the cloud service.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use xtrain::cli::{confirm_overwrite, prompt_api_key, run_form, Cli, Commands, ScreenExit};
use xtrain::cloud::{CloudSession, HealthProbe, ModelCatalog, BINARY_CLASSIFICATION};
use xtrain::dataset::{dataset_stats, load_dataset, ColumnCandidates};
use xtrain::form::{ConnectionStatus, FormController};
use xtrain::report::{display_models, export_config, TrainingSummary};
use xtrain::utils::{
    create_spinner, finish_with_error, finish_with_success, logging, print_banner,
    print_completion, print_connection, print_dataset_card, print_info, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match &cli.log_dir {
        Some(dir) => Ok(dir.clone()),
        None => logging::default_log_dir(),
    };
    match log_dir.and_then(|dir| logging::init(&dir)) {
        Ok(path) => debug!(path = %path.display(), "file logging enabled"),
        Err(e) => print_warning(&format!("File logging disabled: {}", e)),
    }

    if let Some(command) = &cli.command {
        return match command {
            Commands::Models => run_models(&cli),
            Commands::Ping => run_ping(&cli),
        };
    }

    let input = cli.input.as_deref().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    run_training(&cli, input)
}

fn resolve_api_key(cli: &Cli) -> Result<String> {
    match cli.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(key.to_string()),
        None => prompt_api_key()
            .context("An API key is required. Use --api-key or set XTRAIN_API_KEY."),
    }
}

fn open_session(cli: &Cli, api_key: String) -> CloudSession {
    let mut session = CloudSession::new(cli.host.clone(), api_key);
    if let Some(machine) = cli.machines.first() {
        session.set_machine(machine.id.clone());
    }
    session
}

fn run_models(cli: &Cli) -> Result<()> {
    let session = open_session(cli, resolve_api_key(cli)?);

    let pb = create_spinner("Fetching models...");
    let models = match session.list_models() {
        Ok(models) => models,
        Err(e) => {
            finish_with_error(&pb, "Could not fetch models");
            return Err(e).context("Failed to list models");
        }
    };
    let models: Vec<_> = models
        .into_iter()
        .filter(|m| m.model_type == BINARY_CLASSIFICATION)
        .collect();
    finish_with_success(&pb, &format!("{} binary classification models", models.len()));

    display_models(&models);
    Ok(())
}

fn run_ping(cli: &Cli) -> Result<()> {
    let session = open_session(cli, cli.api_key.clone().unwrap_or_default());
    let status = match session.probe(session.host()) {
        Ok(true) => ConnectionStatus::Connected,
        Ok(false) => ConnectionStatus::Offline,
        Err(e) => {
            debug!(error = %e, "probe failed");
            ConnectionStatus::Offline
        }
    };
    print_connection(session.host(), status);
    Ok(())
}

fn run_training(cli: &Cli, input: &Path) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    let pb = create_spinner("Loading dataset...");
    let df = match load_dataset(input, cli.infer_schema_length) {
        Ok(df) => df,
        Err(e) => {
            finish_with_error(&pb, "Could not load dataset");
            return Err(e);
        }
    };
    let (rows, cols, memory_mb) = dataset_stats(&df);
    finish_with_success(&pb, "Dataset loaded");
    print_dataset_card(input, &cli.host, rows, cols, memory_mb);

    let pb = create_spinner("Profiling columns...");
    let candidates = ColumnCandidates::from_stats(&df, cli.thresholds())
        .context("Failed to profile dataset columns")?;
    finish_with_success(&pb, "Columns profiled");
    if candidates.target.len() <= 1 {
        print_warning(&format!(
            "No column has fewer than {} distinct values; nothing can be used as a target",
            cli.target_threshold
        ));
    }

    let mut session = open_session(cli, resolve_api_key(cli)?);
    let mut controller = FormController::new(candidates, cli.machines.clone(), session.host());

    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());
    let label = format!("{} ({} rows × {} cols)", file_name, rows, cols);

    if run_form(&mut controller, &mut session, &label)? == ScreenExit::Cancel {
        print_info("Cancelled by user.");
        return Ok(());
    }

    let config = controller.build_config();
    let target = controller
        .state()
        .target_column
        .clone()
        .unwrap_or_default();
    let id_columns = controller.state().id_columns.clone();
    print_connection(session.host(), controller.state().connection_status);
    print_info(&format!(
        "Training '{}' on target '{}'",
        config.model_name, target
    ));

    let start = Instant::now();
    let pb = create_spinner("Training model...");
    let model = match controller.submit(&df, &session) {
        Ok(model) => model,
        Err(e) => {
            finish_with_error(&pb, "Training failed");
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();
    finish_with_success(&pb, &format!("Model {} trained", model.model_id));
    info!(elapsed_secs = elapsed.as_secs_f64(), "training finished");

    if let Some(path) = &cli.config_out {
        if !path.exists() || confirm_overwrite(path)? {
            export_config(path, &model, &target, &id_columns, &config)?;
            print_success(&format!("Configuration saved to {}", path.display()));
        }
    }

    TrainingSummary {
        model,
        config,
        target,
        id_columns,
        rows,
        elapsed,
        finished_at: Local::now(),
    }
    .display();

    print_completion();
    Ok(())
}
