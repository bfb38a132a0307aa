//! Configuration form controller
//!
//! Reacts to edits, keeps the visibility and enablement invariants, and
//! runs the single submission. It never touches the terminal; the screen
//! calls into it and renders `FormState`.

use polars::prelude::DataFrame;
use tracing::{debug, error, info, warn};

use super::config::{ModelConfig, ParameterSet};
use super::error::{FormError, TrainingError};
use super::state::{
    BodyTab, ConnectionStatus, FormState, Machine, ModelMode, ScreenDisplay, SubmissionState,
    Visibility,
};
use crate::cloud::{
    FittedModel, HealthProbe, ModelCatalog, ProbeError, Trainer, TrainingRequest,
    BINARY_CLASSIFICATION,
};
use crate::dataset::{split_features_labels, ColumnCandidates};

/// An adjustable numeric or choice field on the Parameters/Settings tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    MaxDepth,
    MinLeafSize,
    MinInfoGain,
    OptimiseMetric,
    NTrials,
    EarlyStopping,
    MaxDepthLow,
    MaxDepthHigh,
    MaxDepthStep,
    MinLeafSizeLow,
    MinLeafSizeHigh,
    MinLeafSizeStep,
    MinInfoGainLow,
    MinInfoGainHigh,
    MinInfoGainStep,
    BinAlpha,
    ValidationSize,
}

impl ParamField {
    const STANDARD: [ParamField; 3] = [
        ParamField::MaxDepth,
        ParamField::MinLeafSize,
        ParamField::MinInfoGain,
    ];

    const SEARCH: [ParamField; 12] = [
        ParamField::OptimiseMetric,
        ParamField::NTrials,
        ParamField::EarlyStopping,
        ParamField::MaxDepthLow,
        ParamField::MaxDepthHigh,
        ParamField::MaxDepthStep,
        ParamField::MinLeafSizeLow,
        ParamField::MinLeafSizeHigh,
        ParamField::MinLeafSizeStep,
        ParamField::MinInfoGainLow,
        ParamField::MinInfoGainHigh,
        ParamField::MinInfoGainStep,
    ];

    const SETTINGS: [ParamField; 2] = [ParamField::BinAlpha, ParamField::ValidationSize];

    pub fn label(&self) -> &'static str {
        match self {
            ParamField::MaxDepth => "max_depth",
            ParamField::MinLeafSize => "min_leaf_size",
            ParamField::MinInfoGain => "min_info_gain",
            ParamField::OptimiseMetric => "metric",
            ParamField::NTrials => "n_trials",
            ParamField::EarlyStopping => "early_stopping",
            ParamField::MaxDepthLow => "max_depth (low)",
            ParamField::MaxDepthHigh => "max_depth (high)",
            ParamField::MaxDepthStep => "max_depth (step)",
            ParamField::MinLeafSizeLow => "min_leaf_size (low)",
            ParamField::MinLeafSizeHigh => "min_leaf_size (high)",
            ParamField::MinLeafSizeStep => "min_leaf_size (step)",
            ParamField::MinInfoGainLow => "min_info_gain (low)",
            ParamField::MinInfoGainHigh => "min_info_gain (high)",
            ParamField::MinInfoGainStep => "min_info_gain (step)",
            ParamField::BinAlpha => "bin_alpha",
            ParamField::ValidationSize => "validation_size",
        }
    }

    fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }

    fn is_settings(&self) -> bool {
        Self::SETTINGS.contains(self)
    }
}

/// Drives one training form from open to close
#[derive(Debug)]
pub struct FormController {
    state: FormState,
    candidates: ColumnCandidates,
    host: String,
}

impl FormController {
    /// Open a form over a dataset's candidate columns.
    ///
    /// The first machine, if any, is selected.
    pub fn new(candidates: ColumnCandidates, machines: Vec<Machine>, host: impl Into<String>) -> Self {
        let host: String = host.into();
        let selected_machine = if machines.is_empty() { None } else { Some(0) };
        let state = FormState {
            machines,
            selected_machine,
            ..FormState::default()
        };
        Self {
            state,
            candidates,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn candidates(&self) -> &ColumnCandidates {
        &self.candidates
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn visibility(&self) -> Visibility {
        self.state.visibility()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state.submit_enabled()
    }

    fn ensure_editing(&self) -> Result<(), FormError> {
        match self.state.submission_state {
            SubmissionState::Editing => Ok(()),
            other => Err(FormError::NotEditing(other)),
        }
    }

    fn ensure_identity_editable(&self) -> Result<(), FormError> {
        self.ensure_editing()?;
        if self.state.identity_frozen {
            return Err(FormError::IdentityFrozen);
        }
        Ok(())
    }

    fn clear_identity(&mut self) {
        self.state.model_name.clear();
        self.state.model_description.clear();
        self.state.description_display.clear();
    }

    // ------------------------------------------------------------------------
    // Header: mode, identity, machine, connectivity
    // ------------------------------------------------------------------------

    /// Switch between typing a new identity and picking an existing model.
    ///
    /// Entering `Existing` fetches the listing; a failed fetch leaves the
    /// selector empty rather than failing the form.
    pub fn set_mode(&mut self, mode: ModelMode, catalog: &dyn ModelCatalog) -> Result<(), FormError> {
        self.ensure_identity_editable()?;

        self.state.mode = mode;
        self.state.selected_existing_model = None;
        self.clear_identity();

        match mode {
            ModelMode::Existing => {
                self.state.known_models = match catalog.list_models() {
                    Ok(models) => models
                        .into_iter()
                        .filter(|m| m.model_type == BINARY_CLASSIFICATION)
                        .collect(),
                    Err(err) => {
                        warn!(error = %err, "model listing unavailable");
                        Vec::new()
                    }
                };
                debug!(count = self.state.known_models.len(), "existing models loaded");
            }
            ModelMode::New => {
                self.state.known_models.clear();
            }
        }
        Ok(())
    }

    /// Pick an entry from the existing-model selector; `None` is the placeholder
    pub fn select_existing_model(&mut self, index: Option<usize>) -> Result<(), FormError> {
        self.ensure_identity_editable()?;
        if self.state.mode != ModelMode::Existing {
            return Err(FormError::Hidden("model selector"));
        }

        match index {
            None => {
                self.state.selected_existing_model = None;
                self.clear_identity();
            }
            Some(i) => {
                let model = self
                    .state
                    .known_models
                    .get(i)
                    .cloned()
                    .ok_or(FormError::NoSuchEntry(i))?;
                self.state.selected_existing_model = Some(i);
                self.state.model_name = model.name;
                self.state.description_display = model.description.clone();
                self.state.model_description = model.description;
            }
        }
        Ok(())
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) -> Result<(), FormError> {
        self.ensure_identity_editable()?;
        if self.state.mode != ModelMode::New {
            return Err(FormError::Hidden("model name"));
        }
        self.state.model_name = name.into();
        Ok(())
    }

    pub fn set_model_description(&mut self, description: impl Into<String>) -> Result<(), FormError> {
        self.ensure_identity_editable()?;
        if self.state.mode != ModelMode::New {
            return Err(FormError::Hidden("model description"));
        }
        self.state.model_description = description.into();
        Ok(())
    }

    /// Pin the session to another machine.
    ///
    /// Returns the machine id for the caller to apply to its session; the
    /// connection status resets until the follow-up probe reports back.
    pub fn select_machine(&mut self, index: usize) -> Result<String, FormError> {
        self.ensure_identity_editable()?;
        let machine = self
            .state
            .machines
            .get(index)
            .ok_or(FormError::NoSuchEntry(index))?;
        let id = machine.id.clone();
        self.state.selected_machine = Some(index);
        self.state.connection_status = ConnectionStatus::Unknown;
        Ok(id)
    }

    /// Probe the configured host synchronously and record the outcome
    pub fn check_connection(&mut self, probe: &dyn HealthProbe) -> ConnectionStatus {
        let result = probe.probe(&self.host);
        self.apply_probe_result(result)
    }

    /// Record a probe outcome produced elsewhere (e.g. on a worker thread)
    pub fn apply_probe_result(&mut self, result: Result<bool, ProbeError>) -> ConnectionStatus {
        self.state.connection_status = match result {
            Ok(true) => ConnectionStatus::Connected,
            Ok(false) => ConnectionStatus::Offline,
            Err(err) => {
                debug!(error = %err, "probe failed");
                ConnectionStatus::Offline
            }
        };
        self.state.connection_status
    }

    // ------------------------------------------------------------------------
    // Body: columns, optimise toggle, parameters
    // ------------------------------------------------------------------------

    pub fn select_target(&mut self, column: Option<String>) -> Result<(), FormError> {
        self.ensure_editing()?;
        if let Some(name) = &column {
            if !self.candidates.is_target(name) {
                return Err(FormError::NotACandidate {
                    column: name.clone(),
                    role: "target",
                });
            }
            if self.state.id_columns.contains(name) {
                return Err(FormError::TargetIdOverlap(name.clone()));
            }
        }
        self.state.target_column = column;
        Ok(())
    }

    /// Replace the ID column selection; the placeholder entry is ignored
    pub fn set_id_columns(&mut self, columns: Vec<String>) -> Result<(), FormError> {
        self.ensure_editing()?;
        if let Some(bad) = columns.iter().find(|c| !self.candidates.is_id(c)) {
            return Err(FormError::NotACandidate {
                column: bad.clone(),
                role: "ID",
            });
        }
        if let Some(target) = &self.state.target_column {
            if columns.contains(target) {
                return Err(FormError::TargetIdOverlap(target.clone()));
            }
        }
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        self.state.id_columns = unique;
        Ok(())
    }

    /// Add or remove one ID column
    pub fn toggle_id_column(&mut self, column: &str) -> Result<(), FormError> {
        let mut columns = self.state.id_columns.clone();
        match columns.iter().position(|c| c == column) {
            Some(pos) => {
                columns.remove(pos);
            }
            None => columns.push(column.to_string()),
        }
        self.set_id_columns(columns)
    }

    pub fn select_partition(&mut self, column: Option<String>) -> Result<(), FormError> {
        self.ensure_editing()?;
        if let Some(name) = &column {
            if !self.candidates.is_partition(name) {
                return Err(FormError::NotACandidate {
                    column: name.clone(),
                    role: "partition",
                });
            }
        }
        self.state.partition_column = column;
        Ok(())
    }

    /// Flip between the fixed-hyperparameter and search-space groups
    pub fn set_optimise(&mut self, enabled: bool) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.state.optimise_enabled = enabled;
        Ok(())
    }

    pub fn toggle_optimise(&mut self) -> Result<(), FormError> {
        self.set_optimise(!self.state.optimise_enabled)
    }

    pub fn switch_tab(&mut self) {
        self.state.active_tab = self.state.active_tab.toggled();
    }

    /// Fields shown on the current tab, in display order
    pub fn visible_fields(&self) -> Vec<ParamField> {
        match self.state.active_tab {
            BodyTab::Parameters if self.state.optimise_enabled => ParamField::SEARCH.to_vec(),
            BodyTab::Parameters => ParamField::STANDARD.to_vec(),
            BodyTab::Settings => ParamField::SETTINGS.to_vec(),
        }
    }

    fn ensure_field_visible(&self, field: ParamField) -> Result<(), FormError> {
        let vis = self.visibility();
        let visible = if field.is_settings() {
            true
        } else if field.is_standard() {
            vis.standard_params
        } else {
            vis.search_params
        };
        if visible {
            Ok(())
        } else {
            Err(FormError::Hidden(field.label()))
        }
    }

    /// Move a field by whole steps (negative moves down / back)
    pub fn nudge(&mut self, field: ParamField, steps: i64) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.ensure_field_visible(field)?;

        let hp = &mut self.state.hyperparameters;
        let space = &mut self.state.search_space;
        match field {
            ParamField::MaxDepth => {
                hp.max_depth.nudge(steps);
            }
            ParamField::MinLeafSize => {
                hp.min_leaf_size.nudge(steps);
            }
            ParamField::MinInfoGain => {
                hp.min_info_gain.nudge(steps);
            }
            ParamField::OptimiseMetric => {
                space.optimise_metric.nudge(steps);
            }
            ParamField::NTrials => {
                space.n_trials.nudge(steps);
            }
            ParamField::EarlyStopping => {
                space.early_stopping.nudge(steps);
            }
            ParamField::MaxDepthLow => {
                space.max_depth_range.nudge_low(steps);
            }
            ParamField::MaxDepthHigh => {
                space.max_depth_range.nudge_high(steps);
            }
            ParamField::MaxDepthStep => {
                space.max_depth_step.nudge(steps);
            }
            ParamField::MinLeafSizeLow => {
                space.min_leaf_size_range.nudge_low(steps);
            }
            ParamField::MinLeafSizeHigh => {
                space.min_leaf_size_range.nudge_high(steps);
            }
            ParamField::MinLeafSizeStep => {
                space.min_leaf_size_step.nudge(steps);
            }
            ParamField::MinInfoGainLow => {
                space.min_info_gain_range.nudge_low(steps);
            }
            ParamField::MinInfoGainHigh => {
                space.min_info_gain_range.nudge_high(steps);
            }
            ParamField::MinInfoGainStep => {
                space.min_info_gain_step.nudge(steps);
            }
            ParamField::BinAlpha => {
                self.state.bin_alpha.nudge(steps);
            }
            ParamField::ValidationSize => {
                self.state.validation_size.nudge(steps);
            }
        }
        Ok(())
    }

    /// Current value of a field, formatted for display
    pub fn field_value(&self, field: ParamField) -> String {
        let hp = &self.state.hyperparameters;
        let space = &self.state.search_space;
        let fraction = |v: f64, precision: usize| format!("{:.*}", precision, v);
        match field {
            ParamField::MaxDepth => hp.max_depth.value().to_string(),
            ParamField::MinLeafSize => {
                fraction(hp.min_leaf_size.value(), hp.min_leaf_size.precision())
            }
            ParamField::MinInfoGain => {
                fraction(hp.min_info_gain.value(), hp.min_info_gain.precision())
            }
            ParamField::OptimiseMetric => space.optimise_metric.value().to_string(),
            ParamField::NTrials => space.n_trials.value().to_string(),
            ParamField::EarlyStopping => space.early_stopping.value().to_string(),
            ParamField::MaxDepthLow => space.max_depth_range.bounds().0.to_string(),
            ParamField::MaxDepthHigh => space.max_depth_range.bounds().1.to_string(),
            ParamField::MaxDepthStep => space.max_depth_step.value().to_string(),
            ParamField::MinLeafSizeLow => fraction(
                space.min_leaf_size_range.bounds().0,
                space.min_leaf_size_range.precision(),
            ),
            ParamField::MinLeafSizeHigh => fraction(
                space.min_leaf_size_range.bounds().1,
                space.min_leaf_size_range.precision(),
            ),
            ParamField::MinLeafSizeStep => fraction(space.min_leaf_size_step.value(), 3),
            ParamField::MinInfoGainLow => fraction(
                space.min_info_gain_range.bounds().0,
                space.min_info_gain_range.precision(),
            ),
            ParamField::MinInfoGainHigh => fraction(
                space.min_info_gain_range.bounds().1,
                space.min_info_gain_range.precision(),
            ),
            ParamField::MinInfoGainStep => fraction(space.min_info_gain_step.value(), 3),
            ParamField::BinAlpha => fraction(self.state.bin_alpha.value(), 2),
            ParamField::ValidationSize => fraction(self.state.validation_size.value(), 2),
        }
    }

    /// Set the fixed hyperparameters (clamped to their slider ranges)
    pub fn set_hyperparameters(
        &mut self,
        max_depth: i64,
        min_leaf_size: f64,
        min_info_gain: f64,
    ) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.ensure_field_visible(ParamField::MaxDepth)?;
        let hp = &mut self.state.hyperparameters;
        hp.max_depth.set(max_depth);
        hp.min_leaf_size.set(min_leaf_size);
        hp.min_info_gain.set(min_info_gain);
        Ok(())
    }

    pub fn set_bin_alpha(&mut self, value: f64) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.state.bin_alpha.set(value);
        Ok(())
    }

    pub fn set_validation_size(&mut self, value: f64) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.state.validation_size.set(value);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Footer: submit and cancel
    // ------------------------------------------------------------------------

    /// Configuration reflecting the form as it stands; only the active
    /// parameter group is included
    pub fn build_config(&self) -> ModelConfig {
        let parameters = if self.state.optimise_enabled {
            ParameterSet::Search(self.state.search_space.values())
        } else {
            ParameterSet::Fixed(self.state.hyperparameters.values())
        };
        ModelConfig {
            model_name: self.state.model_name.clone(),
            model_description: self.state.model_description.clone(),
            partition_on: self.state.partition_column.clone(),
            bin_alpha: self.state.bin_alpha.value(),
            validation_size: self.state.validation_size.value(),
            parameters,
        }
    }

    /// Run the one training attempt this form allows.
    ///
    /// On success the body and footer are torn down and the form closes;
    /// on failure the whole screen is cleared and the form is left `Failed`.
    pub fn submit(
        &mut self,
        data: &DataFrame,
        trainer: &dyn Trainer,
    ) -> Result<FittedModel, TrainingError> {
        if self.state.submission_state != SubmissionState::Editing {
            return Err(TrainingError::NotEditing(self.state.submission_state));
        }
        let target = self
            .state
            .target_column
            .clone()
            .ok_or(TrainingError::TargetNotSelected)?;

        self.state.identity_frozen = true;
        self.state.submission_state = SubmissionState::Submitting;
        self.state.display = ScreenDisplay::HeaderOnly;

        let config = self.build_config();
        info!(
            model = %config.model_name,
            target = %target,
            optimise = config.is_optimised(),
            id_columns = self.state.id_columns.len(),
            "submitting model for training"
        );

        let result = split_features_labels(data, &target)
            .map_err(|source| TrainingError::Dataset {
                target: target.clone(),
                source,
            })
            .and_then(|(features, labels)| {
                trainer
                    .fit(TrainingRequest {
                        features: &features,
                        labels: &labels,
                        id_columns: &self.state.id_columns,
                        config: &config,
                    })
                    .map_err(|source| TrainingError::Fit {
                        model_name: config.model_name.clone(),
                        source,
                    })
            });

        match result {
            Ok(model) => {
                self.state.submission_state = SubmissionState::Closed;
                info!(model_id = %model.model_id, "training complete");
                Ok(model)
            }
            Err(err) => {
                self.state.submission_state = SubmissionState::Failed;
                self.state.display = ScreenDisplay::Cleared;
                error!(error = %err, "training failed");
                Err(err)
            }
        }
    }

    /// Close the form without training
    pub fn cancel(&mut self) -> Result<(), FormError> {
        self.ensure_editing()?;
        self.state.submission_state = SubmissionState::Closed;
        self.state.display = ScreenDisplay::Cleared;
        info!("form cancelled");
        Ok(())
    }
}
