//! Mutable state owned by the training form
//!
//! `FormState` mirrors every control on the screen. It is created once when
//! the form opens and only changes through `FormController`.

use std::fmt;

use super::config::{Hyperparameters, OptimiseMetric, SearchSpace};
use super::controls::{Choice, FloatRange, FloatSlider, IntRange, IntSlider};

static MAX_DEPTH_STEPS: [i64; 3] = [1, 2, 5];
static FRACTION_STEPS: [f64; 3] = [0.005, 0.01, 0.02];

// ============================================================================
// Enumerations
// ============================================================================

/// Whether the identity fields are typed in or picked from existing models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelMode {
    #[default]
    New,
    Existing,
}

impl ModelMode {
    pub fn label(&self) -> &'static str {
        match self {
            ModelMode::New => "New Model",
            ModelMode::Existing => "Existing Model",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ModelMode::New => ModelMode::Existing,
            ModelMode::Existing => ModelMode::New,
        }
    }
}

/// Result of the most recent connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Offline,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Unknown => "checking",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Offline => "Offline",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a single form instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Editing,
    Submitting,
    Closed,
    Failed,
}

/// Which parts of the screen are still on display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenDisplay {
    #[default]
    Full,
    /// Body and footer torn down, header left in place
    HeaderOnly,
    /// Everything torn down
    Cleared,
}

/// Tab shown in the right-hand side of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyTab {
    #[default]
    Parameters,
    Settings,
}

impl BodyTab {
    pub fn toggled(&self) -> Self {
        match self {
            BodyTab::Parameters => BodyTab::Settings,
            BodyTab::Settings => BodyTab::Parameters,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// An existing model offered by the selector
#[derive(Debug, Clone, PartialEq)]
pub struct ModelListing {
    pub name: String,
    pub description: String,
    pub model_type: String,
}

/// A compute machine the session can be pinned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub label: String,
    pub id: String,
}

// ============================================================================
// Control groups
// ============================================================================

/// Fixed-hyperparameter group (visible when optimisation is off)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperparameterControls {
    pub max_depth: IntSlider,
    pub min_leaf_size: FloatSlider,
    pub min_info_gain: FloatSlider,
}

impl Default for HyperparameterControls {
    fn default() -> Self {
        Self {
            max_depth: IntSlider::new(12, 2, 100, 1),
            min_leaf_size: FloatSlider::new(0.015, 0.001, 0.2, 0.001),
            min_info_gain: FloatSlider::new(0.015, 0.001, 0.2, 0.001),
        }
    }
}

impl HyperparameterControls {
    pub fn values(&self) -> Hyperparameters {
        Hyperparameters {
            max_depth: self.max_depth.value(),
            min_leaf_size: self.min_leaf_size.value(),
            min_info_gain: self.min_info_gain.value(),
        }
    }
}

/// Search-space group (visible when optimisation is on)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSpaceControls {
    pub max_depth_range: IntRange,
    pub max_depth_step: Choice<i64>,
    pub min_leaf_size_range: FloatRange,
    pub min_leaf_size_step: Choice<f64>,
    pub min_info_gain_range: FloatRange,
    pub min_info_gain_step: Choice<f64>,
    pub n_trials: IntSlider,
    pub early_stopping: IntSlider,
    pub optimise_metric: Choice<OptimiseMetric>,
}

impl Default for SearchSpaceControls {
    fn default() -> Self {
        Self {
            max_depth_range: IntRange::new(4, 22, 2, 100, 1),
            max_depth_step: Choice::new(&MAX_DEPTH_STEPS),
            min_leaf_size_range: FloatRange::new(0.005, 0.08, 0.005, 0.2, 0.005),
            min_leaf_size_step: Choice::new(&FRACTION_STEPS),
            min_info_gain_range: FloatRange::new(0.005, 0.08, 0.005, 0.2, 0.005),
            min_info_gain_step: Choice::new(&FRACTION_STEPS),
            n_trials: IntSlider::new(30, 5, 150, 5),
            early_stopping: IntSlider::new(15, 5, 50, 5),
            optimise_metric: Choice::new(&OptimiseMetric::ALL),
        }
    }
}

impl SearchSpaceControls {
    pub fn values(&self) -> SearchSpace {
        SearchSpace {
            max_depth_range: self.max_depth_range.bounds(),
            max_depth_step: self.max_depth_step.value(),
            min_leaf_size_range: self.min_leaf_size_range.bounds(),
            min_leaf_size_step: self.min_leaf_size_step.value(),
            min_info_gain_range: self.min_info_gain_range.bounds(),
            min_info_gain_step: self.min_info_gain_step.value(),
            n_trials: self.n_trials.value(),
            early_stopping: self.early_stopping.value(),
            optimise_metric: self.optimise_metric.value(),
        }
    }
}

// ============================================================================
// Form state
// ============================================================================

/// All mutable state behind the training form
#[derive(Debug, Clone)]
pub struct FormState {
    // Header
    pub mode: ModelMode,
    pub model_name: String,
    pub model_description: String,
    /// Read-only description shown beside the existing-model selector
    pub description_display: String,
    pub known_models: Vec<ModelListing>,
    pub selected_existing_model: Option<usize>,
    pub identity_frozen: bool,
    pub machines: Vec<Machine>,
    pub selected_machine: Option<usize>,
    pub connection_status: ConnectionStatus,

    // Body
    pub target_column: Option<String>,
    pub id_columns: Vec<String>,
    pub optimise_enabled: bool,
    pub hyperparameters: HyperparameterControls,
    pub search_space: SearchSpaceControls,
    pub partition_column: Option<String>,
    pub bin_alpha: FloatSlider,
    pub validation_size: FloatSlider,
    pub active_tab: BodyTab,

    // Lifecycle
    pub submission_state: SubmissionState,
    pub display: ScreenDisplay,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: ModelMode::New,
            model_name: String::new(),
            model_description: String::new(),
            description_display: String::new(),
            known_models: Vec::new(),
            selected_existing_model: None,
            identity_frozen: false,
            machines: Vec::new(),
            selected_machine: None,
            connection_status: ConnectionStatus::Unknown,
            target_column: None,
            id_columns: Vec::new(),
            optimise_enabled: false,
            hyperparameters: HyperparameterControls::default(),
            search_space: SearchSpaceControls::default(),
            partition_column: None,
            bin_alpha: FloatSlider::new(0.05, 0.01, 0.5, 0.01),
            validation_size: FloatSlider::new(0.2, 0.05, 0.5, 0.01),
            active_tab: BodyTab::Parameters,
            submission_state: SubmissionState::Editing,
            display: ScreenDisplay::Full,
        }
    }
}

/// Visibility of every toggleable region, derived from `FormState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub identity_fields: bool,
    pub model_selector: bool,
    pub standard_params: bool,
    pub search_params: bool,
    pub metric_selector: bool,
    pub header: bool,
    pub body: bool,
    pub footer: bool,
}

impl FormState {
    /// Visibility snapshot; the two parameter groups are exclusive by construction
    pub fn visibility(&self) -> Visibility {
        let search = self.optimise_enabled;
        let header = self.display != ScreenDisplay::Cleared;
        let body = self.display == ScreenDisplay::Full;
        Visibility {
            identity_fields: self.mode == ModelMode::New,
            model_selector: self.mode == ModelMode::Existing,
            standard_params: !search,
            search_params: search,
            metric_selector: search,
            header,
            body,
            footer: body,
        }
    }

    /// Enablement of the submit control: on exactly when a target is chosen
    pub fn submit_enabled(&self) -> bool {
        self.target_column.is_some()
    }

    /// Label above the ID column selector
    pub fn id_label(&self) -> String {
        format!("ID Column ({} selected)", self.id_columns.len())
    }

    pub fn selected_machine(&self) -> Option<&Machine> {
        self.selected_machine.and_then(|i| self.machines.get(i))
    }
}
