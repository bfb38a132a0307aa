//! Tests for the training form controller: visibility, identity and edits

use std::cell::RefCell;

use xtrain::cloud::{CloudSession, HealthProbe, ProbeError};
use xtrain::dataset::{CandidateThresholds, ColumnCandidates};
use xtrain::form::{
    BodyTab, ConnectionStatus, FormController, FormError, ModelMode, OptimiseMetric, ParamField,
    SubmissionState,
};

#[path = "common/mod.rs"]
mod common;

use common::{create_customer_dataframe, customer_form, MockCatalog, MockProbe};

/// Probe that remembers which host it was pointed at
#[derive(Default)]
struct HostRecorder {
    hosts: RefCell<Vec<String>>,
}

impl HealthProbe for HostRecorder {
    fn probe(&self, host: &str) -> Result<bool, ProbeError> {
        self.hosts.borrow_mut().push(host.to_string());
        Ok(true)
    }
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_exactly_one_parameter_group_visible() {
    let (mut form, _) = customer_form();

    for _ in 0..4 {
        let vis = form.visibility();
        assert!(
            vis.standard_params ^ vis.search_params,
            "Exactly one parameter group must be visible"
        );
        assert_eq!(vis.metric_selector, vis.search_params);
        form.toggle_optimise().unwrap();
    }
}

#[test]
fn test_initial_visibility() {
    let (form, _) = customer_form();
    let vis = form.visibility();

    assert!(vis.identity_fields, "New mode shows identity fields");
    assert!(!vis.model_selector, "New mode hides the model selector");
    assert!(vis.standard_params);
    assert!(!vis.search_params);
    assert!(vis.header && vis.body && vis.footer);
    assert_eq!(form.state().connection_status, ConnectionStatus::Unknown);
    assert_eq!(form.state().submission_state, SubmissionState::Editing);
}

#[test]
fn test_visible_fields_follow_tab_and_optimise() {
    let (mut form, _) = customer_form();

    assert_eq!(
        form.visible_fields(),
        vec![
            ParamField::MaxDepth,
            ParamField::MinLeafSize,
            ParamField::MinInfoGain
        ]
    );

    form.set_optimise(true).unwrap();
    let fields = form.visible_fields();
    assert_eq!(fields.len(), 12);
    assert_eq!(fields[0], ParamField::OptimiseMetric);

    form.switch_tab();
    assert_eq!(form.state().active_tab, BodyTab::Settings);
    assert_eq!(
        form.visible_fields(),
        vec![ParamField::BinAlpha, ParamField::ValidationSize]
    );
}

// ============================================================================
// Mode switch and identity
// ============================================================================

#[test]
fn test_mode_round_trip_clears_identity() {
    let (mut form, _) = customer_form();
    let catalog = MockCatalog::standard();

    form.set_model_name("churn").unwrap();
    form.set_model_description("monthly churn").unwrap();

    form.set_mode(ModelMode::Existing, &catalog).unwrap();
    form.select_existing_model(Some(0)).unwrap();
    form.set_mode(ModelMode::New, &catalog).unwrap();

    let state = form.state();
    assert_eq!(state.mode, ModelMode::New);
    assert_eq!(state.model_name, "", "Name should be empty after round trip");
    assert_eq!(state.model_description, "");
    assert!(form.visibility().identity_fields);
    assert!(!form.visibility().model_selector);
}

#[test]
fn test_existing_mode_lists_only_binary_classifiers() {
    let (mut form, _) = customer_form();
    let catalog = MockCatalog::standard();

    form.set_mode(ModelMode::Existing, &catalog).unwrap();

    let names: Vec<&str> = form
        .state()
        .known_models
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["churn-v1", "churn-v2"]);
    assert_eq!(form.state().selected_existing_model, None);
    assert_eq!(catalog.calls.get(), 1);
}

#[test]
fn test_select_existing_model_copies_identity() {
    let (mut form, _) = customer_form();
    form.set_mode(ModelMode::Existing, &MockCatalog::standard())
        .unwrap();

    form.select_existing_model(Some(1)).unwrap();
    let state = form.state();
    assert_eq!(state.model_name, "churn-v2");
    assert_eq!(state.model_description, "Second churn model");
    assert_eq!(state.description_display, "Second churn model");

    form.select_existing_model(None).unwrap();
    let state = form.state();
    assert_eq!(state.model_name, "");
    assert_eq!(state.model_description, "");
    assert_eq!(state.description_display, "");
}

#[test]
fn test_select_existing_model_out_of_range() {
    let (mut form, _) = customer_form();
    form.set_mode(ModelMode::Existing, &MockCatalog::standard())
        .unwrap();

    let err = form.select_existing_model(Some(5)).unwrap_err();
    assert_eq!(err, FormError::NoSuchEntry(5));
    assert_eq!(form.state().selected_existing_model, None);
}

#[test]
fn test_fetch_failure_leaves_empty_selector() {
    let (mut form, _) = customer_form();

    form.set_mode(ModelMode::Existing, &MockCatalog::failing())
        .unwrap();

    assert_eq!(form.state().mode, ModelMode::Existing);
    assert!(form.state().known_models.is_empty());
    assert!(form.select_existing_model(Some(0)).is_err());
}

#[test]
fn test_identity_edits_rejected_when_hidden() {
    let (mut form, _) = customer_form();

    assert!(matches!(
        form.select_existing_model(Some(0)),
        Err(FormError::Hidden(_))
    ));

    form.set_mode(ModelMode::Existing, &MockCatalog::standard())
        .unwrap();
    assert!(matches!(
        form.set_model_name("x"),
        Err(FormError::Hidden(_))
    ));
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_submit_enabled_iff_target_selected() {
    let (mut form, _) = customer_form();
    assert!(!form.submit_enabled());

    form.select_target(Some("churn".to_string())).unwrap();
    assert!(form.submit_enabled());

    form.select_target(None).unwrap();
    assert!(!form.submit_enabled());
}

#[test]
fn test_non_candidate_target_rejected() {
    let (mut form, _) = customer_form();

    let err = form.select_target(Some("age".to_string())).unwrap_err();
    assert!(matches!(err, FormError::NotACandidate { .. }));
    assert_eq!(form.state().target_column, None, "State left unchanged");
}

#[test]
fn test_id_columns_update_label() {
    let (mut form, _) = customer_form();
    assert_eq!(form.state().id_label(), "ID Column (0 selected)");

    form.toggle_id_column("source").unwrap();
    assert_eq!(form.state().id_label(), "ID Column (1 selected)");
    assert!(!form.submit_enabled(), "ID columns never enable submission");

    form.toggle_id_column("source").unwrap();
    assert_eq!(form.state().id_label(), "ID Column (0 selected)");

    assert!(form.set_id_columns(vec!["age".to_string()]).is_err());
}

#[test]
fn test_partition_candidates() {
    let (mut form, _) = customer_form();

    form.select_partition(Some("region".to_string())).unwrap();
    assert_eq!(form.state().partition_column.as_deref(), Some("region"));

    // 12 distinct plans is above the partition threshold of 11
    assert!(form.select_partition(Some("plan".to_string())).is_err());
    assert_eq!(form.state().partition_column.as_deref(), Some("region"));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_nudge_clamps_to_bounds() {
    let (mut form, _) = customer_form();

    form.nudge(ParamField::MaxDepth, 1000).unwrap();
    assert_eq!(form.field_value(ParamField::MaxDepth), "100");
    form.nudge(ParamField::MaxDepth, -1000).unwrap();
    assert_eq!(form.field_value(ParamField::MaxDepth), "2");

    form.nudge(ParamField::MinLeafSize, 1).unwrap();
    assert_eq!(form.field_value(ParamField::MinLeafSize), "0.016");
}

#[test]
fn test_hidden_group_cannot_be_edited() {
    let (mut form, _) = customer_form();

    assert!(matches!(
        form.nudge(ParamField::NTrials, 1),
        Err(FormError::Hidden(_))
    ));

    form.set_optimise(true).unwrap();
    assert!(form.nudge(ParamField::MaxDepth, 1).is_err());
    form.nudge(ParamField::NTrials, 2).unwrap();
    assert_eq!(form.field_value(ParamField::NTrials), "40");
}

#[test]
fn test_metric_cycles_through_options() {
    let (mut form, _) = customer_form();
    form.set_optimise(true).unwrap();

    assert_eq!(
        form.field_value(ParamField::OptimiseMetric),
        OptimiseMetric::WeightedF1.as_str()
    );
    form.nudge(ParamField::OptimiseMetric, -1).unwrap();
    assert_eq!(form.field_value(ParamField::OptimiseMetric), "precision");
}

#[test]
fn test_range_handles_never_cross() {
    let (mut form, _) = customer_form();
    form.set_optimise(true).unwrap();

    form.nudge(ParamField::MaxDepthLow, 50).unwrap();
    let (low, high) = form.state().search_space.max_depth_range.bounds();
    assert!(low <= high);
    assert_eq!((low, high), (22, 22));
}

#[test]
fn test_id_column_cannot_become_target() {
    let (mut form, _) = customer_form();
    form.set_id_columns(vec!["source".to_string()]).unwrap();

    let err = form.select_target(Some("source".to_string())).unwrap_err();
    assert_eq!(err, FormError::TargetIdOverlap("source".to_string()));
    assert_eq!(form.state().target_column, None, "State left unchanged");
    assert!(!form.submit_enabled());
}

#[test]
fn test_target_cannot_become_id_column() {
    let (mut form, _) = customer_form();
    form.select_target(Some("source".to_string())).unwrap();

    let err = form.toggle_id_column("source").unwrap_err();
    assert_eq!(err, FormError::TargetIdOverlap("source".to_string()));
    assert!(form.state().id_columns.is_empty());

    // Freeing the target makes the column available as an ID again
    form.select_target(Some("churn".to_string())).unwrap();
    form.toggle_id_column("source").unwrap();
    assert_eq!(form.state().id_columns, vec!["source".to_string()]);
}

// ============================================================================
// Machine and connectivity
// ============================================================================

#[test]
fn test_first_machine_selected_on_open() {
    let (form, _) = customer_form();
    assert_eq!(form.state().selected_machine().map(|m| m.id.as_str()), Some("m-cpu"));
}

#[test]
fn test_machine_change_resets_status() {
    let (mut form, _) = customer_form();
    form.check_connection(&MockProbe(Some(true)));
    assert_eq!(form.state().connection_status, ConnectionStatus::Connected);

    let id = form.select_machine(1).unwrap();
    assert_eq!(id, "m-gpu");
    assert_eq!(form.state().connection_status, ConnectionStatus::Unknown);

    assert_eq!(form.select_machine(7), Err(FormError::NoSuchEntry(7)));
}

#[test]
fn test_probe_outcomes() {
    let (mut form, _) = customer_form();

    assert_eq!(
        form.check_connection(&MockProbe(Some(true))),
        ConnectionStatus::Connected
    );
    assert_eq!(
        form.check_connection(&MockProbe(Some(false))),
        ConnectionStatus::Offline
    );
    assert_eq!(
        form.check_connection(&MockProbe(None)),
        ConnectionStatus::Offline,
        "Probe errors map to Offline"
    );
    assert!(!form.submit_enabled(), "Connectivity never enables submission");
}

#[test]
fn test_probe_targets_normalised_host() {
    let candidates =
        ColumnCandidates::from_stats(&create_customer_dataframe(), CandidateThresholds::default())
            .unwrap();
    let mut form = FormController::new(candidates, Vec::new(), "https://cloud.example.test/");
    let probe = HostRecorder::default();

    form.check_connection(&probe);

    assert_eq!(form.host(), "https://cloud.example.test");
    assert_eq!(
        form.host(),
        CloudSession::new("https://cloud.example.test/", "key").host()
    );
    assert_eq!(*probe.hosts.borrow(), vec!["https://cloud.example.test".to_string()]);
}

// ============================================================================
// Cancel
// ============================================================================

#[test]
fn test_cancel_closes_form() {
    let (mut form, _) = customer_form();
    form.cancel().unwrap();

    assert_eq!(form.state().submission_state, SubmissionState::Closed);
    let vis = form.visibility();
    assert!(!vis.header && !vis.body && !vis.footer);

    assert!(matches!(
        form.select_target(Some("churn".to_string())),
        Err(FormError::NotEditing(SubmissionState::Closed))
    ));
}
