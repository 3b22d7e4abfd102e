//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use fincast_core::test_utils::{
    completed_prediction, sample_actuals, sample_baseline, sample_lifecycle_factor,
    sample_lifecycle_model, sample_model_values, sample_reference, sample_risk_dimensions,
    sample_risk_factor, sample_weights,
};
use fincast_core::{
    Category, CategoryValues, EngineConfig, HybridPrediction, HybridPredictionCoordinator,
    MockPredictionSource, PredictionStatus, RiskLevel,
};
use serde::Serialize;
use tempfile::TempDir;

use crate::commands::{self, PredictArgs, ProfileSnapshot};

fn write_json<T: Serialize>(dir: &TempDir, name: &str, value: &T) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn sample_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        user_id: 1,
        baseline: Some(sample_baseline()),
        reference: Some(sample_reference()),
        risk_factor: Some(sample_risk_factor()),
        risk_dimensions: Some(sample_risk_dimensions()),
        lifecycle_model: Some(sample_lifecycle_model()),
        lifecycle_factor: Some(sample_lifecycle_factor()),
    }
}

fn model_payload(values: &CategoryValues) -> serde_json::Value {
    serde_json::json!({
        "source_id": "advisor",
        "generated_at": "2026-03-01T12:00:00Z",
        "values": values,
    })
}

fn predict_args(dir: &TempDir, model: &Path) -> PredictArgs {
    PredictArgs {
        profile: write_json(dir, "profile.json", &sample_profile()),
        weights: write_json(dir, "weights.json", &sample_weights()),
        model: model.to_path_buf(),
        previous: None,
        id: 1,
        prediction_type: "budget".to_string(),
        output: None,
    }
}

fn coordinator() -> HybridPredictionCoordinator {
    HybridPredictionCoordinator::from_config(&EngineConfig::embedded().unwrap().prediction).unwrap()
}

// ========== Config Command Tests ==========

#[test]
fn test_load_config_missing_explicit_path() {
    let dir = TempDir::new().unwrap();
    let result = commands::load_config(Some(&dir.path().join("missing.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_config_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(&path, "[prediction]\nversion = \"test-v\"\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.prediction.version, "test-v");
}

#[test]
fn test_cmd_config_defaults() {
    assert!(commands::cmd_config(None, true).is_ok());
}

// ========== Assess Command Tests ==========

#[test]
fn test_assess_profile() {
    let config = EngineConfig::embedded().unwrap();
    let assessment = commands::assess_profile(&sample_profile(), &config).unwrap();

    assert_eq!(assessment.risk_metrics.len(), 2);
    let risk = assessment.risk.unwrap();
    // income 0.39 and investment 0.51 filled from metrics
    assert!((risk.overall_score.unwrap() - 0.4075).abs() < 1e-9);
    assert_eq!(risk.risk_level, Some(RiskLevel::Moderate));

    // 0.8*0.4 + 0.6*0.3 + 0.5*0.3
    assert!((assessment.lifecycle_score.unwrap() - 0.65).abs() < 1e-9);
    assert!(!assessment.stage_weights.unwrap().is_zero());
}

#[test]
fn test_assess_empty_profile() {
    let config = EngineConfig::embedded().unwrap();
    let assessment = commands::assess_profile(&ProfileSnapshot::default(), &config).unwrap();

    assert!(assessment.risk.is_none());
    assert!(assessment.risk_metrics.is_empty());
    assert!(assessment.lifecycle_score.is_none());
}

#[test]
fn test_cmd_assess_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, "profile.json", &sample_profile());
    assert!(commands::cmd_assess(None, &path).is_ok());
}

#[test]
fn test_cmd_assess_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(commands::cmd_assess(None, &path).is_err());
}

// ========== Predict Command Tests ==========

#[tokio::test]
async fn test_run_prediction_with_file_source() {
    let dir = TempDir::new().unwrap();
    let model = write_json(&dir, "model.json", &model_payload(&sample_model_values()));
    let args = predict_args(&dir, &model);
    let source = commands::FilePredictionSource::new(&model);

    let prediction = commands::run_prediction(&coordinator(), &args, &source)
        .await
        .unwrap();

    assert_eq!(prediction.status, PredictionStatus::Completed);
    assert_eq!(prediction.model_source_id.as_deref(), Some("advisor"));
    assert_eq!(prediction.results.len(), 3);
}

#[tokio::test]
async fn test_run_prediction_with_missing_model_file() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("absent.json");
    let args = predict_args(&dir, &model);
    let source = commands::FilePredictionSource::new(&model);

    let prediction = commands::run_prediction(&coordinator(), &args, &source)
        .await
        .unwrap();

    assert_eq!(prediction.status, PredictionStatus::Failed);
    assert!(prediction.failure_reason.is_some());
}

#[tokio::test]
async fn test_run_prediction_with_mock_source() {
    let dir = TempDir::new().unwrap();
    let args = predict_args(&dir, &dir.path().join("unused.json"));
    let source = MockPredictionSource::new(sample_model_values());

    let prediction = commands::run_prediction(&coordinator(), &args, &source)
        .await
        .unwrap();
    assert_eq!(prediction.status, PredictionStatus::Completed);
}

#[tokio::test]
async fn test_run_prediction_unknown_type() {
    let dir = TempDir::new().unwrap();
    let mut args = predict_args(&dir, &dir.path().join("unused.json"));
    args.prediction_type = "horoscope".to_string();

    let result =
        commands::run_prediction(&coordinator(), &args, &MockPredictionSource::echo()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_predict_writes_output() {
    let dir = TempDir::new().unwrap();
    let model = write_json(&dir, "model.json", &model_payload(&sample_model_values()));
    let mut args = predict_args(&dir, &model);
    let output = dir.path().join("prediction.json");
    args.output = Some(output.clone());

    commands::cmd_predict(None, &args).await.unwrap();

    let saved: HybridPrediction =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved.status, PredictionStatus::Completed);
    assert_eq!(saved.iteration, 1);

    // Continue the lineage from the saved prediction
    args.previous = Some(output.clone());
    args.id = 2;
    args.output = Some(dir.path().join("second.json"));
    commands::cmd_predict(None, &args).await.unwrap();

    let second: HybridPrediction = serde_json::from_str(
        &fs::read_to_string(dir.path().join("second.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(second.iteration, 2);
}

// ========== Validate / Calibrate Command Tests ==========

#[test]
fn test_validate_prediction_commits_confidence() {
    let mut prediction = completed_prediction(5, sample_model_values());
    let output = commands::validate_prediction(&mut prediction, &sample_actuals()).unwrap();

    assert_eq!(output.prediction_id, 5);
    assert!(output.confidence_score.is_some());
    assert_eq!(prediction.confidence_score, output.confidence_score);
}

#[test]
fn test_validate_without_actuals_keeps_confidence() {
    let mut prediction = completed_prediction(5, sample_model_values());
    let output = commands::validate_prediction(&mut prediction, &CategoryValues::new()).unwrap();

    assert!(output.confidence_score.is_none());
    assert_eq!(prediction.confidence_score, Some(1.0));
}

#[test]
fn test_cmd_validate_writes_updated_prediction() {
    let dir = TempDir::new().unwrap();
    let prediction = write_json(
        &dir,
        "prediction.json",
        &completed_prediction(5, sample_model_values()),
    );
    let actuals = write_json(&dir, "actuals.json", &sample_actuals());
    let output = dir.path().join("validated.json");

    commands::cmd_validate(&prediction, &actuals, Some(&output)).unwrap();

    let saved: HybridPrediction =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(saved.confidence_score.unwrap() < 1.0);
}

#[test]
fn test_calibrate_prediction() {
    let prediction = completed_prediction(5, sample_model_values());
    let factors: CategoryValues = [(Category::Food, 0.9)].into_iter().collect();

    let calibration = commands::calibrate_prediction(&prediction, &factors).unwrap();
    assert!((calibration.calibrated_values[&Category::Food] - 1260.0).abs() < 1e-9);
    assert_eq!(calibration.calibration_factors[&Category::Income], 1.0);
}

#[test]
fn test_calibrate_rejects_pending_prediction() {
    let mut prediction = completed_prediction(5, sample_model_values());
    prediction.status = PredictionStatus::Pending;
    assert!(commands::calibrate_prediction(&prediction, &CategoryValues::new()).is_err());
}

// ========== Budget Command Tests ==========

#[test]
fn test_budget_report_plain() {
    let config = EngineConfig::embedded().unwrap();
    let budgets: CategoryValues = [(Category::Food, 1000.0)].into_iter().collect();
    let actuals: CategoryValues = [(Category::Food, 800.0)].into_iter().collect();

    let output = commands::budget_report(&budgets, &actuals, None, &config).unwrap();
    let food = output.report.get(Category::Food).unwrap();
    assert_eq!(food.variance, 200.0);
    assert!((food.variance_percentage - 20.0).abs() < 1e-9);
    assert!(output.weighted_confidence.is_none());
}

#[test]
fn test_budget_report_weighted_by_profile() {
    let config = EngineConfig::embedded().unwrap();
    let budgets: CategoryValues = [(Category::Food, 1000.0), (Category::Savings, 400.0)]
        .into_iter()
        .collect();
    let actuals: CategoryValues = [(Category::Food, 800.0), (Category::Savings, 400.0)]
        .into_iter()
        .collect();

    let output =
        commands::budget_report(&budgets, &actuals, Some(&sample_profile()), &config).unwrap();
    assert!(output.weighted_confidence.is_some());
}

#[test]
fn test_cmd_budget_rejects_negative_budget() {
    let dir = TempDir::new().unwrap();
    let budgets: CategoryValues = [(Category::Food, -5.0)].into_iter().collect();
    let budgets = write_json(&dir, "budgets.json", &budgets);
    let actuals = write_json(&dir, "actuals.json", &CategoryValues::new());

    assert!(commands::cmd_budget(None, &budgets, &actuals, None).is_err());
}
