//! Validation and calibration of completed predictions

use std::path::Path;

use anyhow::{Context, Result};
use fincast_core::{
    Calibration, CalibrationEngine, CategoryValues, ConfidenceValidator, HybridPrediction,
    ValidationReport,
};
use serde::Serialize;

use super::{emit_json, read_json};

#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    pub prediction_id: i64,
    pub report: ValidationReport,
    /// Confidence committed to the prediction, if any category was comparable
    pub confidence_score: Option<f64>,
}

/// Validate and, when possible, commit the new confidence to the prediction
pub fn validate_prediction(
    prediction: &mut HybridPrediction,
    actuals: &CategoryValues,
) -> Result<ValidationOutput> {
    let validator = ConfidenceValidator::new();
    let report = validator
        .validate(prediction, actuals)
        .context("Validation failed")?;

    let confidence_score = match validator.apply(prediction, &report) {
        Ok(confidence) => Some(confidence),
        Err(e) if e.is_insufficient_input() => {
            tracing::warn!("{}", e);
            None
        }
        Err(e) => return Err(e).context("Failed to update confidence"),
    };

    if !report.negative_accuracy.is_empty() {
        tracing::warn!(
            "Prediction error exceeded the actual value for: {}",
            report
                .negative_accuracy
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(ValidationOutput {
        prediction_id: prediction.id,
        report,
        confidence_score,
    })
}

pub fn cmd_validate(
    prediction_path: &Path,
    actuals_path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut prediction: HybridPrediction = read_json(prediction_path)?;
    let actuals: CategoryValues = read_json(actuals_path)?;

    let result = validate_prediction(&mut prediction, &actuals)?;

    if let Some(path) = output {
        emit_json(&prediction, Some(path))?;
    }
    emit_json(&result, None)
}

pub fn calibrate_prediction(
    prediction: &HybridPrediction,
    factors: &CategoryValues,
) -> Result<Calibration> {
    CalibrationEngine::new()
        .calibrate(prediction, factors)
        .context("Calibration failed")
}

pub fn cmd_calibrate(prediction_path: &Path, factors_path: &Path) -> Result<()> {
    let prediction: HybridPrediction = read_json(prediction_path)?;
    let factors: CategoryValues = read_json(factors_path)?;

    let calibration = calibrate_prediction(&prediction, &factors)?;
    emit_json(&calibration, None)
}
