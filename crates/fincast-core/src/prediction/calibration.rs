//! Per-category calibration of completed predictions
//!
//! Calibration never mutates the prediction. [`CalibrationEngine::calibrate`]
//! returns a new [`Calibration`] record; committing it (and any confidence
//! change) is the caller's decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{mean, CategoryValues};

use super::types::{HybridPrediction, PredictionStatus};

/// How calibration moved each category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    /// `calibrated - original`
    pub value_changes: CategoryValues,
    /// Change relative to the original, in percent; omitted when original is 0
    pub percentage_changes: CategoryValues,
}

/// A calibration applied to one completed prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub prediction_id: i64,
    pub user_id: i64,
    pub original_values: CategoryValues,
    /// Categories without a factor use 1.0
    pub calibration_factors: CategoryValues,
    pub calibrated_values: CategoryValues,
    pub impact: ImpactMetrics,
    /// Suggested change to the prediction's confidence score
    pub confidence_delta: f64,
    pub calibrated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationEngine;

impl CalibrationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Multiply each original value by its factor (default 1.0)
    pub fn apply(original: &CategoryValues, factors: &CategoryValues) -> CategoryValues {
        original
            .iter()
            .map(|(category, value)| {
                let factor = factors.get(category).copied().unwrap_or(1.0);
                (*category, value * factor)
            })
            .collect()
    }

    pub fn analyze_impact(original: &CategoryValues, calibrated: &CategoryValues) -> ImpactMetrics {
        let mut impact = ImpactMetrics::default();

        for (category, before) in original {
            let Some(after) = calibrated.get(category) else {
                continue;
            };

            let change = after - before;
            impact.value_changes.insert(*category, change);
            if *before != 0.0 {
                impact
                    .percentage_changes
                    .insert(*category, change / before * 100.0);
            }
        }

        impact
    }

    /// Build a calibration for a completed prediction
    pub fn calibrate(
        &self,
        prediction: &HybridPrediction,
        factors: &CategoryValues,
    ) -> Result<Calibration> {
        if prediction.status != PredictionStatus::Completed {
            return Err(Error::IntegrityViolation(format!(
                "cannot calibrate {} prediction {}",
                prediction.status, prediction.id
            )));
        }

        if let Some((category, factor)) = factors
            .iter()
            .find(|(_, f)| !f.is_finite() || **f < 0.0)
        {
            return Err(Error::InvalidArgument(format!(
                "calibration factor for {} must be finite and non-negative, got {}",
                category, factor
            )));
        }

        let original_values = prediction.results.clone();
        let calibrated_values = Self::apply(&original_values, factors);
        let impact = Self::analyze_impact(&original_values, &calibrated_values);

        let calibration_factors: CategoryValues = original_values
            .keys()
            .map(|category| (*category, factors.get(category).copied().unwrap_or(1.0)))
            .collect();

        let shifts: Vec<f64> = impact
            .percentage_changes
            .values()
            .map(|pct| pct.abs() / 100.0)
            .collect();
        let prior = prediction.confidence_score.unwrap_or(0.0);
        let confidence_delta = match mean(&shifts) {
            Some(m) => prior / (1.0 + m) - prior,
            None => 0.0,
        };

        tracing::debug!(
            prediction_id = prediction.id,
            adjusted = factors.len(),
            confidence_delta,
            "Calibration computed"
        );

        Ok(Calibration {
            prediction_id: prediction.id,
            user_id: prediction.user_id,
            original_values,
            calibration_factors,
            calibrated_values,
            impact,
            confidence_delta,
            calibrated_at: Utc::now(),
        })
    }
}
