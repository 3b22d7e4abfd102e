//! Compare completed predictions against observed actuals

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{confidence_from_variance, mean, Category, CategoryValues};

use super::types::{HybridPrediction, PredictionStatus};

/// Per-category comparison of predicted vs. actual values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `1 - |p - a| / a`, not clamped
    pub accuracy: CategoryValues,
    /// `|p - a|`
    pub deviation: CategoryValues,
    /// `1 / (1 + (deviation / a)^2)`
    pub category_confidence: CategoryValues,
    /// Predicted categories with a zero or missing actual
    pub skipped: Vec<Category>,
    /// Categories whose error exceeded the actual value
    pub negative_accuracy: Vec<Category>,
    /// Mean squared relative deviation, `None` if nothing was comparable
    pub variance: Option<f64>,
    pub confidence: Option<f64>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.accuracy.is_empty()
    }

    /// Mean accuracy across compared categories
    pub fn mean_accuracy(&self) -> Option<f64> {
        let values: Vec<f64> = self.accuracy.values().copied().collect();
        mean(&values)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceValidator;

impl ConfidenceValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        prediction: &HybridPrediction,
        actuals: &CategoryValues,
    ) -> Result<ValidationReport> {
        if prediction.status != PredictionStatus::Completed {
            return Err(Error::IntegrityViolation(format!(
                "cannot validate {} prediction {}",
                prediction.status, prediction.id
            )));
        }

        let mut report = ValidationReport::default();
        let mut squared = Vec::new();

        for (category, predicted) in &prediction.results {
            let actual = match actuals.get(category) {
                Some(a) if *a != 0.0 && a.is_finite() => *a,
                _ => {
                    report.skipped.push(*category);
                    continue;
                }
            };

            let deviation = (predicted - actual).abs();
            let relative = deviation / actual;
            let accuracy = 1.0 - relative;

            if accuracy < 0.0 {
                report.negative_accuracy.push(*category);
            }

            report.accuracy.insert(*category, accuracy);
            report.deviation.insert(*category, deviation);
            report
                .category_confidence
                .insert(*category, 1.0 / (1.0 + relative.powi(2)));
            squared.push(relative.powi(2));
        }

        if let Some(variance) = mean(&squared) {
            report.variance = Some(variance);
            report.confidence = Some(confidence_from_variance(variance)?);
        }

        tracing::debug!(
            prediction_id = prediction.id,
            compared = report.accuracy.len(),
            skipped = report.skipped.len(),
            negative = report.negative_accuracy.len(),
            "Prediction validated"
        );

        Ok(report)
    }

    /// Commit the report's variance as the prediction's confidence
    pub fn apply(&self, prediction: &mut HybridPrediction, report: &ValidationReport) -> Result<f64> {
        let variance = report.variance.ok_or_else(|| {
            Error::InsufficientInput(format!(
                "no actuals comparable with prediction {}",
                prediction.id
            ))
        })?;

        prediction.update_confidence(variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::PredictionType;
    use chrono::Utc;

    fn completed(results: &[(Category, f64)]) -> HybridPrediction {
        let now = Utc::now();
        HybridPrediction {
            id: 9,
            user_id: 1,
            prediction_type: PredictionType::Budget,
            status: PredictionStatus::Completed,
            version: Some("v1".to_string()),
            iteration: 1,
            model_weights: Default::default(),
            results: results.iter().copied().collect(),
            prediction_variance: Some(0.0),
            confidence_score: Some(1.0),
            baseline_id: None,
            reference_id: None,
            model_source_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn actuals(pairs: &[(Category, f64)]) -> CategoryValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_accuracy_and_deviation() {
        let p = completed(&[(Category::Food, 900.0)]);
        let report = ConfidenceValidator::new()
            .validate(&p, &actuals(&[(Category::Food, 1000.0)]))
            .unwrap();

        assert!((report.accuracy[&Category::Food] - 0.9).abs() < 1e-9);
        assert_eq!(report.deviation[&Category::Food], 100.0);
        assert!((report.category_confidence[&Category::Food] - 1.0 / 1.01).abs() < 1e-9);
        assert!((report.variance.unwrap() - 0.01).abs() < 1e-12);
        assert!(report.negative_accuracy.is_empty());
    }

    #[test]
    fn test_negative_accuracy_surfaced() {
        let p = completed(&[(Category::Entertainment, 350.0)]);
        let report = ConfidenceValidator::new()
            .validate(&p, &actuals(&[(Category::Entertainment, 100.0)]))
            .unwrap();

        assert!((report.accuracy[&Category::Entertainment] + 1.5).abs() < 1e-9);
        assert_eq!(report.negative_accuracy, vec![Category::Entertainment]);
    }

    #[test]
    fn test_zero_and_missing_actuals_skipped() {
        let p = completed(&[
            (Category::Food, 900.0),
            (Category::Housing, 2000.0),
            (Category::Other, 10.0),
        ]);
        let report = ConfidenceValidator::new()
            .validate(
                &p,
                &actuals(&[(Category::Food, 1000.0), (Category::Other, 0.0)]),
            )
            .unwrap();

        assert_eq!(report.skipped, vec![Category::Housing, Category::Other]);
        assert_eq!(report.accuracy.len(), 1);
    }

    #[test]
    fn test_requires_completed() {
        let mut p = completed(&[(Category::Food, 900.0)]);
        p.status = PredictionStatus::Processing;
        let err = ConfidenceValidator::new()
            .validate(&p, &actuals(&[(Category::Food, 1000.0)]))
            .unwrap_err();
        assert!(matches!(err, Error::IntegrityViolation(_)));
    }

    #[test]
    fn test_apply_updates_confidence() {
        let mut p = completed(&[(Category::Food, 900.0), (Category::Housing, 2400.0)]);
        let validator = ConfidenceValidator::new();
        let report = validator
            .validate(
                &p,
                &actuals(&[(Category::Food, 1000.0), (Category::Housing, 2000.0)]),
            )
            .unwrap();

        // (0.01 + 0.04) / 2
        let confidence = validator.apply(&mut p, &report).unwrap();
        assert!((confidence - 1.0 / 1.025).abs() < 1e-12);
        assert_eq!(p.confidence_score, Some(confidence));
        assert_eq!(report.confidence, Some(confidence));
    }

    #[test]
    fn test_apply_without_comparisons() {
        let mut p = completed(&[(Category::Food, 900.0)]);
        let validator = ConfidenceValidator::new();
        let report = validator.validate(&p, &CategoryValues::new()).unwrap();

        assert!(report.is_empty());
        assert_eq!(report.confidence, None);

        let err = validator.apply(&mut p, &report).unwrap_err();
        assert!(err.is_insufficient_input());
        assert_eq!(p.confidence_score, Some(1.0));
    }

    #[test]
    fn test_mean_accuracy() {
        let p = completed(&[(Category::Food, 900.0), (Category::Housing, 2000.0)]);
        let report = ConfidenceValidator::new()
            .validate(
                &p,
                &actuals(&[(Category::Food, 1000.0), (Category::Housing, 2000.0)]),
            )
            .unwrap();
        assert!((report.mean_accuracy().unwrap() - 0.95).abs() < 1e-9);
    }
}
