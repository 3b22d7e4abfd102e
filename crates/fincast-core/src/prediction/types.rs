//! Core types for hybrid predictions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{confidence_from_variance, CategoryValues, CategoryWeights};

/// What a prediction lineage forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Budget,
    Investment,
    Risk,
    Lifecycle,
    Comprehensive,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::Budget => "budget",
            PredictionType::Investment => "investment",
            PredictionType::Risk => "risk",
            PredictionType::Lifecycle => "lifecycle",
            PredictionType::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "budget" => Ok(PredictionType::Budget),
            "investment" => Ok(PredictionType::Investment),
            "risk" => Ok(PredictionType::Risk),
            "lifecycle" => Ok(PredictionType::Lifecycle),
            "comprehensive" => Ok(PredictionType::Comprehensive),
            _ => Err(format!("Unknown prediction type: {}", s)),
        }
    }
}

/// Status of a hybrid prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    /// Created, inputs not gathered yet
    Pending,
    /// Inputs gathered, combination running
    Processing,
    /// Combination succeeded
    Completed,
    /// Collaborator input missing or invalid
    Failed,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Pending => "pending",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Completed => "completed",
            PredictionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionStatus::Completed | PredictionStatus::Failed)
    }

    /// Pending→Processing, Processing→Completed and Processing→Failed only
    pub fn can_transition_to(&self, next: PredictionStatus) -> bool {
        matches!(
            (self, next),
            (PredictionStatus::Pending, PredictionStatus::Processing)
                | (PredictionStatus::Processing, PredictionStatus::Completed)
                | (PredictionStatus::Processing, PredictionStatus::Failed)
        )
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredictionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PredictionStatus::Pending),
            "processing" => Ok(PredictionStatus::Processing),
            "completed" => Ok(PredictionStatus::Completed),
            "failed" => Ok(PredictionStatus::Failed),
            _ => Err(format!("Unknown prediction status: {}", s)),
        }
    }
}

/// A weighted combination of baseline, statistical and model predictions
///
/// Related records are referenced by ID only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridPrediction {
    pub id: i64,
    pub user_id: i64,
    pub prediction_type: PredictionType,
    pub status: PredictionStatus,
    /// Engine version stamped by the last successful combination
    pub version: Option<String>,
    /// Monotonically increasing per user + prediction type lineage
    pub iteration: u32,
    /// Per-category weight vectors in source order (baseline, statistical, model)
    pub model_weights: CategoryWeights,
    /// Weighted result per category
    pub results: CategoryValues,
    pub prediction_variance: Option<f64>,
    pub confidence_score: Option<f64>,
    pub baseline_id: Option<i64>,
    pub reference_id: Option<i64>,
    pub model_source_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HybridPrediction {
    /// Move to the next status, rejecting illegal transitions
    pub fn transition(&mut self, next: PredictionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::IntegrityViolation(format!(
                "prediction {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }

        tracing::debug!(
            prediction_id = self.id,
            from = self.status.as_str(),
            to = next.as_str(),
            "Prediction status transition"
        );

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to Failed, recording why
    pub(crate) fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(PredictionStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    /// Recompute the confidence score from a variance: `1 / (1 + variance)`
    ///
    /// Allowed while processing and after completion; the confidence score is
    /// the only field a completed prediction may change.
    pub fn update_confidence(&mut self, variance: f64) -> Result<f64> {
        if !matches!(
            self.status,
            PredictionStatus::Processing | PredictionStatus::Completed
        ) {
            return Err(Error::IntegrityViolation(format!(
                "cannot update confidence of {} prediction {}",
                self.status, self.id
            )));
        }

        let confidence = confidence_from_variance(variance)?;
        self.confidence_score = Some(confidence);
        self.updated_at = Utc::now();
        Ok(confidence)
    }

    /// Whether a request for this user and type continues this lineage
    pub fn same_lineage(&self, user_id: i64, prediction_type: PredictionType) -> bool {
        self.user_id == user_id && self.prediction_type == prediction_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> HybridPrediction {
        let now = Utc::now();
        HybridPrediction {
            id: 1,
            user_id: 1,
            prediction_type: PredictionType::Budget,
            status: PredictionStatus::Pending,
            version: None,
            iteration: 0,
            model_weights: CategoryWeights::new(),
            results: CategoryValues::new(),
            prediction_variance: None,
            confidence_score: None,
            baseline_id: None,
            reference_id: None,
            model_source_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_lifecycle() {
        let mut p = pending();
        p.transition(PredictionStatus::Processing).unwrap();
        p.transition(PredictionStatus::Completed).unwrap();
        assert_eq!(p.status, PredictionStatus::Completed);
        assert!(p.status.is_terminal());
    }

    #[test]
    fn test_completed_cannot_reprocess() {
        let mut p = pending();
        p.transition(PredictionStatus::Processing).unwrap();
        p.transition(PredictionStatus::Completed).unwrap();

        let err = p.transition(PredictionStatus::Processing).unwrap_err();
        assert!(matches!(err, Error::IntegrityViolation(_)));
        assert_eq!(p.status, PredictionStatus::Completed);
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut p = pending();
        assert!(p.transition(PredictionStatus::Completed).is_err());
        assert!(p.transition(PredictionStatus::Failed).is_err());
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut p = pending();
        p.transition(PredictionStatus::Processing).unwrap();
        p.fail("source unavailable").unwrap();

        assert_eq!(p.failure_reason.as_deref(), Some("source unavailable"));
        assert!(p.transition(PredictionStatus::Processing).is_err());
        assert!(p.transition(PredictionStatus::Completed).is_err());
    }

    #[test]
    fn test_update_confidence() {
        let mut p = pending();
        assert!(p.update_confidence(0.5).is_err());

        p.transition(PredictionStatus::Processing).unwrap();
        let confidence = p.update_confidence(1.0).unwrap();
        assert_eq!(confidence, 0.5);
        assert_eq!(p.confidence_score, Some(0.5));

        let err = p.update_confidence(-0.1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(p.confidence_score, Some(0.5));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(
            "processing".parse::<PredictionStatus>().unwrap(),
            PredictionStatus::Processing
        );
        assert_eq!(PredictionType::Comprehensive.to_string(), "comprehensive");
        assert!("done".parse::<PredictionStatus>().is_err());
    }
}
