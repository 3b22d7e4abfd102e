//! External prediction source boundary
//!
//! Model output arrives from an external AI service and is untrusted. It is
//! validated here before any arithmetic touches it; anything malformed is
//! reported as [`Error::PredictionSourceInvalid`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryValues};
use crate::statistics::IncomeRange;

use super::types::PredictionType;

/// Model output as received from the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawModelPrediction {
    pub source_id: String,
    pub generated_at: DateTime<Utc>,
    /// Category name to value, exactly as the source sent it
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl RawModelPrediction {
    /// Parse a collaborator payload; malformed JSON is a source error
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| {
            Error::PredictionSourceInvalid(format!("malformed model output: {}", e))
        })
    }

    /// Check the payload and convert it into typed category values
    pub fn validate(&self) -> Result<ModelPrediction> {
        if self.source_id.trim().is_empty() {
            return Err(Error::PredictionSourceInvalid(
                "model output has no source id".to_string(),
            ));
        }
        if self.values.is_empty() {
            return Err(Error::PredictionSourceInvalid(format!(
                "model output from {} has no values",
                self.source_id
            )));
        }

        let mut values = CategoryValues::new();
        for (name, value) in &self.values {
            let category = name.parse::<Category>().map_err(|e| {
                Error::PredictionSourceInvalid(format!("{} ({})", e, self.source_id))
            })?;

            let number = value
                .as_f64()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    Error::PredictionSourceInvalid(format!(
                        "value for {} from {} is not a finite number: {}",
                        name, self.source_id, value
                    ))
                })?;

            values.insert(category, number);
        }

        Ok(ModelPrediction {
            source_id: self.source_id.clone(),
            generated_at: self.generated_at,
            values,
        })
    }
}

/// Validated model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub source_id: String,
    pub generated_at: DateTime<Utc>,
    pub values: CategoryValues,
}

/// What the engine tells the collaborator about the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionContext {
    pub user_id: i64,
    pub prediction_type: PredictionType,
    /// Categories the caller wants predicted
    pub categories: Vec<Category>,
    pub living_cost: Option<f64>,
    pub projected_income: Option<f64>,
    pub income_range: Option<IncomeRange>,
}

/// Capability for obtaining raw model output
///
/// Timeouts and retries belong to the implementation, not to the engine.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Identifier recorded on predictions built from this source
    fn source_id(&self) -> &str;

    /// Produce a raw prediction for the context
    async fn predict(&self, context: &PredictionContext) -> Result<RawModelPrediction>;
}
