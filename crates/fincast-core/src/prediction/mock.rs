//! Mock prediction source for testing
//!
//! Provides predictable model output without a running AI service.
//! Useful for unit tests, integration tests and dry runs of the CLI.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryValues};

use super::source::{PredictionContext, PredictionSource, RawModelPrediction};

#[derive(Debug, Clone)]
enum MockBehavior {
    /// Return these values for every request
    Fixed(CategoryValues),
    /// Mirror the baseline figures from the context
    EchoContext,
    /// Fail the call entirely
    Unavailable,
    /// Answer with a payload that fails validation
    Malformed,
}

/// Mock prediction source
#[derive(Debug, Clone)]
pub struct MockPredictionSource {
    source_id: String,
    behavior: MockBehavior,
}

impl MockPredictionSource {
    /// Source answering with fixed values
    pub fn new(values: CategoryValues) -> Self {
        Self {
            source_id: "mock".to_string(),
            behavior: MockBehavior::Fixed(values),
        }
    }

    /// Source that mirrors the context's projected income and living cost
    pub fn echo() -> Self {
        Self {
            source_id: "mock-echo".to_string(),
            behavior: MockBehavior::EchoContext,
        }
    }

    /// Source whose calls always fail
    pub fn unavailable() -> Self {
        Self {
            source_id: "mock-unavailable".to_string(),
            behavior: MockBehavior::Unavailable,
        }
    }

    /// Source returning non-numeric values
    pub fn malformed() -> Self {
        Self {
            source_id: "mock-malformed".to_string(),
            behavior: MockBehavior::Malformed,
        }
    }

    /// Same behavior under a different source id
    pub fn with_source_id(mut self, source_id: &str) -> Self {
        self.source_id = source_id.to_string();
        self
    }

    fn payload(&self, values: impl IntoIterator<Item = (Category, serde_json::Value)>) -> RawModelPrediction {
        RawModelPrediction {
            source_id: self.source_id.clone(),
            generated_at: Utc::now(),
            values: values
                .into_iter()
                .map(|(category, value)| (category.as_str().to_string(), value))
                .collect(),
        }
    }
}

#[async_trait]
impl PredictionSource for MockPredictionSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn predict(&self, context: &PredictionContext) -> Result<RawModelPrediction> {
        match &self.behavior {
            MockBehavior::Fixed(values) => Ok(self.payload(
                values
                    .iter()
                    .map(|(category, value)| (*category, serde_json::Value::from(*value))),
            )),
            MockBehavior::EchoContext => {
                let mut values = Vec::new();
                if let Some(income) = context.projected_income {
                    values.push((Category::Income, serde_json::Value::from(income)));
                }
                if let Some(living) = context.living_cost {
                    values.push((Category::LivingCost, serde_json::Value::from(living)));
                }
                Ok(self.payload(values))
            }
            MockBehavior::Unavailable => Err(Error::PredictionSourceInvalid(format!(
                "{} is unavailable",
                self.source_id
            ))),
            MockBehavior::Malformed => Ok(self.payload(
                context
                    .categories
                    .iter()
                    .map(|category| (*category, serde_json::Value::from("n/a"))),
            )),
        }
    }
}
