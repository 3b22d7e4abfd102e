//! Shared value types used across the engine

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Budget and prediction categories
///
/// Replaces free-form string keys so malformed category names are rejected at
/// the engine boundary instead of surfacing later as a missing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Housing,
    /// Total cost of living (housing plus consumption)
    LivingCost,
    Food,
    Transportation,
    Utilities,
    Healthcare,
    Education,
    Entertainment,
    Insurance,
    Savings,
    Investment,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Housing => "housing",
            Category::LivingCost => "living_cost",
            Category::Food => "food",
            Category::Transportation => "transportation",
            Category::Utilities => "utilities",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::Insurance => "insurance",
            Category::Savings => "savings",
            Category::Investment => "investment",
            Category::Other => "other",
        }
    }

    /// Get all categories
    pub fn all() -> &'static [Category] {
        &[
            Category::Income,
            Category::Housing,
            Category::LivingCost,
            Category::Food,
            Category::Transportation,
            Category::Utilities,
            Category::Healthcare,
            Category::Education,
            Category::Entertainment,
            Category::Insurance,
            Category::Savings,
            Category::Investment,
            Category::Other,
        ]
    }

    /// Spending categories (everything that is neither income nor wealth building)
    pub fn is_expense(&self) -> bool {
        !matches!(
            self,
            Category::Income | Category::Savings | Category::Investment
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// One value per category
pub type CategoryValues = BTreeMap<Category, f64>;

/// Per-category weight vector, ordered like the prediction sources it weighs
pub type CategoryWeights = BTreeMap<Category, Vec<f64>>;

/// Per-category prediction vector, one entry per contributing source
pub type CategoryPredictions = BTreeMap<Category, Vec<f64>>;

/// Confidence score derived from a non-negative variance: `1 / (1 + variance)`
///
/// Negative or non-finite variance is rejected, never clamped.
pub fn confidence_from_variance(variance: f64) -> Result<f64> {
    if !variance.is_finite() || variance < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "variance must be a finite non-negative number, got {}",
            variance
        )));
    }
    Ok(1.0 / (1.0 + variance))
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
