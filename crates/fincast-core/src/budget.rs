//! Budget variance tracking
//!
//! Compares planned category budgets with actual spend and derives a
//! confidence score for the budget itself.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lifecycle::StageWeights;
use crate::models::{confidence_from_variance, mean, Category, CategoryValues};

/// Planned vs. actual for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetPerformance {
    pub category: Category,
    pub budget: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_percentage: f64,
}

impl BudgetPerformance {
    /// `variance = budget - actual`; percentage is 0 for a zero budget
    pub fn new(category: Category, budget: f64, actual: f64) -> Self {
        let variance = budget - actual;
        let variance_percentage = if budget != 0.0 {
            variance / budget * 100.0
        } else {
            0.0
        };

        Self {
            category,
            budget,
            actual,
            variance,
            variance_percentage,
        }
    }

    /// `|budget - actual| / budget`, `None` for a zero budget
    pub fn variance_ratio(&self) -> Option<f64> {
        if self.budget != 0.0 {
            Some((self.budget - self.actual).abs() / self.budget)
        } else {
            None
        }
    }
}

/// Per-category performance plus aggregate confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub performances: Vec<BudgetPerformance>,
    /// `None` when no category has a non-zero budget
    pub confidence_score: Option<f64>,
}

impl BudgetReport {
    pub fn get(&self, category: Category) -> Option<&BudgetPerformance> {
        self.performances.iter().find(|p| p.category == category)
    }

    pub fn total_budget(&self) -> f64 {
        self.performances.iter().map(|p| p.budget).sum()
    }

    pub fn total_actual(&self) -> f64 {
        self.performances.iter().map(|p| p.actual).sum()
    }

    /// Categories where spending exceeded the plan
    pub fn over_budget(&self) -> Vec<Category> {
        self.performances
            .iter()
            .filter(|p| p.variance < 0.0)
            .map(|p| p.category)
            .collect()
    }
}

/// Tracks budgets against actual spend
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetVarianceTracker;

impl BudgetVarianceTracker {
    pub fn new() -> Self {
        Self
    }

    /// Compare budgets with actuals; a category without actuals counts as 0 spent
    pub fn track(&self, budgets: &CategoryValues, actuals: &CategoryValues) -> Result<BudgetReport> {
        let performances = Self::performances(budgets, actuals)?;

        let ratios: Vec<f64> = performances
            .iter()
            .filter_map(|p| p.variance_ratio())
            .collect();

        let confidence_score = match mean(&ratios) {
            Some(avg) => Some(confidence_from_variance(avg)?),
            None => None,
        };

        tracing::debug!(
            categories = performances.len(),
            confidence = ?confidence_score,
            "Budget performance tracked"
        );

        Ok(BudgetReport {
            performances,
            confidence_score,
        })
    }

    /// Budget confidence with each category's ratio weighted by its lifecycle weight
    ///
    /// A zero weight means "no adjustment" and counts as 1.0.
    pub fn weighted_confidence(
        &self,
        budgets: &CategoryValues,
        actuals: &CategoryValues,
        weights: &StageWeights,
    ) -> Result<Option<f64>> {
        let performances = Self::performances(budgets, actuals)?;

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for p in &performances {
            if let Some(ratio) = p.variance_ratio() {
                let w = match weights.weight_for(p.category) {
                    w if w == 0.0 => 1.0,
                    w => w,
                };
                weighted_sum += ratio * w;
                weight_total += w;
            }
        }

        if weight_total == 0.0 {
            return Ok(None);
        }

        confidence_from_variance(weighted_sum / weight_total).map(Some)
    }

    fn performances(
        budgets: &CategoryValues,
        actuals: &CategoryValues,
    ) -> Result<Vec<BudgetPerformance>> {
        budgets
            .iter()
            .map(|(category, budget)| {
                if !budget.is_finite() || *budget < 0.0 {
                    return Err(Error::InvalidArgument(format!(
                        "budget for {} must be a finite non-negative amount, got {}",
                        category, budget
                    )));
                }
                let actual = actuals.get(category).copied().unwrap_or(0.0);
                if !actual.is_finite() {
                    return Err(Error::InvalidArgument(format!(
                        "actual spend for {} must be finite",
                        category
                    )));
                }
                Ok(BudgetPerformance::new(*category, *budget, actual))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(Category, f64)]) -> CategoryValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_performance_example() {
        let p = BudgetPerformance::new(Category::Food, 1000.0, 800.0);
        assert_eq!(p.variance, 200.0);
        assert!((p.variance_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budget_guard() {
        let p = BudgetPerformance::new(Category::Entertainment, 0.0, 50.0);
        assert_eq!(p.variance, -50.0);
        assert_eq!(p.variance_percentage, 0.0);
        assert_eq!(p.variance_ratio(), None);
    }

    #[test]
    fn test_track_confidence() {
        let budgets = values(&[(Category::Food, 1000.0), (Category::Housing, 2000.0)]);
        let actuals = values(&[(Category::Food, 800.0), (Category::Housing, 2200.0)]);

        let report = BudgetVarianceTracker::new().track(&budgets, &actuals).unwrap();

        // ratios 0.2 and 0.1 -> mean 0.15
        let confidence = report.confidence_score.unwrap();
        assert!((confidence - 1.0 / 1.15).abs() < 1e-9);
        assert_eq!(report.over_budget(), vec![Category::Housing]);
        assert_eq!(report.total_budget(), 3000.0);
        assert_eq!(report.total_actual(), 3000.0);
    }

    #[test]
    fn test_missing_actual_counts_as_zero() {
        let budgets = values(&[(Category::Utilities, 300.0)]);
        let report = BudgetVarianceTracker::new()
            .track(&budgets, &CategoryValues::new())
            .unwrap();

        let p = report.get(Category::Utilities).unwrap();
        assert_eq!(p.actual, 0.0);
        assert_eq!(p.variance_percentage, 100.0);
        assert!((report.confidence_score.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budgets_have_no_confidence() {
        let budgets = values(&[(Category::Other, 0.0)]);
        let actuals = values(&[(Category::Other, 50.0)]);
        let report = BudgetVarianceTracker::new().track(&budgets, &actuals).unwrap();
        assert_eq!(report.confidence_score, None);
    }

    #[test]
    fn test_negative_budget_rejected() {
        let budgets = values(&[(Category::Food, -10.0)]);
        let err = BudgetVarianceTracker::new()
            .track(&budgets, &CategoryValues::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_weighted_confidence() {
        let budgets = values(&[(Category::Food, 1000.0), (Category::Savings, 500.0)]);
        let actuals = values(&[(Category::Food, 800.0), (Category::Savings, 500.0)]);
        let weights = StageWeights {
            income: 0.0,
            expense: 3.0,
            investment: 1.0,
            risk: 0.0,
        };

        let confidence = BudgetVarianceTracker::new()
            .weighted_confidence(&budgets, &actuals, &weights)
            .unwrap()
            .unwrap();

        // (0.2 * 3 + 0.0 * 1) / 4 = 0.15
        assert!((confidence - 1.0 / 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weights_match_unweighted() {
        let budgets = values(&[(Category::Food, 1000.0), (Category::Housing, 2000.0)]);
        let actuals = values(&[(Category::Food, 800.0), (Category::Housing, 2200.0)]);
        let tracker = BudgetVarianceTracker::new();

        let weighted = tracker
            .weighted_confidence(&budgets, &actuals, &StageWeights::default())
            .unwrap();
        let plain = tracker.track(&budgets, &actuals).unwrap().confidence_score;

        assert_eq!(weighted, plain);
    }
}
