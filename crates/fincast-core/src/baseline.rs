//! Baseline calculation
//!
//! Deterministic, region-adjusted cost-of-living and income figures that do
//! not depend on any predictive model. Missing inputs produce `None` rather
//! than an error so the caller can retry once the profile is complete.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryValues};

/// Regional economic inputs for one user's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalBaseline {
    pub id: i64,
    pub user_id: i64,
    pub region_code: String,
    pub base_living_cost: Option<f64>,
    pub housing_index: Option<f64>,
    pub consumption_index: Option<f64>,
    pub income_potential: Option<f64>,
    pub career_growth_rate: Option<f64>,
}

impl RegionalBaseline {
    /// `base_living_cost * (housing_index + consumption_index)`
    pub fn living_cost(&self) -> Option<f64> {
        let base = self.base_living_cost?;
        let housing = self.housing_index?;
        let consumption = self.consumption_index?;
        Some(base * (housing + consumption))
    }

    /// Housing share of the living cost: `base_living_cost * housing_index`
    pub fn housing_cost(&self) -> Option<f64> {
        Some(self.base_living_cost? * self.housing_index?)
    }

    /// Compound income growth: `income_potential * (1 + career_growth_rate)^years`
    pub fn project_income(&self, years: i32) -> Result<Option<f64>> {
        if years < 0 {
            return Err(Error::InvalidArgument(format!(
                "projection years must be non-negative, got {}",
                years
            )));
        }

        Ok(self
            .income_potential
            .zip(self.career_growth_rate)
            .map(|(potential, rate)| potential * (1.0 + rate).powi(years)))
    }
}

/// Produces the baseline source vector for hybrid predictions
#[derive(Debug, Clone, Copy)]
pub struct BaselineCalculator {
    /// Years ahead used for the income projection
    projection_years: i32,
}

impl BaselineCalculator {
    pub fn new(projection_years: i32) -> Result<Self> {
        if projection_years < 0 {
            return Err(Error::InvalidArgument(format!(
                "projection years must be non-negative, got {}",
                projection_years
            )));
        }
        Ok(Self { projection_years })
    }

    pub fn projection_years(&self) -> i32 {
        self.projection_years
    }

    /// Category estimates derivable from the baseline
    ///
    /// Only computable figures are included; an empty map means the baseline
    /// contributes nothing to this prediction.
    pub fn category_estimates(&self, baseline: &RegionalBaseline) -> Result<CategoryValues> {
        let mut estimates = CategoryValues::new();

        if let Some(income) = baseline.project_income(self.projection_years)? {
            estimates.insert(Category::Income, income);
        }
        if let Some(housing) = baseline.housing_cost() {
            estimates.insert(Category::Housing, housing);
        }
        if let Some(living) = baseline.living_cost() {
            estimates.insert(Category::LivingCost, living);
        }

        tracing::trace!(
            region = baseline.region_code.as_str(),
            count = estimates.len(),
            "Baseline estimates computed"
        );

        Ok(estimates)
    }
}

impl Default for BaselineCalculator {
    fn default() -> Self {
        Self {
            projection_years: 1,
        }
    }
}
