//! Statistical reference data for demographic cohorts
//!
//! Population-level income and expense statistics used as a comparison
//! anchor for hybrid predictions. References are published per cohort and
//! period and never mutated; a newer period supersedes an older one.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryValues};

/// z-score for a two-sided 95% normal interval
///
/// Only the 95% interval is supported; this is a fixed constant, not an
/// inverse-normal computation.
pub const Z_SCORE_95: f64 = 1.96;

/// The only confidence interval `income_range_at` accepts
pub const SUPPORTED_CONFIDENCE_INTERVAL: f64 = 0.95;

/// Lookup key for a statistical reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cohort {
    pub age_group: String,
    pub life_stage: String,
    pub region_code: String,
}

impl Cohort {
    pub fn new(
        age_group: impl Into<String>,
        life_stage: impl Into<String>,
        region_code: impl Into<String>,
    ) -> Self {
        Self {
            age_group: age_group.into(),
            life_stage: life_stage.into(),
            region_code: region_code.into(),
        }
    }
}

/// Published income/expense statistics for one cohort and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalReference {
    pub id: i64,
    pub cohort: Cohort,
    /// First day of the period these statistics describe
    pub period: NaiveDate,
    pub mean_income: Option<f64>,
    pub median_income: Option<f64>,
    pub income_std_dev: Option<f64>,
    /// Share of income spent per category
    #[serde(default)]
    pub expense_ratios: CategoryValues,
    /// Share of income saved or invested per category
    #[serde(default)]
    pub saving_ratios: CategoryValues,
    pub sample_size: Option<u64>,
    pub confidence_level: Option<f64>,
    pub data_quality_score: Option<f64>,
}

/// Symmetric income interval around the cohort mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRange {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl StatisticalReference {
    /// 95% income range around the mean
    pub fn income_range(&self) -> Result<Option<IncomeRange>> {
        self.income_range_at(SUPPORTED_CONFIDENCE_INTERVAL)
    }

    /// Income range for the given confidence interval (only 0.95 is supported)
    pub fn income_range_at(&self, confidence_interval: f64) -> Result<Option<IncomeRange>> {
        if (confidence_interval - SUPPORTED_CONFIDENCE_INTERVAL).abs() > f64::EPSILON {
            return Err(Error::InvalidArgument(format!(
                "unsupported confidence interval {}, only {} is available",
                confidence_interval, SUPPORTED_CONFIDENCE_INTERVAL
            )));
        }

        let (mean, std_dev) = match (self.mean_income, self.income_std_dev) {
            (Some(m), Some(s)) => (m, s),
            _ => return Ok(None),
        };

        if std_dev < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "income standard deviation must be non-negative, got {}",
                std_dev
            )));
        }

        let margin = Z_SCORE_95 * std_dev;
        Ok(Some(IncomeRange {
            lower_bound: mean - margin,
            upper_bound: mean + margin,
        }))
    }

    /// Expected spend per category: mean income times each expense ratio
    pub fn expected_expenses(&self) -> Option<CategoryValues> {
        let mean = self.mean_income?;
        Some(
            self.expense_ratios
                .iter()
                .map(|(category, ratio)| (*category, mean * ratio))
                .collect(),
        )
    }

    /// Category estimates for the statistical source vector
    ///
    /// Includes income (the mean), every expense and saving ratio category,
    /// and the total living cost implied by the expense ratios.
    pub fn category_estimates(&self) -> CategoryValues {
        let mean = match self.mean_income {
            Some(m) => m,
            None => return CategoryValues::new(),
        };

        let mut estimates = CategoryValues::new();
        estimates.insert(Category::Income, mean);

        for (category, ratio) in self.expense_ratios.iter().chain(&self.saving_ratios) {
            estimates.insert(*category, mean * ratio);
        }

        if !self.expense_ratios.is_empty() {
            let total_ratio: f64 = self.expense_ratios.values().sum();
            estimates.insert(Category::LivingCost, mean * total_ratio);
        }

        estimates
    }
}

/// Capability for looking up the current reference of a cohort
pub trait StatisticalReferenceProvider {
    /// Latest published reference for the cohort, if any
    fn reference_for(&self, cohort: &Cohort) -> Option<StatisticalReference>;
}

/// In-memory, publish-only reference store
#[derive(Debug, Default)]
pub struct ReferenceStore {
    /// Per-cohort history sorted by period
    references: BTreeMap<Cohort, Vec<StatisticalReference>>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a reference; a cohort+period can only be published once
    pub fn publish(&mut self, reference: StatisticalReference) -> Result<()> {
        let history = self.references.entry(reference.cohort.clone()).or_default();

        if history.iter().any(|r| r.period == reference.period) {
            return Err(Error::IntegrityViolation(format!(
                "reference for {}/{}/{} period {} already published",
                reference.cohort.age_group,
                reference.cohort.life_stage,
                reference.cohort.region_code,
                reference.period
            )));
        }

        tracing::debug!(
            id = reference.id,
            region = reference.cohort.region_code.as_str(),
            period = %reference.period,
            "Statistical reference published"
        );

        let pos = history.partition_point(|r| r.period < reference.period);
        history.insert(pos, reference);
        Ok(())
    }

    /// All published periods for a cohort, oldest first
    pub fn history(&self, cohort: &Cohort) -> &[StatisticalReference] {
        self.references
            .get(cohort)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of published references across all cohorts
    pub fn len(&self) -> usize {
        self.references.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatisticalReferenceProvider for ReferenceStore {
    fn reference_for(&self, cohort: &Cohort) -> Option<StatisticalReference> {
        self.history(cohort).last().cloned()
    }
}
