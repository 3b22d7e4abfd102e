//! Test utilities for fincast-core
//!
//! Sample profile snapshots shared by unit, integration and CLI tests.

use chrono::{NaiveDate, Utc};

use crate::baseline::RegionalBaseline;
use crate::lifecycle::{LifecycleFactor, LifecycleModel, LifecycleStage};
use crate::models::{Category, CategoryValues, CategoryWeights};
use crate::prediction::{HybridPrediction, PredictionStatus, PredictionType};
use crate::risk::{RiskDimensions, RiskFactor};
use crate::statistics::{Cohort, StatisticalReference};

pub fn sample_baseline() -> RegionalBaseline {
    RegionalBaseline {
        id: 101,
        user_id: 1,
        region_code: "CN-SH".to_string(),
        base_living_cost: Some(2500.0),
        housing_index: Some(1.2),
        consumption_index: Some(0.8),
        income_potential: Some(12000.0),
        career_growth_rate: Some(0.06),
    }
}

pub fn sample_cohort() -> Cohort {
    Cohort::new("25-34", "career_start", "CN-SH")
}

pub fn sample_reference() -> StatisticalReference {
    sample_reference_for(201, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default())
}

/// Same cohort, different id and period
pub fn sample_reference_for(id: i64, period: NaiveDate) -> StatisticalReference {
    StatisticalReference {
        id,
        cohort: sample_cohort(),
        period,
        mean_income: Some(11000.0),
        median_income: Some(10200.0),
        income_std_dev: Some(2500.0),
        expense_ratios: [
            (Category::Housing, 0.25),
            (Category::Food, 0.12),
            (Category::Transportation, 0.06),
        ]
        .into_iter()
        .collect(),
        saving_ratios: [(Category::Savings, 0.15)].into_iter().collect(),
        sample_size: Some(4800),
        confidence_level: Some(0.95),
        data_quality_score: Some(0.9),
    }
}

/// Weights in [baseline, statistical, model] order; food has no baseline source
pub fn sample_weights() -> CategoryWeights {
    [
        (Category::Income, vec![0.3, 0.3, 0.4]),
        (Category::Housing, vec![0.4, 0.3, 0.3]),
        (Category::Food, vec![0.0, 0.5, 0.5]),
    ]
    .into_iter()
    .collect()
}

/// Model output matching [`sample_weights`]
pub fn sample_model_values() -> CategoryValues {
    [
        (Category::Income, 12500.0),
        (Category::Housing, 3100.0),
        (Category::Food, 1400.0),
    ]
    .into_iter()
    .collect()
}

pub fn sample_actuals() -> CategoryValues {
    [
        (Category::Income, 12300.0),
        (Category::Housing, 3000.0),
        (Category::Food, 1250.0),
    ]
    .into_iter()
    .collect()
}

pub fn sample_lifecycle_model() -> LifecycleModel {
    LifecycleModel {
        user_id: 1,
        current_stage: Some(LifecycleStage::CareerStart),
        age_factor: Some(1.1),
        career_factor: Some(1.3),
        family_factor: Some(0.9),
        wealth_factor: Some(1.0),
        parameters: None,
    }
}

pub fn sample_lifecycle_factor() -> LifecycleFactor {
    LifecycleFactor {
        income_growth_rate: Some(0.06),
        income_stability: Some(0.8),
        career_potential: Some(0.7),
        lifestyle_coefficient: Some(1.0),
        dependency_ratio: Some(0.1),
        saving_capacity: Some(0.6),
        investment_preference: Some(0.4),
        wealth_momentum: Some(0.5),
    }
}

pub fn sample_risk_factor() -> RiskFactor {
    RiskFactor {
        income_source_diversity: Some(0.4),
        income_stability_index: Some(0.3),
        career_risk_factor: Some(0.5),
        expense_volatility: Some(0.2),
        fixed_expense_ratio: Some(0.45),
        emergency_fund_ratio: Some(0.3),
        portfolio_volatility: Some(0.6),
        market_correlation: Some(0.5),
        diversification_score: Some(0.4),
        insurance_coverage_ratio: Some(0.7),
    }
}

/// Expense, life-event and market scores; income and investment come from metrics
pub fn sample_risk_dimensions() -> RiskDimensions {
    RiskDimensions {
        income: None,
        expense: Some(0.35),
        investment: None,
        life_event: Some(0.2),
        market: Some(0.55),
    }
}

/// A completed prediction with the given results
pub fn completed_prediction(id: i64, results: CategoryValues) -> HybridPrediction {
    let now = Utc::now();
    HybridPrediction {
        id,
        user_id: 1,
        prediction_type: PredictionType::Budget,
        status: PredictionStatus::Completed,
        version: Some("hybrid-1.0".to_string()),
        iteration: 1,
        model_weights: CategoryWeights::new(),
        results,
        prediction_variance: Some(0.0),
        confidence_score: Some(1.0),
        baseline_id: None,
        reference_id: None,
        model_source_id: Some("mock".to_string()),
        failure_reason: None,
        created_at: now,
        updated_at: now,
    }
}
