//! Composite risk scoring
//!
//! Five risk dimensions are combined with fixed weights into an overall
//! score, which is then bucketed into a discrete [`RiskLevel`]. Scoring is
//! all-or-nothing: an assessment missing any dimension has no overall score,
//! so incomplete data can never understate risk.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed dimension weights (income, expense, investment, life event, market)
pub const INCOME_RISK_WEIGHT: f64 = 0.25;
pub const EXPENSE_RISK_WEIGHT: f64 = 0.20;
pub const INVESTMENT_RISK_WEIGHT: f64 = 0.25;
pub const LIFE_EVENT_RISK_WEIGHT: f64 = 0.15;
pub const MARKET_RISK_WEIGHT: f64 = 0.15;

/// Discrete risk classification, ordered from least to most aggressive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Conservative,
    ModerateConservative,
    Moderate,
    ModerateAggressive,
    Aggressive,
}

impl RiskLevel {
    /// Bucket an overall score; boundary values belong to the higher bucket
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            RiskLevel::Conservative
        } else if score < 0.4 {
            RiskLevel::ModerateConservative
        } else if score < 0.6 {
            RiskLevel::Moderate
        } else if score < 0.8 {
            RiskLevel::ModerateAggressive
        } else {
            RiskLevel::Aggressive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "conservative",
            RiskLevel::ModerateConservative => "moderate_conservative",
            RiskLevel::Moderate => "moderate",
            RiskLevel::ModerateAggressive => "moderate_aggressive",
            RiskLevel::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(RiskLevel::Conservative),
            "moderate_conservative" => Ok(RiskLevel::ModerateConservative),
            "moderate" => Ok(RiskLevel::Moderate),
            "moderate_aggressive" => Ok(RiskLevel::ModerateAggressive),
            "aggressive" => Ok(RiskLevel::Aggressive),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Sub-scores derived from [`RiskFactor`] inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMetric {
    IncomeRisk,
    InvestmentRisk,
}

pub type RiskMetrics = BTreeMap<RiskMetric, f64>;

/// Per-dimension risk scores, each nominally in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDimensions {
    pub income: Option<f64>,
    pub expense: Option<f64>,
    pub investment: Option<f64>,
    pub life_event: Option<f64>,
    pub market: Option<f64>,
}

impl RiskDimensions {
    /// Fill income/investment dimensions from computed metrics
    ///
    /// Dimensions that already carry a score are left untouched.
    pub fn with_metrics(mut self, metrics: &RiskMetrics) -> Self {
        if self.income.is_none() {
            self.income = metrics.get(&RiskMetric::IncomeRisk).copied();
        }
        if self.investment.is_none() {
            self.investment = metrics.get(&RiskMetric::InvestmentRisk).copied();
        }
        self
    }

    fn named(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("income", self.income),
            ("expense", self.expense),
            ("investment", self.investment),
            ("life_event", self.life_event),
            ("market", self.market),
        ]
    }

    /// Names of dimensions without a score
    pub fn missing(&self) -> Vec<&'static str> {
        self.named()
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Finer-grained inputs feeding the income and investment dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub income_source_diversity: Option<f64>,
    pub income_stability_index: Option<f64>,
    pub career_risk_factor: Option<f64>,
    pub expense_volatility: Option<f64>,
    pub fixed_expense_ratio: Option<f64>,
    pub emergency_fund_ratio: Option<f64>,
    pub portfolio_volatility: Option<f64>,
    pub market_correlation: Option<f64>,
    pub diversification_score: Option<f64>,
    pub insurance_coverage_ratio: Option<f64>,
}

/// Result of a risk assessment, ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub dimensions: RiskDimensions,
    pub overall_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

/// Computes risk scores from profile-derived inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Dimension weights in (income, expense, investment, life event, market) order
    pub fn weights() -> [f64; 5] {
        [
            INCOME_RISK_WEIGHT,
            EXPENSE_RISK_WEIGHT,
            INVESTMENT_RISK_WEIGHT,
            LIFE_EVENT_RISK_WEIGHT,
            MARKET_RISK_WEIGHT,
        ]
    }

    /// Weighted overall score; `None` unless all five dimensions are present
    pub fn overall_score(dimensions: &RiskDimensions) -> Option<f64> {
        let scores = [
            dimensions.income?,
            dimensions.expense?,
            dimensions.investment?,
            dimensions.life_event?,
            dimensions.market?,
        ];

        Some(
            scores
                .iter()
                .zip(Self::weights())
                .map(|(score, weight)| score * weight)
                .sum(),
        )
    }

    /// Score the dimensions and classify the result
    ///
    /// Present scores must be finite and within [0, 1].
    pub fn assess(&self, dimensions: RiskDimensions) -> Result<RiskAssessment> {
        for (name, score) in dimensions.named() {
            if let Some(s) = score {
                if !s.is_finite() || !(0.0..=1.0).contains(&s) {
                    return Err(Error::InvalidArgument(format!(
                        "{} risk score must be within [0, 1], got {}",
                        name, s
                    )));
                }
            }
        }

        let overall_score = Self::overall_score(&dimensions);
        let risk_level = overall_score.map(RiskLevel::from_score);

        match overall_score {
            Some(score) => tracing::debug!(score, level = ?risk_level, "Risk assessed"),
            None => tracing::debug!(
                missing = ?dimensions.missing(),
                "Risk assessment incomplete, no overall score"
            ),
        }

        Ok(RiskAssessment {
            dimensions,
            overall_score,
            risk_level,
        })
    }

    /// Income and investment sub-scores; incomplete inputs are omitted
    pub fn risk_metrics(factor: &RiskFactor) -> RiskMetrics {
        let mut metrics = RiskMetrics::new();

        if let (Some(diversity), Some(stability), Some(career)) = (
            factor.income_source_diversity,
            factor.income_stability_index,
            factor.career_risk_factor,
        ) {
            metrics.insert(
                RiskMetric::IncomeRisk,
                diversity * 0.3 + stability * 0.4 + career * 0.3,
            );
        }

        if let (Some(volatility), Some(correlation), Some(diversification)) = (
            factor.portfolio_volatility,
            factor.market_correlation,
            factor.diversification_score,
        ) {
            metrics.insert(
                RiskMetric::InvestmentRisk,
                volatility * 0.4 + correlation * 0.3 + diversification * 0.3,
            );
        }

        metrics
    }
}
