//! Lifecycle stage weighting
//!
//! Each of the six life stages carries base parameters for income, expense,
//! investment and risk. A user's multipliers scale those into the weights
//! used for budgeting. Missing configuration produces zero weights, which
//! downstream budgeting reads as "no adjustment".

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Upper age bounds (exclusive) for each stage except retirement
const STAGE_AGE_THRESHOLDS: [(u32, LifecycleStage); 5] = [
    (22, LifecycleStage::Education),
    (30, LifecycleStage::CareerStart),
    (40, LifecycleStage::FamilyBuilding),
    (50, LifecycleStage::CareerPeak),
    (65, LifecycleStage::PreRetirement),
];

/// Ordered life phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Education,
    CareerStart,
    FamilyBuilding,
    CareerPeak,
    PreRetirement,
    Retirement,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::Education => "education",
            LifecycleStage::CareerStart => "career_start",
            LifecycleStage::FamilyBuilding => "family_building",
            LifecycleStage::CareerPeak => "career_peak",
            LifecycleStage::PreRetirement => "pre_retirement",
            LifecycleStage::Retirement => "retirement",
        }
    }

    /// Get all stages in life order
    pub fn all() -> &'static [LifecycleStage] {
        &[
            LifecycleStage::Education,
            LifecycleStage::CareerStart,
            LifecycleStage::FamilyBuilding,
            LifecycleStage::CareerPeak,
            LifecycleStage::PreRetirement,
            LifecycleStage::Retirement,
        ]
    }

    /// Default stage for an age, from the fixed threshold table
    pub fn for_age(age: u32) -> Self {
        STAGE_AGE_THRESHOLDS
            .iter()
            .find(|(upper, _)| age < *upper)
            .map(|(_, stage)| *stage)
            .unwrap_or(LifecycleStage::Retirement)
    }

    /// The stage that follows this one (retirement is final)
    pub fn next(&self) -> Option<Self> {
        let all = Self::all();
        let pos = all.iter().position(|s| s == self)?;
        all.get(pos + 1).copied()
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LifecycleStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleStage::all()
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("Unknown lifecycle stage: {}", s))
    }
}

/// Base parameters for one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageParameters {
    pub income: f64,
    pub expense: f64,
    pub investment: f64,
    pub risk: f64,
}

pub type StageParameterTable = BTreeMap<LifecycleStage, StageParameters>;

/// Weights derived for the user's current stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageWeights {
    pub income: f64,
    pub expense: f64,
    pub investment: f64,
    pub risk: f64,
}

impl StageWeights {
    pub fn is_zero(&self) -> bool {
        self.income == 0.0 && self.expense == 0.0 && self.investment == 0.0 && self.risk == 0.0
    }

    /// Weight that applies to a budget category
    pub fn weight_for(&self, category: Category) -> f64 {
        match category {
            Category::Income => self.income,
            Category::Savings | Category::Investment => self.investment,
            Category::Insurance => self.risk,
            _ => self.expense,
        }
    }
}

/// A user's lifecycle position and multipliers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleModel {
    pub user_id: i64,
    pub current_stage: Option<LifecycleStage>,
    pub age_factor: Option<f64>,
    pub career_factor: Option<f64>,
    pub family_factor: Option<f64>,
    pub wealth_factor: Option<f64>,
    /// Per-model parameters; engine defaults apply when absent
    #[serde(default)]
    pub parameters: Option<StageParameterTable>,
}

/// Income, expense and wealth sub-factors for one profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleFactor {
    pub income_growth_rate: Option<f64>,
    pub income_stability: Option<f64>,
    pub career_potential: Option<f64>,
    pub lifestyle_coefficient: Option<f64>,
    pub dependency_ratio: Option<f64>,
    pub saving_capacity: Option<f64>,
    pub investment_preference: Option<f64>,
    pub wealth_momentum: Option<f64>,
}

impl LifecycleFactor {
    /// `stability*0.4 + saving_capacity*0.3 + wealth_momentum*0.3`, all required
    pub fn composite_score(&self) -> Option<f64> {
        Some(
            self.income_stability? * 0.4
                + self.saving_capacity? * 0.3
                + self.wealth_momentum? * 0.3,
        )
    }
}

/// Computes stage-dependent weights
#[derive(Debug, Clone, Default)]
pub struct LifecycleStageWeighter {
    defaults: StageParameterTable,
}

impl LifecycleStageWeighter {
    /// Weighter without default parameters (models must carry their own)
    pub fn new() -> Self {
        Self::default()
    }

    /// Weighter that falls back to the given table for models without one
    pub fn with_defaults(defaults: StageParameterTable) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &StageParameterTable {
        &self.defaults
    }

    /// Stage weights for a model
    ///
    /// Returns all zeros when the stage or its parameters are unavailable. A
    /// missing multiplier zeroes only its own component.
    pub fn stage_weights(&self, model: &LifecycleModel) -> StageWeights {
        let stage = match model.current_stage {
            Some(s) => s,
            None => return StageWeights::default(),
        };

        let table = model.parameters.as_ref().unwrap_or(&self.defaults);
        let base = match table.get(&stage) {
            Some(p) => p,
            None => {
                tracing::debug!(
                    user_id = model.user_id,
                    stage = stage.as_str(),
                    "No parameters for lifecycle stage, using zero weights"
                );
                return StageWeights::default();
            }
        };

        let scaled = |value: f64, factor: Option<f64>| factor.map(|f| value * f).unwrap_or(0.0);

        StageWeights {
            income: scaled(base.income, model.career_factor),
            expense: scaled(base.expense, model.family_factor),
            investment: scaled(base.investment, model.wealth_factor),
            risk: scaled(base.risk, model.age_factor),
        }
    }

    /// Composite lifecycle score for a factor set
    pub fn composite_score(factor: &LifecycleFactor) -> Option<f64> {
        factor.composite_score()
    }
}
