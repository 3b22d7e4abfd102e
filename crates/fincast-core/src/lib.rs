//! Fincast Core Library
//!
//! Scoring engine for personal financial planning:
//! - Region-adjusted baseline living cost and income projection
//! - Cohort statistics with confidence intervals
//! - Hybrid predictions combining baseline, statistical and AI-model sources
//! - Prediction validation and per-category calibration
//! - Five-dimension risk scoring and risk level classification
//! - Lifecycle stage weighting and composite scores
//! - Budget variance tracking
//!
//! All computations are synchronous and side-effect free apart from
//! `tracing` diagnostics. The only async boundary is the external
//! [`PredictionSource`].

pub mod baseline;
pub mod budget;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod prediction;
pub mod risk;
pub mod statistics;

/// Shared fixtures for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use baseline::{BaselineCalculator, RegionalBaseline};
pub use budget::{BudgetPerformance, BudgetReport, BudgetVarianceTracker};
pub use config::{default_config_path, EngineConfig, PredictionConfig};
pub use error::{Error, Result};
pub use lifecycle::{
    LifecycleFactor, LifecycleModel, LifecycleStage, LifecycleStageWeighter, StageParameterTable,
    StageParameters, StageWeights,
};
pub use models::{
    confidence_from_variance, Category, CategoryPredictions, CategoryValues, CategoryWeights,
};
pub use prediction::{
    Calibration, CalibrationEngine, CombineOutcome, ConfidenceValidator, GatheredPredictions,
    HybridPrediction, HybridPredictionCoordinator, ImpactMetrics, MockPredictionSource, ModelPrediction,
    PredictionContext, PredictionInputs, PredictionRequest, PredictionSource, PredictionStatus,
    PredictionType, RawModelPrediction, ValidationReport,
};
pub use risk::{
    RiskAssessment, RiskDimensions, RiskFactor, RiskLevel, RiskMetric, RiskMetrics, RiskScorer,
};
pub use statistics::{
    Cohort, IncomeRange, ReferenceStore, StatisticalReference, StatisticalReferenceProvider,
};
