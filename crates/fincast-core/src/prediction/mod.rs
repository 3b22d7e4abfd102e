//! Hybrid predictions
//!
//! Baseline, statistical and AI-model predictions are combined per category
//! into one weighted [`HybridPrediction`], then validated against actuals and
//! optionally calibrated.
//!
//! # Architecture
//!
//! - `PredictionSource` trait: the external AI collaborator (async)
//! - `HybridPredictionCoordinator`: weighting, variance and the status machine
//! - `ConfidenceValidator`: accuracy against observed actuals
//! - `CalibrationEngine`: per-category factors with impact analysis
//! - `MockPredictionSource`: predictable source for tests and dry runs
//!
//! # Usage
//!
//! ```rust,ignore
//! let coordinator = HybridPredictionCoordinator::from_config(&config.prediction)?;
//! let prediction = coordinator
//!     .run(id, request, previous.as_ref(), Some(&baseline), Some(&reference), &source)
//!     .await?;
//! ```

pub mod calibration;
pub mod coordinator;
mod mock;
pub mod source;
pub mod types;
pub mod validator;

pub use calibration::{Calibration, CalibrationEngine, ImpactMetrics};
pub use coordinator::{
    combine_weighted, prediction_variance, CombineOutcome, GatheredPredictions,
    HybridPredictionCoordinator, PredictionInputs, PredictionRequest, SOURCE_COUNT, SOURCE_ORDER,
};
pub use mock::MockPredictionSource;
pub use source::{ModelPrediction, PredictionContext, PredictionSource, RawModelPrediction};
pub use types::{HybridPrediction, PredictionStatus, PredictionType};
pub use validator::{ConfidenceValidator, ValidationReport};
