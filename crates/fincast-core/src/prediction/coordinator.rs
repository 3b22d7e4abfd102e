//! Hybrid prediction coordinator
//!
//! Combines up to three prediction sources per category into one weighted
//! result and drives the prediction state machine:
//!
//! ```text
//! Pending ──start──▶ Processing ──combine──▶ Completed
//!                         │
//!                         └──(invalid source / nothing combinable)──▶ Failed
//! ```
//!
//! Every weight vector has one slot per source, ordered baseline,
//! statistical, model. A weight never moves to another source: a zero-weight
//! slot without a value is dropped, a weighted slot without a value rejects
//! the category.
//!
//! Iterations for one user + prediction type lineage must be serialized by
//! the caller. `combine` takes the iteration the caller expects and rejects
//! stale writes instead of silently losing an update.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::baseline::{BaselineCalculator, RegionalBaseline};
use crate::config::PredictionConfig;
use crate::error::{Error, Result};
use crate::models::{Category, CategoryPredictions, CategoryValues, CategoryWeights};
use crate::statistics::StatisticalReference;

use super::source::{PredictionContext, PredictionSource, RawModelPrediction};
use super::types::{HybridPrediction, PredictionStatus, PredictionType};

/// Result of weighting per-category predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombineOutcome {
    /// Weighted value for every category that could be computed
    pub values: CategoryValues,
    /// Categories that could not be computed, with the reason
    pub rejected: BTreeMap<Category, String>,
}

/// Number of prediction sources, and the length of every weight vector
pub const SOURCE_COUNT: usize = 3;

/// Source names in weight-slot order
pub const SOURCE_ORDER: [&str; SOURCE_COUNT] = ["baseline", "statistical", "model"];

/// Slot-aligned weight and prediction vectors for one combination
///
/// `weights` and `predictions` hold only the slots that take part, so they
/// can be passed straight to [`combine_weighted`] and [`prediction_variance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatheredPredictions {
    pub weights: CategoryWeights,
    pub predictions: CategoryPredictions,
    /// Categories whose weighted sources are incomplete
    pub rejected: BTreeMap<Category, String>,
}

/// Weighted sum per category: `Σ predictions[i] * weights[i]`
///
/// Only categories present in `weights` are considered; categories without a
/// weight vector are excluded rather than defaulted to zero.
pub fn combine_weighted(
    weights: &CategoryWeights,
    predictions: &CategoryPredictions,
) -> CombineOutcome {
    let mut outcome = CombineOutcome::default();

    for (category, weight_vector) in weights {
        let prediction_vector = match predictions.get(category) {
            Some(p) if !p.is_empty() => p,
            _ => {
                outcome
                    .rejected
                    .insert(*category, "no source produced a prediction".to_string());
                continue;
            }
        };

        if prediction_vector.len() != weight_vector.len() {
            outcome.rejected.insert(
                *category,
                format!(
                    "{} weights for {} predictions",
                    weight_vector.len(),
                    prediction_vector.len()
                ),
            );
            continue;
        }

        let value = prediction_vector
            .iter()
            .zip(weight_vector)
            .map(|(prediction, weight)| prediction * weight)
            .sum();

        tracing::trace!(category = category.as_str(), value, "Category combined");
        outcome.values.insert(*category, value);
    }

    outcome
}

/// Dispersion of the sources around the combined result
///
/// Per category: `Σ w_i ((p_i - r) / r)^2 / Σ w_i`, averaged across
/// categories. Categories with a zero result or zero total weight are
/// skipped; if none remain the variance is 0.
pub fn prediction_variance(
    weights: &CategoryWeights,
    predictions: &CategoryPredictions,
    results: &CategoryValues,
) -> f64 {
    let mut per_category = Vec::new();

    for (category, result) in results {
        let (Some(w), Some(p)) = (weights.get(category), predictions.get(category)) else {
            continue;
        };
        if *result == 0.0 || w.len() != p.len() {
            continue;
        }

        let weight_total: f64 = w.iter().sum();
        if weight_total == 0.0 {
            continue;
        }

        let spread: f64 = w
            .iter()
            .zip(p)
            .map(|(weight, prediction)| weight * ((prediction - result) / result).powi(2))
            .sum();

        per_category.push(spread / weight_total);
    }

    crate::models::mean(&per_category).unwrap_or(0.0)
}

/// What the caller wants predicted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub user_id: i64,
    pub prediction_type: PredictionType,
    pub weights: CategoryWeights,
}

/// Already-loaded inputs for one combination
#[derive(Debug, Clone, Default)]
pub struct PredictionInputs<'a> {
    pub baseline: Option<&'a RegionalBaseline>,
    pub reference: Option<&'a StatisticalReference>,
    /// Raw collaborator output; `None` when the source produced nothing
    pub model_output: Option<RawModelPrediction>,
}

/// Owns the hybrid prediction state machine and versioning
#[derive(Debug, Clone)]
pub struct HybridPredictionCoordinator {
    baseline: BaselineCalculator,
    version: String,
}

impl HybridPredictionCoordinator {
    pub fn new(version: impl Into<String>, projection_years: i32) -> Result<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "prediction version must not be empty".to_string(),
            ));
        }

        Ok(Self {
            baseline: BaselineCalculator::new(projection_years)?,
            version,
        })
    }

    pub fn from_config(config: &PredictionConfig) -> Result<Self> {
        Self::new(config.version.clone(), config.projection_years)
    }

    /// Version stamped on every successful combination
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Create a Pending prediction
    ///
    /// `previous` is the latest prediction in the same lineage, if any; the new
    /// prediction continues from its iteration.
    pub fn begin(
        &self,
        id: i64,
        request: PredictionRequest,
        previous: Option<&HybridPrediction>,
    ) -> Result<HybridPrediction> {
        validate_weights(&request.weights)?;

        let iteration = match previous {
            Some(prev) => {
                if !prev.same_lineage(request.user_id, request.prediction_type) {
                    return Err(Error::IntegrityViolation(format!(
                        "prediction {} belongs to user {} / {}, not user {} / {}",
                        prev.id,
                        prev.user_id,
                        prev.prediction_type,
                        request.user_id,
                        request.prediction_type
                    )));
                }
                if !prev.status.is_terminal() {
                    return Err(Error::IntegrityViolation(format!(
                        "previous prediction {} is still {}",
                        prev.id, prev.status
                    )));
                }
                prev.iteration
            }
            None => 0,
        };

        let now = Utc::now();
        Ok(HybridPrediction {
            id,
            user_id: request.user_id,
            prediction_type: request.prediction_type,
            status: PredictionStatus::Pending,
            version: None,
            iteration,
            model_weights: request.weights,
            results: CategoryValues::new(),
            prediction_variance: None,
            confidence_score: None,
            baseline_id: None,
            reference_id: None,
            model_source_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Pending → Processing
    pub fn start(&self, prediction: &mut HybridPrediction) -> Result<()> {
        prediction.transition(PredictionStatus::Processing)
    }

    /// Context handed to the external prediction source
    pub fn context(
        &self,
        prediction: &HybridPrediction,
        baseline: Option<&RegionalBaseline>,
        reference: Option<&StatisticalReference>,
    ) -> Result<PredictionContext> {
        let projected_income = match baseline {
            Some(b) => b.project_income(self.baseline.projection_years())?,
            None => None,
        };
        let income_range = match reference {
            Some(r) => r.income_range()?,
            None => None,
        };

        Ok(PredictionContext {
            user_id: prediction.user_id,
            prediction_type: prediction.prediction_type,
            categories: prediction.model_weights.keys().copied().collect(),
            living_cost: baseline.and_then(|b| b.living_cost()),
            projected_income,
            income_range,
        })
    }

    /// Align each category's weights with the sources that produced a value
    pub fn gather(
        &self,
        weights: &CategoryWeights,
        baseline: Option<&RegionalBaseline>,
        reference: Option<&StatisticalReference>,
        model: &CategoryValues,
    ) -> Result<GatheredPredictions> {
        let baseline_estimates = match baseline {
            Some(b) => self.baseline.category_estimates(b)?,
            None => CategoryValues::new(),
        };
        let statistical_estimates = reference
            .map(|r| r.category_estimates())
            .unwrap_or_default();

        let sources: [&CategoryValues; SOURCE_COUNT] =
            [&baseline_estimates, &statistical_estimates, model];

        let mut gathered = GatheredPredictions::default();

        'categories: for (category, weight_vector) in weights {
            if weight_vector.len() != SOURCE_COUNT {
                gathered.rejected.insert(
                    *category,
                    format!(
                        "expected {} weights ({}), got {}",
                        SOURCE_COUNT,
                        SOURCE_ORDER.join(", "),
                        weight_vector.len()
                    ),
                );
                continue;
            }

            let mut slot_weights = Vec::with_capacity(SOURCE_COUNT);
            let mut slot_values = Vec::with_capacity(SOURCE_COUNT);

            for ((name, source), weight) in SOURCE_ORDER.iter().zip(sources).zip(weight_vector) {
                match source.get(category) {
                    Some(value) => {
                        slot_weights.push(*weight);
                        slot_values.push(*value);
                    }
                    None if *weight == 0.0 => {}
                    None => {
                        gathered.rejected.insert(
                            *category,
                            format!("{} source has weight {} but no value", name, weight),
                        );
                        continue 'categories;
                    }
                }
            }

            gathered.weights.insert(*category, slot_weights);
            gathered.predictions.insert(*category, slot_values);
        }

        Ok(gathered)
    }

    /// Combine all inputs into the prediction
    ///
    /// Requires a Processing prediction at `expected_iteration`. Invalid or
    /// missing model output, nothing combinable, or a non-finite variance
    /// moves the prediction to Failed and returns the error. Nothing else on
    /// the prediction is written unless the combination completes.
    pub fn combine(
        &self,
        prediction: &mut HybridPrediction,
        inputs: PredictionInputs<'_>,
        expected_iteration: u32,
    ) -> Result<CombineOutcome> {
        if prediction.status != PredictionStatus::Processing {
            return Err(Error::IntegrityViolation(format!(
                "cannot combine {} prediction {}",
                prediction.status, prediction.id
            )));
        }
        if prediction.iteration != expected_iteration {
            return Err(Error::IntegrityViolation(format!(
                "stale write to prediction {}: expected iteration {}, found {}",
                prediction.id, expected_iteration, prediction.iteration
            )));
        }

        let model = match inputs.model_output.as_ref() {
            Some(raw) => raw.validate(),
            None => Err(Error::PredictionSourceInvalid(
                "no model output available".to_string(),
            )),
        };
        let model = match model {
            Ok(m) => m,
            Err(e) => {
                prediction.fail(e.to_string())?;
                return Err(e);
            }
        };

        let gathered = match self.gather(
            &prediction.model_weights,
            inputs.baseline,
            inputs.reference,
            &model.values,
        ) {
            Ok(g) => g,
            Err(e) => {
                prediction.fail(e.to_string())?;
                return Err(e);
            }
        };

        let mut outcome = combine_weighted(&gathered.weights, &gathered.predictions);
        outcome.rejected.extend(gathered.rejected);

        let overflowed: Vec<Category> = outcome
            .values
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(category, _)| *category)
            .collect();
        for category in overflowed {
            outcome.values.remove(&category);
            outcome
                .rejected
                .insert(category, "combined value is not finite".to_string());
        }

        if outcome.values.is_empty() {
            let reasons = outcome
                .rejected
                .iter()
                .map(|(category, reason)| format!("{}: {}", category, reason))
                .collect::<Vec<_>>()
                .join("; ");
            let err = Error::InvalidArgument(format!("no category could be combined ({})", reasons));
            prediction.fail(err.to_string())?;
            return Err(err);
        }

        let variance = prediction_variance(&gathered.weights, &gathered.predictions, &outcome.values);
        if !variance.is_finite() {
            let err = Error::InvalidArgument(format!(
                "prediction variance is not finite ({})",
                variance
            ));
            prediction.fail(err.to_string())?;
            return Err(err);
        }

        prediction.update_confidence(variance)?;
        prediction.prediction_variance = Some(variance);
        prediction.results = outcome.values.clone();
        prediction.baseline_id = inputs.baseline.map(|b| b.id);
        prediction.reference_id = inputs.reference.map(|r| r.id);
        prediction.model_source_id = Some(model.source_id);
        prediction.iteration += 1;
        prediction.version = Some(self.version.clone());
        prediction.transition(PredictionStatus::Completed)?;

        tracing::debug!(
            prediction_id = prediction.id,
            iteration = prediction.iteration,
            combined = outcome.values.len(),
            rejected = outcome.rejected.len(),
            variance,
            "Hybrid prediction combined"
        );

        Ok(outcome)
    }

    /// Run a full prediction against an external source
    ///
    /// A failing or invalid source yields `Ok` with a Failed prediction, since
    /// that record still needs persisting. Precondition violations are errors.
    pub async fn run<S>(
        &self,
        id: i64,
        request: PredictionRequest,
        previous: Option<&HybridPrediction>,
        baseline: Option<&RegionalBaseline>,
        reference: Option<&StatisticalReference>,
        source: &S,
    ) -> Result<HybridPrediction>
    where
        S: PredictionSource + ?Sized,
    {
        let mut prediction = self.begin(id, request, previous)?;
        let expected_iteration = prediction.iteration;
        let context = self.context(&prediction, baseline, reference)?;

        self.start(&mut prediction)?;

        let model_output = match source.predict(&context).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(
                    prediction_id = id,
                    source = source.source_id(),
                    error = %e,
                    "Prediction source returned no output"
                );
                prediction.fail(e.to_string())?;
                return Ok(prediction);
            }
        };

        let inputs = PredictionInputs {
            baseline,
            reference,
            model_output: Some(model_output),
        };

        match self.combine(&mut prediction, inputs, expected_iteration) {
            Ok(_) => Ok(prediction),
            Err(_) if prediction.status == PredictionStatus::Failed => Ok(prediction),
            Err(e) => Err(e),
        }
    }
}

fn validate_weights(weights: &CategoryWeights) -> Result<()> {
    if weights.is_empty() {
        return Err(Error::InvalidArgument(
            "weight configuration is empty".to_string(),
        ));
    }

    for (category, vector) in weights {
        if vector.len() != SOURCE_COUNT {
            return Err(Error::InvalidArgument(format!(
                "weight vector for {} needs {} slots ({}), got {}",
                category,
                SOURCE_COUNT,
                SOURCE_ORDER.join(", "),
                vector.len()
            )));
        }
        if let Some(bad) = vector.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::InvalidArgument(format!(
                "weight {} for {} must be finite and non-negative",
                bad, category
            )));
        }
    }

    Ok(())
}
