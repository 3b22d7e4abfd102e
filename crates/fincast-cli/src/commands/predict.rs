//! Hybrid prediction command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use fincast_core::{
    CategoryWeights, HybridPrediction, HybridPredictionCoordinator, PredictionContext,
    PredictionRequest, PredictionSource, PredictionStatus, PredictionType, RawModelPrediction,
};

use super::{emit_json, load_config, read_json, ProfileSnapshot};

/// Prediction source backed by a JSON file of collaborator output
#[derive(Debug, Clone)]
pub struct FilePredictionSource {
    path: PathBuf,
    source_id: String,
}

impl FilePredictionSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            source_id: format!("file:{}", path.display()),
        }
    }
}

#[async_trait]
impl PredictionSource for FilePredictionSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn predict(&self, context: &PredictionContext) -> fincast_core::Result<RawModelPrediction> {
        tracing::debug!(
            user_id = context.user_id,
            categories = context.categories.len(),
            path = %self.path.display(),
            "Reading model output"
        );
        let payload = tokio::fs::read_to_string(&self.path).await?;
        RawModelPrediction::from_json(&payload)
    }
}

/// Arguments for `fincast predict`
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub profile: PathBuf,
    pub weights: PathBuf,
    pub model: PathBuf,
    pub previous: Option<PathBuf>,
    pub id: i64,
    pub prediction_type: String,
    pub output: Option<PathBuf>,
}

/// Run one prediction and return the record to persist
pub async fn run_prediction(
    coordinator: &HybridPredictionCoordinator,
    args: &PredictArgs,
    source: &dyn PredictionSource,
) -> Result<HybridPrediction> {
    let prediction_type: PredictionType = args
        .prediction_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let profile: ProfileSnapshot = read_json(&args.profile)?;
    let weights: CategoryWeights = read_json(&args.weights)?;
    let previous: Option<HybridPrediction> = match &args.previous {
        Some(path) => Some(read_json(path)?),
        None => None,
    };

    let request = PredictionRequest {
        user_id: profile.user_id,
        prediction_type,
        weights,
    };

    coordinator
        .run(
            args.id,
            request,
            previous.as_ref(),
            profile.baseline.as_ref(),
            profile.reference.as_ref(),
            source,
        )
        .await
        .context("Prediction failed")
}

pub async fn cmd_predict(config_path: Option<&Path>, args: &PredictArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let coordinator = HybridPredictionCoordinator::from_config(&config.prediction)
        .context("Invalid prediction config")?;
    let source = FilePredictionSource::new(&args.model);

    let prediction = run_prediction(&coordinator, args, &source).await?;

    match prediction.status {
        PredictionStatus::Completed => tracing::info!(
            "Prediction {} completed (iteration {}, confidence {:.3})",
            prediction.id,
            prediction.iteration,
            prediction.confidence_score.unwrap_or(0.0)
        ),
        _ => tracing::warn!(
            "Prediction {} {}: {}",
            prediction.id,
            prediction.status,
            prediction.failure_reason.as_deref().unwrap_or("unknown reason")
        ),
    }

    emit_json(&prediction, args.output.as_deref())
}
