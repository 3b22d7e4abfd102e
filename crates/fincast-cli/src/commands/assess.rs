//! Risk and lifecycle assessment

use std::path::Path;

use anyhow::{Context, Result};
use fincast_core::{
    EngineConfig, LifecycleStage, LifecycleStageWeighter, RiskAssessment, RiskMetrics, RiskScorer,
    StageWeights,
};
use serde::Serialize;

use super::{emit_json, load_config, read_json, ProfileSnapshot};

/// Scores derived from one profile snapshot
#[derive(Debug, Serialize)]
pub struct Assessment {
    pub user_id: i64,
    pub risk_metrics: RiskMetrics,
    pub risk: Option<RiskAssessment>,
    pub lifecycle_stage: Option<LifecycleStage>,
    pub stage_weights: Option<StageWeights>,
    pub lifecycle_score: Option<f64>,
}

pub fn assess_profile(profile: &ProfileSnapshot, config: &EngineConfig) -> Result<Assessment> {
    let risk_metrics = profile
        .risk_factor
        .as_ref()
        .map(RiskScorer::risk_metrics)
        .unwrap_or_default();

    let risk = match profile.risk_dimensions {
        Some(dimensions) => Some(
            RiskScorer::new()
                .assess(dimensions.with_metrics(&risk_metrics))
                .context("Risk assessment failed")?,
        ),
        None => None,
    };

    let weighter = config.stage_weighter();
    let stage_weights = profile
        .lifecycle_model
        .as_ref()
        .map(|model| weighter.stage_weights(model));

    Ok(Assessment {
        user_id: profile.user_id,
        risk_metrics,
        risk,
        lifecycle_stage: profile.lifecycle_model.as_ref().and_then(|m| m.current_stage),
        stage_weights,
        lifecycle_score: profile
            .lifecycle_factor
            .as_ref()
            .and_then(LifecycleStageWeighter::composite_score),
    })
}

pub fn cmd_assess(config_path: Option<&Path>, profile_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let profile: ProfileSnapshot = read_json(profile_path)?;

    let assessment = assess_profile(&profile, &config)?;

    match &assessment.risk {
        Some(RiskAssessment {
            overall_score: None,
            dimensions,
            ..
        }) => tracing::warn!(
            "No overall risk score, missing dimensions: {}",
            dimensions.missing().join(", ")
        ),
        None => tracing::warn!("Profile has no risk dimensions"),
        _ => {}
    }

    emit_json(&assessment, None)
}
