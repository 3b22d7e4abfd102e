//! Budget variance command

use std::path::Path;

use anyhow::{Context, Result};
use fincast_core::{BudgetReport, BudgetVarianceTracker, CategoryValues, EngineConfig};
use serde::Serialize;

use super::{emit_json, load_config, read_json, ProfileSnapshot};

#[derive(Debug, Serialize)]
pub struct BudgetOutput {
    #[serde(flatten)]
    pub report: BudgetReport,
    /// Confidence weighted by the profile's lifecycle stage
    pub weighted_confidence: Option<f64>,
}

pub fn budget_report(
    budgets: &CategoryValues,
    actuals: &CategoryValues,
    profile: Option<&ProfileSnapshot>,
    config: &EngineConfig,
) -> Result<BudgetOutput> {
    let tracker = BudgetVarianceTracker::new();
    let report = tracker
        .track(budgets, actuals)
        .context("Budget tracking failed")?;

    let weighted_confidence = match profile.and_then(|p| p.lifecycle_model.as_ref()) {
        Some(model) => {
            let weights = config.stage_weighter().stage_weights(model);
            tracker
                .weighted_confidence(budgets, actuals, &weights)
                .context("Weighted budget confidence failed")?
        }
        None => None,
    };

    Ok(BudgetOutput {
        report,
        weighted_confidence,
    })
}

pub fn cmd_budget(
    config_path: Option<&Path>,
    budgets_path: &Path,
    actuals_path: &Path,
    profile_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let budgets: CategoryValues = read_json(budgets_path)?;
    let actuals: CategoryValues = read_json(actuals_path)?;
    let profile: Option<ProfileSnapshot> = match profile_path {
        Some(p) => Some(read_json(p)?),
        None => None,
    };

    let output = budget_report(&budgets, &actuals, profile.as_ref(), &config)?;

    let over = output.report.over_budget();
    if !over.is_empty() {
        tracing::info!(
            "Over budget: {}",
            over.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        );
    }

    emit_json(&output, None)
}
