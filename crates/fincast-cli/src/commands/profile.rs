//! Profile snapshot file format

use fincast_core::{
    LifecycleFactor, LifecycleModel, RegionalBaseline, RiskDimensions, RiskFactor,
    StatisticalReference,
};
use serde::{Deserialize, Serialize};

/// Everything the engine knows about one user at one point in time
///
/// Every section is optional; commands report what they could not compute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub user_id: i64,
    pub baseline: Option<RegionalBaseline>,
    pub reference: Option<StatisticalReference>,
    pub risk_factor: Option<RiskFactor>,
    pub risk_dimensions: Option<RiskDimensions>,
    pub lifecycle_model: Option<LifecycleModel>,
    pub lifecycle_factor: Option<LifecycleFactor>,
}
