//! Engine configuration
//!
//! Holds the prediction version stamp, the income projection horizon and the
//! default lifecycle stage parameters.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/fincast/config/engine.toml)
//!    or an explicit path
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! An override file replaces the embedded file; it is not merged into it.
//! Prediction keys left out take their built-in values, but a file without a
//! `[lifecycle.stages]` table has no default stage parameters, so every stage
//! weight is zero unless a model carries its own table.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lifecycle::{LifecycleStage, LifecycleStageWeighter, StageParameterTable, StageParameters};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Settings for hybrid prediction runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Version stamped on completed predictions
    pub version: String,
    /// Years of compound growth applied to baseline income
    pub projection_years: i32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            version: "hybrid-1.0".to_string(),
            projection_years: 1,
        }
    }
}

/// Loaded, immutable engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub prediction: PredictionConfig,
    pub stage_parameters: StageParameterTable,
}

impl EngineConfig {
    /// Load from the default override location, else embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::embedded(),
        }
    }

    /// Load from an explicit path; a missing file falls back to defaults
    pub fn with_path(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "Config override not found, using defaults");
            Self::embedded()
        }
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// The raw embedded TOML, for `fincast config --defaults`
    pub fn default_toml() -> &'static str {
        DEFAULT_CONFIG
    }

    /// Lifecycle weighter seeded with this config's stage parameters
    pub fn stage_weighter(&self) -> LifecycleStageWeighter {
        LifecycleStageWeighter::with_defaults(self.stage_parameters.clone())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded config override");
        parse_config(&content)
    }
}

/// Get the override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fincast").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    prediction: Option<RawPrediction>,
    lifecycle: Option<RawLifecycle>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    version: Option<String>,
    projection_years: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawLifecycle {
    stages: Option<HashMap<String, RawStage>>,
}

#[derive(Debug, Deserialize)]
struct RawStage {
    income: Option<f64>,
    expense: Option<f64>,
    investment: Option<f64>,
    risk: Option<f64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(prediction) = raw.prediction {
        if let Some(version) = prediction.version {
            if version.trim().is_empty() {
                return Err(Error::Config("prediction.version must not be empty".to_string()));
            }
            config.prediction.version = version;
        }
        if let Some(years) = prediction.projection_years {
            if years < 0 {
                return Err(Error::Config(format!(
                    "prediction.projection_years must be non-negative, got {}",
                    years
                )));
            }
            config.prediction.projection_years = years;
        }
    }

    if let Some(stages) = raw.lifecycle.and_then(|l| l.stages) {
        for (name, stage) in stages {
            let Ok(key) = name.parse::<LifecycleStage>() else {
                tracing::debug!(stage = name.as_str(), "Skipping unknown lifecycle stage");
                continue;
            };

            let params = StageParameters {
                income: stage.income.unwrap_or(0.0),
                expense: stage.expense.unwrap_or(0.0),
                investment: stage.investment.unwrap_or(0.0),
                risk: stage.risk.unwrap_or(0.0),
            };

            for (field, value) in [
                ("income", params.income),
                ("expense", params.expense),
                ("investment", params.investment),
                ("risk", params.risk),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::Config(format!(
                        "lifecycle.stages.{}.{} must be finite and non-negative, got {}",
                        name, field, value
                    )));
                }
            }

            config.stage_parameters.insert(key, params);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleModel;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.prediction.version, "hybrid-1.0");
        assert_eq!(config.prediction.projection_years, 1);
        assert_eq!(config.stage_parameters.len(), LifecycleStage::all().len());
    }

    #[test]
    fn test_partial_config_drops_stage_table() {
        let config = parse_config(
            r#"
            [prediction]
            version = "hybrid-2.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.prediction.version, "hybrid-2.0");
        assert_eq!(config.prediction.projection_years, 1);
        assert!(config.stage_parameters.is_empty());
    }

    #[test]
    fn test_unknown_stage_skipped() {
        let config = parse_config(
            r#"
            [lifecycle.stages.midlife_crisis]
            income = 1.0

            [lifecycle.stages.retirement]
            income = 0.3
            risk = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.stage_parameters.len(), 1);
        let retirement = config.stage_parameters[&LifecycleStage::Retirement];
        assert_eq!(retirement.income, 0.3);
        assert_eq!(retirement.expense, 0.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[prediction]\nprojection_years = -2\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = parse_config("[lifecycle.stages.education]\nrisk = -0.5\n").unwrap_err();
        assert!(err.to_string().contains("risk"));

        assert!(parse_config("[prediction\n").is_err());
    }

    #[test]
    fn test_with_path_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[prediction]\nversion = \"custom\"\nprojection_years = 5").unwrap();

        let config = EngineConfig::with_path(file.path()).unwrap();
        assert_eq!(config.prediction.version, "custom");
        assert_eq!(config.prediction.projection_years, 5);
        assert!(config.stage_parameters.is_empty());
        assert!(config
            .stage_weighter()
            .stage_weights(&LifecycleModel {
                current_stage: Some(LifecycleStage::CareerStart),
                age_factor: Some(1.0),
                career_factor: Some(1.0),
                family_factor: Some(1.0),
                wealth_factor: Some(1.0),
                ..Default::default()
            })
            .is_zero());
    }

    #[test]
    fn test_with_missing_path_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::with_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::embedded().unwrap());
    }

    #[test]
    fn test_stage_weighter_uses_config_defaults() {
        let config = EngineConfig::embedded().unwrap();
        let weighter = config.stage_weighter();
        assert_eq!(weighter.defaults(), &config.stage_parameters);
    }
}
