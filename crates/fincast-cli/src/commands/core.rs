//! Shared command utilities

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fincast_core::EngineConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Load engine config from an explicit path or the default resolution
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            EngineConfig::with_path(p)
                .with_context(|| format!("Failed to load config from {}", p.display()))
        }
        None => EngineConfig::load().context("Failed to load engine config"),
    }
}

/// Read and deserialize a JSON input file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Pretty-print a value as JSON to a file, or stdout when no path is given
pub fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
