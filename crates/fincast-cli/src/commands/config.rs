//! Config command implementation

use std::path::Path;

use anyhow::Result;
use fincast_core::{default_config_path, EngineConfig};

use super::{emit_json, load_config};

pub fn cmd_config(config_path: Option<&Path>, defaults: bool) -> Result<()> {
    if defaults {
        print!("{}", EngineConfig::default_toml());
        return Ok(());
    }

    match (config_path, default_config_path()) {
        (Some(p), _) => tracing::info!("Using config {}", p.display()),
        (None, Some(p)) if p.exists() => tracing::info!("Using config {}", p.display()),
        _ => tracing::info!("Using built-in config"),
    }

    let config = load_config(config_path)?;
    emit_json(&config, None)
}
