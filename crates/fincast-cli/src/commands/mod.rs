//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, JSON input/output)
//! - `profile` - Profile snapshot file format
//! - `config` - Effective configuration display
//! - `assess` - Risk and lifecycle scoring
//! - `predict` - Hybrid prediction with a file-backed model source
//! - `validate` - Validation and calibration of completed predictions
//! - `budget` - Budget variance reports

pub mod assess;
pub mod budget;
pub mod config;
pub mod core;
pub mod predict;
pub mod profile;
pub mod validate;

// Re-export command functions for main.rs
pub use assess::*;
pub use budget::*;
pub use config::*;
pub use core::*;
pub use predict::*;
pub use profile::*;
pub use validate::*;
