//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fincast - Hybrid financial prediction and risk scoring
#[derive(Parser)]
#[command(name = "fincast")]
#[command(about = "Hybrid prediction, calibration, risk and lifecycle scoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config override (defaults to the data dir override, then built-ins)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the effective engine configuration
    Config {
        /// Print the built-in TOML defaults instead
        #[arg(long)]
        defaults: bool,
    },

    /// Score risk and lifecycle position for a profile snapshot
    Assess {
        /// Profile snapshot (JSON)
        #[arg(short, long)]
        profile: PathBuf,
    },

    /// Run a hybrid prediction
    Predict {
        /// Profile snapshot with baseline and statistical reference (JSON)
        #[arg(short, long)]
        profile: PathBuf,

        /// Per-category weights, three slots each: baseline, statistical, model (JSON)
        #[arg(short, long)]
        weights: PathBuf,

        /// Raw model output from the AI collaborator (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Previous prediction in the same lineage (JSON)
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Prediction id
        #[arg(long, default_value = "1")]
        id: i64,

        /// Prediction type: budget, investment, risk, lifecycle, comprehensive
        #[arg(short = 't', long = "type", default_value = "budget")]
        prediction_type: String,

        /// Write the prediction here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a completed prediction against actual values
    Validate {
        /// Completed prediction (JSON)
        #[arg(short, long)]
        prediction: PathBuf,

        /// Actual values per category (JSON)
        #[arg(short, long)]
        actuals: PathBuf,

        /// Write the prediction with its updated confidence here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Calibrate a completed prediction with per-category factors
    Calibrate {
        /// Completed prediction (JSON)
        #[arg(short, long)]
        prediction: PathBuf,

        /// Calibration factor per category (JSON); missing categories use 1.0
        #[arg(short, long)]
        factors: PathBuf,
    },

    /// Compare budgets with actual spend
    Budget {
        /// Planned amount per category (JSON)
        #[arg(short, long)]
        budgets: PathBuf,

        /// Actual spend per category (JSON)
        #[arg(short, long)]
        actuals: PathBuf,

        /// Profile snapshot; enables lifecycle-weighted confidence
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
}
