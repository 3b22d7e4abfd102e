//! Fincast CLI - Hybrid financial prediction and risk scoring
//!
//! Usage:
//!   fincast config                                    Show effective configuration
//!   fincast assess --profile P                        Risk and lifecycle scores
//!   fincast predict --profile P --weights W --model M Run a hybrid prediction
//!   fincast validate --prediction X --actuals A       Compare with actuals
//!   fincast calibrate --prediction X --factors F      Apply calibration factors
//!   fincast budget --budgets B --actuals A            Budget variance report

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Config { defaults } => commands::cmd_config(config, defaults),
        Commands::Assess { profile } => commands::cmd_assess(config, &profile),
        Commands::Predict {
            profile,
            weights,
            model,
            previous,
            id,
            prediction_type,
            output,
        } => {
            commands::cmd_predict(
                config,
                &commands::PredictArgs {
                    profile,
                    weights,
                    model,
                    previous,
                    id,
                    prediction_type,
                    output,
                },
            )
            .await
        }
        Commands::Validate {
            prediction,
            actuals,
            output,
        } => commands::cmd_validate(&prediction, &actuals, output.as_deref()),
        Commands::Calibrate {
            prediction,
            factors,
        } => commands::cmd_calibrate(&prediction, &factors),
        Commands::Budget {
            budgets,
            actuals,
            profile,
        } => commands::cmd_budget(config, &budgets, &actuals, profile.as_deref()),
    }
}
