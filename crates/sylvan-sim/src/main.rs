//! # Sylvan
//!
//! Runs one arena scenario headlessly and prints a JSON summary.
//!
//! Usage: `sylvan [scenario.toml]`. Without an argument the scenario is read
//! from `sylvan.toml` in the working directory; a missing file runs the
//! built-in scenario.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use sylvan_sim::{ScenarioConfig, Simulation, CONFIG_FILE};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("sylvan=info".parse()?))
        .init();

    info!("Sylvan starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let mut scenario = ScenarioConfig::load_from(&path);
    scenario
        .validate()
        .with_context(|| format!("invalid scenario {path}"))?;

    let mut simulation = Simulation::new(scenario).context("failed to build arena")?;
    let summary = simulation.run();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!("Sylvan shutdown complete");
    Ok(())
}
