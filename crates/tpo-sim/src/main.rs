//! Take-profit order simulator - Entry Point
//!
//! Replays a TOML scenario against an in-memory pool and prints a JSON
//! summary of the run.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Take-profit order book simulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file path (can also be set via TPO_SCENARIO env var)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Stop at the first failing step
    #[arg(long)]
    fail_fast: bool,

    /// Print Prometheus metrics after the summary
    #[arg(long)]
    metrics: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tpo_telemetry::init_logging()?;

    info!("Starting tpo-sim v{}", env!("CARGO_PKG_VERSION"));

    // Scenario path: CLI arg > TPO_SCENARIO env var > default
    let scenario_path = args
        .scenario
        .or_else(|| std::env::var("TPO_SCENARIO").ok())
        .unwrap_or_else(|| "config/scenario.toml".to_string());

    info!(scenario_path = %scenario_path, "Loading scenario");

    let mut config = tpo_sim::SimConfig::from_file(&scenario_path)?;
    config.fail_fast |= args.fail_fast;
    info!(
        pools = config.pools.len(),
        steps = config.steps.len(),
        "Scenario loaded"
    );

    let mut simulation = tpo_sim::Simulation::new(&config)?;
    let summary = simulation.run(&config.steps)?;
    info!(
        ok = summary.steps_ok,
        failed = summary.steps_failed,
        fills = summary.fills,
        "Scenario finished"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if args.metrics {
        print!("{}", tpo_telemetry::Metrics::render()?);
    }

    Ok(())
}
