#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless skirmish and reports the outcome.

mod scenario;
mod summary;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use scenario::Scenario;
use skirmish_world::query;
use summary::Summary;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs a skirmish scenario without rendering.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct Args {
    /// TOML scenario to run; the built-in ambush runs when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of update passes, overriding the scenario.
    #[arg(long)]
    ticks: Option<u32>,
    /// Length of one update pass in milliseconds, overriding the scenario.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: Option<u64>,
    /// Seed for randomized behaviors, overriding the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter directives; falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the skirmish command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::parse(scenario::BUILT_IN).context("built-in scenario is invalid")?,
    };
    let ticks = args.ticks.unwrap_or(scenario.ticks());
    let tick = args.tick_ms.map_or(scenario.tick(), Duration::from_millis);
    let seed = args.seed.unwrap_or(scenario.seed());

    let mut simulation = scenario
        .builder()?
        .seed(seed)
        .build()
        .context("failed to assemble simulation")?;
    tracing::info!(
        banner = query::welcome_banner(simulation.world()),
        ticks,
        tick_ms = tick.as_millis() as u64,
        seed,
        "starting run"
    );

    let mut summary = Summary::default();
    for _ in 0..ticks {
        summary.record(&simulation.update(tick));
    }
    summary.finish(&simulation.units(), simulation.now());

    print!("{summary}");
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")
}
