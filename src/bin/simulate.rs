//! Revnet Simulation Binary
//!
//! Runs one simulation, prints a periodic table of both venues and a run
//! summary, and optionally dumps every snapshot and trader as JSON.
//!
//! ## Usage
//! ```bash
//! cargo run --bin simulate --release -- --config scenario.json --every 7
//! RUST_LOG=revnet_simulation=debug cargo run --bin simulate -- --days 30
//! ```

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use revnet_simulation::report::SimulationSummary;
use revnet_simulation::{run_simulation, SimulationConfig, SimulationSnapshot};

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Simulate a Revnet competing with an AMM pool")]
struct Cli {
    /// JSON config file; missing keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of days to simulate
    #[arg(short, long)]
    days: Option<u32>,

    /// Base random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a table row every N days
    #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
    every: u32,

    /// Write snapshots and traders to this file as JSON
    #[arg(short, long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("revnet_simulation=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(days) = cli.days {
        config.days_to_calculate = days;
    }
    if let Some(seed) = cli.seed {
        config.random_seed = seed;
    }

    println!("=======================================================");
    println!("  Revnet vs AMM Simulation");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Days: {}, Seed: {}", config.days_to_calculate, config.random_seed);
    println!(
        "  Ceiling: +{:.1}% every {} days, floor tax intensity {:.2}",
        config.price_ceiling_increase_percentage * 100.0,
        config.price_ceiling_increase_frequency_in_days,
        config.price_floor_tax_intensity,
    );
    println!(
        "  Boost: {:.1}% for {} days, premint {}",
        config.boost_percent * 100.0,
        config.boost_duration_in_days,
        config.premint_amount,
    );
    println!(
        "  Pool: {} ETH / {} tokens, deployed on day {}",
        config.initial_eth, config.initial_token, config.day_deployed,
    );
    println!();

    let output = run_simulation(&config)?;

    print_table(&output.snapshots, cli.every);
    println!();

    println!("Summary");
    println!("{}", "-".repeat(50));
    SimulationSummary::from_output(&output).print();

    if let Some(path) = &cli.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &output)?;
        println!();
        println!("Wrote {} snapshots to {}", output.snapshots.len(), path.display());
    }

    Ok(())
}

fn print_table(snapshots: &[SimulationSnapshot], every: u32) {
    println!("| Day  | Ceiling  | Floor    | Pool Price | Revnet ETH | Supply     | Buys | Sells |");
    println!("|------|----------|----------|------------|------------|------------|------|-------|");

    let last_day = snapshots.last().map(|s| s.day);
    for snapshot in snapshots {
        if snapshot.day % every != 0 && Some(snapshot.day) != last_day {
            continue;
        }
        let pool_price = match snapshot.pool.token_price {
            Some(price) => format!("{:10.4}", price),
            None => format!("{:>10}", "n/a"),
        };
        println!(
            "| {:4} | {:8.4} | {:8.4} | {} | {:10.2} | {:10.2} | {:4} | {:5} |",
            snapshot.day,
            snapshot.revnet.price_ceiling,
            snapshot.revnet.price_floor,
            pool_price,
            snapshot.revnet.eth_balance,
            snapshot.revnet.token_supply,
            snapshot.purchases.len(),
            snapshot.sales.len(),
        );
    }
}
