//! Monte Carlo Sweep Binary
//!
//! Runs one scenario over many consecutive seeds and reports the spread of
//! final prices, then repeats the sweep across floor tax intensities.
//!
//! ## Usage
//! ```bash
//! cargo run --bin monte_carlo --release -- --runs 500
//! cargo run --bin monte_carlo --release -- --config scenario.json --runs 200
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use revnet_simulation::report::run_monte_carlo;
use revnet_simulation::SimulationConfig;

const TAX_INTENSITIES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

#[derive(Parser)]
#[command(name = "monte_carlo")]
#[command(about = "Sweep a Revnet scenario over many random seeds")]
struct Cli {
    /// JSON config file; missing keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of seeds to run
    #[arg(short, long, default_value = "200")]
    runs: usize,

    /// Number of days per run
    #[arg(short, long)]
    days: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("revnet_simulation=warn")),
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

    println!("=======================================================");
    println!("  Monte Carlo Sweep");
    println!("  Revnet vs AMM, {} seeds", cli.runs);
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Days per run: {}", config.days_to_calculate);
    println!("  Daily purchases lambda: {}", config.daily_purchases_lambda);
    println!("  Sale probability: {:.1}%", config.sale_probability * 100.0);
    println!();

    println!("Configured scenario");
    println!("{}", "-".repeat(50));
    run_monte_carlo(&config, cli.runs)?.print();
    println!();

    println!("=======================================================");
    println!("  Floor Tax Intensity Sweep");
    println!("=======================================================");
    println!();
    print_tax_table(&config, cli.runs)?;

    Ok(())
}

fn print_tax_table(config: &SimulationConfig, runs: usize) -> anyhow::Result<()> {
    println!("| Tax  | Floor p50 | Floor p95 | Pool Price p50 | Revnet ETH p50 | Pool Buys |");
    println!("|------|-----------|-----------|----------------|----------------|-----------|");

    for tax in TAX_INTENSITIES {
        let scenario = SimulationConfig {
            price_floor_tax_intensity: tax,
            ..config.clone()
        };
        let result = run_monte_carlo(&scenario, runs)?;

        println!(
            "| {:4.2} | {:9.4} | {:9.4} | {:14.4} | {:14.2} | {:8.1}% |",
            tax,
            result.price_floor.p50,
            result.price_floor.p95,
            result.pool_price.p50,
            result.revnet_eth_balance.p50,
            result.mean_pool_purchase_share * 100.0,
        );
    }

    Ok(())
}
