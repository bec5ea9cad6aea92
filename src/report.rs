//! Run Summaries and Monte Carlo Sweeps
//!
//! Condenses simulation output into the numbers worth comparing between
//! parameter sets.
//!
//! ## Single Run
//! - Purchases and sales per venue, ETH volume per venue
//! - Voided sales and tokens sent to the boost bucket
//! - Final ceiling, floor and pool price
//! - Mean ETH returned per ETH spent by traders who sold
//!
//! ## Sweep
//! The same config over consecutive seeds, with the mean and the 5th, 50th
//! and 95th percentiles of the final prices.

use std::collections::HashMap;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::router::Venue;
use crate::simulation::{run_simulation, SimulationOutput};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VenueStats {
    pub purchases: usize,
    pub sales: usize,
    pub eth_in: f64,  // ETH spent by buyers
    pub eth_out: f64, // ETH paid to sellers
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSummary {
    pub days: usize,
    pub traders: usize,
    pub by_venue: HashMap<Venue, VenueStats>,
    pub voided_sales: usize,
    pub tokens_sent_to_boost: f64,
    pub final_price_ceiling: f64,
    pub final_price_floor: f64,
    pub final_pool_price: Option<f64>,
    pub final_revnet_eth: f64,
    pub mean_realized_return: Option<f64>,
}

impl SimulationSummary {
    pub fn from_output(output: &SimulationOutput) -> Self {
        let mut by_venue: HashMap<Venue, VenueStats> =
            Venue::all().into_iter().map(|v| (v, VenueStats::default())).collect();
        let mut voided_sales = 0;

        for trader in &output.traders {
            let purchase = trader.purchase();
            let stats = by_venue.entry(purchase.source).or_default();
            stats.purchases += 1;
            stats.eth_in += purchase.eth_spent;

            if let Some(sale) = trader.sale() {
                match sale.source {
                    Some(venue) => {
                        let stats = by_venue.entry(venue).or_default();
                        stats.sales += 1;
                        stats.eth_out += sale.eth_received;
                    }
                    None => voided_sales += 1,
                }
            }
        }

        let returns: Vec<f64> = output
            .traders
            .iter()
            .filter_map(|t| t.realized_return())
            .collect();
        let mean_realized_return = if returns.is_empty() {
            None
        } else {
            Some(returns.iter().sum::<f64>() / returns.len() as f64)
        };

        let last = output.final_snapshot();

        Self {
            days: output.snapshots.len(),
            traders: output.traders.len(),
            by_venue,
            voided_sales,
            tokens_sent_to_boost: last.map_or(0.0, |s| s.revnet.tokens_sent_to_boost),
            final_price_ceiling: last.map_or(1.0, |s| s.revnet.price_ceiling),
            final_price_floor: last.map_or(0.0, |s| s.revnet.price_floor),
            final_pool_price: last.and_then(|s| s.pool.token_price),
            final_revnet_eth: last.map_or(0.0, |s| s.revnet.eth_balance),
            mean_realized_return,
        }
    }

    pub fn venue(&self, venue: Venue) -> VenueStats {
        self.by_venue.get(&venue).cloned().unwrap_or_default()
    }

    pub fn print(&self) {
        println!("  Days simulated:          {}", self.days);
        println!("  Traders:                 {}", self.traders);
        for venue in Venue::all() {
            let stats = self.venue(venue);
            println!(
                "  {:7} buys/sells:       {} / {}  (ETH in {:.2}, out {:.2})",
                venue.name(),
                stats.purchases,
                stats.sales,
                stats.eth_in,
                stats.eth_out,
            );
        }
        println!("  Voided sales:            {}", self.voided_sales);
        println!("  Tokens sent to boost:    {:.2}", self.tokens_sent_to_boost);
        println!("  Final price ceiling:     {:.4} ETH", self.final_price_ceiling);
        println!("  Final price floor:       {:.4} ETH", self.final_price_floor);
        match self.final_pool_price {
            Some(price) => println!("  Final pool price:        {:.4} ETH", price),
            None => println!("  Final pool price:        n/a"),
        }
        println!("  Final Revnet ETH:        {:.2}", self.final_revnet_eth);
        match self.mean_realized_return {
            Some(r) => println!("  Mean seller return:      {:.3}x", r),
            None => println!("  Mean seller return:      n/a"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Percentiles {
    pub mean: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

impl Percentiles {
    fn from_samples(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mean = if sorted.is_empty() {
            0.0
        } else {
            sorted.iter().sum::<f64>() / sorted.len() as f64
        };
        Self {
            mean,
            p5: percentile(&sorted, 0.05),
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
        }
    }

    fn print_row(&self, label: &str) {
        println!(
            "  {:22} mean {:10.4}  p5 {:10.4}  p50 {:10.4}  p95 {:10.4}",
            label, self.mean, self.p5, self.p50, self.p95
        );
    }
}

#[derive(Clone, Debug)]
pub struct MonteCarloResult {
    pub runs: usize,
    pub base_seed: u64,

    pub pool_prices: Vec<f64>, // Runs whose pool ended degenerate are left out
    pub price_floors: Vec<f64>,
    pub price_ceilings: Vec<f64>,
    pub revnet_eth: Vec<f64>,
    pub pool_purchase_share: Vec<f64>,

    pub pool_price: Percentiles,
    pub price_floor: Percentiles,
    pub price_ceiling: Percentiles,
    pub revnet_eth_balance: Percentiles,
    pub mean_pool_purchase_share: f64,
}

impl MonteCarloResult {
    pub fn print(&self) {
        println!("  Runs:                    {}", self.runs);
        println!(
            "  Seeds:                   {}..{}",
            self.base_seed,
            self.base_seed.wrapping_add(self.runs as u64)
        );
        self.pool_price.print_row("Final pool price");
        self.price_floor.print_row("Final price floor");
        self.price_ceiling.print_row("Final price ceiling");
        self.revnet_eth_balance.print_row("Final Revnet ETH");
        println!(
            "  Pool purchase share:     {:.1}%",
            self.mean_pool_purchase_share * 100.0
        );
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Runs `config` over seeds `random_seed .. random_seed + runs`.
pub fn run_monte_carlo(config: &SimulationConfig, runs: usize) -> Result<MonteCarloResult> {
    let mut pool_prices = Vec::with_capacity(runs);
    let mut price_floors = Vec::with_capacity(runs);
    let mut price_ceilings = Vec::with_capacity(runs);
    let mut revnet_eth = Vec::with_capacity(runs);
    let mut pool_purchase_share = Vec::with_capacity(runs);

    for i in 0..runs {
        let run_config = SimulationConfig {
            random_seed: config.random_seed.wrapping_add(i as u64),
            ..config.clone()
        };
        let output = run_simulation(&run_config)?;
        let summary = SimulationSummary::from_output(&output);

        if let Some(price) = summary.final_pool_price {
            pool_prices.push(price);
        }
        price_floors.push(summary.final_price_floor);
        price_ceilings.push(summary.final_price_ceiling);
        revnet_eth.push(summary.final_revnet_eth);

        let share = if summary.traders > 0 {
            summary.venue(Venue::Pool).purchases as f64 / summary.traders as f64
        } else {
            0.0
        };
        pool_purchase_share.push(share);
    }

    let mean_pool_purchase_share = if runs > 0 {
        pool_purchase_share.iter().sum::<f64>() / runs as f64
    } else {
        0.0
    };

    Ok(MonteCarloResult {
        runs,
        base_seed: config.random_seed,
        pool_price: Percentiles::from_samples(&pool_prices),
        price_floor: Percentiles::from_samples(&price_floors),
        price_ceiling: Percentiles::from_samples(&price_ceilings),
        revnet_eth_balance: Percentiles::from_samples(&revnet_eth),
        mean_pool_purchase_share,
        pool_prices,
        price_floors,
        price_ceilings,
        revnet_eth,
        pool_purchase_share,
    })
}
