//! Day-Stepped Simulation
//!
//! Drives one pool and one Revnet through `days_to_calculate` days of random
//! trader activity.
//!
//! ## Each Day
//! 1. Draw the number of arriving buyers (Poisson). Each draws a log-normal
//!    ETH spend, buys through the router and becomes a trader. Once the pool
//!    is deployed, `token_liquidity_ratio` of the tokens bought go back into
//!    the pool.
//! 2. Every trader without a sale who has held for `minimum_days_held` days
//!    sells with probability `sale_probability`. A seller sells
//!    `1 - token_liquidity_ratio` of the tokens bought; once the pool is
//!    deployed, `eth_liquidity_ratio` of the ETH received goes back into it.
//! 3. Record a snapshot of both venues and the day's trades.
//! 4. Advance the Revnet's day.
//!
//! Each run builds its state from the config alone, so two runs with the
//! same config produce identical snapshots.

use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::pool::LiquidityPool;
use crate::random::RandomStreams;
use crate::revnet::Revnet;
use crate::router::{self, Venue};
use crate::sampling::{LogNormal, Poisson};
use crate::trader::{PurchaseRecord, SaleRecord, Trader};

/// Token amounts whose redemption value is tracked in every snapshot.
pub const RECLAIM_QUOTE_SIZES: [f64; 3] = [1.0, 5.0, 10.0];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevnetSnapshot {
    pub eth_balance: f64,
    pub token_supply: f64,
    pub price_ceiling: f64,
    pub price_floor: f64,
    pub tokens_sent_to_boost: f64,
    pub reclaim_amounts: [f64; 3], // ETH for burning 1, 5 and 10 tokens
}

impl RevnetSnapshot {
    fn capture(revnet: &Revnet) -> Self {
        Self {
            eth_balance: revnet.eth_balance(),
            token_supply: revnet.token_supply(),
            price_ceiling: revnet.price_ceiling(),
            price_floor: revnet.price_floor(),
            tokens_sent_to_boost: revnet.tokens_sent_to_boost(),
            reclaim_amounts: RECLAIM_QUOTE_SIZES.map(|tokens| revnet.eth_reclaim_amount(tokens)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub eth: f64,
    pub token: f64,
    pub token_price: Option<f64>, // ETH per token; None while a side is empty
    pub deployed: bool,
}

impl PoolSnapshot {
    fn capture(pool: &LiquidityPool, day: u32) -> Self {
        Self {
            eth: pool.eth(),
            token: pool.token(),
            token_price: pool.marginal_price_of_token().ok(),
            deployed: pool.is_deployed(day),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    pub trader: usize,
    #[serde(flatten)]
    pub record: PurchaseRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEvent {
    pub trader: usize,
    #[serde(flatten)]
    pub record: SaleRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub day: u32,
    pub revnet: RevnetSnapshot,
    pub pool: PoolSnapshot,
    pub purchases: Vec<PurchaseEvent>,
    pub sales: Vec<SaleEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub snapshots: Vec<SimulationSnapshot>,
    pub traders: Vec<Trader>,
}

impl SimulationOutput {
    pub fn final_snapshot(&self) -> Option<&SimulationSnapshot> {
        self.snapshots.last()
    }
}

pub struct Simulation {
    config: SimulationConfig,
    revnet: Revnet,
    pool: LiquidityPool,
    streams: RandomStreams,
    arrivals: Poisson,
    spend: LogNormal,
    traders: Vec<Trader>,
    snapshots: Vec<SimulationSnapshot>,
    day: u32,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let pool =
            LiquidityPool::new(config.initial_eth, config.initial_token, config.day_deployed)?;
        // Tokens seeded into the pool count as outstanding supply
        let revnet = Revnet::with_outstanding_supply(config.revnet_params(), pool.token())?;
        let arrivals = Poisson::new(config.daily_purchases_lambda)?;
        let spend = LogNormal::new(config.purchase_amount_mean, config.purchase_amount_deviation)?;

        Ok(Self {
            streams: RandomStreams::from_seed(config.random_seed),
            snapshots: Vec::with_capacity(config.days_to_calculate as usize),
            traders: Vec::new(),
            day: 0,
            config,
            revnet,
            pool,
            arrivals,
            spend,
        })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn revnet(&self) -> &Revnet {
        &self.revnet
    }

    pub fn pool(&self) -> &LiquidityPool {
        &self.pool
    }

    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    pub fn snapshots(&self) -> &[SimulationSnapshot] {
        &self.snapshots
    }

    pub fn is_finished(&self) -> bool {
        self.day >= self.config.days_to_calculate
    }

    /// Simulates the current day and returns its snapshot.
    pub fn step(&mut self) -> Result<&SimulationSnapshot> {
        let day = self.day;
        let purchases = self.run_purchases(day)?;
        let sales = self.run_sales(day)?;

        debug!(
            day,
            purchases = purchases.len(),
            sales = sales.len(),
            ceiling = self.revnet.price_ceiling(),
            floor = self.revnet.price_floor(),
            "day complete"
        );

        self.snapshots.push(SimulationSnapshot {
            day,
            revnet: RevnetSnapshot::capture(&self.revnet),
            pool: PoolSnapshot::capture(&self.pool, day),
            purchases,
            sales,
        });

        self.revnet.increment_day();
        self.day += 1;

        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    fn run_purchases(&mut self, day: u32) -> Result<Vec<PurchaseEvent>> {
        let arrivals = self.arrivals.sample(&mut self.streams.arrivals);
        let mut events = Vec::with_capacity(arrivals as usize);

        for _ in 0..arrivals {
            let eth_spent = self.spend.sample(&mut self.streams.purchases);
            let outcome = router::purchase(eth_spent, &mut self.revnet, &mut self.pool)?;

            let record = PurchaseRecord {
                eth_spent,
                tokens_received: outcome.tokens_received,
                source: outcome.source,
                day,
            };
            let id = self.traders.len();
            self.traders.push(Trader::new(id, record));
            events.push(PurchaseEvent { trader: id, record });

            if self.pool.is_deployed(day) {
                self.pool
                    .provide_tokens(outcome.tokens_received * self.config.token_liquidity_ratio)?;
            }
        }

        Ok(events)
    }

    fn run_sales(&mut self, day: u32) -> Result<Vec<SaleEvent>> {
        let sold_fraction = 1.0 - self.config.token_liquidity_ratio;
        let mut events = Vec::new();

        for trader in self.traders.iter_mut() {
            if trader.has_sold() || trader.days_held(day) < self.config.minimum_days_held {
                continue;
            }
            if !self.streams.sales.chance(self.config.sale_probability) {
                continue;
            }

            let tokens_spent = trader.purchase().tokens_received * sold_fraction;
            let outcome = router::sell(tokens_spent, &mut self.revnet, &mut self.pool)?;

            let record = SaleRecord {
                tokens_spent,
                eth_received: outcome.eth_received(),
                source: outcome.source(),
                day,
            };
            trader.record_sale(record)?;
            events.push(SaleEvent {
                trader: trader.id(),
                record,
            });

            if self.pool.is_deployed(day) {
                self.pool
                    .provide_eth(outcome.eth_received() * self.config.eth_liquidity_ratio)?;
            }
        }

        Ok(events)
    }

    /// Runs the remaining days and hands over the results.
    pub fn run(mut self) -> Result<SimulationOutput> {
        info!(
            days = self.config.days_to_calculate,
            seed = self.config.random_seed,
            "starting simulation"
        );

        while !self.is_finished() {
            self.step()?;
        }

        let pool_purchases = self
            .traders
            .iter()
            .filter(|t| t.purchase().source == Venue::Pool)
            .count();
        info!(
            traders = self.traders.len(),
            pool_purchases,
            revnet_eth = self.revnet.eth_balance(),
            "simulation finished"
        );

        Ok(SimulationOutput {
            snapshots: self.snapshots,
            traders: self.traders,
        })
    }
}

/// Runs a fresh simulation for `config`.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationOutput> {
    Simulation::new(config.clone())?.run()
}
