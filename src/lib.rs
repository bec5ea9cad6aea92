//! Revnet Simulation Library
//!
//! Simulates a Revnet (a token issuer with a rising price ceiling and a
//! tax-weighted price floor) competing with a constant-product AMM pool for
//! the same traders, one day at a time.
//!
//! ## Modules
//!
//! - `random`: seeded LCG streams
//! - `sampling`: Poisson, Box–Muller normal and log-normal samplers
//! - `pool`: constant-product liquidity pool
//! - `revnet`: issuance at the ceiling, redemption at the floor, boost
//! - `router`: picks the better venue for every buy and sell
//! - `trader`: write-once purchase/sale ledger
//! - `simulation`: the day loop and per-day snapshots
//! - `config`: run configuration, defaults, validation, JSON loading
//! - `report`: run summaries and multi-seed Monte Carlo sweeps
//!
//! ## Usage
//!
//! ```bash
//! # Run a single simulation
//! cargo run --bin simulate --release -- --config scenario.json
//!
//! # Sweep the same scenario over many seeds
//! cargo run --bin monte_carlo --release -- --runs 500
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod random;
pub mod report;
pub mod revnet;
pub mod router;
pub mod sampling;
pub mod simulation;
pub mod trader;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use pool::LiquidityPool;
pub use random::{RandomStream, RandomStreams};
pub use revnet::{Revnet, RevnetParams};
pub use router::{purchase, sell, PurchaseOutcome, SaleOutcome, Venue};
pub use simulation::{run_simulation, Simulation, SimulationOutput, SimulationSnapshot};
pub use trader::{PurchaseRecord, SaleRecord, Trader};
