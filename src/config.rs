//! Simulation Configuration
//!
//! One flat record holds every knob of a run. JSON keys are camelCase
//! (`priceCeilingIncreasePercentage`, `dailyPurchasesLambda`, ...) and any
//! key left out takes its default. A config is validated before a run
//! starts, so a bad value never produces a partial run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SimulationError};
use crate::revnet::{check_fraction, RevnetParams};
use crate::sampling::{check_log_normal, check_poisson_rate};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    // Revnet
    pub price_ceiling_increase_percentage: f64,
    pub price_ceiling_increase_frequency_in_days: u32,
    pub price_floor_tax_intensity: f64,
    pub boost_percent: f64,
    pub boost_duration_in_days: u32,
    pub premint_amount: f64,

    // Pool
    pub day_deployed: u32,
    pub initial_eth: f64,
    pub initial_token: f64,

    // Run
    pub days_to_calculate: u32,
    pub random_seed: u64,

    // Trader behavior
    pub daily_purchases_lambda: f64,
    pub purchase_amount_mean: f64,      // mu of the log-normal spend
    pub purchase_amount_deviation: f64, // sigma of the log-normal spend
    pub token_liquidity_ratio: f64,
    pub eth_liquidity_ratio: f64,
    pub sale_probability: f64,
    pub minimum_days_held: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let revnet = RevnetParams::default();
        Self {
            price_ceiling_increase_percentage: revnet.price_ceiling_increase_percentage,
            price_ceiling_increase_frequency_in_days: revnet
                .price_ceiling_increase_frequency_in_days,
            price_floor_tax_intensity: revnet.price_floor_tax_intensity,
            boost_percent: revnet.boost_percent,
            boost_duration_in_days: revnet.boost_duration_in_days,
            premint_amount: revnet.premint_amount,
            day_deployed: 30,
            initial_eth: 10.0,
            initial_token: 10.0,
            days_to_calculate: 365,
            random_seed: 1,
            daily_purchases_lambda: 10.0,
            purchase_amount_mean: 0.0,
            purchase_amount_deviation: 0.5,
            token_liquidity_ratio: 0.1,
            eth_liquidity_ratio: 0.1,
            sale_probability: 0.05,
            minimum_days_held: 7,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn revnet_params(&self) -> RevnetParams {
        RevnetParams {
            price_ceiling_increase_percentage: self.price_ceiling_increase_percentage,
            price_ceiling_increase_frequency_in_days: self.price_ceiling_increase_frequency_in_days,
            price_floor_tax_intensity: self.price_floor_tax_intensity,
            premint_amount: self.premint_amount,
            boost_percent: self.boost_percent,
            boost_duration_in_days: self.boost_duration_in_days,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.revnet_params().validate()?;

        check_fraction("tokenLiquidityRatio", self.token_liquidity_ratio)?;
        check_fraction("ethLiquidityRatio", self.eth_liquidity_ratio)?;
        check_fraction("saleProbability", self.sale_probability)?;

        check_non_negative("initialEth", self.initial_eth)?;
        check_non_negative("initialToken", self.initial_token)?;

        check_poisson_rate("dailyPurchasesLambda", self.daily_purchases_lambda)?;
        check_log_normal(
            "purchaseAmountMean",
            "purchaseAmountDeviation",
            self.purchase_amount_mean,
            self.purchase_amount_deviation,
        )?;

        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("{value} must be finite and non-negative"),
        ));
    }
    Ok(())
}
