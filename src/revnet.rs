//! Revnet Issuance and Redemption
//!
//! The Revnet mints tokens for ETH at a price ceiling and burns tokens for
//! ETH at a price floor.
//!
//! ## Price Ceiling
//! Tokens minted per ETH drop by `price_ceiling_increase_percentage` every
//! `price_ceiling_increase_frequency_in_days` days:
//! `(1 - pct) ^ floor(day / frequency)`. The ceiling is its reciprocal, 1 at
//! day 0 and non-decreasing.
//!
//! ## Price Floor
//! Burning `t` of `S` tokens returns `B * r * (r * tax + (1 - tax))` with
//! `r = t / S` and `B` the ETH balance. With a non-zero tax intensity this is
//! convex in `r`: small redemptions get less than their pro-rata share, and
//! burning the whole supply returns exactly `B`.
//!
//! ## Boost
//! While `day < boost_duration_in_days`, `boost_percent` of every issued token
//! goes to the boost bucket instead of the payer.

use serde::{Deserialize, Serialize};

use crate::error::{check_amount, Result, SimulationError};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevnetParams {
    pub price_ceiling_increase_percentage: f64,
    pub price_ceiling_increase_frequency_in_days: u32,
    pub price_floor_tax_intensity: f64,
    pub premint_amount: f64,
    pub boost_percent: f64,
    pub boost_duration_in_days: u32,
}

impl Default for RevnetParams {
    fn default() -> Self {
        Self {
            price_ceiling_increase_percentage: 0.05,
            price_ceiling_increase_frequency_in_days: 7,
            price_floor_tax_intensity: 0.5,
            premint_amount: 0.0,
            boost_percent: 0.1,
            boost_duration_in_days: 30,
        }
    }
}

impl RevnetParams {
    pub fn validate(&self) -> Result<()> {
        // A 100% step would drive issuance to zero and the ceiling to infinity
        if !(0.0..1.0).contains(&self.price_ceiling_increase_percentage) {
            return Err(SimulationError::invalid(
                "priceCeilingIncreasePercentage",
                format!("{} is outside [0, 1)", self.price_ceiling_increase_percentage),
            ));
        }
        check_fraction("priceFloorTaxIntensity", self.price_floor_tax_intensity)?;
        check_fraction("boostPercent", self.boost_percent)?;

        if self.price_ceiling_increase_frequency_in_days == 0 {
            return Err(SimulationError::invalid(
                "priceCeilingIncreaseFrequencyInDays",
                "must be at least one day",
            ));
        }
        if self.boost_duration_in_days == 0 {
            return Err(SimulationError::invalid("boostDurationInDays", "must be at least one day"));
        }

        if !self.premint_amount.is_finite() || self.premint_amount < 0.0 {
            return Err(SimulationError::invalid(
                "premintAmount",
                format!("{} must be finite and non-negative", self.premint_amount),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::invalid(name, format!("{value} is outside [0, 1]")));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revnet {
    params: RevnetParams,
    token_supply: f64,
    eth_balance: f64,
    tokens_sent_to_boost: f64,
    day: u32,
}

impl Revnet {
    pub fn new(params: RevnetParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            token_supply: params.premint_amount,
            eth_balance: 0.0,
            tokens_sent_to_boost: 0.0,
            day: 0,
        })
    }

    /// A Revnet whose supply also counts `outstanding` tokens held elsewhere,
    /// e.g. seeded into a liquidity pool.
    pub fn with_outstanding_supply(params: RevnetParams, outstanding: f64) -> Result<Self> {
        check_amount("outstanding", outstanding)?;
        let mut revnet = Self::new(params)?;
        revnet.token_supply += outstanding;
        Ok(revnet)
    }

    pub fn params(&self) -> &RevnetParams {
        &self.params
    }

    pub fn token_supply(&self) -> f64 {
        self.token_supply
    }

    pub fn eth_balance(&self) -> f64 {
        self.eth_balance
    }

    pub fn tokens_sent_to_boost(&self) -> f64 {
        self.tokens_sent_to_boost
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn increment_day(&mut self) {
        self.day += 1;
    }

    pub fn is_boost_active(&self) -> bool {
        self.day < self.params.boost_duration_in_days
    }

    pub fn tokens_created_per_eth(&self) -> f64 {
        let steps = self.day / self.params.price_ceiling_increase_frequency_in_days;
        (1.0 - self.params.price_ceiling_increase_percentage).powf(steps as f64)
    }

    /// ETH per token at issuance.
    pub fn price_ceiling(&self) -> f64 {
        1.0 / self.tokens_created_per_eth()
    }

    pub fn eth_reclaim_amount(&self, tokens_out: f64) -> f64 {
        if self.token_supply <= 0.0 {
            return 0.0;
        }
        let ratio = tokens_out / self.token_supply;
        // ratio * tax + (1 - tax), arranged so ratio == 1 gives exactly 1
        let intensity = 1.0 - self.params.price_floor_tax_intensity * (1.0 - ratio);
        self.eth_balance * ratio * intensity
    }

    /// ETH reclaimed for burning a single token.
    pub fn price_floor(&self) -> f64 {
        self.eth_reclaim_amount(1.0)
    }

    /// Mints at the ceiling and returns the tokens the payer receives.
    pub fn create_tokens_at_ceiling(&mut self, eth_in: f64) -> Result<f64> {
        check_amount("eth_in", eth_in)?;
        let minted = eth_in * self.tokens_created_per_eth();
        self.eth_balance += eth_in;
        self.token_supply += minted;

        if self.is_boost_active() {
            let boosted = minted * self.params.boost_percent;
            self.tokens_sent_to_boost += boosted;
            Ok(minted - boosted)
        } else {
            Ok(minted)
        }
    }

    /// Burns at the floor and returns the ETH reclaimed.
    pub fn destroy_tokens_at_floor(&mut self, tokens_in: f64) -> Result<f64> {
        check_amount("tokens_in", tokens_in)?;
        if self.token_supply <= 0.0 {
            return Err(SimulationError::DegenerateState("revnet has no token supply"));
        }
        if tokens_in > self.token_supply {
            return Err(SimulationError::DegenerateState(
                "redemption exceeds revnet token supply",
            ));
        }
        let reclaimed = self.eth_reclaim_amount(tokens_in);
        if reclaimed > self.eth_balance {
            return Err(SimulationError::DegenerateState(
                "redemption exceeds revnet eth balance",
            ));
        }
        self.token_supply -= tokens_in;
        self.eth_balance -= reclaimed;
        Ok(reclaimed)
    }

    /// Moves tokens bought elsewhere into the boost bucket. Returns the
    /// amount left for the buyer.
    pub(crate) fn skim_boost(&mut self, tokens: f64) -> f64 {
        if !self.is_boost_active() {
            return tokens;
        }
        let boosted = tokens * self.params.boost_percent;
        self.tokens_sent_to_boost += boosted;
        tokens - boosted
    }
}
