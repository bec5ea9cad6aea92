//! Constant-Product Liquidity Pool
//!
//! An ETH/token AMM with no fee: every trade keeps `eth * token` fixed.
//! Liquidity provision adds to either side without minting LP shares.
//!
//! A pool with an empty side has no meaningful price. Quotes and trades on
//! such a pool return [`SimulationError::DegenerateState`] rather than a
//! non-finite value or the whole opposite balance.

use serde::{Deserialize, Serialize};

use crate::error::{check_amount, Result, SimulationError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    eth: f64,
    token: f64,
    day_deployed: u32, // First day the pool takes routed trades
}

impl LiquidityPool {
    pub fn new(eth: f64, token: f64, day_deployed: u32) -> Result<Self> {
        check_amount("initial_eth", eth)?;
        check_amount("initial_token", token)?;
        Ok(Self {
            eth,
            token,
            day_deployed,
        })
    }

    pub fn eth(&self) -> f64 {
        self.eth
    }

    pub fn token(&self) -> f64 {
        self.token
    }

    pub fn day_deployed(&self) -> u32 {
        self.day_deployed
    }

    pub fn is_deployed(&self, day: u32) -> bool {
        day >= self.day_deployed
    }

    /// The constant-product invariant `k`.
    pub fn invariant(&self) -> f64 {
        self.eth * self.token
    }

    pub fn is_degenerate(&self) -> bool {
        self.eth <= 0.0 || self.token <= 0.0
    }

    fn ensure_liquid(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(SimulationError::DegenerateState("pool has an empty side"));
        }
        Ok(())
    }

    pub fn provide_eth(&mut self, amount: f64) -> Result<()> {
        check_amount("eth", amount)?;
        self.eth += amount;
        Ok(())
    }

    pub fn provide_tokens(&mut self, amount: f64) -> Result<()> {
        check_amount("tokens", amount)?;
        self.token += amount;
        Ok(())
    }

    /// Tokens per ETH at the margin.
    pub fn marginal_price_of_eth(&self) -> Result<f64> {
        self.ensure_liquid()?;
        Ok(self.token / self.eth)
    }

    /// ETH per token at the margin.
    pub fn marginal_price_of_token(&self) -> Result<f64> {
        self.ensure_liquid()?;
        Ok(self.eth / self.token)
    }

    /// ETH paid out for `token_in` tokens, without trading.
    pub fn eth_return(&self, token_in: f64) -> Result<f64> {
        check_amount("token_in", token_in)?;
        self.ensure_liquid()?;
        let new_eth = self.invariant() / (self.token + token_in);
        Ok(self.eth - new_eth)
    }

    /// Tokens paid out for `eth_in` ETH, without trading.
    pub fn token_return(&self, eth_in: f64) -> Result<f64> {
        check_amount("eth_in", eth_in)?;
        self.ensure_liquid()?;
        let new_token = self.invariant() / (self.eth + eth_in);
        Ok(self.token - new_token)
    }

    pub fn buy_eth(&mut self, token_in: f64) -> Result<f64> {
        let eth_out = self.eth_return(token_in)?;
        self.token += token_in;
        self.eth -= eth_out;
        Ok(eth_out)
    }

    pub fn buy_token(&mut self, eth_in: f64) -> Result<f64> {
        let token_out = self.token_return(eth_in)?;
        self.eth += eth_in;
        self.token -= token_out;
        Ok(token_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> LiquidityPool {
        LiquidityPool::new(10.0, 1000.0, 0).unwrap()
    }

    #[test]
    fn test_marginal_prices() {
        let pool = pool();
        assert!((pool.marginal_price_of_eth().unwrap() - 100.0).abs() < 1e-12);
        assert!((pool.marginal_price_of_token().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_token_return_quote() {
        let pool = pool();
        // 1000 - 10_000 / 11
        let expected = 1000.0 - 10_000.0 / 11.0;
        assert!((pool.token_return(1.0).unwrap() - expected).abs() < 1e-9);
        assert_eq!(pool.eth(), 10.0);
    }

    #[test]
    fn test_buy_token_preserves_invariant() {
        let mut pool = pool();
        let k = pool.invariant();
        let out = pool.buy_token(2.5).unwrap();

        assert!(out > 0.0);
        assert!((pool.invariant() - k).abs() / k < 1e-12);
        assert!((pool.eth() - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_buy_eth_preserves_invariant() {
        let mut pool = pool();
        let k = pool.invariant();
        let out = pool.buy_eth(250.0).unwrap();

        assert!((out - 2.0).abs() < 1e-9);
        assert!((pool.invariant() - k).abs() / k < 1e-12);
    }

    #[test]
    fn test_provide_changes_balances() {
        let mut pool = pool();
        pool.provide_eth(5.0).unwrap();
        pool.provide_tokens(500.0).unwrap();

        assert_eq!(pool.eth(), 15.0);
        assert_eq!(pool.token(), 1500.0);
    }

    #[test]
    fn test_provide_rejects_negative() {
        let mut pool = pool();
        assert!(pool.provide_eth(-1.0).is_err());
        assert!(pool.provide_tokens(f64::INFINITY).is_err());
        assert_eq!(pool.eth(), 10.0);
    }

    #[test]
    fn test_empty_pool_is_degenerate() {
        let mut pool = LiquidityPool::new(0.0, 1000.0, 0).unwrap();

        assert!(pool.token_return(1.0).unwrap_err().is_degenerate());
        assert!(pool.marginal_price_of_token().unwrap_err().is_degenerate());
        assert!(pool.buy_token(1.0).is_err());
        assert_eq!(pool.token(), 1000.0);
    }

    #[test]
    fn test_deployment_day() {
        let pool = LiquidityPool::new(1.0, 1.0, 30).unwrap();
        assert_eq!(pool.day_deployed(), 30);
        assert!(!pool.is_deployed(29));
        assert!(pool.is_deployed(30));
    }
}
