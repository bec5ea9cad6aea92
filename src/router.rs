//! Trade Routing
//!
//! A trader always takes whichever venue pays strictly more: more tokens per
//! ETH on a purchase, more ETH per token on a sale. The Revnet is the
//! fallback when the pool is not deployed yet, cannot cover the trade, or
//! simply quotes worse.
//!
//! A venue in a degenerate state (empty pool side, no Revnet supply) is
//! skipped, not reported as a fault. A sale that neither venue can take is
//! [`SaleOutcome::Voided`] and leaves both venues untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

use crate::error::{check_amount, Result};
use crate::pool::LiquidityPool;
use crate::revnet::Revnet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Pool,
    Revnet,
}

impl Venue {
    pub fn all() -> Vec<Self> {
        vec![Self::Pool, Self::Revnet]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::Revnet => "revnet",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PurchaseOutcome {
    pub tokens_received: f64,
    pub source: Venue,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SaleOutcome {
    Sold { eth_received: f64, source: Venue },
    Voided,
}

impl SaleOutcome {
    pub fn eth_received(&self) -> f64 {
        match self {
            Self::Sold { eth_received, .. } => *eth_received,
            Self::Voided => 0.0,
        }
    }

    pub fn source(&self) -> Option<Venue> {
        match self {
            Self::Sold { source, .. } => Some(*source),
            Self::Voided => None,
        }
    }

    pub fn is_voided(&self) -> bool {
        matches!(self, Self::Voided)
    }
}

/// Spends `eth_spent` at whichever venue yields more tokens.
pub fn purchase(
    eth_spent: f64,
    revnet: &mut Revnet,
    pool: &mut LiquidityPool,
) -> Result<PurchaseOutcome> {
    check_amount("eth_spent", eth_spent)?;
    let issued = eth_spent * revnet.tokens_created_per_eth();

    if pool.is_deployed(revnet.day()) {
        let pool_beats_revnet = pool
            .token_return(eth_spent)
            .map(|quote| quote < pool.token() && quote > issued)
            .unwrap_or(false);

        if pool_beats_revnet {
            let bought = pool.buy_token(eth_spent)?;
            let tokens_received = revnet.skim_boost(bought);
            trace!(eth_spent, tokens_received, "purchase routed to pool");
            return Ok(PurchaseOutcome {
                tokens_received,
                source: Venue::Pool,
            });
        }
    }

    let tokens_received = revnet.create_tokens_at_ceiling(eth_spent)?;
    trace!(eth_spent, tokens_received, "purchase routed to revnet");
    Ok(PurchaseOutcome {
        tokens_received,
        source: Venue::Revnet,
    })
}

/// Sells `tokens_spent` at whichever venue yields more ETH.
pub fn sell(
    tokens_spent: f64,
    revnet: &mut Revnet,
    pool: &mut LiquidityPool,
) -> Result<SaleOutcome> {
    check_amount("tokens_spent", tokens_spent)?;
    let reclaim = revnet.eth_reclaim_amount(tokens_spent);

    if pool.is_deployed(revnet.day()) {
        let pool_beats_revnet = pool
            .eth_return(tokens_spent)
            .map(|quote| quote < pool.eth() && quote > reclaim)
            .unwrap_or(false);

        if pool_beats_revnet {
            let eth_received = pool.buy_eth(tokens_spent)?;
            trace!(tokens_spent, eth_received, "sale routed to pool");
            return Ok(SaleOutcome::Sold {
                eth_received,
                source: Venue::Pool,
            });
        }
    }

    if reclaim <= revnet.eth_balance() {
        match revnet.destroy_tokens_at_floor(tokens_spent) {
            Ok(eth_received) => {
                trace!(tokens_spent, eth_received, "sale routed to revnet");
                return Ok(SaleOutcome::Sold {
                    eth_received,
                    source: Venue::Revnet,
                });
            }
            Err(err) if err.is_degenerate() => {
                warn!(tokens_spent, %err, "revnet cannot take sale");
            }
            Err(err) => return Err(err),
        }
    }

    warn!(tokens_spent, "sale voided: no venue available");
    Ok(SaleOutcome::Voided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revnet::RevnetParams;

    fn flat_params() -> RevnetParams {
        RevnetParams {
            price_ceiling_increase_percentage: 0.0,
            price_ceiling_increase_frequency_in_days: 1,
            price_floor_tax_intensity: 0.0,
            premint_amount: 0.0,
            boost_percent: 0.0,
            boost_duration_in_days: 1,
        }
    }

    #[test]
    fn test_purchase_prefers_revnet_when_pool_is_worse() {
        // Pool sells 0.01 tokens per ETH, the Revnet issues 1
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(1000.0, 10.0, 0).unwrap();

        let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source, Venue::Revnet);
        assert_eq!(outcome.tokens_received, 1.0);
        assert_eq!(pool.eth(), 1000.0);
    }

    #[test]
    fn test_purchase_prefers_pool_when_pool_is_better() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(10.0, 1000.0, 0).unwrap();

        let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source, Venue::Pool);
        assert!((outcome.tokens_received - (1000.0 - 10_000.0 / 11.0)).abs() < 1e-9);
        assert_eq!(revnet.eth_balance(), 0.0);
    }

    #[test]
    fn test_purchase_skips_undeployed_pool() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(10.0, 1000.0, 5).unwrap();

        let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source, Venue::Revnet);
        assert_eq!(pool.token(), 1000.0);
    }

    #[test]
    fn test_purchase_skips_empty_pool() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(0.0, 1000.0, 0).unwrap();

        let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source, Venue::Revnet);
    }

    #[test]
    fn test_pool_purchase_pays_boost() {
        let mut revnet = Revnet::new(RevnetParams {
            boost_percent: 0.25,
            boost_duration_in_days: 10,
            ..flat_params()
        })
        .unwrap();
        let mut pool = LiquidityPool::new(10.0, 1000.0, 0).unwrap();
        let bought = pool.token_return(1.0).unwrap();

        let outcome = purchase(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source, Venue::Pool);
        assert!((outcome.tokens_received - bought * 0.75).abs() < 1e-9);
        assert!((revnet.tokens_sent_to_boost() - bought * 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_purchase_rejects_invalid_amount() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(10.0, 10.0, 0).unwrap();
        assert!(purchase(-1.0, &mut revnet, &mut pool).is_err());
        assert!(purchase(f64::NAN, &mut revnet, &mut pool).is_err());
    }

    #[test]
    fn test_sell_prefers_pool_when_pool_pays_more() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        revnet.create_tokens_at_ceiling(10.0).unwrap();
        // Pool pays ~9 ETH for one token, the Revnet pays 1
        let mut pool = LiquidityPool::new(100.0, 10.0, 0).unwrap();

        let outcome = sell(1.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source(), Some(Venue::Pool));
        assert!(outcome.eth_received() > revnet.eth_reclaim_amount(1.0));
        assert_eq!(revnet.token_supply(), 10.0);
    }

    #[test]
    fn test_sell_falls_back_to_revnet() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        revnet.create_tokens_at_ceiling(10.0).unwrap();
        let mut pool = LiquidityPool::new(1.0, 1000.0, 0).unwrap();

        let outcome = sell(2.0, &mut revnet, &mut pool).unwrap();
        assert_eq!(outcome.source(), Some(Venue::Revnet));
        assert!((outcome.eth_received() - 2.0).abs() < 1e-12);
        assert!((revnet.token_supply() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_sell_voided_when_no_venue() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        let mut pool = LiquidityPool::new(10.0, 10.0, 100).unwrap();

        let outcome = sell(1.0, &mut revnet, &mut pool).unwrap();
        assert!(outcome.is_voided());
        assert_eq!(outcome.source(), None);
        assert_eq!(outcome.eth_received(), 0.0);
        assert_eq!(pool.eth(), 10.0);
    }

    #[test]
    fn test_voided_differs_from_zero_eth_sale() {
        let zero = SaleOutcome::Sold {
            eth_received: 0.0,
            source: Venue::Revnet,
        };
        assert_ne!(zero, SaleOutcome::Voided);
        assert!(!zero.is_voided());
    }

    #[test]
    fn test_sell_over_supply_is_voided() {
        let mut revnet = Revnet::new(flat_params()).unwrap();
        revnet.create_tokens_at_ceiling(5.0).unwrap();
        let mut pool = LiquidityPool::new(0.0, 0.0, 0).unwrap();

        let outcome = sell(6.0, &mut revnet, &mut pool).unwrap();
        assert!(outcome.is_voided());
        assert_eq!(revnet.token_supply(), 5.0);
        assert_eq!(revnet.eth_balance(), 5.0);
    }
}
