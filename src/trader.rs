//! Trader Ledger
//!
//! One entry per simulated buyer: a purchase recorded at creation and at
//! most one later sale. Both records are write-once.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::router::Venue;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub eth_spent: f64,
    pub tokens_received: f64,
    pub source: Venue,
    pub day: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub tokens_spent: f64,
    pub eth_received: f64,
    pub source: Option<Venue>, // None when the sale was voided
    pub day: u32,
}

impl SaleRecord {
    pub fn is_voided(&self) -> bool {
        self.source.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trader {
    id: usize,
    purchase: PurchaseRecord,
    sale: Option<SaleRecord>,
}

impl Trader {
    pub fn new(id: usize, purchase: PurchaseRecord) -> Self {
        Self {
            id,
            purchase,
            sale: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn purchase(&self) -> &PurchaseRecord {
        &self.purchase
    }

    pub fn sale(&self) -> Option<&SaleRecord> {
        self.sale.as_ref()
    }

    pub fn has_sold(&self) -> bool {
        self.sale.is_some()
    }

    pub fn days_held(&self, day: u32) -> u32 {
        day.saturating_sub(self.purchase.day)
    }

    pub fn record_sale(&mut self, sale: SaleRecord) -> Result<()> {
        if self.sale.is_some() {
            return Err(SimulationError::SaleAlreadyRecorded { trader: self.id });
        }
        self.sale = Some(sale);
        Ok(())
    }

    /// ETH received per ETH spent on the tokens that were sold.
    pub fn realized_return(&self) -> Option<f64> {
        let sale = self.sale.as_ref().filter(|s| !s.is_voided())?;
        if self.purchase.tokens_received <= 0.0 {
            return None;
        }
        let cost = self.purchase.eth_spent * sale.tokens_spent / self.purchase.tokens_received;
        if cost <= 0.0 {
            return None;
        }
        Some(sale.eth_received / cost)
    }
}
