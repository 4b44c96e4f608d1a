//! Depth projection: resting volume aggregated by price.
//!
//! Recomputed from the books on every call and never consulted by the
//! matcher.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderBook;

/// Aggregated volume at one price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    /// Resting volume at exactly this price.
    pub volume: Decimal,
    pub order_count: usize,
    /// Volume at this price or better.
    pub cumulative_volume: Decimal,
}

/// Aggregate one side of the book, best price first.
///
/// The running total never exceeds [`OrderBook::total_volume`], which the
/// book keeps representable.
#[must_use]
pub fn aggregate(book: &OrderBook) -> Vec<DepthLevel> {
    let mut cumulative = Decimal::ZERO;
    book.levels()
        .map(|level| {
            cumulative = cumulative.saturating_add(level.total_volume());
            DepthLevel {
                price: level.price,
                volume: level.total_volume(),
                order_count: level.len(),
                cumulative_volume: cumulative,
            }
        })
        .collect()
}

/// Both sides of the depth ladder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthView {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthView {
    #[must_use]
    pub fn from_books(bids: &OrderBook, asks: &OrderBook) -> Self {
        Self {
            bids: aggregate(bids),
            asks: aggregate(asks),
        }
    }

    /// Keep only the best `levels` prices per side.
    #[must_use]
    pub fn truncate(mut self, levels: usize) -> Self {
        self.bids.truncate(levels);
        self.asks.truncate(levels);
        self
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Mid price = (best_bid + best_ask) / 2. `None` if either side is empty.
    ///
    /// Computed as `bid + (ask - bid) / 2` so the sum of two large prices
    /// cannot overflow.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(bid + (ask - bid) / Decimal::TWO),
            _ => None,
        }
    }
}
