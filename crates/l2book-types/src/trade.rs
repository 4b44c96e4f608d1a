//! Trade types produced by the matching engine.
//!
//! A [`Trade`] is the immutable record of a single fill between the
//! incoming (aggressor) order and one resting order, always at the
//! resting order's price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, Side, TradeId};

/// A single execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier (deterministic from `sequence`).
    pub id: TradeId,
    /// Execution order across the engine's lifetime.
    pub sequence: u64,
    /// Execution price (the resting order's price).
    pub price: Decimal,
    /// Executed volume, always > 0.
    pub volume: Decimal,
    /// The bid-side order, regardless of which side was the aggressor.
    pub buy_order_id: OrderId,
    /// The ask-side order.
    pub sell_order_id: OrderId,
    /// Side of the incoming order that triggered this execution.
    pub aggressor_side: Side,
    /// When this trade was executed.
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// price × volume, `None` if it does not fit in a `Decimal`.
    #[must_use]
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.volume)
    }

    /// Sum of notionals, `None` on overflow.
    pub fn total_notional<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Option<Decimal> {
        trades
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.notional()?))
    }

    #[must_use]
    pub fn aggressor_is_buyer(&self) -> bool {
        self.aggressor_side == Side::Bid
    }

    /// The resting (passive) order of this fill.
    #[must_use]
    pub fn maker_order_id(&self) -> OrderId {
        match self.aggressor_side {
            Side::Bid => self.sell_order_id,
            Side::Ask => self.buy_order_id,
        }
    }

    /// The incoming (aggressive) order of this fill.
    #[must_use]
    pub fn taker_order_id(&self) -> OrderId {
        match self.aggressor_side {
            Side::Bid => self.buy_order_id,
            Side::Ask => self.sell_order_id,
        }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[#{}] {} {} @ {} (buy {} / sell {})",
            self.sequence,
            self.aggressor_side,
            self.volume,
            self.price,
            self.buy_order_id.short(),
            self.sell_order_id.short(),
        )
    }
}
