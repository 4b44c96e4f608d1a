//! Submission request and result types.
//!
//! An [`OrderRequest`] is what an external collaborator hands to the
//! engine; a [`SubmissionResult`] is what it gets back. Partial fills and
//! empty books are reported through [`SubmissionOutcome`], never as errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderType, Side, Trade};

/// A new order as submitted by a caller. IDs and sequences are assigned
/// by the engine, not by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub order_type: OrderType,
    /// Required for limit orders, must be absent for market orders.
    #[serde(default)]
    pub price: Option<Decimal>,
    pub volume: Decimal,
    /// Optional caller clock. The engine clamps it so order timestamps
    /// never go backwards.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl OrderRequest {
    #[must_use]
    pub fn limit(side: Side, price: Decimal, volume: Decimal) -> Self {
        Self {
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn market(side: Side, volume: Decimal) -> Self {
        Self {
            side,
            order_type: OrderType::Market,
            price: None,
            volume,
            timestamp: None,
        }
    }

    /// Attach a caller-side timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The whole volume executed.
    Filled,
    /// Some volume executed; the limit residual now rests in the book.
    PartiallyFilledResting,
    /// Nothing crossed; the whole limit order rests in the book.
    Resting,
    /// A market order exhausted the opposite book; the remainder was discarded.
    PartiallyFilledDiscarded,
    /// A market order found the opposite book empty. Nothing changed, not
    /// even the engine's sequences: the reported `order_id` was never
    /// recorded and goes to the next accepted order.
    NoLiquidity,
}

impl std::fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filled => write!(f, "FILLED"),
            Self::PartiallyFilledResting => write!(f, "PARTIALLY_FILLED_RESTING"),
            Self::Resting => write!(f, "RESTING"),
            Self::PartiallyFilledDiscarded => write!(f, "PARTIALLY_FILLED_DISCARDED"),
            Self::NoLiquidity => write!(f, "NO_LIQUIDITY"),
        }
    }
}

/// Result of one processed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// The ID the engine assigned to the incoming order.
    pub order_id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub requested_volume: Decimal,
    pub filled_volume: Decimal,
    /// Trades in execution order.
    pub trades: Vec<Trade>,
    /// Set when a limit residual was rested (equal to `order_id`).
    pub resting_order_id: Option<OrderId>,
    pub outcome: SubmissionOutcome,
}

impl SubmissionResult {
    /// Volume that neither executed nor (for market orders) survived.
    #[must_use]
    pub fn unfilled_volume(&self) -> Decimal {
        self.requested_volume - self.filled_volume
    }

    #[must_use]
    pub fn is_no_liquidity(&self) -> bool {
        self.outcome == SubmissionOutcome::NoLiquidity
    }

    /// Volume-weighted execution price, `None` when nothing traded or the
    /// notional does not fit in a `Decimal`.
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        if self.filled_volume.is_zero() {
            return None;
        }
        Trade::total_notional(&self.trades)?.checked_div(self.filled_volume)
    }
}
