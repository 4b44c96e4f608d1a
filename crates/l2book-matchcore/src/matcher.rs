//! Continuous price-time priority matching.
//!
//! Matching is split in two so that a submission is all-or-nothing:
//!
//! ```text
//! plan_limit_fills / plan_market_fills(&Order, &OrderBook) -> MatchPlan   (read-only)
//! execute_plan(&mut OrderBook, &MatchPlan)                                (validate, then mutate)
//! ```
//!
//! The planner walks the opposite book best price first and, within a
//! level, oldest first. Every fill executes at the resting order's price.
//! [`execute_plan`] checks every fill against the book before applying
//! the first one, so an inconsistent plan never leaves a half-applied book.

use chrono::{DateTime, Utc};
use l2book_types::{L2BookError, Order, OrderId, OrderType, Result, Side, Trade, TradeId};
use rust_decimal::Decimal;

use crate::OrderBook;

/// One planned execution against a resting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub maker_order_id: OrderId,
    /// The resting order's price.
    pub price: Decimal,
    pub volume: Decimal,
}

impl Fill {
    /// Materialize this fill as a ledger trade for `taker`.
    #[must_use]
    pub fn to_trade(
        &self,
        taker: &Order,
        id: TradeId,
        sequence: u64,
        executed_at: DateTime<Utc>,
    ) -> Trade {
        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Bid => (taker.id, self.maker_order_id),
            Side::Ask => (self.maker_order_id, taker.id),
        };
        Trade {
            id,
            sequence,
            price: self.price,
            volume: self.volume,
            buy_order_id,
            sell_order_id,
            aggressor_side: taker.side,
            executed_at,
        }
    }
}

/// The outcome of walking the opposite book for one incoming order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPlan {
    /// Fills in execution order.
    pub fills: Vec<Fill>,
    /// Sum of fill volumes.
    pub filled: Decimal,
    /// Incoming volume left after every fill.
    pub residual: Decimal,
}

impl MatchPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

/// Plan the fills of an incoming limit order: walk while the best
/// opposite level crosses the order's price.
pub fn plan_limit_fills(incoming: &Order, opposite: &OrderBook) -> Result<MatchPlan> {
    if incoming.order_type != OrderType::Limit {
        return Err(L2BookError::Internal(format!(
            "plan_limit_fills called with a {} order",
            incoming.order_type
        )));
    }
    match incoming.price {
        Some(p) if p > Decimal::ZERO => plan_fills(incoming, opposite, |price| incoming.crosses(price)),
        _ => Err(L2BookError::invalid_order("limit order requires a positive price")),
    }
}

/// Plan the fills of an incoming market order: every price crosses, the
/// walk ends when the order is filled or the book runs out.
pub fn plan_market_fills(incoming: &Order, opposite: &OrderBook) -> Result<MatchPlan> {
    if incoming.order_type != OrderType::Market {
        return Err(L2BookError::Internal(format!(
            "plan_market_fills called with a {} order",
            incoming.order_type
        )));
    }
    plan_fills(incoming, opposite, |_| true)
}

fn plan_fills(
    incoming: &Order,
    opposite: &OrderBook,
    crosses: impl Fn(Decimal) -> bool,
) -> Result<MatchPlan> {
    if opposite.side() != incoming.side.opposite() {
        return Err(L2BookError::Internal(format!(
            "{} order matched against the {} book",
            incoming.side,
            opposite.side()
        )));
    }
    if incoming.remaining <= Decimal::ZERO {
        return Err(L2BookError::invalid_order(format!(
            "volume must be positive, got {}",
            incoming.remaining
        )));
    }

    let mut plan = MatchPlan {
        residual: incoming.remaining,
        ..MatchPlan::default()
    };

    'levels: for level in opposite.levels() {
        if !crosses(level.price) {
            break;
        }
        for resting in level.iter() {
            let volume = plan.residual.min(resting.remaining);
            plan.fills.push(Fill {
                maker_order_id: resting.id,
                price: level.price,
                volume,
            });
            plan.filled += volume;
            plan.residual -= volume;
            if plan.residual.is_zero() {
                break 'levels;
            }
        }
    }

    Ok(plan)
}

/// Apply a plan to the book it was computed from.
///
/// Every fill is validated first; nothing is reduced unless every
/// reduction is valid.
pub fn execute_plan(opposite: &mut OrderBook, plan: &MatchPlan) -> Result<()> {
    for fill in &plan.fills {
        opposite.check_reduction(&fill.maker_order_id, fill.volume)?;
    }
    for fill in &plan.fills {
        let remaining = opposite.reduce_order(&fill.maker_order_id, fill.volume)?;
        tracing::debug!(
            maker = %fill.maker_order_id,
            price = %fill.price,
            volume = %fill.volume,
            remaining = %remaining,
            "Resting order reduced"
        );
    }
    Ok(())
}
