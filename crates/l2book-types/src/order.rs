//! Order types for the l2book matching engine.
//!
//! An [`Order`] carries an immutable identity (id, side, type, price,
//! sequence, timestamp) and a single mutable field, `remaining`, which
//! only ever decreases.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderId;

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// The side an order of this side matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "BID"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

/// The type of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// Core order struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price. `None` for market orders.
    pub price: Option<Decimal>,
    /// Volume requested at submission.
    pub volume: Decimal,
    /// Volume not yet executed.
    pub remaining: Decimal,
    /// Engine-issued priority sequence (lower = earlier).
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Returns `true` if this order is willing to trade against a resting
    /// order at `resting_price`. Market orders cross every price.
    #[must_use]
    pub fn crosses(&self, resting_price: Decimal) -> bool {
        match (self.order_type, self.price) {
            (OrderType::Market, _) => true,
            (OrderType::Limit, Some(limit)) => match self.side {
                Side::Bid => resting_price <= limit,
                Side::Ask => resting_price >= limit,
            },
            (OrderType::Limit, None) => false,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }

    #[must_use]
    pub fn filled_volume(&self) -> Decimal {
        self.volume - self.remaining
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(side: Side, price: Decimal, volume: Decimal) -> Self {
        Self {
            id: OrderId::new(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume,
            remaining: volume,
            sequence: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn dummy_market(side: Side, volume: Decimal) -> Self {
        Self {
            id: OrderId::new(),
            side,
            order_type: OrderType::Market,
            price: None,
            volume,
            remaining: volume,
            sequence: 0,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_display_and_opposite() {
        assert_eq!(format!("{}", Side::Bid), "BID");
        assert_eq!(format!("{}", Side::Ask), "ASK");
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn bid_crosses_asks_at_or_below_limit() {
        let bid = Order::dummy_limit(Side::Bid, Decimal::new(10, 0), Decimal::ONE);
        assert!(bid.crosses(Decimal::new(9, 0)));
        assert!(bid.crosses(Decimal::new(10, 0)));
        assert!(!bid.crosses(Decimal::new(11, 0)));
    }

    #[test]
    fn ask_crosses_bids_at_or_above_limit() {
        let ask = Order::dummy_limit(Side::Ask, Decimal::new(10, 0), Decimal::ONE);
        assert!(ask.crosses(Decimal::new(11, 0)));
        assert!(ask.crosses(Decimal::new(10, 0)));
        assert!(!ask.crosses(Decimal::new(9, 0)));
    }

    #[test]
    fn market_crosses_everything() {
        let market = Order::dummy_market(Side::Ask, Decimal::ONE);
        assert!(market.crosses(Decimal::new(1, 8)));
        assert!(market.crosses(Decimal::new(1_000_000, 0)));
    }

    #[test]
    fn fill_tracking() {
        let mut order = Order::dummy_limit(Side::Bid, Decimal::new(100, 0), Decimal::new(10, 0));
        assert!(!order.is_filled());
        order.remaining = Decimal::new(4, 0);
        assert_eq!(order.filled_volume(), Decimal::new(6, 0));
        order.remaining = Decimal::ZERO;
        assert!(order.is_filled());
        assert_eq!(order.filled_volume(), Decimal::new(10, 0));
    }
}
