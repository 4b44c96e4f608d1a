//! A single price level in the order book.
//!
//! Orders at the same price are keyed by their engine sequence, so
//! iteration order is time priority and an order can be reduced or
//! removed without scanning the level.

use std::collections::BTreeMap;

use l2book_types::{L2BookError, Order, Result};
use rust_decimal::Decimal;

/// A single price level containing all resting orders at that price.
///
/// The lowest sequence has the highest time priority and is filled first.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    /// Orders by sequence (first = oldest = highest priority).
    orders: BTreeMap<u64, Order>,
    /// Cached sum of `remaining` across `orders`.
    total_volume: Decimal,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: BTreeMap::new(),
            total_volume: Decimal::ZERO,
        }
    }

    /// Add an order at its sequence slot. New submissions always carry the
    /// highest sequence so they land at the back.
    pub fn push(&mut self, order: Order) -> Result<()> {
        if self.orders.contains_key(&order.sequence) {
            return Err(L2BookError::Internal(format!(
                "sequence {} already occupied at price {}",
                order.sequence, self.price
            )));
        }
        self.total_volume = self
            .total_volume
            .checked_add(order.remaining)
            .ok_or_else(|| {
                L2BookError::Internal(format!("level volume overflow at price {}", self.price))
            })?;
        self.orders.insert(order.sequence, order);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, sequence: u64) -> Option<&Order> {
        self.orders.get(&sequence)
    }

    /// Reduce the order at `sequence` by `amount` and return its new
    /// remaining volume. An order reduced to zero is removed in the same
    /// call. The caller guarantees `0 < amount <= remaining`.
    pub fn reduce(&mut self, sequence: u64, amount: Decimal) -> Option<Decimal> {
        let order = self.orders.get_mut(&sequence)?;
        order.remaining -= amount;
        let (remaining, filled) = (order.remaining, order.is_filled());
        self.total_volume -= amount;
        if filled {
            self.orders.remove(&sequence);
        }
        Some(remaining)
    }

    /// Remove a specific order. Returns the removed order, or `None`.
    pub fn remove(&mut self, sequence: u64) -> Option<Order> {
        let order = self.orders.remove(&sequence)?;
        self.total_volume -= order.remaining;
        Some(order)
    }

    /// Orders in time priority.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Total remaining volume across all orders at this level.
    #[must_use]
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
