//! One side of the order book.
//!
//! Price levels live in a `BTreeMap` keyed so that ascending key order is
//! always best-price-first:
//! - **Bids**: key = `-price` -- highest price first
//! - **Asks**: key = `price` -- lowest price first
//!
//! An auxiliary `HashMap<OrderId, (price, sequence)>` locates any resting
//! order without scanning.
//!
//! The side's total resting volume always fits in a `Decimal`: inserts
//! that would overflow it are refused. Every level total and every
//! cumulative depth figure is bounded by it.

use std::collections::{BTreeMap, HashMap};

use l2book_types::*;
use rust_decimal::Decimal;

use crate::price_level::PriceLevel;

/// Resting limit orders for one side of a single instrument.
#[derive(Debug, Clone)]
pub struct OrderBook {
    side: Side,
    /// Levels in priority order (see [`priority_key`]).
    levels: BTreeMap<Decimal, PriceLevel>,
    /// Fast lookup: `OrderId -> (price, sequence)`.
    index: HashMap<OrderId, (Decimal, u64)>,
    /// Sum of `remaining` across the side.
    total_volume: Decimal,
}

/// Map a price to its level key for `side`.
fn priority_key(side: Side, price: Decimal) -> Decimal {
    match side {
        Side::Bid => -price,
        Side::Ask => price,
    }
}

impl OrderBook {
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            index: HashMap::new(),
            total_volume: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Validate that `order` could be rested here, without mutating.
    pub fn check_insert(&self, order: &Order) -> Result<()> {
        if order.side != self.side {
            return Err(L2BookError::invalid_order(format!(
                "{} order cannot rest in the {} book",
                order.side, self.side
            )));
        }
        if order.order_type != OrderType::Limit {
            return Err(L2BookError::invalid_order("market orders never rest"));
        }
        match order.price {
            Some(p) if p > Decimal::ZERO => {}
            Some(p) => {
                return Err(L2BookError::invalid_order(format!(
                    "price must be positive, got {p}"
                )));
            }
            None => return Err(L2BookError::invalid_order("limit order without a price")),
        }
        if order.remaining <= Decimal::ZERO {
            return Err(L2BookError::invalid_order(format!(
                "volume must be positive, got {}",
                order.remaining
            )));
        }
        if self.index.contains_key(&order.id) {
            return Err(L2BookError::DuplicateOrder(order.id));
        }
        if self.total_volume.checked_add(order.remaining).is_none() {
            return Err(L2BookError::invalid_order(format!(
                "volume {} would overflow resting {} volume {}",
                order.remaining, self.side, self.total_volume
            )));
        }
        Ok(())
    }

    /// Rest a limit order at its price, behind every order of that level
    /// with a lower sequence.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        self.check_insert(&order)?;
        let price = order
            .price
            .ok_or_else(|| L2BookError::invalid_order("limit order without a price"))?;

        let (id, sequence, volume) = (order.id, order.sequence, order.remaining);
        self.levels
            .entry(priority_key(self.side, price))
            .or_insert_with(|| PriceLevel::new(price))
            .push(order)?;
        self.index.insert(id, (price, sequence));
        self.total_volume += volume;
        Ok(())
    }

    // =================================================================
    // Reduction / removal
    // =================================================================

    /// Validate a reduction of `amount` against order `id`, without mutating.
    pub fn check_reduction(&self, id: &OrderId, amount: Decimal) -> Result<()> {
        let order = self.get(id).ok_or(L2BookError::UnknownOrder(*id))?;
        if amount <= Decimal::ZERO || amount > order.remaining {
            return Err(L2BookError::InvalidReduction {
                order_id: *id,
                requested: amount,
                remaining: order.remaining,
            });
        }
        Ok(())
    }

    /// Decrease order `id` by `amount`. An order reaching zero leaves the
    /// book, and so does its level if that empties it. Returns the new
    /// remaining volume.
    pub fn reduce_order(&mut self, id: &OrderId, amount: Decimal) -> Result<Decimal> {
        self.check_reduction(id, amount)?;
        let (price, sequence) = *self.index.get(id).ok_or(L2BookError::UnknownOrder(*id))?;
        let key = priority_key(self.side, price);

        let level = self
            .levels
            .get_mut(&key)
            .ok_or(L2BookError::UnknownOrder(*id))?;
        let remaining = level
            .reduce(sequence, amount)
            .ok_or(L2BookError::UnknownOrder(*id))?;
        self.total_volume -= amount;

        if remaining.is_zero() {
            self.index.remove(id);
            if level.is_empty() {
                self.levels.remove(&key);
                tracing::trace!(side = %self.side, price = %price, "Price level emptied");
            }
        }
        Ok(remaining)
    }

    /// Remove order `id` regardless of its remaining volume.
    pub fn remove(&mut self, id: &OrderId) -> Result<Order> {
        let (price, sequence) = *self.index.get(id).ok_or(L2BookError::UnknownOrder(*id))?;
        let key = priority_key(self.side, price);

        let level = self
            .levels
            .get_mut(&key)
            .ok_or(L2BookError::UnknownOrder(*id))?;
        let order = level
            .remove(sequence)
            .ok_or(L2BookError::UnknownOrder(*id))?;
        if level.is_empty() {
            self.levels.remove(&key);
        }
        self.index.remove(id);
        self.total_volume -= order.remaining;
        Ok(order)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// The level at the best price, or `None` if the book is empty.
    #[must_use]
    pub fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.values().next()
    }

    /// Best price: highest bid or lowest ask.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        self.best_level().map(|l| l.price)
    }

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        let (price, sequence) = self.index.get(id)?;
        self.levels
            .get(&priority_key(self.side, *price))?
            .get(*sequence)
    }

    #[must_use]
    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of resting orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct price levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total resting volume on this side.
    #[must_use]
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Resting volume `incoming` could trade against, i.e. at every level
    /// its price crosses.
    #[must_use]
    pub fn volume_crossing(&self, incoming: &Order) -> Decimal {
        self.levels()
            .take_while(|l| incoming.crosses(l.price))
            .map(PriceLevel::total_volume)
            .sum()
    }

    // =================================================================
    // Iteration
    // =================================================================

    /// Levels from best to worst price.
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels.values()
    }

    /// Every resting order in full price-time priority.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.levels.values().flat_map(PriceLevel::iter)
    }
}
