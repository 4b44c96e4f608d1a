//! Input validation for order requests.
//!
//! Runs before the engine stamps or touches anything: a rejected request
//! leaves the books, the ledger, and the sequencer exactly as they were.

use l2book_types::{L2BookError, MarketConfig, OrderRequest, OrderType, Result};
use rust_decimal::Decimal;

/// Validates requests against the instrument's trading rules.
#[derive(Debug, Clone)]
pub struct OrderValidator {
    market: MarketConfig,
}

impl OrderValidator {
    #[must_use]
    pub fn new(market: MarketConfig) -> Self {
        Self { market }
    }

    #[must_use]
    pub fn market(&self) -> &MarketConfig {
        &self.market
    }

    /// Check a request. Every failure is `InvalidOrder`.
    ///
    /// Checks run in order:
    /// 1. Volume is positive
    /// 2. Limit orders carry a positive price (a market order's price is
    ///    ignored)
    /// 3. Volume respects min/max size and lot size
    /// 4. Limit price respects tick size
    pub fn validate(&self, request: &OrderRequest) -> Result<()> {
        if request.volume <= Decimal::ZERO {
            return Err(L2BookError::invalid_order(format!(
                "volume must be positive, got {}",
                request.volume
            )));
        }

        match (request.order_type, request.price) {
            (OrderType::Limit, None) => {
                return Err(L2BookError::invalid_order("limit order requires a price"));
            }
            (OrderType::Limit, Some(p)) if p <= Decimal::ZERO => {
                return Err(L2BookError::invalid_order(format!(
                    "price must be positive, got {p}"
                )));
            }
            _ => {}
        }

        if let Some(min) = self.market.min_order_volume {
            if request.volume < min {
                return Err(L2BookError::invalid_order(format!(
                    "volume {} below minimum {min}",
                    request.volume
                )));
            }
        }
        if let Some(max) = self.market.max_order_volume {
            if request.volume > max {
                return Err(L2BookError::invalid_order(format!(
                    "volume {} above maximum {max}",
                    request.volume
                )));
            }
        }
        if let Some(lot) = self.market.lot_size {
            if !request.volume.checked_rem(lot).is_some_and(|r| r.is_zero()) {
                return Err(L2BookError::invalid_order(format!(
                    "volume {} is not a multiple of lot size {lot}",
                    request.volume
                )));
            }
        }
        if let (OrderType::Limit, Some(tick), Some(price)) =
            (request.order_type, self.market.tick_size, request.price)
        {
            if !price.checked_rem(tick).is_some_and(|r| r.is_zero()) {
                return Err(L2BookError::invalid_order(format!(
                    "price {price} is not a multiple of tick size {tick}"
                )));
            }
        }

        Ok(())
    }
}
