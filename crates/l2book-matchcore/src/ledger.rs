//! The execution ledger: the system of record for what traded.
//!
//! Append-only. Trades are stored in execution order and only handed
//! out as shared borrows, so callers can iterate as often as they like
//! without being able to alter history.

use std::ops::RangeBounds;

use l2book_types::{L2BookError, Result, Trade};
use rust_decimal::Decimal;

/// Append-only, chronologically ordered sequence of trades.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLedger {
    trades: Vec<Trade>,
}

impl ExecutionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trades: Vec::with_capacity(capacity),
        }
    }

    /// Record a trade. Sequences must strictly increase.
    pub fn append(&mut self, trade: Trade) -> Result<()> {
        self.check_batch(std::slice::from_ref(&trade))?;
        self.trades.push(trade);
        Ok(())
    }

    /// Check that `batch` could be appended in order without breaking
    /// sequence monotonicity.
    pub fn check_batch(&self, batch: &[Trade]) -> Result<()> {
        let mut previous = self.trades.last().map(|t| t.sequence);
        for trade in batch {
            if let Some(prev) = previous {
                if trade.sequence <= prev {
                    return Err(L2BookError::Internal(format!(
                        "trade sequence {} not after {prev}",
                        trade.sequence
                    )));
                }
            }
            previous = Some(trade.sequence);
        }
        Ok(())
    }

    /// Append a batch of trades, all or none.
    pub fn extend(&mut self, batch: Vec<Trade>) -> Result<()> {
        self.check_batch(&batch)?;
        for trade in batch {
            self.append(trade)?;
        }
        Ok(())
    }

    /// Every trade, oldest first.
    pub fn all(&self) -> std::slice::Iter<'_, Trade> {
        self.trades.iter()
    }

    /// Trades by ledger position. Out-of-range bounds yield an empty slice.
    pub fn query(&self, range: impl RangeBounds<usize>) -> &[Trade] {
        use std::ops::Bound;

        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.trades.len(),
        }
        .min(self.trades.len());

        self.trades.get(start..end).unwrap_or(&[])
    }

    /// Trades with a sequence strictly greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[Trade] {
        let start = self.trades.partition_point(|t| t.sequence <= sequence);
        &self.trades[start..]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Trade] {
        &self.trades
    }

    #[must_use]
    pub fn last(&self) -> Option<&Trade> {
        self.trades.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Total executed volume, `None` once it no longer fits in a `Decimal`.
    #[must_use]
    pub fn total_volume(&self) -> Option<Decimal> {
        self.trades
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.volume))
    }

    #[must_use]
    pub fn last_price(&self) -> Option<Decimal> {
        self.last().map(|t| t.price)
    }

    /// Volume-weighted average price across the whole ledger.
    #[must_use]
    pub fn vwap(&self) -> Option<Decimal> {
        let volume = self.total_volume()?;
        if volume.is_zero() {
            return None;
        }
        Trade::total_notional(&self.trades)?.checked_div(volume)
    }
}
