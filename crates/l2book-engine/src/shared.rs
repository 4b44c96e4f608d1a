//! Shared access to one engine from many threads.
//!
//! The `RwLock` is the single serialization point: a submission holds the
//! write lock for its whole processing, and readers take the read lock
//! and leave with owned copies, so nobody observes a book mid-match.

use std::sync::Arc;

use l2book_matchcore::DepthLevel;
use l2book_types::{Order, OrderRequest, Result, Side, SubmissionResult, Trade};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::{BookSnapshot, MatchingEngine};

/// Cloneable handle to a shared [`MatchingEngine`].
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<RwLock<MatchingEngine>>,
}

impl SharedEngine {
    #[must_use]
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn submit_order(&self, request: OrderRequest) -> Result<SubmissionResult> {
        self.inner.write().submit_order(request)
    }

    /// Run `f` against the engine under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&self.inner.read())
    }

    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        self.inner.read().snapshot()
    }

    #[must_use]
    pub fn book_depth(&self, side: Side) -> Vec<DepthLevel> {
        self.inner.read().book_depth(side)
    }

    #[must_use]
    pub fn resting_orders(&self, side: Side) -> Vec<Order> {
        self.inner.read().resting_orders(side)
    }

    #[must_use]
    pub fn trades(&self) -> Vec<Trade> {
        self.inner.read().trades().cloned().collect()
    }

    /// Trades with a sequence strictly greater than `sequence`.
    #[must_use]
    pub fn trades_since(&self, sequence: u64) -> Vec<Trade> {
        self.inner.read().ledger().since(sequence).to_vec()
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.inner.read().best_bid()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.inner.read().best_ask()
    }

    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        self.inner.read().spread()
    }

    #[must_use]
    pub fn ledger_digest(&self) -> String {
        self.inner.read().ledger_digest()
    }
}
