//! The matching engine: one instrument, two books, one ledger.
//!
//! ## Submission pipeline
//!
//! ```text
//! OrderRequest → OrderValidator.validate() → Sequencer.preview_order()
//!     → plan fills (read-only) → pre-check residual + trade batch
//!     → execute_plan() → ledger.extend() → rest residual
//!     → Sequencer.commit()
//! ```
//!
//! Everything that can fail is checked before the first mutation, so an
//! error leaves both books, the ledger, and the sequencer as they were.

use l2book_matchcore::{
    DepthLevel, DepthView, ExecutionLedger, MatchPlan, OrderBook, aggregate, execute_plan,
    ledger_digest_hex, plan_limit_fills, plan_market_fills, verify_ledger_digest,
};
use l2book_types::{
    EngineConfig, L2BookError, MarketPair, Order, OrderId, OrderRequest, OrderType, Result, Side,
    SubmissionOutcome, SubmissionResult, Trade,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderValidator, Sequencer};

/// One consistent read of both books and the ledger position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    /// Resting bids in priority order.
    pub bids: Vec<Order>,
    /// Resting asks in priority order.
    pub asks: Vec<Order>,
    pub depth: DepthView,
    /// Sequence of the most recent trade, `None` before the first trade.
    pub last_trade_sequence: Option<u64>,
    pub trade_count: usize,
}

impl BookSnapshot {
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.depth.best_bid()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.depth.best_ask()
    }

    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        self.depth.spread()
    }
}

/// Single-instrument price-time priority matching engine.
///
/// A plain owned value: submissions take `&mut self`, queries `&self`.
/// Wrap it in [`SharedEngine`](crate::SharedEngine) to share it.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    pair: MarketPair,
    bids: OrderBook,
    asks: OrderBook,
    ledger: ExecutionLedger,
    sequencer: Sequencer,
    validator: OrderValidator,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl MatchingEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        tracing::info!(
            symbol = %config.market.symbol(),
            ledger_capacity = config.ledger_capacity,
            "Matching engine created"
        );
        Self {
            pair: config.market.pair(),
            bids: OrderBook::new(Side::Bid),
            asks: OrderBook::new(Side::Ask),
            ledger: ExecutionLedger::with_capacity(config.ledger_capacity),
            sequencer: Sequencer::new(),
            validator: OrderValidator::new(config.market.clone()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn pair(&self) -> &MarketPair {
        &self.pair
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate, match, and (for a limit residual) rest one order.
    ///
    /// Fails with `InvalidOrder` for malformed input, before anything
    /// is stamped or mutated. An internal-consistency failure aborts the
    /// submission with the books and ledger untouched. A price on a
    /// market order is ignored.
    pub fn submit_order(&mut self, request: OrderRequest) -> Result<SubmissionResult> {
        if let Err(e) = self.validator.validate(&request) {
            tracing::warn!(
                side = %request.side,
                order_type = %request.order_type,
                volume = %request.volume,
                error = %e,
                "Order rejected"
            );
            return Err(e);
        }

        let stamp = self.sequencer.preview_order(request.timestamp);
        let incoming = Order {
            id: stamp.id,
            side: request.side,
            order_type: request.order_type,
            price: match request.order_type {
                OrderType::Limit => request.price,
                OrderType::Market => None,
            },
            volume: request.volume,
            remaining: request.volume,
            sequence: stamp.sequence,
            timestamp: stamp.timestamp,
        };

        let (own, opposite) = match incoming.side {
            Side::Bid => (&mut self.bids, &mut self.asks),
            Side::Ask => (&mut self.asks, &mut self.bids),
        };

        if incoming.order_type == OrderType::Market && opposite.is_empty() {
            tracing::warn!(
                order_id = %incoming.id,
                side = %incoming.side,
                volume = %incoming.volume,
                "Market order found no liquidity"
            );
            return Ok(SubmissionResult {
                order_id: incoming.id,
                side: incoming.side,
                order_type: incoming.order_type,
                requested_volume: incoming.volume,
                filled_volume: Decimal::ZERO,
                trades: Vec::new(),
                resting_order_id: None,
                outcome: SubmissionOutcome::NoLiquidity,
            });
        }

        let plan: MatchPlan = match incoming.order_type {
            OrderType::Limit => plan_limit_fills(&incoming, opposite)?,
            OrderType::Market => plan_market_fills(&incoming, opposite)?,
        };

        let residual = if incoming.order_type == OrderType::Limit && plan.residual > Decimal::ZERO
        {
            let mut residual = incoming.clone();
            residual.remaining = plan.residual;
            own.check_insert(&residual)?;
            if self.config.check_invariants {
                check_residual_uncrossed(&residual, opposite, &plan)?;
            }
            Some(residual)
        } else {
            None
        };

        let executed_at = self.sequencer.execution_time(&stamp);
        let trades: Vec<Trade> = plan
            .fills
            .iter()
            .zip(0_u64..)
            .map(|(fill, offset)| {
                let trade = self.sequencer.preview_trade(offset);
                fill.to_trade(&incoming, trade.id, trade.sequence, executed_at)
            })
            .collect();
        self.ledger.check_batch(&trades)?;

        // Commit. Every step below was checked above.
        execute_plan(opposite, &plan)?;
        for trade in &trades {
            tracing::debug!(
                trade_id = %trade.id,
                sequence = trade.sequence,
                price = %trade.price,
                volume = %trade.volume,
                buy = %trade.buy_order_id,
                sell = %trade.sell_order_id,
                "Trade executed"
            );
        }
        self.ledger.extend(trades.clone())?;

        let resting_order_id = match residual {
            Some(order) => {
                let id = order.id;
                tracing::debug!(
                    order_id = %id,
                    side = %order.side,
                    price = ?order.price,
                    remaining = %order.remaining,
                    "Residual rested"
                );
                own.insert(order)?;
                Some(id)
            }
            None => None,
        };
        let latest = if trades.is_empty() { stamp.timestamp } else { executed_at };
        self.sequencer.commit(&stamp, trades.len() as u64, latest);

        let outcome = match (incoming.order_type, resting_order_id.is_some()) {
            (OrderType::Limit, true) if plan.filled.is_zero() => SubmissionOutcome::Resting,
            (OrderType::Limit, true) => SubmissionOutcome::PartiallyFilledResting,
            (OrderType::Market, _) if plan.residual > Decimal::ZERO => {
                SubmissionOutcome::PartiallyFilledDiscarded
            }
            _ => SubmissionOutcome::Filled,
        };

        tracing::info!(
            order_id = %incoming.id,
            side = %incoming.side,
            order_type = %incoming.order_type,
            requested = %incoming.volume,
            filled = %plan.filled,
            trades = trades.len(),
            outcome = %outcome,
            "Order processed"
        );

        Ok(SubmissionResult {
            order_id: incoming.id,
            side: incoming.side,
            order_type: incoming.order_type,
            requested_volume: incoming.volume,
            filled_volume: plan.filled,
            trades,
            resting_order_id,
            outcome,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn book(&self, side: Side) -> &OrderBook {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Depth ladder for one side, best price first.
    #[must_use]
    pub fn book_depth(&self, side: Side) -> Vec<DepthLevel> {
        aggregate(self.book(side))
    }

    #[must_use]
    pub fn depth(&self) -> DepthView {
        DepthView::from_books(&self.bids, &self.asks)
    }

    /// Resting orders for one side in priority order.
    #[must_use]
    pub fn resting_orders(&self, side: Side) -> Vec<Order> {
        self.book(side).orders().cloned().collect()
    }

    /// Look up a resting order on either side.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.bids.get(id).or_else(|| self.asks.get(id))
    }

    /// Every trade, oldest first.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.ledger.all()
    }

    #[must_use]
    pub fn ledger(&self) -> &ExecutionLedger {
        &self.ledger
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            symbol: self.pair.symbol(),
            bids: self.resting_orders(Side::Bid),
            asks: self.resting_orders(Side::Ask),
            depth: self.depth(),
            last_trade_sequence: self.ledger.last().map(|t| t.sequence),
            trade_count: self.ledger.len(),
        }
    }

    /// Hex SHA-256 over the ledger; equal for engines fed the same stream.
    #[must_use]
    pub fn ledger_digest(&self) -> String {
        ledger_digest_hex(self.ledger.as_slice())
    }

    /// Check the ledger against a digest produced by [`ledger_digest`].
    /// Fails with `Serialization` if `expected` is not 64 hex characters.
    ///
    /// [`ledger_digest`]: MatchingEngine::ledger_digest
    pub fn verify_ledger_digest(&self, expected: &str) -> Result<bool> {
        let bytes: [u8; 32] = hex::decode(expected)
            .ok()
            .and_then(|raw| raw.try_into().ok())
            .ok_or_else(|| {
                L2BookError::Serialization(format!("not a SHA-256 hex digest: {expected:?}"))
            })?;
        Ok(verify_ledger_digest(self.ledger.as_slice(), &bytes))
    }
}

/// Fails with `CrossedBook` if `residual` would rest at or through the
/// best opposite price left once `plan` is applied. Only a residual can
/// cross: without one the own side is unchanged and the opposite side
/// only loses liquidity.
fn check_residual_uncrossed(
    residual: &Order,
    opposite: &OrderBook,
    plan: &MatchPlan,
) -> Result<()> {
    let remaining_best = opposite
        .levels()
        .find(|level| {
            let taken: Decimal = plan
                .fills
                .iter()
                .filter(|fill| fill.price == level.price)
                .map(|fill| fill.volume)
                .sum();
            taken < level.total_volume()
        })
        .map(|level| level.price);

    match (remaining_best, residual.price) {
        (Some(best), Some(price)) if residual.crosses(best) => {
            let (best_bid, best_ask) = match residual.side {
                Side::Bid => (price, best),
                Side::Ask => (best, price),
            };
            tracing::error!(
                order_id = %residual.id,
                %best_bid,
                %best_ask,
                "Residual would cross the book"
            );
            Err(L2BookError::CrossedBook { best_bid, best_ask })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use l2book_matchcore::Fill;
    use l2book_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn limit(side: Side, price: i64, volume: i64) -> OrderRequest {
        OrderRequest::limit(side, dec(price), dec(volume))
    }

    #[test]
    fn limit_with_no_counterparty_rests() {
        let mut engine = MatchingEngine::default();
        let result = engine.submit_order(limit(Side::Bid, 10, 5)).unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::Resting);
        assert_eq!(result.filled_volume, Decimal::ZERO);
        assert_eq!(result.resting_order_id, Some(result.order_id));
        assert!(result.trades.is_empty());
        assert_eq!(engine.best_bid(), Some(dec(10)));
        assert!(engine.order(&result.order_id).is_some());
    }

    #[test]
    fn full_fill_does_not_rest() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 5)).unwrap();
        let result = engine.submit_order(limit(Side::Bid, 11, 5)).unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::Filled);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].price, dec(10));
        assert!(result.resting_order_id.is_none());
        assert!(engine.book(Side::Bid).is_empty());
        assert!(engine.book(Side::Ask).is_empty());
    }

    #[test]
    fn partial_fill_rests_residual() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 2)).unwrap();
        let result = engine.submit_order(limit(Side::Bid, 10, 5)).unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::PartiallyFilledResting);
        assert_eq!(result.filled_volume, dec(2));
        let resting = engine.resting_orders(Side::Bid);
        assert_eq!(resting.len(), 1);
        assert_eq!(resting[0].remaining, dec(3));
        assert_eq!(resting[0].volume, dec(5));
    }

    #[test]
    fn market_partial_fill_discards_remainder() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Bid, 10, 2)).unwrap();
        let result = engine
            .submit_order(OrderRequest::market(Side::Ask, dec(5)))
            .unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::PartiallyFilledDiscarded);
        assert_eq!(result.filled_volume, dec(2));
        assert_eq!(result.unfilled_volume(), dec(3));
        assert!(engine.book(Side::Ask).is_empty());
        assert!(engine.book(Side::Bid).is_empty());
    }

    #[test]
    fn market_on_empty_book_reports_no_liquidity() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 2)).unwrap();
        let before = engine.snapshot();

        let result = engine
            .submit_order(OrderRequest::market(Side::Ask, dec(5)))
            .unwrap();
        assert!(result.is_no_liquidity());
        assert_eq!(result.filled_volume, Decimal::ZERO);
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.ledger().len(), 0);

        // The order id was never committed: the next order receives it.
        let next = engine.submit_order(limit(Side::Bid, 9, 1)).unwrap();
        assert_eq!(next.order_id, result.order_id);
        assert_eq!(next.order_id, OrderId::from_sequence(1));
    }

    #[test]
    fn no_liquidity_does_not_shift_later_ids() {
        let stream = [limit(Side::Ask, 10, 2), limit(Side::Bid, 10, 1), limit(Side::Bid, 11, 1)];
        let mut plain = MatchingEngine::default();
        let mut noisy = MatchingEngine::default();
        for request in stream {
            let skipped = noisy.submit_order(OrderRequest::market(Side::Ask, dec(1))).unwrap();
            assert!(skipped.is_no_liquidity());
            let a = plain.submit_order(request.clone()).unwrap();
            let b = noisy.submit_order(request).unwrap();
            assert_eq!(a.order_id, b.order_id);
        }
        assert_eq!(plain.ledger_digest(), noisy.ledger_digest());
    }

    #[test]
    fn market_order_price_is_ignored() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 2)).unwrap();
        engine.submit_order(limit(Side::Ask, 12, 2)).unwrap();

        let mut request = OrderRequest::market(Side::Bid, dec(3));
        request.price = Some(dec(10));
        let result = engine.submit_order(request).unwrap();

        assert_eq!(result.outcome, SubmissionOutcome::Filled);
        let prices: Vec<Decimal> = result.trades.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![dec(10), dec(12)]);
        assert!(engine.book(Side::Bid).is_empty());
    }

    #[test]
    fn invalid_order_changes_nothing() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 2)).unwrap();
        let before = engine.snapshot();

        let err = engine.submit_order(limit(Side::Bid, 10, 0)).unwrap_err();
        assert!(matches!(err, L2BookError::InvalidOrder { .. }));
        let err = engine.submit_order(limit(Side::Bid, -1, 3)).unwrap_err();
        assert!(matches!(err, L2BookError::InvalidOrder { .. }));

        assert_eq!(engine.snapshot(), before);
        // Rejections do not consume an order sequence.
        let next = engine.submit_order(limit(Side::Bid, 1, 1)).unwrap();
        assert_eq!(next.order_id, OrderId::from_sequence(1));
    }

    #[test]
    fn side_volume_overflow_is_rejected_not_panicked() {
        let huge = Decimal::from_i128_with_scale(40_000_000_000_000_000_000_000_000_000, 0);
        let mut engine = MatchingEngine::default();
        engine.submit_order(OrderRequest::limit(Side::Bid, dec(8), huge)).unwrap();
        let before = engine.snapshot();

        for price in [8, 9] {
            let err = engine
                .submit_order(OrderRequest::limit(Side::Bid, dec(price), huge))
                .unwrap_err();
            assert!(matches!(err, L2BookError::InvalidOrder { .. }));
        }
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.book(Side::Bid).total_volume(), huge);

        // A large ask still trades against it.
        let result = engine.submit_order(OrderRequest::limit(Side::Ask, dec(8), huge)).unwrap();
        assert_eq!(result.outcome, SubmissionOutcome::Filled);
        assert!(result.average_price().is_none());
        assert_eq!(engine.ledger().total_volume(), Some(huge));
    }

    #[test]
    fn crossing_residual_is_refused_before_commit() {
        let mut asks = OrderBook::new(Side::Ask);
        let resting = Order::dummy_limit(Side::Ask, dec(10), dec(2)).with_sequence(0);
        let resting_id = resting.id;
        asks.insert(resting).unwrap();
        asks.insert(Order::dummy_limit(Side::Ask, dec(12), dec(1)).with_sequence(1))
            .unwrap();
        let residual = Order::dummy_limit(Side::Bid, dec(11), dec(1)).with_sequence(2);

        // A plan that leaves the 10 level in place would rest the bid through it.
        let err = check_residual_uncrossed(&residual, &asks, &MatchPlan::default()).unwrap_err();
        match err {
            L2BookError::CrossedBook { best_bid, best_ask } => {
                assert_eq!((best_bid, best_ask), (dec(11), dec(10)));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let sweep = MatchPlan {
            fills: vec![Fill { maker_order_id: resting_id, price: dec(10), volume: dec(2) }],
            filled: dec(2),
            residual: dec(1),
        };
        assert!(check_residual_uncrossed(&residual, &asks, &sweep).is_ok());
        assert_eq!(asks.order_count(), 2);
    }

    #[test]
    fn ledger_digest_verifies() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 1)).unwrap();
        engine.submit_order(limit(Side::Bid, 10, 1)).unwrap();
        let digest = engine.ledger_digest();

        assert!(engine.verify_ledger_digest(&digest).unwrap());
        assert!(!MatchingEngine::default().verify_ledger_digest(&digest).unwrap());
        let err = engine.verify_ledger_digest("abc").unwrap_err();
        assert!(matches!(err, L2BookError::Serialization(_)));
    }

    #[test]
    fn new_rejects_bad_config() {
        let mut market = MarketConfig::default();
        market.tick_size = Some(Decimal::ZERO);
        let err = MatchingEngine::new(EngineConfig::for_market(market)).unwrap_err();
        assert!(matches!(err, L2BookError::Configuration(_)));
    }

    #[test]
    fn tick_size_is_enforced() {
        let mut engine = MatchingEngine::new(EngineConfig::for_market(MarketConfig::btc_usdt()))
            .unwrap();
        let off_tick = OrderRequest::limit(Side::Bid, Decimal::new(100_005, 3), Decimal::ONE);
        assert!(engine.submit_order(off_tick).is_err());
        assert!(engine.book(Side::Bid).is_empty());
    }

    #[test]
    fn queries_reflect_both_sides() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Bid, 8, 1)).unwrap();
        engine.submit_order(limit(Side::Bid, 9, 2)).unwrap();
        engine.submit_order(limit(Side::Ask, 12, 3)).unwrap();

        assert_eq!(engine.best_bid(), Some(dec(9)));
        assert_eq!(engine.best_ask(), Some(dec(12)));
        assert_eq!(engine.spread(), Some(dec(3)));

        let depth = engine.book_depth(Side::Bid);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[1].cumulative_volume, dec(3));

        let snap = engine.snapshot();
        assert_eq!(snap.symbol, "BASE/QUOTE");
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.asks.len(), 1);
        assert_eq!(snap.spread(), Some(dec(3)));
        assert!(snap.last_trade_sequence.is_none());
    }

    #[test]
    fn trades_are_sequenced_across_submissions() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Ask, 10, 1)).unwrap();
        engine.submit_order(limit(Side::Ask, 11, 1)).unwrap();
        engine.submit_order(limit(Side::Bid, 11, 2)).unwrap();
        engine.submit_order(limit(Side::Ask, 9, 1)).unwrap();
        engine.submit_order(OrderRequest::market(Side::Bid, dec(1))).unwrap();

        let seqs: Vec<u64> = engine.trades().map(|t| t.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(engine.snapshot().last_trade_sequence, Some(2));
        assert_eq!(engine.ledger().total_volume(), Some(dec(3)));
    }

    #[test]
    fn identical_streams_produce_identical_digests() {
        let stream = vec![
            limit(Side::Ask, 10, 5),
            limit(Side::Ask, 9, 3),
            limit(Side::Bid, 10, 6),
            OrderRequest::market(Side::Ask, dec(1)),
        ];
        let mut a = MatchingEngine::default();
        let mut b = MatchingEngine::default();
        for req in stream {
            a.submit_order(req.clone()).unwrap();
            b.submit_order(req).unwrap();
        }
        assert_eq!(a.ledger_digest(), b.ledger_digest());
        assert_eq!(a.ledger_digest().len(), 64);
    }

    #[test]
    fn snapshot_serializes() {
        let mut engine = MatchingEngine::default();
        engine.submit_order(limit(Side::Bid, 10, 5)).unwrap();
        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        let back: BookSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, engine.snapshot());
    }
}
