//! The engine's single monotonic issuer of IDs, sequences, and timestamps.
//!
//! Only the engine owns a `Sequencer`, and it is only touched while a
//! submission holds the engine exclusively, so issued sequences are
//! unique and strictly increasing, and timestamps never go backwards.

use chrono::{DateTime, Utc};
use l2book_types::{OrderId, TradeId};

/// Identity stamped onto an accepted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStamp {
    pub id: OrderId,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// Identity stamped onto an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeStamp {
    pub id: TradeId,
    pub sequence: u64,
}

/// Issues stamps in two steps: `preview_*` computes what the next
/// submission would receive without changing anything, and [`commit`]
/// records them once the submission has been applied. A submission that
/// errors or reports no liquidity never commits, so it leaves no gap.
///
/// [`commit`]: Sequencer::commit
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    next_order: u64,
    next_trade: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `candidate` so it is never earlier than anything committed.
    fn clamp(&self, candidate: DateTime<Utc>) -> DateTime<Utc> {
        match self.last_timestamp {
            Some(last) if candidate < last => last,
            _ => candidate,
        }
    }

    /// Stamp the next order would receive. A caller-supplied timestamp is
    /// honoured unless it would move time backwards.
    #[must_use]
    pub fn preview_order(&self, requested: Option<DateTime<Utc>>) -> OrderStamp {
        let sequence = self.next_order;
        OrderStamp {
            id: OrderId::from_sequence(sequence),
            sequence,
            timestamp: self.clamp(requested.unwrap_or_else(Utc::now)),
        }
    }

    /// Stamp of the `offset`-th trade (zero-based) of the pending submission.
    #[must_use]
    pub fn preview_trade(&self, offset: u64) -> TradeStamp {
        let sequence = self.next_trade + offset;
        TradeStamp {
            id: TradeId::from_sequence(sequence),
            sequence,
        }
    }

    /// Execution time for trades of the order stamped `order`: the wall
    /// clock, but never before the order's own timestamp.
    #[must_use]
    pub fn execution_time(&self, order: &OrderStamp) -> DateTime<Utc> {
        Utc::now().max(order.timestamp)
    }

    /// Record an applied submission: its order stamp, how many trades it
    /// produced, and the latest timestamp it used.
    pub fn commit(&mut self, order: &OrderStamp, trades: u64, latest: DateTime<Utc>) {
        self.next_order = self.next_order.max(order.sequence + 1);
        self.next_trade += trades;
        self.last_timestamp = Some(self.clamp(latest.max(order.timestamp)));
    }
}
