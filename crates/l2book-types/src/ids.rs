//! Identifiers used throughout l2book.
//!
//! Engine-issued IDs are derived from the engine's monotonic sequence so
//! that replaying the same request stream reproduces the same IDs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a domain separator and a sequence number into 16 UUID bytes.
fn sequence_uuid(domain: &[u8], sequence: u64) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(sequence.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    Uuid::from_bytes(bytes)
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Unique order identifier. Never reused within an engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Random time-ordered ID (UUIDv7). Used by tests and ad-hoc tooling.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Deterministic `OrderId` from the engine's order sequence.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence_uuid(b"l2book:order_id:v1:", sequence))
    }

    /// First ten hex characters, handy for log lines and tables.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..10].to_string()
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TradeId
// ---------------------------------------------------------------------------

/// Unique trade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

impl TradeId {
    /// Deterministic `TradeId` from the engine's trade sequence.
    ///
    /// Two engines fed the same requests assign the **same** trade IDs,
    /// which keeps the ledger digest comparable across replays.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence_uuid(b"l2book:trade_id:v1:", sequence))
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MarketPair
// ---------------------------------------------------------------------------

/// The instrument an engine trades (e.g., BTC/USDT).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketPair {
    pub base: String,
    pub quote: String,
}

impl MarketPair {
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_uniqueness() {
        let a = OrderId::new();
        let b = OrderId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn sequence_ids_are_deterministic() {
        assert_eq!(OrderId::from_sequence(7), OrderId::from_sequence(7));
        assert_ne!(OrderId::from_sequence(7), OrderId::from_sequence(8));
        assert_eq!(TradeId::from_sequence(3), TradeId::from_sequence(3));
        assert_ne!(TradeId::from_sequence(3), TradeId::from_sequence(4));
    }

    #[test]
    fn order_and_trade_domains_differ() {
        assert_ne!(OrderId::from_sequence(1).0, TradeId::from_sequence(1).0);
    }

    #[test]
    fn short_id_is_ten_chars() {
        assert_eq!(OrderId::from_sequence(1).short().len(), 10);
    }

    #[test]
    fn market_pair_symbol() {
        let pair = MarketPair::new("BTC", "USDT");
        assert_eq!(pair.symbol(), "BTC/USDT");
        assert_eq!(format!("{pair}"), "BTC/USDT");
    }

    #[test]
    fn serde_roundtrip() {
        let oid = OrderId::from_sequence(42);
        let json = serde_json::to_string(&oid).unwrap();
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(oid, back);
    }
}
