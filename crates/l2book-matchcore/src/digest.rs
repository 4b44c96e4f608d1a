//! Ledger digests for replay verification.
//!
//! Two engines fed the same request stream must record the same trades.
//! The digest is a SHA-256 over the ledger that makes that comparison a
//! single 32-byte equality check.

use l2book_types::Trade;
use sha2::{Digest, Sha256};

/// Compute the digest over a sequence of trades.
///
/// Covers trade IDs, sequences, prices, volumes, and both order IDs, in
/// ledger order. Execution wall-clock times are not part of the digest.
#[must_use]
pub fn compute_ledger_digest(trades: &[Trade]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"l2book:ledger_digest:v1:");
    hasher.update((trades.len() as u64).to_le_bytes());

    for trade in trades {
        hasher.update(trade.id.0.as_bytes());
        hasher.update(trade.sequence.to_le_bytes());
        hasher.update(trade.buy_order_id.0.as_bytes());
        hasher.update(trade.sell_order_id.0.as_bytes());
        hasher.update(trade.price.normalize().to_string().as_bytes());
        hasher.update(trade.volume.normalize().to_string().as_bytes());
    }

    hasher.finalize().into()
}

/// Hex form of [`compute_ledger_digest`], for logs and JSON output.
#[must_use]
pub fn ledger_digest_hex(trades: &[Trade]) -> String {
    hex::encode(compute_ledger_digest(trades))
}

/// Verify that `trades` hash to `expected`.
#[must_use]
pub fn verify_ledger_digest(trades: &[Trade], expected: &[u8; 32]) -> bool {
    compute_ledger_digest(trades) == *expected
}
