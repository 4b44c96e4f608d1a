//! # l2book-engine
//!
//! **Serialized matching engine** for a single instrument.
//!
//! ## Architecture
//!
//! 1. **OrderValidator**: rejects malformed requests before any state change
//! 2. **Sequencer**: previews order/trade IDs, sequences, and monotonic
//!    timestamps; records them only when a submission is applied
//! 3. **MatchingEngine**: owns both books and the ledger; plans, checks, then commits
//! 4. **SharedEngine**: `Arc<RwLock<_>>` handle; writers serialize, readers snapshot
//!
//! ## Order Flow
//!
//! ```text
//! OrderRequest → OrderValidator.validate() → Sequencer.preview_order()
//!     → MatchCore plan → commit → Sequencer.commit() → SubmissionResult
//! ```

pub mod engine;
pub mod sequencer;
pub mod shared;
pub mod validator;

pub use engine::{BookSnapshot, MatchingEngine};
pub use sequencer::{OrderStamp, Sequencer, TradeStamp};
pub use shared::SharedEngine;
pub use validator::OrderValidator;
