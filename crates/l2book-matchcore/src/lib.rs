//! # l2book-matchcore
//!
//! **Price-time priority order book and matching primitives.**
//!
//! MatchCore holds the data structures and algorithms; it knows nothing
//! about clocks, ID issuance, or locking. Those belong to `l2book-engine`.
//!
//! - [`OrderBook`]: one side of the book, `BTreeMap` levels + ID index
//! - [`PriceLevel`]: orders at one price in time priority
//! - [`plan_limit_fills`] / [`plan_market_fills`] / [`execute_plan`]:
//!   read-only fill planning followed by an all-or-nothing commit
//! - [`ExecutionLedger`]: append-only trade history
//! - [`DepthView`]: cumulative volume by price
//! - [`compute_ledger_digest`]: replay verification hash

pub mod depth;
pub mod digest;
pub mod ledger;
pub mod matcher;
pub mod orderbook;
pub mod price_level;

pub use depth::{DepthLevel, DepthView, aggregate};
pub use digest::{compute_ledger_digest, ledger_digest_hex, verify_ledger_digest};
pub use ledger::ExecutionLedger;
pub use matcher::{Fill, MatchPlan, execute_plan, plan_limit_fills, plan_market_fills};
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
