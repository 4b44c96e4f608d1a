//! # l2book-types
//!
//! Shared types, errors, and configuration for the **l2book** matching engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`TradeId`], [`MarketPair`]
//! - **Order model**: [`Order`], [`Side`], [`OrderType`]
//! - **Trade model**: [`Trade`]
//! - **Submission model**: [`OrderRequest`], [`SubmissionResult`], [`SubmissionOutcome`]
//! - **Configuration**: [`EngineConfig`], [`MarketConfig`]
//! - **Errors**: [`L2BookError`] with `LB_ERR_` prefix codes
//! - **Constants**: defaults shared by the engine and the CLI

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod request;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use l2book_types::{Order, Side, Trade, OrderRequest, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use request::*;
pub use trade::*;

// Constants are accessed via `l2book_types::constants::FOO`
// (not re-exported to avoid name collisions).
