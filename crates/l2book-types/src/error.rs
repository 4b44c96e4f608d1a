//! Error types for the l2book matching engine.
//!
//! All errors use the `LB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 5xx: Matching errors
//! - 9xx: General / internal errors
//!
//! Only malformed input and broken invariants are errors. A market order
//! that finds no liquidity is a [`crate::SubmissionOutcome`], not an error.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::OrderId;

/// Central error enum for all l2book operations.
#[derive(Debug, Error)]
pub enum L2BookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The order failed validation (non-positive volume or price, etc.).
    /// Raised before any state change.
    #[error("LB_ERR_100: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The referenced order is not resting in the book.
    #[error("LB_ERR_101: Unknown order: {0}")]
    UnknownOrder(OrderId),

    /// An order with this ID is already resting.
    #[error("LB_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// A reduction larger than the order's remaining volume, or non-positive.
    #[error("LB_ERR_103: Invalid reduction of {order_id}: requested {requested}, remaining {remaining}")]
    InvalidReduction {
        order_id: OrderId,
        requested: Decimal,
        remaining: Decimal,
    },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// The book was left crossed after a submission.
    #[error("LB_ERR_500: Crossed book: best bid {best_bid} >= best ask {best_ask}")]
    CrossedBook { best_bid: Decimal, best_ask: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("LB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("LB_ERR_903: I/O error: {0}")]
    Io(String),
}

impl L2BookError {
    /// Shorthand for [`L2BookError::InvalidOrder`].
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }

    /// Numeric code, matching the `LB_ERR_` prefix of the message.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidOrder { .. } => 100,
            Self::UnknownOrder(_) => 101,
            Self::DuplicateOrder(_) => 102,
            Self::InvalidReduction { .. } => 103,
            Self::CrossedBook { .. } => 500,
            Self::Internal(_) => 900,
            Self::Serialization(_) => 901,
            Self::Configuration(_) => 902,
            Self::Io(_) => 903,
        }
    }

    /// Internal-consistency errors abort the submission that hit them;
    /// everything else is caller input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::UnknownOrder(_)
                | Self::DuplicateOrder(_)
                | Self::InvalidReduction { .. }
                | Self::CrossedBook { .. }
                | Self::Internal(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, L2BookError>;

impl From<std::io::Error> for L2BookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for L2BookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
