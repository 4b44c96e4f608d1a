//! System-wide constants for the l2book matching engine.

/// Initial capacity reserved for the execution ledger.
pub const DEFAULT_LEDGER_CAPACITY: usize = 4096;

/// Number of depth levels the CLI prints per side unless told otherwise.
pub const DEFAULT_DEPTH_LEVELS: usize = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "l2book";
