//! Shared foundation: error taxonomy and locking helper.

/// Error taxonomy and result alias.
pub mod error;
/// Poison-tolerant mutex locking.
pub mod sync;
