//! Common aliases used throughout the matchmaker.

pub use alloy_primitives::{Address, B256, I256, U256};

/// Canonical digest of an intent's fields.
pub type IntentHash = B256;

/// Block number.
pub type BlockNumber = u64;

/// Timestamp (Unix seconds).
pub type Timestamp = u64;
