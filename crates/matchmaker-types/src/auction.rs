//! Auction window identity.
//!
//! A window is keyed by `(intent hash, target block)`. A new target block
//! always opens a fresh window, so a stale auction can never be replayed.

use crate::common::{BlockNumber, IntentHash};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowKey {
	pub intent_hash: IntentHash,
	pub target_block: BlockNumber,
}

impl WindowKey {
	pub fn new(intent_hash: IntentHash, target_block: BlockNumber) -> Self {
		Self {
			intent_hash,
			target_block,
		}
	}
}

impl fmt::Display for WindowKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.intent_hash, self.target_block)
	}
}
