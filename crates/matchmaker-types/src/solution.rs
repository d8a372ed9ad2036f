//! Solver-submitted candidate fills.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate fill for one intent, with its simulated economic outcome.
///
/// Created by solution intake; never mutated. A better solution within the
/// same auction window supersedes it on the leaderboard, it is not deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
	/// Solver-chosen identifier, echoed back on the authorization callback.
	pub uuid: Uuid,
	pub solver: Address,
	/// Callback endpoint base URL for authorization delivery.
	pub base_url: String,
	/// Asset kind this solution was submitted under, used to build the
	/// callback path.
	pub asset_kind: String,
	pub fill_amount: U256,
	/// The counter-amount the simulation shows the maker actually
	/// receiving (sell) or paying (buy).
	pub execute_amount: U256,
	/// Raw transaction bytes needed to replay the fill.
	pub txs: Vec<Bytes>,
}
