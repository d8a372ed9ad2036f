//! External collaborator interfaces: the settlement chain and the EVM
//! simulation facility.
//!
//! The coordinator consumes both through the narrow traits here; the
//! concrete implementations talk JSON-RPC to a node and HTTP to a hosted
//! simulation API. Every call carries a bounded timeout so a stalled
//! collaborator surfaces as a job failure, never an indefinite block.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use matchmaker_types::{Authorization, IntentHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod implementations {
	pub mod http_sim;
	pub mod rpc;
}

sol! {
	/// The slice of the settlement contract ABI the coordinator touches.
	function intentFilled(bytes32 intentHash) external view returns (bool);
	function authorize(
		bytes32 intentHash,
		address solver,
		uint256 fillAmountToCheck,
		uint256 executeAmountToCheck,
		uint256 blockDeadline
	) external;
}

#[derive(Debug, Error)]
pub enum ChainError {
	#[error("RPC error: {0}")]
	Rpc(String),
	#[error("Transport error: {0}")]
	Transport(String),
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Simulation error: {0}")]
	Simulation(String),
}

/// Latest-block view the coordinator schedules against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	pub number: u64,
	pub timestamp: u64,
	pub base_fee: U256,
}

/// One element of a hypothetical transaction bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SimTransaction {
	/// A solver's raw signed transaction, replayed as-is.
	Raw { data: Bytes },
	/// An unsigned call, e.g. the synthetic authorize the coordinator
	/// prepends so the bundle behaves as if the solver were already
	/// authorized.
	Call {
		from: Address,
		to: Address,
		data: Bytes,
		value: U256,
	},
}

/// The simulated outcome of one bundle element.
///
/// `balance_deltas` maps account address to per-asset deltas; the native
/// asset is keyed by the zero address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationTrace {
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub balance_deltas: HashMap<Address, HashMap<Address, I256>>,
}

impl SimulationTrace {
	pub fn delta(&self, account: Address, asset: Address) -> I256 {
		self.balance_deltas
			.get(&account)
			.and_then(|assets| assets.get(&asset))
			.copied()
			.unwrap_or(I256::ZERO)
	}
}

/// Settlement-chain collaborator.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	async fn latest_block(&self) -> Result<Block, ChainError>;

	/// Whether the intent is already fully settled on-chain.
	async fn is_intent_filled(&self, intent_hash: IntentHash) -> Result<bool, ChainError>;

	/// Issues the on-chain authorize call (on-chain authorization
	/// variant only). Returns the submitted transaction hash.
	async fn submit_authorization(
		&self,
		authorization: &Authorization,
	) -> Result<B256, ChainError>;
}

/// EVM simulation collaborator: computes hypothetical balance deltas from
/// an unconfirmed transaction bundle.
#[async_trait]
pub trait SimulationInterface: Send + Sync {
	async fn simulate_bundle(
		&self,
		transactions: &[SimTransaction],
	) -> Result<Vec<SimulationTrace>, ChainError>;
}

/// ABI-encodes the settlement contract's authorize call for an
/// authorization. Used both for the synthetic bundle head and for the
/// on-chain authorization variant.
pub fn encode_authorize_call(authorization: &Authorization) -> Bytes {
	authorizeCall {
		intentHash: authorization.intent_hash,
		solver: authorization.solver,
		fillAmountToCheck: authorization.fill_amount_to_check,
		executeAmountToCheck: authorization.execute_amount_to_check,
		blockDeadline: U256::from(authorization.block_deadline),
	}
	.abi_encode()
	.into()
}
