//! Configuration for the matchmaker service.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to read config file: {0}")]
	Io(#[from] std::io::Error),
	#[error("Failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("Invalid config: {0}")]
	Invalid(String),
}

/// Complete matchmaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchmakerConfig {
	pub server: ServerConfig,
	pub chain: ChainConfig,
	pub simulation: SimulationConfig,
	pub signer: SignerConfig,
	#[serde(default)]
	pub auction: AuctionConfig,
	#[serde(default)]
	pub direct: DirectConfig,
	/// Solvers pre-approved out of band for the direct-submission path.
	#[serde(default)]
	pub known_solvers: Vec<KnownSolver>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub rpc_url: String,
	pub chain_id: u64,
	/// Settlement contract the authorizations are scoped to.
	pub settlement_address: Address,
	/// Average block time in seconds, used to place target blocks.
	#[serde(default = "default_block_time")]
	pub block_time_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
	pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
	/// Hex-encoded coordinator private key.
	pub private_key: String,
}

/// How the winner's permission reaches the settlement contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationMode {
	/// Hand the signed authorization to the solver, who presents it at
	/// settlement time.
	#[default]
	Signature,
	/// The coordinator itself issues the on-chain authorize call.
	Onchain,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuctionConfig {
	/// Relative margin, in bps of the best score, within which near-best
	/// solutions are all authorized.
	#[serde(default = "default_tie_tolerance_bps")]
	pub tie_tolerance_bps: u64,
	/// How long window state is retained before TTL eviction.
	#[serde(default = "default_window_retention_secs")]
	pub window_retention_secs: u64,
	#[serde(default)]
	pub authorization_mode: AuthorizationMode,
	/// Expected gas cost of the coordinator's own authorize call,
	/// used by the profitability check in on-chain mode.
	#[serde(default = "default_authorization_gas_limit")]
	pub authorization_gas_limit: u64,
	/// Worker pool size draining the job queue.
	#[serde(default = "default_queue_concurrency")]
	pub queue_concurrency: usize,
}

impl Default for AuctionConfig {
	fn default() -> Self {
		Self {
			tie_tolerance_bps: default_tie_tolerance_bps(),
			window_retention_secs: default_window_retention_secs(),
			authorization_mode: AuthorizationMode::default(),
			authorization_gas_limit: default_authorization_gas_limit(),
			queue_concurrency: default_queue_concurrency(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectConfig {
	/// How many blocks ahead the direct-submission authorization is
	/// priced and deadlined at.
	#[serde(default = "default_horizon_blocks")]
	pub horizon_blocks: u64,
}

impl Default for DirectConfig {
	fn default() -> Self {
		Self {
			horizon_blocks: default_horizon_blocks(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KnownSolver {
	pub name: String,
	pub address: Address,
	/// Callback endpoint base URL.
	pub base_url: String,
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}
fn default_port() -> u16 {
	3000
}
fn default_block_time() -> u64 {
	12
}
fn default_tie_tolerance_bps() -> u64 {
	10
}
fn default_window_retention_secs() -> u64 {
	120
}
fn default_authorization_gas_limit() -> u64 {
	150_000
}
fn default_queue_concurrency() -> usize {
	256
}
fn default_horizon_blocks() -> u64 {
	15
}

impl MatchmakerConfig {
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		let config: Self = toml::from_str(&raw)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.chain.rpc_url.is_empty() {
			return Err(ConfigError::Invalid("chain.rpc_url is empty".into()));
		}
		if self.chain.block_time_secs == 0 {
			return Err(ConfigError::Invalid("chain.block_time_secs is zero".into()));
		}
		if self.simulation.url.is_empty() {
			return Err(ConfigError::Invalid("simulation.url is empty".into()));
		}
		let key = self.signer.private_key.trim_start_matches("0x");
		if key.len() != 64 || hex::decode(key).is_err() {
			return Err(ConfigError::Invalid(
				"signer.private_key must be 32 hex-encoded bytes".into(),
			));
		}
		if self.auction.tie_tolerance_bps > 10_000 {
			return Err(ConfigError::Invalid(
				"auction.tie_tolerance_bps exceeds 10000".into(),
			));
		}
		for solver in &self.known_solvers {
			if solver.base_url.is_empty() {
				return Err(ConfigError::Invalid(format!(
					"known solver {} has an empty base_url",
					solver.name
				)));
			}
		}
		Ok(())
	}
}
