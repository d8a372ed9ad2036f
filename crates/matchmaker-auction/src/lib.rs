//! The matchmaker core: auction/settlement coordination.
//!
//! Solvers race to propose fills for a published intent. This crate
//! collects their candidate solutions during a short per-block auction
//! window, scores them on an append-only leaderboard, and once the window
//! closes signs time-boxed authorizations for the near-best cohort. A
//! separate direct-submission path authorizes pre-approved solvers for
//! intents that name this coordinator as their sole authority, without
//! running an auction.

use alloy_primitives::Address;
use alloy_sol_types::Eip712Domain;
use matchmaker_account::{AccountError, AccountService};
use matchmaker_chain::{ChainError, ChainInterface, SimulationInterface};
use matchmaker_config::{AuthorizationMode, KnownSolver, MatchmakerConfig};
use matchmaker_delivery::DeliveryService;
use matchmaker_queue::JobQueue;
use matchmaker_storage::{StorageError, StorageService};
use matchmaker_types::authorization::authorization_domain;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use window::Windows;

pub mod direct;
pub mod intake;
pub mod release;
pub mod window;

/// Leaderboard entries read back at release time.
pub(crate) const TOP_K: usize = 5;
/// Blocks past the target block an authorization stays consumable.
pub(crate) const DEADLINE_BLOCK_MARGIN: u64 = 5;
/// Blocks past the target block after which a release is stale.
pub(crate) const RELEASE_GRACE_BLOCKS: u64 = 2;
/// Minimum seconds left before the next block for a solution to have a
/// realistic chance of landing in it.
pub(crate) const MIN_BLOCK_LEAD_SECS: u64 = 6;

/// Attempt budgets per job family. Release must never retry: a late
/// retry would sign against a now-stale block number.
pub(crate) const RELEASE_ATTEMPTS: u32 = 1;
pub(crate) const DIRECT_DELIVERY_ATTEMPTS: u32 = 5;
pub(crate) const ONCHAIN_AUTHORIZE_ATTEMPTS: u32 = 30;

/// Why a submission was turned away. Informational for the caller and
/// never retried by the coordinator; the solver must resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
	NotStarted,
	Expired,
	AlreadyFilled,
	AuctionLocked,
	SolutionReverted,
	NotProfitable,
	NoMakerDelta,
	AmountOverflow,
	UnsupportedAuthority,
	UnknownSolver,
}

impl fmt::Display for RejectionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let reason = match self {
			Self::NotStarted => "Intent has not started",
			Self::Expired => "Intent is expired",
			Self::AlreadyFilled => "Intent is already filled",
			Self::AuctionLocked => "Auction is locked",
			Self::SolutionReverted => "Solution reverted",
			Self::NotProfitable => "Solution is not profitable",
			Self::NoMakerDelta => "No maker balance change",
			Self::AmountOverflow => "Intent amounts overflow",
			Self::UnsupportedAuthority => "Unsupported matchmaker authority",
			Self::UnknownSolver => "Unknown solver",
		};
		f.write_str(reason)
	}
}

#[derive(Debug, Error)]
pub enum AuctionError {
	/// Business rejection, user-visible, never retried.
	#[error("{0}")]
	Rejected(RejectionReason),
	/// Transient collaborator failures; the job-queue retry budget
	/// governs re-attempts.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Chain error: {0}")]
	Chain(#[from] ChainError),
	#[error("Signing error: {0}")]
	Account(#[from] AccountError),
	#[error("Internal error: {0}")]
	Internal(String),
}

impl AuctionError {
	pub fn rejection(&self) -> Option<RejectionReason> {
		match self {
			Self::Rejected(reason) => Some(*reason),
			_ => None,
		}
	}
}

/// Static knobs for the auction core, derived from configuration.
#[derive(Debug, Clone)]
pub struct AuctionSettings {
	pub settlement: Address,
	pub chain_id: u64,
	pub block_time_secs: u64,
	pub tie_tolerance_bps: u64,
	pub window_retention: Duration,
	pub authorization_mode: AuthorizationMode,
	pub authorization_gas_limit: u64,
	pub direct_horizon_blocks: u64,
	pub known_solvers: Vec<KnownSolver>,
}

impl AuctionSettings {
	pub fn from_config(config: &MatchmakerConfig) -> Self {
		Self {
			settlement: config.chain.settlement_address,
			chain_id: config.chain.chain_id,
			block_time_secs: config.chain.block_time_secs,
			tie_tolerance_bps: config.auction.tie_tolerance_bps,
			window_retention: Duration::from_secs(config.auction.window_retention_secs),
			authorization_mode: config.auction.authorization_mode,
			authorization_gas_limit: config.auction.authorization_gas_limit,
			direct_horizon_blocks: config.direct.horizon_blocks,
			known_solvers: config.known_solvers.clone(),
		}
	}
}

/// The coordinator service. Stateless apart from the shared ledger store,
/// so multiple replicas can run against the same backend.
pub struct AuctionService {
	pub(crate) chain: Arc<dyn ChainInterface>,
	pub(crate) simulator: Arc<dyn SimulationInterface>,
	pub(crate) account: Arc<AccountService>,
	pub(crate) delivery: Arc<DeliveryService>,
	pub(crate) queue: JobQueue,
	pub(crate) windows: Windows,
	pub(crate) settings: AuctionSettings,
	pub(crate) domain: Eip712Domain,
	pub(crate) coordinator: Address,
}

impl AuctionService {
	pub fn new(
		storage: Arc<StorageService>,
		chain: Arc<dyn ChainInterface>,
		simulator: Arc<dyn SimulationInterface>,
		account: Arc<AccountService>,
		delivery: Arc<DeliveryService>,
		queue: JobQueue,
		settings: AuctionSettings,
	) -> Arc<Self> {
		let domain = authorization_domain(settings.chain_id, settings.settlement);
		let coordinator = account.address();
		let windows = Windows::new(storage, settings.window_retention);
		Arc::new(Self {
			chain,
			simulator,
			account,
			delivery,
			queue,
			windows,
			settings,
			domain,
			coordinator,
		})
	}

	pub fn coordinator(&self) -> Address {
		self.coordinator
	}
}

/// Current Unix time in seconds.
pub(crate) fn now_secs() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or(Duration::ZERO)
		.as_secs()
}

#[cfg(test)]
pub(crate) mod testutil;
