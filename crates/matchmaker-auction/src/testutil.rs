//! Mock collaborators and a wired-up service harness for tests.

use crate::{AuctionService, AuctionSettings};
use alloy_primitives::{Address, B256, I256, U256};
use async_trait::async_trait;
use matchmaker_account::{implementations::local::LocalWallet, AccountService};
use matchmaker_chain::{
	Block, ChainError, ChainInterface, SimTransaction, SimulationInterface, SimulationTrace,
};
use matchmaker_config::{AuthorizationMode, KnownSolver};
use matchmaker_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use matchmaker_queue::JobQueue;
use matchmaker_storage::{implementations::memory::MemoryStore, StorageService};
use matchmaker_types::{Authorization, AuthorizationDelivery, Intent, IntentHash, Side};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const TEST_KEY: &str =
	"0x0123456789012345678901234567890123456789012345678901234567890123";

pub(crate) struct MockChain {
	pub block: Mutex<Block>,
	pub filled: AtomicBool,
	pub submitted: Mutex<Vec<Authorization>>,
}

impl MockChain {
	pub fn new(block: Block) -> Self {
		Self {
			block: Mutex::new(block),
			filled: AtomicBool::new(false),
			submitted: Mutex::new(Vec::new()),
		}
	}
}

#[async_trait]
impl ChainInterface for MockChain {
	async fn latest_block(&self) -> Result<Block, ChainError> {
		Ok(*self.block.lock().unwrap())
	}

	async fn is_intent_filled(&self, _intent_hash: IntentHash) -> Result<bool, ChainError> {
		Ok(self.filled.load(Ordering::SeqCst))
	}

	async fn submit_authorization(
		&self,
		authorization: &Authorization,
	) -> Result<B256, ChainError> {
		self.submitted.lock().unwrap().push(authorization.clone());
		Ok(B256::from([0xffu8; 32]))
	}
}

pub(crate) struct MockSimulator {
	pub traces: Mutex<Vec<SimulationTrace>>,
	pub calls: AtomicU32,
	/// Artificial simulation latency, for tests that race the window lock
	/// against an in-flight submission.
	pub delay: Mutex<Option<Duration>>,
}

impl MockSimulator {
	pub fn new() -> Self {
		Self {
			traces: Mutex::new(Vec::new()),
			calls: AtomicU32::new(0),
			delay: Mutex::new(None),
		}
	}

	pub fn set_traces(&self, traces: Vec<SimulationTrace>) {
		*self.traces.lock().unwrap() = traces;
	}
}

#[async_trait]
impl SimulationInterface for MockSimulator {
	async fn simulate_bundle(
		&self,
		_transactions: &[SimTransaction],
	) -> Result<Vec<SimulationTrace>, ChainError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let delay = *self.delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		Ok(self.traces.lock().unwrap().clone())
	}
}

type Delivered = Arc<Mutex<Vec<(String, String, AuthorizationDelivery)>>>;

pub(crate) struct MockDelivery {
	pub delivered: Delivered,
	/// Deliveries to this base URL fail, for partial-failure tests.
	pub fail_for: Mutex<Option<String>>,
}

#[async_trait]
impl DeliveryInterface for MockDelivery {
	async fn deliver_authorization(
		&self,
		base_url: &str,
		asset_kind: &str,
		delivery: &AuthorizationDelivery,
	) -> Result<(), DeliveryError> {
		if self.fail_for.lock().unwrap().as_deref() == Some(base_url) {
			return Err(DeliveryError::Transport("connection refused".to_string()));
		}
		self.delivered.lock().unwrap().push((
			base_url.to_string(),
			asset_kind.to_string(),
			delivery.clone(),
		));
		Ok(())
	}
}

pub(crate) struct Harness {
	pub service: Arc<AuctionService>,
	pub storage: Arc<StorageService>,
	pub chain: Arc<MockChain>,
	pub simulator: Arc<MockSimulator>,
	pub delivered: Delivered,
	pub delivery_mock: Arc<MockDelivery>,
}

pub(crate) fn settings() -> AuctionSettings {
	AuctionSettings {
		settlement: Address::from([0xaau8; 20]),
		chain_id: 1,
		block_time_secs: 12,
		tie_tolerance_bps: 10,
		window_retention: Duration::from_secs(60),
		authorization_mode: AuthorizationMode::Signature,
		authorization_gas_limit: 150_000,
		direct_horizon_blocks: 15,
		known_solvers: Vec::new(),
	}
}

pub(crate) fn known_solver(tag: u8, name: &str) -> KnownSolver {
	KnownSolver {
		name: name.to_string(),
		address: Address::from([tag; 20]),
		base_url: format!("http://{}.local", name),
	}
}

pub(crate) fn harness(settings: AuctionSettings, block: Block) -> Harness {
	let storage = Arc::new(StorageService::new(Box::new(MemoryStore::new())));
	let chain = Arc::new(MockChain::new(block));
	let simulator = Arc::new(MockSimulator::new());
	let delivered: Delivered = Arc::new(Mutex::new(Vec::new()));
	let delivery_mock = Arc::new(MockDelivery {
		delivered: Arc::clone(&delivered),
		fail_for: Mutex::new(None),
	});
	let wallet = LocalWallet::new(TEST_KEY).expect("test key is valid");
	let account = Arc::new(AccountService::new(Box::new(wallet)));
	let delivery = Arc::new(DeliveryService::new(Box::new(SharedDelivery(Arc::clone(
		&delivery_mock,
	)))));
	let queue = JobQueue::new(8).with_retry_delay(Duration::from_millis(5));
	let service = AuctionService::new(
		Arc::clone(&storage),
		chain.clone() as Arc<dyn ChainInterface>,
		simulator.clone() as Arc<dyn SimulationInterface>,
		account,
		delivery,
		queue,
		settings,
	);
	Harness {
		service,
		storage,
		chain,
		simulator,
		delivered,
		delivery_mock,
	}
}

/// Lets the test keep a handle on the mock while the service owns the
/// boxed interface.
struct SharedDelivery(Arc<MockDelivery>);

#[async_trait]
impl DeliveryInterface for SharedDelivery {
	async fn deliver_authorization(
		&self,
		base_url: &str,
		asset_kind: &str,
		delivery: &AuthorizationDelivery,
	) -> Result<(), DeliveryError> {
		self.0
			.deliver_authorization(base_url, asset_kind, delivery)
			.await
	}
}

pub(crate) fn sell_intent(now: u64) -> Intent {
	Intent {
		maker: Address::from([0x11u8; 20]),
		matchmaker_authority: None,
		side: Side::Sell,
		sell_token: Address::from([0x22u8; 20]),
		buy_token: Address::from([0x33u8; 20]),
		amount: U256::from(500_000_000_000_000_000u128),
		end_amount: U256::from(300_000_000_000_000_000u128),
		start_amount_bps: 0,
		expected_amount_bps: 0,
		start_time: now.saturating_sub(10),
		end_time: now + 1_000,
		is_partially_fillable: false,
	}
}

pub(crate) fn trace_with_delta(account: Address, asset: Address, delta: I256) -> SimulationTrace {
	SimulationTrace {
		error: None,
		balance_deltas: HashMap::from([(account, HashMap::from([(asset, delta)]))]),
	}
}

pub(crate) fn ok_trace() -> SimulationTrace {
	SimulationTrace::default()
}
