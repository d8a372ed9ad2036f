use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matchmaker_account::{implementations::local::LocalWallet, AccountService};
use matchmaker_auction::{AuctionService, AuctionSettings};
use matchmaker_chain::implementations::{http_sim::HttpSimulator, rpc::RpcChain};
use matchmaker_chain::{ChainInterface, SimulationInterface};
use matchmaker_config::MatchmakerConfig;
use matchmaker_delivery::{implementations::http::HttpDelivery, DeliveryService};
use matchmaker_queue::JobQueue;
use matchmaker_storage::{implementations::memory::MemoryStore, StorageService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;

/// Sweep interval for the in-memory store's TTL reaper.
const REAPER_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "matchmaker")]
#[command(about = "Intent auction coordinator", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, env = "MATCHMAKER_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the matchmaker service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli),
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting matchmaker service");
	info!("Loading configuration from: {:?}", cli.config);

	let config = MatchmakerConfig::load(&cli.config).context("Failed to load configuration")?;

	let service = build_service(&config).context("Failed to build auction service")?;
	info!(coordinator = %service.coordinator(), "Auction service ready");

	let bind_address = format!("{}:{}", config.server.host, config.server.port);
	let listener = tokio::net::TcpListener::bind(&bind_address)
		.await
		.with_context(|| format!("Failed to bind {}", bind_address))?;
	info!("API server listening on {}", bind_address);

	axum::serve(listener, api::router(service))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("API server failed")?;

	info!("Matchmaker service stopped");
	Ok(())
}

fn build_service(config: &MatchmakerConfig) -> Result<Arc<AuctionService>> {
	let store = Arc::new(MemoryStore::new());
	store.spawn_reaper(REAPER_INTERVAL);
	let storage = Arc::new(StorageService::new(Box::new(Arc::clone(&store))));

	let wallet =
		LocalWallet::new(&config.signer.private_key).context("Failed to load signing key")?;
	let account = Arc::new(AccountService::new(Box::new(wallet)));
	let coordinator = account.address();

	let chain = Arc::new(
		RpcChain::new(
			config.chain.rpc_url.clone(),
			config.chain.settlement_address,
			coordinator,
		)
		.context("Failed to create chain client")?,
	) as Arc<dyn ChainInterface>;
	let simulator = Arc::new(
		HttpSimulator::new(config.simulation.url.clone())
			.context("Failed to create simulation client")?,
	) as Arc<dyn SimulationInterface>;
	let delivery = Arc::new(DeliveryService::new(Box::new(
		HttpDelivery::new().context("Failed to create delivery client")?,
	)));
	let queue = JobQueue::new(config.auction.queue_concurrency);

	Ok(AuctionService::new(
		storage,
		chain,
		simulator,
		account,
		delivery,
		queue,
		AuctionSettings::from_config(config),
	))
}

fn validate_config(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = MatchmakerConfig::load(&cli.config).context("Failed to load configuration")?;

	info!("Configuration is valid");
	info!("Chain id: {}", config.chain.chain_id);
	info!("Settlement contract: {}", config.chain.settlement_address);
	info!("Authorization mode: {:?}", config.auction.authorization_mode);
	for solver in &config.known_solvers {
		info!("  Known solver: {} ({})", solver.name, solver.address);
	}

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
