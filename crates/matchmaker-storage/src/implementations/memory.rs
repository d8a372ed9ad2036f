//! In-memory storage backend.
//!
//! Backs the shared ledger store with process-local maps plus an active
//! reaper task, so TTL-driven expiry behaves the same as with an external
//! store. Expiry is also checked lazily on every read, which keeps the
//! semantics correct even when the reaper has not swept yet.

use crate::{StorageError, StorageInterface};
use alloy_primitives::I256;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::trace;

struct Entry {
	value: Vec<u8>,
	expires_at: Option<Instant>,
}

impl Entry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}
}

struct ScoredSet {
	members: BTreeSet<(I256, Vec<u8>)>,
	expires_at: Option<Instant>,
}

impl ScoredSet {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}
}

/// Process-local storage backend with TTL support.
pub struct MemoryStore {
	entries: RwLock<HashMap<String, Entry>>,
	sets: RwLock<HashMap<String, ScoredSet>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
			sets: RwLock::new(HashMap::new()),
		}
	}

	/// Starts the background task that evicts expired keys.
	pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
		let store = Arc::clone(self);
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			loop {
				ticker.tick().await;
				store.sweep().await;
			}
		})
	}

	async fn sweep(&self) {
		let now = Instant::now();
		let mut entries = self.entries.write().await;
		let before = entries.len();
		entries.retain(|_, entry| !entry.is_expired(now));
		let swept = before - entries.len();
		drop(entries);

		let mut sets = self.sets.write().await;
		let before = sets.len();
		sets.retain(|_, set| !set.is_expired(now));
		let swept = swept + before - sets.len();
		if swept > 0 {
			trace!(swept, "evicted expired keys");
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStore {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let entries = self.entries.read().await;
		match entries.get(key) {
			Some(entry) if !entry.is_expired(Instant::now()) => Ok(entry.value.clone()),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let mut entries = self.entries.write().await;
		entries.insert(
			key.to_string(),
			Entry {
				value,
				expires_at: ttl.map(|ttl| Instant::now() + ttl),
			},
		);
		Ok(())
	}

	async fn set_if_absent(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<bool, StorageError> {
		let now = Instant::now();
		let mut entries = self.entries.write().await;
		if let Some(existing) = entries.get(key) {
			if !existing.is_expired(now) {
				return Ok(false);
			}
		}
		entries.insert(
			key.to_string(),
			Entry {
				value,
				expires_at: ttl.map(|ttl| now + ttl),
			},
		);
		Ok(true)
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.entries.write().await.remove(key);
		self.sets.write().await.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let entries = self.entries.read().await;
		Ok(entries
			.get(key)
			.is_some_and(|entry| !entry.is_expired(Instant::now())))
	}

	async fn scored_insert(
		&self,
		key: &str,
		score: I256,
		member: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let now = Instant::now();
		let mut sets = self.sets.write().await;
		let set = sets.entry(key.to_string()).or_insert_with(|| ScoredSet {
			members: BTreeSet::new(),
			// Retention is fixed when the window is first written.
			expires_at: ttl.map(|ttl| now + ttl),
		});
		if set.is_expired(now) {
			set.members.clear();
			set.expires_at = ttl.map(|ttl| now + ttl);
		}
		set.members.insert((score, member));
		Ok(())
	}

	async fn scored_top(
		&self,
		key: &str,
		limit: usize,
	) -> Result<Vec<(I256, Vec<u8>)>, StorageError> {
		let sets = self.sets.read().await;
		match sets.get(key) {
			Some(set) if !set.is_expired(Instant::now()) => Ok(set
				.members
				.iter()
				.rev()
				.take(limit)
				.cloned()
				.collect()),
			_ => Ok(Vec::new()),
		}
	}
}
