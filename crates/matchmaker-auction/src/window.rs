//! Auction window state and locking discipline.
//!
//! A window moves `OPEN -> LOCKED` exactly once, through an atomic
//! marker write, and is never reopened. There is no persisted CLOSED
//! state: retention TTL evicts old windows wholesale.

use alloy_primitives::I256;
use matchmaker_storage::{StorageError, StorageService};
use matchmaker_types::{Solution, WindowKey};
use std::sync::Arc;
use std::time::Duration;

/// Storage namespace for window state. Leaderboards live at
/// `matchmaker:solutions:{intentHash}:{targetBlock}`, the lock marker at
/// the same key suffixed `:locked`.
const NAMESPACE: &str = "matchmaker:solutions";

pub(crate) struct Windows {
	storage: Arc<StorageService>,
	retention: Duration,
}

impl Windows {
	pub fn new(storage: Arc<StorageService>, retention: Duration) -> Self {
		Self { storage, retention }
	}

	fn lock_id(key: &WindowKey) -> String {
		format!("{}:locked", key)
	}

	/// Whether the submission period for this window is over. Intake
	/// treats a present marker as an immediate rejection, never as a
	/// retryable condition.
	pub async fn is_locked(&self, key: &WindowKey) -> Result<bool, StorageError> {
		self.storage.exists(NAMESPACE, &Self::lock_id(key)).await
	}

	/// Performs the `OPEN -> LOCKED` transition. Returns whether this
	/// call was the one that locked the window.
	pub async fn lock(&self, key: &WindowKey) -> Result<bool, StorageError> {
		self.storage
			.acquire_marker(NAMESPACE, &Self::lock_id(key), Some(self.retention))
			.await
	}

	/// Appends a scored solution to the window's leaderboard.
	pub async fn insert_solution(
		&self,
		key: &WindowKey,
		score: I256,
		solution: &Solution,
	) -> Result<(), StorageError> {
		self.storage
			.leaderboard_insert(
				NAMESPACE,
				&key.to_string(),
				score,
				solution,
				Some(self.retention),
			)
			.await
	}

	/// Reads up to `limit` solutions, best score first.
	pub async fn top_solutions(
		&self,
		key: &WindowKey,
		limit: usize,
	) -> Result<Vec<(I256, Solution)>, StorageError> {
		self.storage
			.leaderboard_top(NAMESPACE, &key.to_string(), limit)
			.await
	}
}
