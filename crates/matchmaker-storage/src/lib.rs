//! Shared ledger store for the matchmaker.
//!
//! This module provides the abstraction over the low-latency keyed store
//! the coordinator shares across its worker processes: plain get/set with
//! TTL, an atomic set-if-absent used for window locks, and score-ordered
//! collections used for auction leaderboards.

use alloy_primitives::I256;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// All operations must be safe under concurrent execution without an
/// external mutex: scored-set insertion is an append, and `set_if_absent`
/// is the single atomic read-modify-write the coordinator relies on.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes with optional time-to-live.
	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError>;

	/// Stores raw bytes only if the key does not already hold a live
	/// value. Returns whether this call performed the write.
	async fn set_if_absent(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<bool, StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Appends a member to the scored set at `key`. The TTL applies to
	/// the whole set and is fixed when the set is first created.
	async fn scored_insert(
		&self,
		key: &str,
		score: I256,
		member: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError>;

	/// Reads up to `limit` members of the scored set at `key`,
	/// best (highest) score first.
	async fn scored_top(
		&self,
		key: &str,
		limit: usize,
	) -> Result<Vec<(I256, Vec<u8>)>, StorageError>;
}

// Lets a caller keep a shared handle on a backend (for background
// maintenance tasks) while the service owns a boxed one.
#[async_trait]
impl<T: StorageInterface + ?Sized> StorageInterface for std::sync::Arc<T> {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		(**self).get_bytes(key).await
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		(**self).set_bytes(key, value, ttl).await
	}

	async fn set_if_absent(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<bool, StorageError> {
		(**self).set_if_absent(key, value, ttl).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		(**self).delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		(**self).exists(key).await
	}

	async fn scored_insert(
		&self,
		key: &str,
		score: I256,
		member: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		(**self).scored_insert(key, score, member, ttl).await
	}

	async fn scored_top(
		&self,
		key: &str,
		limit: usize,
	) -> Result<Vec<(I256, Vec<u8>)>, StorageError> {
		(**self).scored_top(key, limit).await
	}
}

/// High-level storage service that provides typed operations.
///
/// Wraps a low-level backend and adds JSON serialization plus the
/// namespaced key layout (`namespace:id`) used across the coordinator.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value with optional time-to-live.
	pub async fn store_with_ttl<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes, ttl).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Checks whether a live value exists for `namespace:id`.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.exists(&key).await
	}

	/// Writes a presence-only marker unless one is already live.
	/// Returns whether this call placed the marker.
	pub async fn acquire_marker(
		&self,
		namespace: &str,
		id: &str,
		ttl: Option<Duration>,
	) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.set_if_absent(&key, vec![1], ttl).await
	}

	/// Appends a scored entry to the leaderboard at `namespace:id`.
	pub async fn leaderboard_insert<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		score: I256,
		data: &T,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.scored_insert(&key, score, bytes, ttl).await
	}

	/// Reads the top `limit` leaderboard entries, best-first.
	pub async fn leaderboard_top<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
		limit: usize,
	) -> Result<Vec<(I256, T)>, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let raw = self.backend.scored_top(&key, limit).await?;
		raw.into_iter()
			.map(|(score, bytes)| {
				serde_json::from_slice(&bytes)
					.map(|data| (score, data))
					.map_err(|e| StorageError::Serialization(e.to_string()))
			})
			.collect()
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}
}
