//! Durable work queue for the matchmaker.
//!
//! An at-least-once delayed/immediate job dispatcher with bounded worker
//! concurrency and a per-job attempt budget. Scheduling is idempotent:
//! a job id names the unit of work (e.g. an auction window key), and a
//! second schedule call for a live id is a no-op. This is what lets two
//! concurrent solution submissions schedule exactly one release job.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum QueueError {
	/// The job ran and failed; the queue retries it until the attempt
	/// budget is exhausted.
	#[error("job failed: {0}")]
	Failed(String),
}

/// Scheduling parameters for one job.
#[derive(Debug, Clone)]
pub struct JobSpec {
	/// Deduplication identity. One live job per id.
	pub id: String,
	/// Delay before the first attempt.
	pub delay: Duration,
	/// Total attempt budget. `1` means no retry; release jobs use that
	/// because a late retry would sign against a stale block number.
	pub attempts: u32,
}

impl JobSpec {
	pub fn new(id: impl Into<String>, delay: Duration, attempts: u32) -> Self {
		Self {
			id: id.into(),
			delay,
			attempts: attempts.max(1),
		}
	}

	pub fn immediate(id: impl Into<String>, attempts: u32) -> Self {
		Self::new(id, Duration::ZERO, attempts)
	}
}

/// Bounded-concurrency job dispatcher.
#[derive(Clone)]
pub struct JobQueue {
	live: Arc<DashMap<String, ()>>,
	permits: Arc<Semaphore>,
	retry_delay: Duration,
}

impl JobQueue {
	pub fn new(concurrency: usize) -> Self {
		Self {
			live: Arc::new(DashMap::new()),
			permits: Arc::new(Semaphore::new(concurrency.max(1))),
			retry_delay: DEFAULT_RETRY_DELAY,
		}
	}

	pub fn with_retry_delay(mut self, delay: Duration) -> Self {
		self.retry_delay = delay;
		self
	}

	/// Schedules a job unless one with the same id is already live.
	/// Returns whether this call scheduled it.
	///
	/// `run` is invoked once per attempt; each attempt holds one worker
	/// permit for its whole duration.
	pub fn schedule<F, Fut>(&self, spec: JobSpec, run: F) -> bool
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), QueueError>> + Send + 'static,
	{
		use dashmap::mapref::entry::Entry;
		match self.live.entry(spec.id.clone()) {
			Entry::Occupied(_) => {
				debug!(job_id = %spec.id, "job already scheduled, skipping");
				return false;
			}
			Entry::Vacant(slot) => {
				slot.insert(());
			}
		}

		let live = Arc::clone(&self.live);
		let permits = Arc::clone(&self.permits);
		let retry_delay = self.retry_delay;
		tokio::spawn(async move {
			if !spec.delay.is_zero() {
				tokio::time::sleep(spec.delay).await;
			}
			for attempt in 1..=spec.attempts {
				let Ok(_permit) = Arc::clone(&permits).acquire_owned().await else {
					break;
				};
				match run().await {
					Ok(()) => {
						debug!(job_id = %spec.id, attempt, "job completed");
						break;
					}
					Err(e) if attempt < spec.attempts => {
						warn!(job_id = %spec.id, attempt, error = %e, "job failed, retrying");
						tokio::time::sleep(retry_delay).await;
					}
					Err(e) => {
						error!(
							job_id = %spec.id,
							attempts = spec.attempts,
							error = %e,
							"job failed, attempt budget exhausted"
						);
					}
				}
			}
			live.remove(&spec.id);
		});
		true
	}

	/// Whether a job with this id is currently pending or running.
	pub fn is_scheduled(&self, id: &str) -> bool {
		self.live.contains_key(id)
	}
}
