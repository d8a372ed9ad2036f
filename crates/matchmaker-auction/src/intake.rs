//! Solution intake: validate, simulate, score, enqueue.

use crate::{
	now_secs, AuctionError, AuctionService, RejectionReason, DEADLINE_BLOCK_MARGIN,
	MIN_BLOCK_LEAD_SECS, RELEASE_ATTEMPTS,
};
use alloy_primitives::{Address, I256, U256};
use matchmaker_chain::{encode_authorize_call, Block, SimTransaction};
use matchmaker_config::AuthorizationMode;
use matchmaker_queue::JobSpec;
use matchmaker_types::{Authorization, Side, Solution, SubmissionRequest, WindowKey};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The target block a fresh solution is scored against, and that block's
/// expected timestamp.
///
/// Normally `latest + 1`; bumped to `latest + 2` when fewer than
/// `MIN_BLOCK_LEAD_SECS` remain until the next block, so every accepted
/// solution has a realistic chance of landing in the block it was scored
/// against.
pub(crate) fn compute_target_block(latest: &Block, now: u64, block_time_secs: u64) -> (u64, u64) {
	let next_timestamp = latest.timestamp + block_time_secs;
	if next_timestamp.saturating_sub(now) < MIN_BLOCK_LEAD_SECS {
		(latest.number + 2, next_timestamp + block_time_secs)
	} else {
		(latest.number + 1, next_timestamp)
	}
}

/// Leaderboard score for a realized counter-amount.
///
/// Sign convention: for a buy intent a smaller amount pulled from the
/// maker is better, so the amount is negated; higher score is then
/// uniformly better for both sides.
pub(crate) fn score_for(side: Side, execute_amount: U256) -> Result<I256, AuctionError> {
	let magnitude = I256::try_from(execute_amount)
		.map_err(|_| AuctionError::Internal("execute amount exceeds score range".to_string()))?;
	Ok(match side {
		Side::Sell => magnitude,
		Side::Buy => -magnitude,
	})
}

impl AuctionService {
	/// Validates and scores an incoming candidate fill, inserts it into
	/// the current window's leaderboard, and (for the first accepted
	/// solution of the window) schedules the release job.
	pub async fn submit(
		self: &Arc<Self>,
		asset_kind: &str,
		request: SubmissionRequest,
	) -> Result<(), AuctionError> {
		let now = now_secs();
		let intent = &request.intent;

		if !intent.has_started(now) {
			return Err(AuctionError::Rejected(RejectionReason::NotStarted));
		}
		if intent.is_expired(now) {
			return Err(AuctionError::Rejected(RejectionReason::Expired));
		}

		let intent_hash = intent.hash();
		if self.chain.is_intent_filled(intent_hash).await? {
			return Err(AuctionError::Rejected(RejectionReason::AlreadyFilled));
		}

		let latest = self.chain.latest_block().await?;
		let (target_block, target_timestamp) =
			compute_target_block(&latest, now, self.settings.block_time_secs);
		let key = WindowKey::new(intent_hash, target_block);

		if self.windows.is_locked(&key).await? {
			return Err(AuctionError::Rejected(RejectionReason::AuctionLocked));
		}

		let execute_check = intent
			.required_amount_at(now)
			.ok_or(AuctionError::Rejected(RejectionReason::AmountOverflow))?;

		// Hypothetical bundle: a synthetic authorize call covering the
		// intent's full amount, then the solver's raw transactions. The
		// simulation then behaves as if this solver had already won.
		let synthetic = Authorization {
			intent_hash,
			solver: request.solver,
			fill_amount_to_check: intent.amount,
			execute_amount_to_check: execute_check,
			block_deadline: target_block + DEADLINE_BLOCK_MARGIN,
		};
		let mut bundle = vec![SimTransaction::Call {
			from: self.coordinator,
			to: self.settings.settlement,
			data: encode_authorize_call(&synthetic),
			value: U256::ZERO,
		}];
		bundle.extend(
			request
				.txs
				.iter()
				.cloned()
				.map(|data| SimTransaction::Raw { data }),
		);

		let traces = self.simulator.simulate_bundle(&bundle).await?;
		let trailing = traces
			.last()
			.ok_or_else(|| AuctionError::Internal("simulation returned no traces".to_string()))?;
		if let Some(error) = &trailing.error {
			debug!(%intent_hash, error, "solution reverted in simulation");
			return Err(AuctionError::Rejected(RejectionReason::SolutionReverted));
		}

		// The maker's realized counter-amount decides the score.
		let execute_amount = match intent.side {
			Side::Sell => {
				let delta = trailing.delta(intent.maker, intent.buy_token);
				if delta <= I256::ZERO {
					return Err(AuctionError::Rejected(RejectionReason::NoMakerDelta));
				}
				delta.unsigned_abs()
			}
			Side::Buy => {
				let delta = trailing.delta(intent.maker, intent.sell_token);
				if delta >= I256::ZERO {
					return Err(AuctionError::Rejected(RejectionReason::NoMakerDelta));
				}
				delta.unsigned_abs()
			}
		};

		if self.settings.authorization_mode == AuthorizationMode::Onchain {
			// The coordinator pays for its own authorize call; it only
			// accepts solutions that reimburse that gas.
			let authorize_trace = traces.first().ok_or_else(|| {
				AuctionError::Internal("simulation returned no traces".to_string())
			})?;
			let reward = authorize_trace.delta(self.coordinator, Address::ZERO);
			let cost = latest.base_fee * U256::from(self.settings.authorization_gas_limit);
			let cost = I256::try_from(cost)
				.map_err(|_| AuctionError::Internal("gas cost exceeds range".to_string()))?;
			if reward < cost {
				return Err(AuctionError::Rejected(RejectionReason::NotProfitable));
			}
		}

		let score = score_for(intent.side, execute_amount)?;
		let solution = Solution {
			uuid: request.uuid,
			solver: request.solver,
			base_url: request.base_url,
			asset_kind: asset_kind.to_string(),
			fill_amount: request.fill_amount,
			execute_amount,
			txs: request.txs,
		};

		// Simulation can outlast the submission period; a lock placed
		// meanwhile must still turn this solution away, or it would land
		// on a leaderboard release has already read.
		if self.windows.is_locked(&key).await? {
			return Err(AuctionError::Rejected(RejectionReason::AuctionLocked));
		}
		self.windows.insert_solution(&key, score, &solution).await?;

		// One delayed release job per window; the window key is the
		// job's deduplication identity, so a second solution never
		// double-schedules it.
		let delay = Duration::from_secs(target_timestamp.saturating_sub(now));
		let service = Arc::clone(self);
		let scheduled = self.queue.schedule(
			JobSpec::new(format!("release:{}", key), delay, RELEASE_ATTEMPTS),
			move || {
				let service = Arc::clone(&service);
				async move {
					service
						.release(key)
						.await
						.map_err(|e| matchmaker_queue::QueueError::Failed(e.to_string()))
				}
			},
		);

		info!(
			%intent_hash,
			target_block,
			solver = %solution.solver,
			execute_amount = %solution.execute_amount,
			scheduled_release = scheduled,
			"solution accepted"
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn block(number: u64, timestamp: u64) -> Block {
		Block {
			number,
			timestamp,
			base_fee: U256::from(1_000_000_000u64),
		}
	}

	#[test]
	fn target_is_next_block_with_enough_lead() {
		// Next block expected at t=112, now=100: 12s of lead.
		let (number, timestamp) = compute_target_block(&block(50, 100), 100, 12);
		assert_eq!(number, 51);
		assert_eq!(timestamp, 112);
	}

	#[test]
	fn target_bumps_when_the_next_block_is_too_close() {
		// Next block expected at t=112, now=108: only 4s left.
		let (number, timestamp) = compute_target_block(&block(50, 100), 108, 12);
		assert_eq!(number, 52);
		assert_eq!(timestamp, 124);
	}

	#[test]
	fn target_bumps_when_the_next_block_is_overdue() {
		let (number, _) = compute_target_block(&block(50, 100), 130, 12);
		assert_eq!(number, 52);
	}

	#[test]
	fn buy_scores_are_negated() {
		let sell = score_for(Side::Sell, U256::from(310u64)).unwrap();
		let buy = score_for(Side::Buy, U256::from(310u64)).unwrap();
		assert_eq!(sell, I256::try_from(310i64).unwrap());
		assert_eq!(buy, I256::try_from(-310i64).unwrap());
		// Paying less scores higher.
		assert!(score_for(Side::Buy, U256::from(305u64)).unwrap() > buy);
	}
}
