//! Authorization release: lock the window, pick the winner cohort, sign
//! and fan out.

use crate::{
	AuctionError, AuctionService, DEADLINE_BLOCK_MARGIN, ONCHAIN_AUTHORIZE_ATTEMPTS,
	RELEASE_GRACE_BLOCKS, TOP_K,
};
use alloy_primitives::{I256, U256};
use futures::future::join_all;
use matchmaker_config::AuthorizationMode;
use matchmaker_queue::JobSpec;
use matchmaker_types::{Authorization, AuthorizationDelivery, Solution, WindowKey};
use std::sync::Arc;
use tracing::{info, warn};

/// Keeps the solutions whose score is within `tolerance_bps` of the best
/// score. On-chain execution order is non-deterministic, so a small
/// cohort of near-tied solvers is authorized rather than a single winner;
/// whoever lands first wins the race for real.
pub(crate) fn tie_cohort(
	entries: Vec<(I256, Solution)>,
	tolerance_bps: u64,
) -> Vec<(I256, Solution)> {
	let Some(&(best, _)) = entries.first() else {
		return entries;
	};
	let tolerance = best.unsigned_abs() * U256::from(tolerance_bps) / U256::from(10_000u64);
	let tolerance = I256::try_from(tolerance).unwrap_or(I256::MAX);
	let threshold = best.saturating_sub(tolerance);
	entries
		.into_iter()
		.filter(|(score, _)| *score >= threshold)
		.collect()
}

impl AuctionService {
	/// Fires once per window. Locks the window, reads the leaderboard,
	/// and delivers one signed authorization per cohort member.
	///
	/// Fire-and-forget fan-out: a delivery failure for one solver is
	/// logged and skipped, never aborting the remaining deliveries.
	pub async fn release(self: &Arc<Self>, key: WindowKey) -> Result<(), AuctionError> {
		if !self.windows.lock(&key).await? {
			// Another replica already released this window; scheduling
			// is deduplicated by window key, so there is nothing to do.
			info!(window = %key, "window already locked");
			return Ok(());
		}

		let latest = self.chain.latest_block().await?;
		if latest.number >= key.target_block + RELEASE_GRACE_BLOCKS {
			// Signing now would authorize against a stale block number.
			warn!(
				window = %key,
				latest_block = latest.number,
				"deadline passed, discarding release"
			);
			return Ok(());
		}

		let entries = self.windows.top_solutions(&key, TOP_K).await?;
		if entries.is_empty() {
			warn!(window = %key, "no solutions at release time");
			return Ok(());
		}

		let cohort = tie_cohort(entries, self.settings.tie_tolerance_bps);
		let block_deadline = key.target_block + DEADLINE_BLOCK_MARGIN;
		info!(
			window = %key,
			cohort = cohort.len(),
			block_deadline,
			"releasing authorizations"
		);

		let deliveries = cohort.into_iter().map(|(_, solution)| {
			let service = Arc::clone(self);
			async move {
				let authorization = Authorization {
					intent_hash: key.intent_hash,
					solver: solution.solver,
					fill_amount_to_check: solution.fill_amount,
					execute_amount_to_check: solution.execute_amount,
					block_deadline,
				};

				if service.settings.authorization_mode == AuthorizationMode::Onchain {
					service.schedule_onchain_authorization(&authorization);
				}

				let signed = match service
					.account
					.sign_authorization(authorization, &service.domain)
					.await
				{
					Ok(signed) => signed,
					Err(e) => {
						warn!(window = %key, solver = %solution.solver, error = %e, "signing failed");
						return;
					}
				};
				let delivery = AuthorizationDelivery {
					uuid: solution.uuid,
					authorization: signed,
				};
				if let Err(e) = service
					.delivery
					.deliver(&solution.base_url, &solution.asset_kind, &delivery)
					.await
				{
					warn!(
						window = %key,
						solver = %solution.solver,
						error = %e,
						"authorization delivery failed"
					);
				}
			}
		});
		join_all(deliveries).await;

		Ok(())
	}

	/// On-chain authorization variant: the coordinator issues the
	/// authorize call itself, with a generous retry budget because the
	/// call stays valid until the block deadline.
	fn schedule_onchain_authorization(self: &Arc<Self>, authorization: &Authorization) {
		let id = format!(
			"authorize:{}:{}",
			authorization.intent_hash, authorization.solver
		);
		let service = Arc::clone(self);
		let authorization = authorization.clone();
		self.queue.schedule(
			JobSpec::immediate(id, ONCHAIN_AUTHORIZE_ATTEMPTS),
			move || {
				let service = Arc::clone(&service);
				let authorization = authorization.clone();
				async move {
					service
						.chain
						.submit_authorization(&authorization)
						.await
						.map(|_| ())
						.map_err(|e| matchmaker_queue::QueueError::Failed(e.to_string()))
				}
			},
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, U256};
	use uuid::Uuid;

	fn solution(tag: u8) -> Solution {
		Solution {
			uuid: Uuid::from_bytes([tag; 16]),
			solver: Address::from([tag; 20]),
			base_url: format!("http://solver-{}.local", tag),
			asset_kind: "erc20".to_string(),
			fill_amount: U256::from(500u64),
			execute_amount: U256::from(310u64),
			txs: Vec::new(),
		}
	}

	fn scored(scores: &[i64]) -> Vec<(I256, Solution)> {
		scores
			.iter()
			.enumerate()
			.map(|(i, &s)| (I256::try_from(s).unwrap(), solution(i as u8 + 1)))
			.collect()
	}

	#[test]
	fn cohort_keeps_only_scores_within_tolerance_of_the_best() {
		// 10 bps of 1_000_000 = 1_000: threshold 999_000.
		let cohort = tie_cohort(scored(&[1_000_000, 999_950, 998_999, 900_000]), 10);
		let kept: Vec<i64> = cohort
			.iter()
			.map(|(s, _)| i64::try_from(*s).unwrap())
			.collect();
		assert_eq!(kept, vec![1_000_000, 999_950]);
	}

	#[test]
	fn cohort_includes_the_exact_threshold() {
		let cohort = tie_cohort(scored(&[1_000_000, 999_000]), 10);
		assert_eq!(cohort.len(), 2);
	}

	#[test]
	fn cohort_handles_buy_side_negative_scores() {
		// Best is -305_000; 200 bps of its magnitude = 6_100, so the
		// threshold is -311_100 and both qualify.
		let cohort = tie_cohort(scored(&[-305_000, -310_000]), 200);
		assert_eq!(cohort.len(), 2);

		// With a tight tolerance only the best survives.
		let cohort = tie_cohort(scored(&[-305_000, -310_000]), 10);
		assert_eq!(cohort.len(), 1);
	}

	#[test]
	fn cohort_of_one_is_the_best_alone() {
		let cohort = tie_cohort(scored(&[1_000]), 10);
		assert_eq!(cohort.len(), 1);
	}

	#[test]
	fn empty_leaderboard_gives_an_empty_cohort() {
		assert!(tie_cohort(Vec::new(), 10).is_empty());
	}
}
