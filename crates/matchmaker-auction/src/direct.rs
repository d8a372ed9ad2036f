//! Direct-submission path: no auction, no tie-break.
//!
//! For intents that name this coordinator as their sole authority, a
//! pre-approved solver (or a fixed known list) is authorized immediately
//! at a short block horizon, without ever touching a leaderboard.

use crate::{now_secs, AuctionError, AuctionService, RejectionReason, DIRECT_DELIVERY_ATTEMPTS};
use matchmaker_config::KnownSolver;
use matchmaker_queue::JobSpec;
use matchmaker_types::{Authorization, AuthorizationDelivery, IntentRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Which ingress route an intent arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectRoute {
	/// Exactly one known solver is authorized.
	Private,
	/// Every known solver is authorized.
	Public,
}

impl AuctionService {
	/// Handles an inbound "new intent" notification for the direct path.
	pub async fn submit_intent(
		self: &Arc<Self>,
		asset_kind: &str,
		request: IntentRequest,
		route: DirectRoute,
	) -> Result<(), AuctionError> {
		let now = now_secs();
		let intent = &request.intent;

		if !intent.has_started(now) {
			return Err(AuctionError::Rejected(RejectionReason::NotStarted));
		}
		if intent.is_expired(now) {
			return Err(AuctionError::Rejected(RejectionReason::Expired));
		}
		if intent.matchmaker_authority != Some(self.coordinator) {
			return Err(AuctionError::Rejected(RejectionReason::UnsupportedAuthority));
		}

		let intent_hash = intent.hash();
		if self.chain.is_intent_filled(intent_hash).await? {
			return Err(AuctionError::Rejected(RejectionReason::AlreadyFilled));
		}

		let recipients = self.direct_recipients(&request, route)?;

		let latest = self.chain.latest_block().await?;
		let horizon_blocks = self.settings.direct_horizon_blocks;
		let horizon_secs = horizon_blocks * self.settings.block_time_secs;
		let execute_amount = intent
			.required_amount_at(now + horizon_secs)
			.ok_or(AuctionError::Rejected(RejectionReason::AmountOverflow))?;
		let block_deadline = latest.number + horizon_blocks;

		for solver in recipients {
			let authorization = Authorization {
				intent_hash,
				solver: solver.address,
				fill_amount_to_check: intent.amount,
				execute_amount_to_check: execute_amount,
				block_deadline,
			};
			let signed = self
				.account
				.sign_authorization(authorization, &self.domain)
				.await?;
			let delivery = AuthorizationDelivery {
				uuid: Uuid::new_v4(),
				authorization: signed,
			};

			info!(
				%intent_hash,
				solver = %solver.name,
				block_deadline,
				"authorizing known solver directly"
			);
			let service = Arc::clone(self);
			let base_url = solver.base_url.clone();
			let asset_kind = asset_kind.to_string();
			self.queue.schedule(
				JobSpec::immediate(
					format!("direct:{}:{}", intent_hash, solver.name),
					DIRECT_DELIVERY_ATTEMPTS,
				),
				move || {
					let service = Arc::clone(&service);
					let base_url = base_url.clone();
					let asset_kind = asset_kind.clone();
					let delivery = delivery.clone();
					async move {
						service
							.delivery
							.deliver(&base_url, &asset_kind, &delivery)
							.await
							.map_err(|e| matchmaker_queue::QueueError::Failed(e.to_string()))
					}
				},
			);
		}

		Ok(())
	}

	fn direct_recipients(
		&self,
		request: &IntentRequest,
		route: DirectRoute,
	) -> Result<Vec<KnownSolver>, AuctionError> {
		let known = &self.settings.known_solvers;
		let recipients = match route {
			DirectRoute::Public => known.clone(),
			DirectRoute::Private => {
				let chosen = match &request.solver {
					Some(name) => known.iter().find(|s| &s.name == name),
					None => known.first(),
				};
				chosen.cloned().into_iter().collect()
			}
		};
		if recipients.is_empty() {
			return Err(AuctionError::Rejected(RejectionReason::UnknownSolver));
		}
		Ok(recipients)
	}
}
