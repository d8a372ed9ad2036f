//! Outbound authorization delivery.
//!
//! Once the coordinator has signed an authorization, it is pushed to the
//! winning solver's callback endpoint. A delivery failure only ever
//! affects its own recipient; fan-out across a winner cohort is the
//! caller's concern (gather-all, no short-circuit).

use async_trait::async_trait;
use matchmaker_types::AuthorizationDelivery;
use thiserror::Error;

pub mod implementations {
	pub mod http;
}

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Transport error: {0}")]
	Transport(String),
	#[error("Recipient returned {0}")]
	Rejected(u16),
}

#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Posts the signed authorization to
	/// `{base_url}/{asset_kind}/authorizations`.
	async fn deliver_authorization(
		&self,
		base_url: &str,
		asset_kind: &str,
		delivery: &AuthorizationDelivery,
	) -> Result<(), DeliveryError>;
}

pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
}

impl DeliveryService {
	pub fn new(provider: Box<dyn DeliveryInterface>) -> Self {
		Self { provider }
	}

	pub async fn deliver(
		&self,
		base_url: &str,
		asset_kind: &str,
		delivery: &AuthorizationDelivery,
	) -> Result<(), DeliveryError> {
		self.provider
			.deliver_authorization(base_url, asset_kind, delivery)
			.await
	}
}
