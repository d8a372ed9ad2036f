//! HTTP callback delivery.

use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use matchmaker_types::AuthorizationDelivery;
use std::time::Duration;
use tracing::debug;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpDelivery {
	client: reqwest::Client,
}

impl HttpDelivery {
	pub fn new() -> Result<Self, DeliveryError> {
		let client = reqwest::Client::builder()
			.timeout(DELIVERY_TIMEOUT)
			.build()
			.map_err(|e| DeliveryError::Transport(e.to_string()))?;
		Ok(Self { client })
	}
}

#[async_trait]
impl DeliveryInterface for HttpDelivery {
	async fn deliver_authorization(
		&self,
		base_url: &str,
		asset_kind: &str,
		delivery: &AuthorizationDelivery,
	) -> Result<(), DeliveryError> {
		let url = format!(
			"{}/{}/authorizations",
			base_url.trim_end_matches('/'),
			asset_kind
		);
		debug!(%url, uuid = %delivery.uuid, "delivering authorization");
		let response = self
			.client
			.post(&url)
			.json(delivery)
			.send()
			.await
			.map_err(|e| DeliveryError::Transport(e.to_string()))?;
		if !response.status().is_success() {
			return Err(DeliveryError::Rejected(response.status().as_u16()));
		}
		Ok(())
	}
}
