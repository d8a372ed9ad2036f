//! HTTP ingress request and response bodies.

use crate::intent::Intent;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /{assetKind}/solutions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
	pub uuid: Uuid,
	/// Solver's callback endpoint base URL.
	pub base_url: String,
	pub solver: Address,
	pub intent: Intent,
	pub fill_amount: U256,
	/// Raw transactions that perform the fill.
	pub txs: Vec<Bytes>,
}

/// Body of `POST /{assetKind}/intents/private` and `/public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
	pub intent: Intent,
	/// For the private route: which known solver to authorize. Defaults
	/// to the first configured solver when omitted.
	pub solver: Option<String>,
}

/// Uniform success/error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ApiResponse {
	pub fn success() -> Self {
		Self {
			message: Some("Success".to_string()),
			error: None,
		}
	}

	pub fn error(reason: impl Into<String>) -> Self {
		Self {
			message: None,
			error: Some(reason.into()),
		}
	}
}
