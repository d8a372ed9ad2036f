//! Signing for the matchmaker.
//!
//! The coordinator process exclusively owns the key that signs
//! authorizations; everything that needs a signature goes through the
//! `AccountService` here.

use alloy_primitives::{Address, B256};
use alloy_sol_types::Eip712Domain;
use async_trait::async_trait;
use matchmaker_types::{Authorization, SignedAuthorization};
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// The coordinator address derived from the signing key.
	fn address(&self) -> Address;

	/// Signs a 32-byte digest, returning the 65-byte r||s||v signature.
	async fn sign_hash(&self, hash: &B256) -> Result<Vec<u8>, AccountError>;
}

pub struct AccountService {
	provider: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self { provider }
	}

	pub fn address(&self) -> Address {
		self.provider.address()
	}

	/// Signs an authorization over its EIP-712 typed-data hash.
	pub async fn sign_authorization(
		&self,
		authorization: Authorization,
		domain: &Eip712Domain,
	) -> Result<SignedAuthorization, AccountError> {
		let hash = authorization.signing_hash(domain);
		let signature = self.provider.sign_hash(&hash).await?;
		Ok(SignedAuthorization {
			authorization,
			signature: hex::encode(signature),
		})
	}
}
