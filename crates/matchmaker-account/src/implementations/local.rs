//! Local private-key wallet.
//!
//! Manages the coordinator key in-process using Alloy's signer. Suitable
//! for single-operator deployments; a remote signer would implement the
//! same `AccountInterface`.

use crate::{AccountError, AccountInterface};
use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key, with or without
	/// the 0x prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: &B256) -> Result<Vec<u8>, AccountError> {
		let signature = self
			.signer
			.sign_hash(hash)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign hash: {}", e)))?;
		Ok(signature.as_bytes().to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::AccountService;
	use alloy_primitives::U256;
	use matchmaker_types::{authorization::authorization_domain, Authorization};

	const TEST_KEY: &str = "0x0123456789012345678901234567890123456789012345678901234567890123";

	#[test]
	fn rejects_malformed_keys() {
		assert!(LocalWallet::new("not a key").is_err());
		assert!(LocalWallet::new("0x1234").is_err());
	}

	#[tokio::test]
	async fn signs_an_authorization() {
		let wallet = LocalWallet::new(TEST_KEY).unwrap();
		let account = AccountService::new(Box::new(wallet));
		let domain = authorization_domain(1, Address::from([8u8; 20]));
		let authorization = Authorization {
			intent_hash: B256::from([9u8; 32]),
			solver: Address::from([4u8; 20]),
			fill_amount_to_check: U256::from(500u64),
			execute_amount_to_check: U256::from(310u64),
			block_deadline: 105,
		};
		let signed = account
			.sign_authorization(authorization.clone(), &domain)
			.await
			.unwrap();
		assert_eq!(signed.authorization, authorization);
		// 65 bytes, hex-encoded.
		assert_eq!(signed.signature.len(), 130);
	}
}
