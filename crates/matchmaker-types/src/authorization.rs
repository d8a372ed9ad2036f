//! Coordinator-signed, deadline-bounded settlement permissions.

use crate::common::{BlockNumber, IntentHash};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

sol! {
	/// EIP-712 schema the settlement contract verifies. Forging a
	/// signature over it requires the coordinator's private key.
	struct AuthorizationData {
		bytes32 intentHash;
		address solver;
		uint256 fillAmountToCheck;
		uint256 executeAmountToCheck;
		uint256 blockDeadline;
	}
}

/// A time-boxed permission letting one solver settle one intent for a
/// specific amount. Consumed at most once by the settlement contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
	pub intent_hash: IntentHash,
	pub solver: Address,
	pub fill_amount_to_check: U256,
	pub execute_amount_to_check: U256,
	pub block_deadline: BlockNumber,
}

impl Authorization {
	/// The EIP-712 signing hash under the coordinator's domain.
	pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
		AuthorizationData {
			intentHash: self.intent_hash,
			solver: self.solver,
			fillAmountToCheck: self.fill_amount_to_check,
			executeAmountToCheck: self.execute_amount_to_check,
			blockDeadline: U256::from(self.block_deadline),
		}
		.eip712_signing_hash(domain)
	}
}

/// The signing domain for authorizations issued by this coordinator.
pub fn authorization_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
	Eip712Domain::new(
		Some("Matchmaker".into()),
		Some("1".into()),
		Some(U256::from(chain_id)),
		Some(verifying_contract),
		None,
	)
}

/// An authorization together with the coordinator's signature over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAuthorization {
	#[serde(flatten)]
	pub authorization: Authorization,
	/// 65-byte ECDSA signature, hex-encoded.
	pub signature: String,
}

/// Callback body posted to a solver's `/{assetKind}/authorizations`
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDelivery {
	pub uuid: Uuid,
	pub authorization: SignedAuthorization,
}
