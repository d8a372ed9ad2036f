//! Raw JSON-RPC settlement-chain client.

use crate::{
	encode_authorize_call, intentFilledCall, Block, ChainError, ChainInterface,
};
use alloy_primitives::{hex, Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use matchmaker_types::{Authorization, IntentHash};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RpcChain {
	client: reqwest::Client,
	url: String,
	settlement: Address,
	/// Sender for on-chain authorize calls (`eth_sendTransaction`);
	/// the node or relayer behind the endpoint holds this account.
	coordinator: Address,
}

#[derive(Deserialize)]
struct RpcResponse {
	result: Option<Value>,
	error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

impl RpcChain {
	pub fn new(url: String, settlement: Address, coordinator: Address) -> Result<Self, ChainError> {
		let client = reqwest::Client::builder()
			.timeout(RPC_TIMEOUT)
			.build()
			.map_err(|e| ChainError::Transport(e.to_string()))?;
		Ok(Self {
			client,
			url,
			settlement,
			coordinator,
		})
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});
		debug!(method, "rpc request");
		let response: RpcResponse = self
			.client
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.map_err(|e| ChainError::Transport(e.to_string()))?
			.json()
			.await
			.map_err(|e| ChainError::Transport(e.to_string()))?;
		if let Some(error) = response.error {
			return Err(ChainError::Rpc(format!(
				"{} ({})",
				error.message, error.code
			)));
		}
		response
			.result
			.ok_or_else(|| ChainError::Rpc("missing result".to_string()))
	}
}

fn hex_u64(value: &Value, field: &str) -> Result<u64, ChainError> {
	let raw = value
		.get(field)
		.and_then(Value::as_str)
		.ok_or_else(|| ChainError::Decode(format!("missing field {}", field)))?;
	u64::from_str_radix(raw.trim_start_matches("0x"), 16)
		.map_err(|e| ChainError::Decode(format!("bad {}: {}", field, e)))
}

fn hex_u256(value: &Value, field: &str) -> Result<U256, ChainError> {
	let raw = value
		.get(field)
		.and_then(Value::as_str)
		.ok_or_else(|| ChainError::Decode(format!("missing field {}", field)))?;
	U256::from_str_radix(raw.trim_start_matches("0x"), 16)
		.map_err(|e| ChainError::Decode(format!("bad {}: {}", field, e)))
}

#[async_trait]
impl ChainInterface for RpcChain {
	async fn latest_block(&self) -> Result<Block, ChainError> {
		let block = self
			.call("eth_getBlockByNumber", json!(["latest", false]))
			.await?;
		Ok(Block {
			number: hex_u64(&block, "number")?,
			timestamp: hex_u64(&block, "timestamp")?,
			base_fee: hex_u256(&block, "baseFeePerGas").unwrap_or(U256::ZERO),
		})
	}

	async fn is_intent_filled(&self, intent_hash: IntentHash) -> Result<bool, ChainError> {
		let data = intentFilledCall { intentHash: intent_hash }.abi_encode();
		let result = self
			.call(
				"eth_call",
				json!([
					{
						"to": self.settlement,
						"data": format!("0x{}", hex::encode(&data)),
					},
					"latest"
				]),
			)
			.await?;
		let raw = result
			.as_str()
			.ok_or_else(|| ChainError::Decode("eth_call result is not a string".to_string()))?;
		let bytes = hex::decode(raw.trim_start_matches("0x"))
			.map_err(|e| ChainError::Decode(e.to_string()))?;
		let decoded = intentFilledCall::abi_decode_returns(&bytes, true)
			.map_err(|e| ChainError::Decode(e.to_string()))?;
		Ok(decoded._0)
	}

	async fn submit_authorization(
		&self,
		authorization: &Authorization,
	) -> Result<B256, ChainError> {
		let data = encode_authorize_call(authorization);
		let result = self
			.call(
				"eth_sendTransaction",
				json!([{
					"from": self.coordinator,
					"to": self.settlement,
					"data": format!("0x{}", hex::encode(&data)),
				}]),
			)
			.await?;
		let raw = result
			.as_str()
			.ok_or_else(|| ChainError::Decode("tx hash is not a string".to_string()))?;
		raw.parse::<B256>()
			.map_err(|e| ChainError::Decode(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_helpers_parse_quantities() {
		let block = json!({"number": "0x10", "timestamp": "0x64", "baseFeePerGas": "0x3b9aca00"});
		assert_eq!(hex_u64(&block, "number").unwrap(), 16);
		assert_eq!(hex_u64(&block, "timestamp").unwrap(), 100);
		assert_eq!(
			hex_u256(&block, "baseFeePerGas").unwrap(),
			U256::from(1_000_000_000u64)
		);
		assert!(hex_u64(&block, "missing").is_err());
	}
}
