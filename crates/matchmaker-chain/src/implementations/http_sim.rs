//! Hosted simulation API client.
//!
//! Posts the hypothetical bundle to a simulation service and maps its
//! response onto `SimulationTrace`s.

use crate::{ChainError, SimTransaction, SimulationInterface, SimulationTrace};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SIMULATION_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpSimulator {
	client: reqwest::Client,
	url: String,
}

#[derive(Serialize)]
struct SimulateRequest<'a> {
	transactions: &'a [SimTransaction],
}

#[derive(Deserialize)]
struct SimulateResponse {
	traces: Vec<SimulationTrace>,
}

impl HttpSimulator {
	pub fn new(url: String) -> Result<Self, ChainError> {
		let client = reqwest::Client::builder()
			.timeout(SIMULATION_TIMEOUT)
			.build()
			.map_err(|e| ChainError::Transport(e.to_string()))?;
		Ok(Self { client, url })
	}
}

#[async_trait]
impl SimulationInterface for HttpSimulator {
	async fn simulate_bundle(
		&self,
		transactions: &[SimTransaction],
	) -> Result<Vec<SimulationTrace>, ChainError> {
		debug!(bundle_len = transactions.len(), "simulating bundle");
		let response = self
			.client
			.post(&self.url)
			.json(&SimulateRequest { transactions })
			.send()
			.await
			.map_err(|e| ChainError::Transport(e.to_string()))?;
		if !response.status().is_success() {
			return Err(ChainError::Simulation(format!(
				"simulation API returned {}",
				response.status()
			)));
		}
		let body: SimulateResponse = response
			.json()
			.await
			.map_err(|e| ChainError::Decode(e.to_string()))?;
		if body.traces.len() != transactions.len() {
			return Err(ChainError::Simulation(format!(
				"expected {} traces, got {}",
				transactions.len(),
				body.traces.len()
			)));
		}
		Ok(body.traces)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes, I256, U256};
	use std::collections::HashMap;

	#[test]
	fn trace_serialization_roundtrips() {
		let maker = Address::from([1u8; 20]);
		let token = Address::from([2u8; 20]);
		let mut deltas = HashMap::new();
		deltas.insert(
			maker,
			HashMap::from([(token, I256::try_from(310i64).unwrap())]),
		);
		let trace = SimulationTrace {
			error: None,
			balance_deltas: deltas,
		};
		let json = serde_json::to_string(&trace).unwrap();
		let back: SimulationTrace = serde_json::from_str(&json).unwrap();
		assert_eq!(back.delta(maker, token), I256::try_from(310i64).unwrap());
	}

	#[test]
	fn bundle_request_serializes_both_transaction_kinds() {
		let txs = vec![
			SimTransaction::Call {
				from: Address::from([1u8; 20]),
				to: Address::from([2u8; 20]),
				data: Bytes::from(vec![1, 2, 3]),
				value: U256::ZERO,
			},
			SimTransaction::Raw {
				data: Bytes::from(vec![4, 5, 6]),
			},
		];
		let json = serde_json::to_string(&SimulateRequest { transactions: &txs }).unwrap();
		assert!(json.contains("\"kind\":\"call\""));
		assert!(json.contains("\"kind\":\"raw\""));
	}
}
