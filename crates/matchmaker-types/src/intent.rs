//! Maker-signed, time-decaying trade orders.

use crate::common::{IntentHash, Timestamp};
use alloy_primitives::{keccak256, Address, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

const BPS_DENOMINATOR: u64 = 10_000;

/// Which side of the trade the maker is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Buy,
	Sell,
}

/// An immutable, maker-signed order. Created by an external signer and
/// read-only to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
	pub maker: Address,
	/// Address allowed to arbitrate this intent. `None` means any
	/// matchmaker may run the competitive auction for it.
	pub matchmaker_authority: Option<Address>,
	pub side: Side,
	pub sell_token: Address,
	pub buy_token: Address,
	/// Fillable quantity.
	pub amount: U256,
	/// Floor counter-amount, worst for the maker.
	pub end_amount: U256,
	/// Decay-curve start offset relative to `end_amount`, in bps.
	pub start_amount_bps: u64,
	/// Surplus-split parameter relative to `end_amount`, in bps.
	pub expected_amount_bps: u64,
	pub start_time: Timestamp,
	pub end_time: Timestamp,
	pub is_partially_fillable: bool,
}

impl Intent {
	/// Deterministic digest over the canonical ABI encoding of all fields.
	pub fn hash(&self) -> IntentHash {
		let side: u16 = match self.side {
			Side::Buy => 0,
			Side::Sell => 1,
		};
		let encoded = (
			self.maker,
			self.matchmaker_authority.unwrap_or(Address::ZERO),
			side,
			self.sell_token,
			self.buy_token,
			self.amount,
			self.end_amount,
			U256::from(self.start_amount_bps),
			U256::from(self.expected_amount_bps),
			U256::from(self.start_time),
			U256::from(self.end_time),
			self.is_partially_fillable,
		)
			.abi_encode();
		keccak256(encoded)
	}

	pub fn has_started(&self, now: Timestamp) -> bool {
		now >= self.start_time
	}

	pub fn is_expired(&self, now: Timestamp) -> bool {
		now >= self.end_time
	}

	/// The required counter-amount at timestamp `t`.
	///
	/// Linear interpolation between the start value (best for the maker)
	/// and the floor `end_amount` (worst for the maker); `t` is clamped
	/// into `[start_time, end_time]` so the result never leaves that range.
	///
	/// Amounts come from untrusted input, so the interpolation is checked:
	/// `None` means the curve cannot be evaluated in 256 bits and the
	/// intent must be rejected.
	pub fn required_amount_at(&self, t: Timestamp) -> Option<U256> {
		let t = t.clamp(self.start_time, self.end_time);
		let duration = self.end_time.saturating_sub(self.start_time);
		if duration == 0 {
			return Some(self.end_amount);
		}
		let elapsed = U256::from(t - self.start_time);
		let duration = U256::from(duration);
		let bps = U256::from(BPS_DENOMINATOR);
		match self.side {
			Side::Sell => {
				// Maker receives: starts above the floor and decays down.
				let start = self
					.end_amount
					.checked_mul(bps + U256::from(self.start_amount_bps))?
					/ bps;
				let decay = (start - self.end_amount).checked_mul(elapsed)? / duration;
				Some(start - decay)
			}
			Side::Buy => {
				// Maker pays: starts below the ceiling and rises up to it.
				let start = self
					.end_amount
					.checked_mul(bps.saturating_sub(U256::from(self.start_amount_bps)))?
					/ bps;
				let rise = (self.end_amount - start).checked_mul(elapsed)? / duration;
				Some(start + rise)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sell_intent(end_amount: u64, start_amount_bps: u64) -> Intent {
		Intent {
			maker: Address::from([1u8; 20]),
			matchmaker_authority: None,
			side: Side::Sell,
			sell_token: Address::from([2u8; 20]),
			buy_token: Address::from([3u8; 20]),
			amount: U256::from(500u64),
			end_amount: U256::from(end_amount),
			start_amount_bps,
			expected_amount_bps: 0,
			start_time: 1_000,
			end_time: 2_000,
			is_partially_fillable: false,
		}
	}

	#[test]
	fn sell_decay_is_linear_between_start_and_floor() {
		let intent = sell_intent(100, 1_000);
		assert_eq!(intent.required_amount_at(1_000), Some(U256::from(110u64)));
		assert_eq!(intent.required_amount_at(1_500), Some(U256::from(105u64)));
		assert_eq!(intent.required_amount_at(2_000), Some(U256::from(100u64)));
	}

	#[test]
	fn decay_clamps_outside_the_window() {
		let intent = sell_intent(100, 1_000);
		assert_eq!(intent.required_amount_at(0), Some(U256::from(110u64)));
		assert_eq!(intent.required_amount_at(9_999), Some(U256::from(100u64)));
	}

	#[test]
	fn zero_bps_sell_is_flat() {
		let intent = sell_intent(100, 0);
		assert_eq!(intent.required_amount_at(1_000), Some(U256::from(100u64)));
		assert_eq!(intent.required_amount_at(1_999), Some(U256::from(100u64)));
	}

	#[test]
	fn buy_decay_rises_toward_the_ceiling() {
		let mut intent = sell_intent(100, 1_000);
		intent.side = Side::Buy;
		assert_eq!(intent.required_amount_at(1_000), Some(U256::from(90u64)));
		assert_eq!(intent.required_amount_at(1_500), Some(U256::from(95u64)));
		assert_eq!(intent.required_amount_at(2_000), Some(U256::from(100u64)));
	}

	#[test]
	fn absurd_amounts_do_not_wrap() {
		let mut intent = sell_intent(100, 1_000);
		intent.end_amount = U256::MAX;
		assert_eq!(intent.required_amount_at(1_000), None);
		assert_eq!(intent.required_amount_at(1_500), None);
	}

	#[test]
	fn hash_is_deterministic_and_field_sensitive() {
		let a = sell_intent(100, 1_000);
		let b = sell_intent(100, 1_000);
		assert_eq!(a.hash(), b.hash());

		let c = sell_intent(101, 1_000);
		assert_ne!(a.hash(), c.hash());

		let mut d = sell_intent(100, 1_000);
		d.side = Side::Buy;
		assert_ne!(a.hash(), d.hash());
	}
}
