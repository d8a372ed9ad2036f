//! Shared domain types for the matchmaker.
//!
//! Everything the coordinator passes between its services lives here:
//! maker-signed intents and their decay curve, solver-submitted solutions,
//! auction window keys, and the signed authorizations handed to winners.

pub mod api;
pub mod auction;
pub mod authorization;
pub mod common;
pub mod intent;
pub mod solution;

pub use api::{ApiResponse, IntentRequest, SubmissionRequest};
pub use auction::WindowKey;
pub use authorization::{Authorization, AuthorizationDelivery, SignedAuthorization};
pub use common::{BlockNumber, IntentHash, Timestamp};
pub use intent::{Intent, Side};
pub use solution::Solution;
