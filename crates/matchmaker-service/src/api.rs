//! HTTP ingress for solvers and intent publishers.
//!
//! Three POST routes feed the coordinator: solution submissions into the
//! auction path, and private/public intent notifications into the direct
//! path. `GET /lives` is the liveness probe solvers poll before
//! submitting.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use matchmaker_auction::{direct::DirectRoute, AuctionError, AuctionService};
use matchmaker_types::{ApiResponse, IntentRequest, SubmissionRequest};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub fn router(service: Arc<AuctionService>) -> Router {
	Router::new()
		.route("/{asset_kind}/solutions", post(submit_solution))
		.route("/{asset_kind}/intents/private", post(submit_intent_private))
		.route("/{asset_kind}/intents/public", post(submit_intent_public))
		.route("/lives", get(liveness))
		.with_state(service)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

async fn submit_solution(
	State(service): State<Arc<AuctionService>>,
	Path(asset_kind): Path<String>,
	Json(request): Json<SubmissionRequest>,
) -> (StatusCode, Json<ApiResponse>) {
	respond(service.submit(&asset_kind, request).await)
}

async fn submit_intent_private(
	State(service): State<Arc<AuctionService>>,
	Path(asset_kind): Path<String>,
	Json(request): Json<IntentRequest>,
) -> (StatusCode, Json<ApiResponse>) {
	respond(
		service
			.submit_intent(&asset_kind, request, DirectRoute::Private)
			.await,
	)
}

async fn submit_intent_public(
	State(service): State<Arc<AuctionService>>,
	Path(asset_kind): Path<String>,
	Json(request): Json<IntentRequest>,
) -> (StatusCode, Json<ApiResponse>) {
	respond(
		service
			.submit_intent(&asset_kind, request, DirectRoute::Public)
			.await,
	)
}

async fn liveness() -> Json<ApiResponse> {
	Json(ApiResponse {
		message: Some("yes".to_string()),
		error: None,
	})
}

/// Business rejections surface as 400 with their stable reason string;
/// collaborator failures are logged and collapsed to an opaque 500.
fn respond(result: Result<(), AuctionError>) -> (StatusCode, Json<ApiResponse>) {
	match result {
		Ok(()) => (StatusCode::OK, Json(ApiResponse::success())),
		Err(AuctionError::Rejected(reason)) => (
			StatusCode::BAD_REQUEST,
			Json(ApiResponse::error(reason.to_string())),
		),
		Err(e) => {
			warn!(error = %e, "request failed");
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(ApiResponse::error("Internal server error")),
			)
		}
	}
}
