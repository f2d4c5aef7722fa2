//! HTTP surface for the rate limiter service.
//!
//! Thin I/O layer over [`RateLimiterService`]: the check and configure
//! endpoints, a health route, and a demo route guarded by the rate limit
//! middleware. Responses use a uniform envelope: `{"success": true,
//! "data": ...}` on success, `{"success": false, "error": ...}` on failure.

use crate::error::{LimiterError, Result};
use crate::limiter::{rate_limit_middleware, RateLimiterService};
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Reconfiguration payload for `PUT /api/v1/rate-limit/{client_key}`
#[derive(Debug, Deserialize)]
pub struct ConfigureRequest {
    pub max_requests: u32,
    pub cycle_duration: u32,
}

/// Build the application router
pub fn app_router(service: Arc<RateLimiterService>) -> Router {
    let protected = Router::new()
        .route("/data", get(protected_data))
        .route_layer(middleware::from_fn_with_state(
            service.clone(),
            rate_limit_middleware,
        ));

    let api = Router::new()
        .route(
            "/rate-limit/:client_key",
            get(check_rate_limit).put(configure_rate_limit),
        )
        .nest("/protected", protected);

    Router::new()
        .route("/", get(health))
        .nest("/api/v1", api)
        .with_state(service)
}

/// Wrap payload data in the success envelope
fn success(data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Check-and-consume one admission for the client key
async fn check_rate_limit(
    State(service): State<Arc<RateLimiterService>>,
    Path(client_key): Path<String>,
) -> Json<Value> {
    let decision = service.check_rate_limit(&client_key).await;

    success(json!({
        "allowed": decision.allowed,
        "remaining": decision.remaining,
        "reset": decision.reset,
    }))
}

/// Apply a per-client limit configuration.
///
/// Non-positive values are rejected here, before the core is involved; a
/// backend failure surfaces as a 500 rather than silently dropping the write.
async fn configure_rate_limit(
    State(service): State<Arc<RateLimiterService>>,
    Path(client_key): Path<String>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<Value>> {
    if req.max_requests == 0 || req.cycle_duration == 0 {
        return Err(LimiterError::Validation(
            "max_requests and cycle_duration must be positive".to_string(),
        ));
    }

    service
        .configure_rate_limit(&client_key, req.max_requests, req.cycle_duration)
        .await?;

    Ok(success(json!({
        "message": "Rate limit configuration saved",
    })))
}

async fn protected_data() -> Json<Value> {
    success(json!({ "message": "Protected data" }))
}
