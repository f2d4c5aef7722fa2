use super::service::{RateLimitDecision, RateLimiterService};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Axum middleware enforcing the rate limit on protected routes.
///
/// The client key comes from the `X-Client-ID` header, falling back to the
/// caller's network address when absent. Denied requests get a 429 with the
/// error envelope and never reach the inner handler; admitted requests are
/// forwarded and the response carries the `X-RateLimit-*` headers.
pub async fn rate_limit_middleware(
    State(service): State<Arc<RateLimiterService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let client_key = client_key_from(request.headers(), connect_info.map(|ci| ci.0));

    let decision = service.check_rate_limit(&client_key).await;

    if !decision.allowed {
        warn!("Rejecting request over limit for client: {}", client_key);
        return rate_limit_exceeded_response(&decision);
    }

    debug!(
        "Rate limit check passed for client {}, remaining: {}",
        client_key, decision.remaining
    );

    let response = next.run(request).await;
    attach_rate_limit_headers(response, &decision)
}

/// Derive the client key from the request: header first, peer address second
fn client_key_from(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("X-Client-ID")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| {
            peer.map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        })
}

/// Create a 429 Too Many Requests response with rate limit headers
fn rate_limit_exceeded_response(decision: &RateLimitDecision) -> Response {
    let body = Json(serde_json::json!({
        "success": false,
        "error": "Rate limit exceeded",
    }));

    let response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    attach_rate_limit_headers(response, decision)
}

/// Attach `X-RateLimit-*` headers reporting the ceiling, remaining count,
/// and reset epoch
fn attach_rate_limit_headers(mut response: Response, decision: &RateLimitDecision) -> Response {
    let headers = response.headers_mut();

    headers.insert(
        "X-RateLimit-Limit",
        HeaderValue::from_str(&decision.limit.to_string()).unwrap(),
    );
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from_str(&decision.remaining.to_string()).unwrap(),
    );
    headers.insert(
        "X-RateLimit-Reset",
        HeaderValue::from_str(&decision.reset.to_string()).unwrap(),
    );

    response
}
