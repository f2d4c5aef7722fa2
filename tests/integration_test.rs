use axum::body::Body;
use http::{Request, StatusCode};
use ratelimitd::handlers::app_router;
use ratelimitd::limiter::{MemoryWindowStore, RateLimiterService};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Build an app over the in-memory store with the given window defaults
fn setup_test_app(default_max_requests: u32, default_cycle_duration_mins: u32) -> axum::Router {
    let store = Arc::new(MemoryWindowStore::new(
        default_max_requests,
        default_cycle_duration_mins,
    ));
    app_router(Arc::new(RateLimiterService::new(store)))
}

async fn body_json(response: axum::response::Response) -> Value {
    use http_body_util::BodyExt;

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn check_request(client_key: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/v1/rate-limit/{}", client_key))
        .body(Body::empty())
        .unwrap()
}

fn configure_request(client_key: &str, max_requests: u32, cycle_duration: u32) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/rate-limit/{}", client_key))
        .header("Content-Type", "application/json")
        .body(Body::from(format!(
            r#"{{"max_requests": {}, "cycle_duration": {}}}"#,
            max_requests, cycle_duration
        )))
        .unwrap()
}

fn protected_request(client_key: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/v1/protected/data")
        .header("X-Client-ID", client_key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_configured_limit_is_exhausted_in_order() {
    let app = setup_test_app(100, 1);

    let response = app
        .clone()
        .oneshot(configure_request("c1", 5, 1))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // First 5 checks admit with remaining counting down, the 6th denies
    for expected_remaining in [4, 3, 2, 1, 0] {
        let response = app.clone().oneshot(check_request("c1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["allowed"], true);
        assert_eq!(body["data"]["remaining"], expected_remaining);
    }

    let response = app.clone().oneshot(check_request("c1")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["remaining"], 0);
}

#[tokio::test]
async fn test_unseen_client_uses_defaults() {
    let app = setup_test_app(100, 1);

    let response = app.oneshot(check_request("new")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["allowed"], true);
    assert_eq!(body["data"]["remaining"], 99);
}

#[tokio::test]
async fn test_protected_route_enforces_limit() {
    let app = setup_test_app(100, 1);

    let response = app
        .clone()
        .oneshot(configure_request("mw-client", 5, 1))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for i in 0..6 {
        let response = app
            .clone()
            .oneshot(protected_request("mw-client"))
            .await
            .unwrap();

        if i < 5 {
            assert_eq!(
                response.status(),
                StatusCode::OK,
                "request {} should pass",
                i + 1
            );

            let headers = response.headers();
            assert_eq!(headers.get("X-RateLimit-Limit").unwrap(), "5");
            assert_eq!(
                headers.get("X-RateLimit-Remaining").unwrap(),
                &(4 - i).to_string()
            );
            assert!(headers.get("X-RateLimit-Reset").is_some());
        } else {
            assert_eq!(
                response.status(),
                StatusCode::TOO_MANY_REQUESTS,
                "request {} should be blocked",
                i + 1
            );

            let headers = response.headers();
            assert_eq!(headers.get("X-RateLimit-Remaining").unwrap(), "0");
        }
    }
}

#[tokio::test]
async fn test_denied_check_after_protected_exhaustion() {
    let app = setup_test_app(100, 1);

    app.clone()
        .oneshot(configure_request("shared", 3, 1))
        .await
        .unwrap();

    // Exhaust via the protected route
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(protected_request("shared"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // The status endpoint observes the same exhausted window
    let response = app.clone().oneshot(check_request("shared")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["remaining"], 0);
}

#[tokio::test]
async fn test_concurrent_requests_admit_exactly_the_limit() {
    let app = setup_test_app(100, 1);

    app.clone()
        .oneshot(configure_request("concurrent", 10, 1))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app.oneshot(protected_request("concurrent")).await.unwrap();
            response.status()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::OK {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 10, "exactly max_requests must be admitted");
}

#[tokio::test]
async fn test_configure_validation_and_error_shape() {
    let app = setup_test_app(100, 1);

    let response = app
        .clone()
        .oneshot(configure_request("c1", 0, 1))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let response = app
        .clone()
        .oneshot(configure_request("c1", 1, 0))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app(100, 1);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_clients_are_isolated() {
    let app = setup_test_app(100, 1);

    app.clone()
        .oneshot(configure_request("small", 1, 1))
        .await
        .unwrap();

    // Exhaust the small client
    app.clone().oneshot(check_request("small")).await.unwrap();
    let response = app.clone().oneshot(check_request("small")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["allowed"], false);

    // Another client is unaffected
    let response = app.clone().oneshot(check_request("other")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["allowed"], true);
}
