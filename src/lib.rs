pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;

use crate::config::{Backend, Config, RateLimitSettings};
use crate::error::{LimiterError, Result};
use crate::limiter::{MemoryWindowStore, RateLimiterService, RedisWindowStore, WindowStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Initialize and run the rate limiter server
pub async fn init_server(config: Config) -> Result<()> {
    config.validate()?;

    info!("Starting rate limiter service");

    let store = build_store(&config.rate_limit).await?;
    let service = Arc::new(RateLimiterService::new(store));

    let app = handlers::app_router(service).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(LimiterError::Io)?;

    info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| LimiterError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Build the window store selected by the configuration.
///
/// For the Redis backend the connection is verified with a ping; failing
/// to reach Redis at startup is fatal.
async fn build_store(settings: &RateLimitSettings) -> Result<Arc<dyn WindowStore>> {
    match settings.backend {
        Backend::Local => {
            info!("Using in-memory window store");
            Ok(Arc::new(MemoryWindowStore::new(
                settings.default_max_requests,
                settings.default_cycle_duration_mins,
            )))
        }
        Backend::Redis => {
            let redis = settings.redis.as_ref().ok_or_else(|| {
                LimiterError::Config("redis backend selected but no redis.url configured".to_string())
            })?;

            let store = RedisWindowStore::connect(
                &redis.url,
                redis.password.as_deref(),
                settings.default_max_requests,
                settings.default_cycle_duration_mins,
            )
            .await?;

            store.ping().await?;
            info!("Using Redis window store at {}", redis.url);

            Ok(Arc::new(store))
        }
    }
}

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratelimitd=debug,tower_http=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();
}
