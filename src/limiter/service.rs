use super::store::WindowStore;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Outcome of one admission check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Remaining requests in the current cycle
    pub remaining: u32,
    /// The window's request ceiling
    pub limit: u32,
    /// When the cycle resets, as epoch seconds
    pub reset: i64,
}

/// Rate limiter service orchestrating check-and-consume and reconfiguration
/// against whichever window store is configured.
///
/// Every operation runs the full load-decide-mutate-persist sequence under
/// one process-wide mutex, for both backends. Without it, two concurrent
/// checks for the same client could both load the same count, both see
/// admission as allowed, and overshoot the ceiling by one. The coarse lock
/// serializes all clients, not just same-key operations; per-key locking
/// (or a conditional update pushed into the backend) would restore cross-key
/// parallelism and is a known refinement.
pub struct RateLimiterService {
    store: Arc<dyn WindowStore>,
    guard: Mutex<()>,
}

impl RateLimiterService {
    /// Create a service over the given window store
    pub fn new(store: Arc<dyn WindowStore>) -> Self {
        Self {
            store,
            guard: Mutex::new(()),
        }
    }

    /// Check-and-consume one request for a client key.
    ///
    /// Loads the client's window (creating and persisting a default when
    /// absent, or when the load itself failed), decides admission, and on
    /// admission increments and persists the updated window. Appears atomic
    /// to concurrent callers.
    ///
    /// Store failures on this path degrade to a fresh default window rather
    /// than failing the request; availability wins over strict accounting
    /// when the backend misbehaves.
    pub async fn check_rate_limit(&self, client_key: &str) -> RateLimitDecision {
        let _guard = self.guard.lock().await;

        let mut window = match self.store.get(client_key).await {
            Ok(Some(window)) => window,
            Ok(None) => {
                debug!("Creating window for new client: {}", client_key);
                let window = self.store.create_default(client_key);
                if let Err(e) = self.store.save(&window).await {
                    error!("Failed to persist new window for {}: {}", client_key, e);
                }
                window
            }
            Err(e) => {
                warn!(
                    "Window load failed for {}, treating as new client: {}",
                    client_key, e
                );
                let window = self.store.create_default(client_key);
                if let Err(e) = self.store.save(&window).await {
                    error!("Failed to persist new window for {}: {}", client_key, e);
                }
                window
            }
        };

        let allowed = window.is_allowed();

        if allowed {
            window.increment();
            if let Err(e) = self.store.save(&window).await {
                error!("Failed to persist window for {}: {}", client_key, e);
            }
        } else {
            warn!("Rate limit exceeded for client: {}", client_key);
        }

        RateLimitDecision {
            allowed,
            remaining: window.remaining_requests(),
            limit: window.max_requests,
            reset: window.reset_time().timestamp(),
        }
    }

    /// Replace a client's request ceiling and cycle duration.
    ///
    /// The current count and cycle start are left untouched; reconfiguring
    /// never resets consumption. Unlike the check path, a store failure here
    /// propagates: silently dropping a configuration write is worse than an
    /// explicit error.
    pub async fn configure_rate_limit(
        &self,
        client_key: &str,
        max_requests: u32,
        cycle_duration_mins: u32,
    ) -> Result<()> {
        let _guard = self.guard.lock().await;

        let mut window = match self.store.get(client_key).await? {
            Some(window) => window,
            None => self.store.create_default(client_key),
        };

        window.max_requests = max_requests;
        window.cycle_duration_mins = cycle_duration_mins;

        self.store.save(&window).await?;

        debug!(
            "Configured client {}: max_requests={}, cycle_duration_mins={}",
            client_key, max_requests, cycle_duration_mins
        );
        Ok(())
    }
}
