use super::window::RateLimitWindow;
use crate::error::Result;
use async_trait::async_trait;

/// Storage contract for per-client rate limit windows.
///
/// Both backends satisfy this contract: the in-memory store for single
/// process deployments and the Redis store for shared state across
/// instances. Implementations own the durable copy; callers always receive
/// decoupled values, so mutating a returned window never touches store
/// state until it is saved back.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Fetch the window for a client key.
    ///
    /// Returns `Ok(None)` when the key has never been written or has
    /// expired; that is not an error. Backend failures are.
    async fn get(&self, client_key: &str) -> Result<Option<RateLimitWindow>>;

    /// Upsert the window under its client key, unconditionally
    async fn save(&self, window: &RateLimitWindow) -> Result<()>;

    /// Remove the window for a client key; a no-op when absent
    async fn delete(&self, client_key: &str) -> Result<()>;

    /// Build a fresh window for a client key from the store's configured
    /// defaults. Does not persist it; the caller decides when to save.
    fn create_default(&self, client_key: &str) -> RateLimitWindow;
}
