use super::store::WindowStore;
use super::window::RateLimitWindow;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// In-memory window store for single-process deployments.
///
/// A read/write lock guards the map; reads take the shared lock and return
/// a clone, writes take the exclusive lock and insert a clone. This makes
/// each operation linearizable but gives no atomicity across a get-then-save
/// pair; the service's own lock provides that.
pub struct MemoryWindowStore {
    windows: RwLock<HashMap<String, RateLimitWindow>>,
    default_max_requests: u32,
    default_cycle_duration_mins: u32,
}

impl MemoryWindowStore {
    /// Create an empty store with the given window defaults
    pub fn new(default_max_requests: u32, default_cycle_duration_mins: u32) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            default_max_requests,
            default_cycle_duration_mins,
        }
    }

    /// Number of tracked clients (for testing/monitoring)
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn get(&self, client_key: &str) -> Result<Option<RateLimitWindow>> {
        // A poisoned lock means a holder panicked; the map itself is intact
        let windows = self.windows.read().unwrap_or_else(PoisonError::into_inner);

        Ok(windows.get(client_key).cloned())
    }

    async fn save(&self, window: &RateLimitWindow) -> Result<()> {
        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);

        windows.insert(window.client_key.clone(), window.clone());
        Ok(())
    }

    async fn delete(&self, client_key: &str) -> Result<()> {
        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);

        if windows.remove(client_key).is_some() {
            debug!("Removed window for client: {}", client_key);
        }
        Ok(())
    }

    fn create_default(&self, client_key: &str) -> RateLimitWindow {
        RateLimitWindow::new(
            client_key,
            self.default_max_requests,
            self.default_cycle_duration_mins,
        )
    }
}
