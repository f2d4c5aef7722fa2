use super::store::WindowStore;
use super::window::RateLimitWindow;
use crate::error::{LimiterError, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, IntoConnectionInfo};
use tracing::debug;

/// Namespace prefix for window records in Redis
const KEY_PREFIX: &str = "rate_limit:";

/// Build the Redis key for a client's window record
fn record_key(client_key: &str) -> String {
    format!("{}{}", KEY_PREFIX, client_key)
}

/// Redis-backed window store shared across service instances.
///
/// Each client maps to one record: the window serialized as JSON under
/// `rate_limit:{client_key}`. Every save attaches an expiration of twice
/// the window's cycle duration, refreshed on each write; that expiration
/// is the only reclamation mechanism for idle clients.
pub struct RedisWindowStore {
    /// Redis connection manager (auto-reconnecting, cheap to clone)
    connection: ConnectionManager,
    default_max_requests: u32,
    default_cycle_duration_mins: u32,
}

impl RedisWindowStore {
    /// Connect to Redis and build a store with the given window defaults.
    ///
    /// An explicit password, when given, overrides any credential in the URL.
    pub async fn connect(
        url: &str,
        password: Option<&str>,
        default_max_requests: u32,
        default_cycle_duration_mins: u32,
    ) -> Result<Self> {
        let mut info = url
            .into_connection_info()
            .map_err(LimiterError::Connection)?;

        if let Some(password) = password {
            info.redis.password = Some(password.to_string());
        }

        let client = redis::Client::open(info).map_err(LimiterError::Connection)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(LimiterError::Connection)?;

        Ok(Self {
            connection,
            default_max_requests,
            default_cycle_duration_mins,
        })
    }

    /// Test the Redis connection
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();

        redis::cmd("PING")
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(LimiterError::Connection)
    }
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn get(&self, client_key: &str) -> Result<Option<RateLimitWindow>> {
        let key = record_key(client_key);
        let mut conn = self.connection.clone();

        // A missing key is an Option::None, not an error; only transport
        // failures surface here
        let data: Option<String> = conn.get(&key).await.map_err(|e| LimiterError::Backend {
            op: "get",
            key: key.clone(),
            source: e,
        })?;

        match data {
            Some(raw) => {
                let window =
                    serde_json::from_str(&raw).map_err(|e| LimiterError::Serialization {
                        op: "decode",
                        key,
                        source: e,
                    })?;
                Ok(Some(window))
            }
            None => {
                debug!("No window record for key: {}", key);
                Ok(None)
            }
        }
    }

    async fn save(&self, window: &RateLimitWindow) -> Result<()> {
        let key = record_key(&window.client_key);
        let mut conn = self.connection.clone();

        let payload =
            serde_json::to_string(window).map_err(|e| LimiterError::Serialization {
                op: "encode",
                key: key.clone(),
                source: e,
            })?;

        // Records expire after two full cycles without a write; abandoned
        // clients are reclaimed by Redis itself
        let ttl_secs = u64::from(window.cycle_duration_mins) * 2 * 60;

        conn.set_ex(&key, payload, ttl_secs)
            .await
            .map_err(|e| LimiterError::Backend {
                op: "save",
                key,
                source: e,
            })
    }

    async fn delete(&self, client_key: &str) -> Result<()> {
        let key = record_key(client_key);
        let mut conn = self.connection.clone();

        conn.del(&key).await.map_err(|e| LimiterError::Backend {
            op: "delete",
            key,
            source: e,
        })
    }

    fn create_default(&self, client_key: &str) -> RateLimitWindow {
        RateLimitWindow::new(
            client_key,
            self.default_max_requests,
            self.default_cycle_duration_mins,
        )
    }
}
