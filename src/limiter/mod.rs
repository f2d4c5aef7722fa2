//! Fixed-window rate limiting.
//!
//! The core of the service: the per-client window entity, the storage
//! contract it is persisted through, the two store backends, and the
//! service that runs the check-and-increment protocol on top of them.
//!
//! - **Window entity**: pure decision logic with lazy reset-on-read
//! - **Memory store**: mutex-guarded map for single-process deployments
//! - **Redis store**: JSON records with expiration, shared across instances
//! - **Service**: serializes load-decide-mutate-persist so concurrent
//!   checks for one client can never overshoot the ceiling
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ratelimitd::limiter::{MemoryWindowStore, RateLimiterService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryWindowStore::new(100, 1));
//!     let service = RateLimiterService::new(store);
//!
//!     let decision = service.check_rate_limit("client-1").await;
//!     assert!(decision.allowed);
//! }
//! ```

pub mod memory;
pub mod middleware;
pub mod redis;
pub mod service;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use memory::MemoryWindowStore;
pub use middleware::rate_limit_middleware;
pub use redis::RedisWindowStore;
pub use service::{RateLimitDecision, RateLimiterService};
pub use store::WindowStore;
pub use window::RateLimitWindow;
