use crate::error::{LimiterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Rate limiter configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Which window store backs the limiter
    #[serde(default)]
    pub backend: Backend,
    /// Redis connection settings (required for the redis backend)
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    /// Request ceiling for clients without explicit configuration
    #[serde(default = "default_max_requests")]
    pub default_max_requests: u32,
    /// Cycle length in minutes for clients without explicit configuration
    #[serde(default = "default_cycle_duration_mins")]
    pub default_cycle_duration_mins: u32,
}

/// Window store backend selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process store, per-instance limits
    #[default]
    Local,
    /// Redis store, limits shared across instances
    Redis,
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Password, overriding any credential in the URL
    #[serde(default)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_requests() -> u32 {
    100
}

fn default_cycle_duration_mins() -> u32 {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            redis: None,
            default_max_requests: default_max_requests(),
            default_cycle_duration_mins: default_cycle_duration_mins(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LimiterError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| LimiterError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.default_max_requests == 0 {
            return Err(LimiterError::Config(
                "default_max_requests must be > 0".to_string(),
            ));
        }

        if self.rate_limit.default_cycle_duration_mins == 0 {
            return Err(LimiterError::Config(
                "default_cycle_duration_mins must be > 0".to_string(),
            ));
        }

        if self.rate_limit.backend == Backend::Redis {
            match &self.rate_limit.redis {
                Some(redis) if !redis.url.is_empty() => {}
                _ => {
                    return Err(LimiterError::Config(
                        "redis backend selected but no redis.url configured".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9090

rate_limit:
  backend: redis
  redis:
    url: "redis://localhost:6379"
  default_max_requests: 50
  default_cycle_duration_mins: 2
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.rate_limit.backend, Backend::Redis);
        assert_eq!(config.rate_limit.default_max_requests, 50);
        assert_eq!(config.rate_limit.default_cycle_duration_mins, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let yaml = r#"
server: {}
rate_limit: {}
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.backend, Backend::Local);
        assert_eq!(config.rate_limit.default_max_requests, 100);
        assert_eq!(config.rate_limit.default_cycle_duration_mins, 1);
    }

    #[test]
    fn test_validate_redis_backend_requires_url() {
        let yaml = r#"
rate_limit:
  backend: redis
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_defaults_rejected() {
        let yaml = r#"
rate_limit:
  default_max_requests: 0
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_password_override() {
        let yaml = r#"
rate_limit:
  backend: redis
  redis:
    url: "redis://localhost:6379"
    password: "secret"
"#;

        let config = Config::from_yaml(yaml).unwrap();
        let redis = config.rate_limit.redis.unwrap();
        assert_eq!(redis.password.as_deref(), Some("secret"));
    }
}
