//! Web server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first when present.
//!
//! | Variable                       | Default          |
//! |--------------------------------|------------------|
//! | `BASKET_BIND_ADDR`             | `0.0.0.0:8080`   |
//! | `BASKET_DB_PATH`               | `./basket.db`    |
//! | `BASKET_DB_MAX_CONNECTIONS`    | `5`              |
//! | `BASKET_COMMIT_POLICY`         | `per_item`       |
//! | `BASKET_MAX_CONFLICT_RETRIES`  | `3`              |
//! | `BASKET_CART_IDLE_SECS`        | `1800`           |
//! | `BASKET_CART_CAPACITY`         | `10000`          |
//! | `BASKET_DEFAULT_USER_ID`       | `anonymous`      |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use basket_core::{CommitPolicy, ANONYMOUS_USER_ID, DEFAULT_MAX_CONFLICT_RETRIES};
use basket_db::DbConfig;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How checkout decrements are committed
    pub commit_policy: CommitPolicy,

    /// Re-reads allowed after a version conflict during checkout
    pub max_conflict_retries: u32,

    /// Idle time after which a cart session is dropped
    pub cart_idle: Duration,

    /// Maximum number of live cart sessions
    pub cart_capacity: u64,

    /// Owner recorded on cart lines when the request names none
    pub default_user_id: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: PathBuf::from("./basket.db"),
            db_max_connections: 5,
            commit_policy: CommitPolicy::PerItem,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            cart_idle: Duration::from_secs(1800), // 30 minutes
            cart_capacity: 10_000,
            default_user_id: ANONYMOUS_USER_ID.to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WebConfig::default();

        let config = WebConfig {
            bind_addr: parse_or(&lookup, "BASKET_BIND_ADDR", defaults.bind_addr)?,

            db_path: lookup("BASKET_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: parse_or(
                &lookup,
                "BASKET_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            commit_policy: parse_or(&lookup, "BASKET_COMMIT_POLICY", defaults.commit_policy)?,

            max_conflict_retries: parse_or(
                &lookup,
                "BASKET_MAX_CONFLICT_RETRIES",
                defaults.max_conflict_retries,
            )?,

            cart_idle: Duration::from_secs(parse_or(
                &lookup,
                "BASKET_CART_IDLE_SECS",
                defaults.cart_idle.as_secs(),
            )?),

            cart_capacity: parse_or(&lookup, "BASKET_CART_CAPACITY", defaults.cart_capacity)?,

            default_user_id: lookup("BASKET_DEFAULT_USER_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_user_id),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("BASKET_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.cart_idle.is_zero() {
            return Err(ConfigError::InvalidValue("BASKET_CART_IDLE_SECS".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        _ => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WebConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.commit_policy, CommitPolicy::PerItem);
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.cart_idle, Duration::from_secs(1800));
        assert_eq!(config.default_user_id, "anonymous");
    }

    #[test]
    fn test_overrides() {
        let config = WebConfig::from_lookup(lookup(&[
            ("BASKET_BIND_ADDR", "127.0.0.1:9000"),
            ("BASKET_COMMIT_POLICY", "all_or_nothing"),
            ("BASKET_CART_IDLE_SECS", "60"),
            ("BASKET_DB_PATH", "/tmp/cart.db"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.commit_policy, CommitPolicy::AllOrNothing);
        assert_eq!(config.cart_idle, Duration::from_secs(60));
        assert_eq!(config.db_config().database_path, PathBuf::from("/tmp/cart.db"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            ("BASKET_BIND_ADDR", "not-an-addr"),
            ("BASKET_COMMIT_POLICY", "sometimes"),
            ("BASKET_MAX_CONFLICT_RETRIES", "-1"),
            ("BASKET_DB_MAX_CONNECTIONS", "0"),
            ("BASKET_CART_IDLE_SECS", "0"),
        ] {
            let err = WebConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == key), "{key}");
        }
    }
}
