//! # Executor Configuration
//!
//! Per-operation timeouts. Defaults match the bounds the provider has always shipped with
//! (five minutes for mutating calls, one minute for reads) and can be overridden via
//! environment variables or deserialized from the orchestrator's own configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_DELETE_TIMEOUT_SECS: u64 = 300;

/// Timeout bounds for each lifecycle operation.
///
/// Exceeding a bound surfaces [`ErrorKind::Timeout`](crate::error::ErrorKind::Timeout);
/// the remote call itself is not aborted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub create_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub update_timeout_secs: u64,
    pub delete_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            create_timeout_secs: DEFAULT_CREATE_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            update_timeout_secs: DEFAULT_UPDATE_TIMEOUT_SECS,
            delete_timeout_secs: DEFAULT_DELETE_TIMEOUT_SECS,
        }
    }
}

impl ExecutorConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            create_timeout_secs: env_var_or_default(
                "RECONCILER_CREATE_TIMEOUT_SECS",
                DEFAULT_CREATE_TIMEOUT_SECS,
            ),
            read_timeout_secs: env_var_or_default(
                "RECONCILER_READ_TIMEOUT_SECS",
                DEFAULT_READ_TIMEOUT_SECS,
            ),
            update_timeout_secs: env_var_or_default(
                "RECONCILER_UPDATE_TIMEOUT_SECS",
                DEFAULT_UPDATE_TIMEOUT_SECS,
            ),
            delete_timeout_secs: env_var_or_default(
                "RECONCILER_DELETE_TIMEOUT_SECS",
                DEFAULT_DELETE_TIMEOUT_SECS,
            ),
        }
    }

    /// Bounds are whole seconds; a fractional `timeout` rounds up.
    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout_secs = whole_secs(timeout);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_secs = whole_secs(timeout);
        self
    }

    pub fn with_update_timeout(mut self, timeout: Duration) -> Self {
        self.update_timeout_secs = whole_secs(timeout);
        self
    }

    pub fn with_delete_timeout(mut self, timeout: Duration) -> Self {
        self.delete_timeout_secs = whole_secs(timeout);
        self
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_secs)
    }
}

fn whole_secs(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

/// Read environment variable or return default value
pub fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.create_timeout(), Duration::from_secs(300));
        assert_eq!(config.read_timeout(), Duration::from_secs(60));
        assert_eq!(config.delete_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_sub_second_timeout_rounds_up() {
        let config = ExecutorConfig::default()
            .with_create_timeout(Duration::from_millis(500))
            .with_read_timeout(Duration::from_millis(1500))
            .with_delete_timeout(Duration::from_secs(2));
        assert_eq!(config.create_timeout(), Duration::from_secs(1));
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.delete_timeout(), Duration::from_secs(2));
        assert_eq!(
            ExecutorConfig::default()
                .with_update_timeout(Duration::ZERO)
                .update_timeout(),
            Duration::ZERO
        );
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"create_timeout_secs": 30}"#).unwrap();
        assert_eq!(config.create_timeout(), Duration::from_secs(30));
        assert_eq!(config.update_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_env_override_and_fallback() {
        std::env::set_var("RECONCILER_UNIT_TEST_TIMEOUT", "12");
        assert_eq!(env_var_or_default("RECONCILER_UNIT_TEST_TIMEOUT", 1u64), 12);
        std::env::set_var("RECONCILER_UNIT_TEST_TIMEOUT", "soon");
        assert_eq!(env_var_or_default("RECONCILER_UNIT_TEST_TIMEOUT", 1u64), 1);
        std::env::remove_var("RECONCILER_UNIT_TEST_TIMEOUT");
    }
}
