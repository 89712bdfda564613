//! Provider-level configuration.

use reconciler_framework::config::env_var_or_default;
use reconciler_framework::ExecutorConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Timeouts shared by every resource type's executor.
    pub executor: ExecutorConfig,
    /// Request buffer of the cloud service channel.
    pub channel_capacity: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            executor: ExecutorConfig::from_env(),
            channel_capacity: env_var_or_default(
                "PROVIDER_CHANNEL_CAPACITY",
                DEFAULT_CHANNEL_CAPACITY,
            )
            .max(1),
        }
    }
}
