//! Error types for assembling the provider.

use reconciler_framework::RegistryError;
use thiserror::Error;

/// Failures while building resource types or wiring the provider system.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A schema validator pattern failed to compile.
    #[error("invalid validation pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The cloud service task panicked or was cancelled.
    #[error("cloud service task failed: {0}")]
    ServiceTask(String),
}
