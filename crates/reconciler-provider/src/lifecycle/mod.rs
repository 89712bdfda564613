//! # Provider Lifecycle & Wiring
//!
//! This module starts the pieces of the sample provider, connects them, and shuts them
//! down again.
//!
//! ## The ProviderSystem Pattern
//!
//! Resource types never construct their own API client. [`ProviderSystem`] spawns the cloud
//! service once, then hands a clone of its client to every resource type's executor:
//!
//! ```rust,ignore
//! let (service, cloud) = CloudService::new(config.channel_capacity);
//!
//! let registry = ResourceRegistry::new()
//!     .with(LifecycleExecutor::new(LexBotAssociation::new()?, cloud.clone(), config.executor.clone()))?
//!     .with(LifecycleExecutor::new(LogIndexPolicy::new()?, cloud.clone(), config.executor.clone()))?
//!     .with(LifecycleExecutor::new(AppFabricIngestion::new()?, cloud.clone(), config.executor))?;
//!
//! let handle = tokio::spawn(service.run());
//! ```
//!
//! Swapping the client is how tests point the same resource types at a different backend.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop every client** - the registry's executors and the direct `cloud` handle
//! 2. **Service detects closure** - `receiver.recv()` returns `None`
//! 3. **Service logs final state** - object counts per kind
//! 4. **Await completion** - a panicked service surfaces as [`ProviderError::ServiceTask`]
//!
//! [`ProviderError::ServiceTask`]: crate::error::ProviderError::ServiceTask
//!
//! ## Observability
//!
//! Binaries call [`setup_tracing`](reconciler_framework::tracing::setup_tracing) once before
//! building the system; see the framework's `tracing` module for what gets logged.

pub mod provider_system;

pub use provider_system::*;
