use crate::cloud::{CloudClient, CloudService};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::{AppFabricIngestion, LexBotAssociation, LogIndexPolicy};
use reconciler_framework::{LifecycleExecutor, ResourceHandler, ResourceRegistry};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator for the sample provider.
///
/// `ProviderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the cloud service task
/// - **Dependency Wiring**: Handing every resource type's executor a client for that service
/// - **Dispatch**: Exposing the executors through a [`ResourceRegistry`] keyed by type name
///
/// # Example
///
/// ```ignore
/// let system = ProviderSystem::new(ProviderConfig::default())?;
///
/// let handler = system.handler("aws_connect_lex_bot_association")?;
/// let outcome = handler.reconcile(None, Some(&desired)).await?;
///
/// // Handlers borrowed from the registry must be dropped before shutdown.
/// drop(handler);
/// system.shutdown().await?;
/// ```
pub struct ProviderSystem {
    /// Direct access to the cloud service, for out-of-band changes and fault injection.
    pub cloud: CloudClient,

    pub registry: ResourceRegistry,

    handle: JoinHandle<()>,
}

impl ProviderSystem {
    /// Spawns the cloud service and registers all resource types.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let (service, cloud) = CloudService::new(config.channel_capacity);
        Self::with_service(service, cloud, config)
    }

    /// Same as [`new`](Self::new) with a pre-configured service (page size, ...).
    pub fn with_service(
        service: CloudService,
        cloud: CloudClient,
        config: ProviderConfig,
    ) -> Result<Self, ProviderError> {
        let registry = ResourceRegistry::new()
            .with(LifecycleExecutor::new(
                LexBotAssociation::new()?,
                cloud.clone(),
                config.executor.clone(),
            ))?
            .with(LifecycleExecutor::new(
                LogIndexPolicy::new()?,
                cloud.clone(),
                config.executor.clone(),
            ))?
            .with(LifecycleExecutor::new(
                AppFabricIngestion::new()?,
                cloud.clone(),
                config.executor,
            ))?;

        let handle = tokio::spawn(service.run());
        info!(resource_types = ?registry.type_names(), "Provider started");

        Ok(Self {
            cloud,
            registry,
            handle,
        })
    }

    /// Looks up the handler for a registered type name.
    pub fn handler(&self, type_name: &str) -> Result<Arc<dyn ResourceHandler>, ProviderError> {
        Ok(self.registry.get(type_name)?)
    }

    /// Gracefully shuts down the cloud service.
    ///
    /// Dropping the registry and the direct client closes the service channel; the task then
    /// drains and exits. Handler `Arc`s still held elsewhere keep the channel open, so drop
    /// them first.
    pub async fn shutdown(self) -> Result<(), ProviderError> {
        info!("Shutting down provider...");

        drop(self.registry);
        drop(self.cloud);

        self.handle.await.map_err(|e| {
            error!(error = %e, "Cloud service task failed");
            ProviderError::ServiceTask(e.to_string())
        })?;

        info!("Provider shut down");
        Ok(())
    }
}
