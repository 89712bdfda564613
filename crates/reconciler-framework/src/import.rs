//! # Import Resolver
//!
//! Adopts a pre-existing remote object into management from a raw, user-supplied identity
//! string. The string is decoded against the resource type's identity format, the object is
//! read once, and its state is rebuilt as desired configuration so the next plan shows no
//! drift.
//!
//! A malformed identity fails before any remote call. An identity that decodes but points at
//! nothing fails with "not found"; nothing is created.

use crate::error::{ErrorKind, Operation, ReconcileError};
use crate::executor::{LifecycleExecutor, ReadOutcome};
use crate::identity::ResourceIdentity;
use crate::resource::ManagedResource;
use crate::state::DesiredState;
use tracing::{info, instrument, warn};

/// A successfully adopted resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Imported {
    pub identity: ResourceIdentity,
    pub desired: DesiredState,
}

pub struct ImportResolver<'a, R: ManagedResource> {
    executor: &'a LifecycleExecutor<R>,
}

impl<'a, R: ManagedResource> ImportResolver<'a, R> {
    pub fn new(executor: &'a LifecycleExecutor<R>) -> Self {
        Self { executor }
    }

    #[instrument(skip(self), fields(resource_type = self.executor.type_name()))]
    pub async fn resolve(&self, raw: &str) -> Result<Imported, ReconcileError> {
        let resource = self.executor.resource();
        let identity = resource.identity_format().decode(raw).map_err(|e| {
            warn!(error = %e, "Rejected import identity");
            ReconcileError::new(Operation::Import, resource.type_name(), raw, e)
        })?;

        match self.executor.read(&identity).await {
            Ok(ReadOutcome::Present(observed)) => {
                let desired = resource.import_state(&identity, observed);
                info!(%identity, attributes = desired.len(), "Imported");
                Ok(Imported { identity, desired })
            }
            Ok(ReadOutcome::Removed) => Err(ReconcileError::new(
                Operation::Import,
                resource.type_name(),
                identity.to_string(),
                ErrorKind::NotFound,
            )),
            Err(e) => Err(ReconcileError {
                operation: Operation::Import,
                ..e
            }),
        }
    }
}

impl<R: ManagedResource> LifecycleExecutor<R> {
    /// Shorthand for [`ImportResolver::resolve`].
    pub async fn import(&self, raw: &str) -> Result<Imported, ReconcileError> {
        ImportResolver::new(self).resolve(raw).await
    }
}
