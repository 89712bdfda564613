//! # Lifecycle Executor
//!
//! This module defines the `LifecycleExecutor`, the generic component that drives one resource
//! type through Create, Read, Update and Delete against the remote API. It is the "server"
//! half of the reconciler: resource types supply the remote hooks, the executor supplies
//! everything around them.
//!
//! ## Guarantees
//!
//! - Desired state is validated against the schema before any remote call.
//! - Create and delete run under independent timeout bounds. A bound that elapses surfaces
//!   [`ErrorKind::Timeout`], which is not the same thing as a rejection: the remote may have
//!   acted.
//! - Create is followed by an immediate read. If that read fails the object still exists, so
//!   the result is Present with unknown attributes; nothing is rolled back.
//! - Read maps not-found to [`ReadOutcome::Removed`] instead of an error.
//! - Update never touches a key-forming attribute in place; it signals
//!   [`ErrorKind::ReplacementRequired`] and leaves the decision to the caller.
//! - Delete of an absent object succeeds.
//! - Nothing is retried internally. Retry and backoff belong to the orchestrator.

use crate::config::ExecutorConfig;
use crate::diff::{self, Plan};
use crate::error::{ErrorKind, Operation, ReconcileError, RemoteError};
use crate::finder::{Lookup, RemoteFinder};
use crate::identity::ResourceIdentity;
use crate::resource::ManagedResource;
use crate::state::{DesiredState, LifecyclePhase, LifecycleRecord, ObservedState};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub identity: ResourceIdentity,
    /// `None` when the follow-up read failed: the object exists but its attributes are unknown.
    pub observed: Option<ObservedState>,
}

/// Result of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Present(ObservedState),
    /// The remote object is gone. The orchestrator should drop it from state.
    Removed,
}

/// Drives one resource type's lifecycle.
///
/// Holds only immutable data, so a single executor can serve concurrent passes for
/// different identities.
pub struct LifecycleExecutor<R: ManagedResource> {
    resource: R,
    client: R::Client,
    config: ExecutorConfig,
}

impl<R: ManagedResource> LifecycleExecutor<R> {
    pub fn new(resource: R, client: R::Client, config: ExecutorConfig) -> Self {
        Self {
            resource,
            client,
            config,
        }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn client(&self) -> &R::Client {
        &self.client
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn type_name(&self) -> &'static str {
        self.resource.type_name()
    }

    fn error(
        &self,
        operation: Operation,
        identity: Option<&ResourceIdentity>,
        kind: impl Into<ErrorKind>,
    ) -> ReconcileError {
        let identity = identity.map_or_else(|| "-".to_string(), ToString::to_string);
        ReconcileError::new(operation, self.type_name(), identity, kind)
    }

    /// Checks `desired` against the schema without calling the remote.
    ///
    /// `identity` is the tracked object, if there is one; it only labels the error.
    pub fn validate(
        &self,
        identity: Option<&ResourceIdentity>,
        desired: &DesiredState,
    ) -> Result<(), ReconcileError> {
        self.resource
            .schema()
            .validate(desired)
            .map_err(|e| self.error(Operation::Plan, identity, e))
    }

    /// Computes the action needed to move `observed` to `desired`.
    pub fn plan(
        &self,
        identity: Option<&ResourceIdentity>,
        desired: &DesiredState,
        observed: &ObservedState,
    ) -> Result<Plan, ReconcileError> {
        self.validate(identity, desired)?;
        Ok(diff::plan(
            self.resource.schema(),
            desired,
            observed,
            self.resource.supports_update(),
        ))
    }

    /// Creates the remote object, then reads it back.
    #[instrument(skip_all, fields(resource_type = self.type_name()))]
    pub async fn create(&self, desired: &DesiredState) -> Result<Created, ReconcileError> {
        self.resource
            .schema()
            .validate(desired)
            .map_err(|e| self.error(Operation::Create, None, e))?;

        let mut record = LifecycleRecord::new(LifecyclePhase::Absent);
        record.desired = Some(desired.clone());
        self.advance(&mut record, LifecyclePhase::Creating, Operation::Create)?;
        debug!(?desired, "Create");

        let created = bounded(
            self.config.create_timeout(),
            self.resource.on_create(&self.client, desired),
        )
        .await;
        let identity = match created {
            Ok(identity) => identity,
            Err(kind) => {
                record.fail(&kind);
                warn!(error = %kind, phase = %record.phase(), "Create failed");
                return Err(self.error(Operation::Create, None, kind));
            }
        };
        record.identity = Some(identity.clone());
        self.advance(&mut record, LifecyclePhase::Present, Operation::Create)?;
        info!(%identity, "Created");

        match self.read(&identity).await {
            Ok(ReadOutcome::Present(observed)) => {
                record.observed = Some(observed.clone());
                Ok(Created {
                    identity,
                    observed: Some(observed),
                })
            }
            Ok(ReadOutcome::Removed) => {
                warn!(%identity, "Created object not yet visible, attributes unknown");
                Ok(Created {
                    identity,
                    observed: None,
                })
            }
            Err(e) => {
                record.last_error = Some(e.to_string());
                warn!(%identity, error = %e, "Read after create failed, attributes unknown");
                Ok(Created {
                    identity,
                    observed: None,
                })
            }
        }
    }

    /// Fetches the current remote state.
    #[instrument(skip_all, fields(resource_type = self.type_name(), %identity))]
    pub async fn read(&self, identity: &ResourceIdentity) -> Result<ReadOutcome, ReconcileError> {
        let finder = RemoteFinder::new(&self.resource, &self.client);
        match bounded(self.config.read_timeout(), finder.find(identity)).await {
            Ok(Lookup::Found(observed)) => Ok(ReadOutcome::Present(observed)),
            Ok(Lookup::NotFound) => {
                info!("Removed outside of management");
                Ok(ReadOutcome::Removed)
            }
            Err(kind) => Err(self.error(Operation::Read, Some(identity), kind)),
        }
    }

    /// Applies `changed` attributes in place and returns the refreshed state.
    ///
    /// Fails with [`ErrorKind::ReplacementRequired`] before calling the remote if any changed
    /// attribute is key-forming or the type has no in-place update.
    #[instrument(skip_all, fields(resource_type = self.type_name(), %identity))]
    pub async fn update(
        &self,
        identity: &ResourceIdentity,
        changed: &BTreeSet<String>,
        desired: &DesiredState,
    ) -> Result<ObservedState, ReconcileError> {
        self.resource
            .schema()
            .validate(desired)
            .map_err(|e| self.error(Operation::Update, Some(identity), e))?;

        let replace_because = diff::replacement_reasons(
            self.resource.schema(),
            changed,
            self.resource.supports_update(),
        );
        if !replace_because.is_empty() {
            info!(attributes = ?replace_because, "Replacement required");
            return Err(self.error(
                Operation::Update,
                Some(identity),
                ErrorKind::ReplacementRequired {
                    attributes: replace_because.into_iter().collect(),
                },
            ));
        }

        if changed.is_empty() {
            debug!("Nothing to update");
        } else {
            debug!(?changed, "Update");
            bounded(
                self.config.update_timeout(),
                self.resource
                    .on_update(&self.client, identity, changed, desired),
            )
            .await
            .map_err(|kind| {
                warn!(error = %kind, "Update failed");
                self.error(Operation::Update, Some(identity), kind)
            })?;
            info!(?changed, "Updated");
        }

        match self.read(identity).await {
            Ok(ReadOutcome::Present(observed)) => Ok(observed),
            Ok(ReadOutcome::Removed) => {
                Err(self.error(Operation::Update, Some(identity), ErrorKind::NotFound))
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the old object and creates a new one from `desired`.
    #[instrument(skip_all, fields(resource_type = self.type_name(), %identity))]
    pub async fn replace(
        &self,
        identity: &ResourceIdentity,
        desired: &DesiredState,
    ) -> Result<Created, ReconcileError> {
        self.resource
            .schema()
            .validate(desired)
            .map_err(|e| self.error(Operation::Replace, Some(identity), e))?;
        info!("Replacing");
        self.delete(identity).await?;
        self.create(desired).await
    }

    /// Removes the remote object. Already absent counts as success.
    #[instrument(skip_all, fields(resource_type = self.type_name(), %identity))]
    pub async fn delete(&self, identity: &ResourceIdentity) -> Result<(), ReconcileError> {
        let mut record = LifecycleRecord::new(LifecyclePhase::Present);
        record.identity = Some(identity.clone());
        self.advance(&mut record, LifecyclePhase::Deleting, Operation::Delete)?;
        debug!("Delete");

        let bound = self.config.delete_timeout();
        let deleted =
            tokio::time::timeout(bound, self.resource.on_delete(&self.client, identity)).await;

        match deleted {
            Ok(Ok(())) => info!("Deleted"),
            Ok(Err(RemoteError::NotFound(_))) => info!("Already absent"),
            Ok(Err(e)) => {
                record.fail(&e);
                warn!(error = %e, phase = %record.phase(), "Delete failed");
                return Err(self.error(Operation::Delete, Some(identity), e));
            }
            Err(_) => {
                let kind = ErrorKind::Timeout { after: bound };
                record.fail(&kind);
                warn!(error = %kind, "Delete timed out");
                return Err(self.error(Operation::Delete, Some(identity), kind));
            }
        }

        self.advance(&mut record, LifecyclePhase::Absent, Operation::Delete)
    }

    fn advance(
        &self,
        record: &mut LifecycleRecord,
        next: LifecyclePhase,
        operation: Operation,
    ) -> Result<(), ReconcileError> {
        record.transition(next).map_err(|e| {
            self.error(
                operation,
                record.identity.as_ref(),
                ErrorKind::Rejected(e.to_string()),
            )
        })
    }
}

/// Runs `call` under `bound`, folding the elapsed case into [`ErrorKind::Timeout`].
async fn bounded<T, F>(bound: Duration, call: F) -> Result<T, ErrorKind>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(bound, call).await {
        Ok(result) => result.map_err(ErrorKind::from),
        Err(_) => Err(ErrorKind::Timeout { after: bound }),
    }
}
