//! # Resource Registry
//!
//! Maps registered type names (`aws_connect_lex_bot_association`, ...) to type-erased
//! handlers so an orchestrator can drive heterogeneous resources through one interface.
//!
//! [`ResourceHandler`] is the object-safe face of a [`LifecycleExecutor`]. Every executor gets
//! it for free through a blanket impl. The provided [`ResourceHandler::reconcile`] runs one
//! full pass (read, plan, converge) for a single resource.

use crate::diff::{Plan, PlanAction};
use crate::error::{Operation, ReconcileError};
use crate::executor::{Created, LifecycleExecutor, ReadOutcome};
use crate::identity::{IdentityFormat, ResourceIdentity};
use crate::import::Imported;
use crate::resource::ManagedResource;
use crate::schema::ResourceSchema;
use crate::state::{DesiredState, ObservedState};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// Remote already matches desired configuration.
    InSync {
        identity: ResourceIdentity,
        observed: ObservedState,
    },
    Created(Created),
    Updated {
        identity: ResourceIdentity,
        observed: ObservedState,
    },
    Replaced(Created),
    Deleted,
    /// Nothing desired and nothing tracked.
    Absent,
}

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> &ResourceSchema;
    fn identity_format(&self) -> IdentityFormat;

    fn plan(
        &self,
        identity: Option<&ResourceIdentity>,
        desired: &DesiredState,
        observed: &ObservedState,
    ) -> Result<Plan, ReconcileError>;

    async fn create(&self, desired: &DesiredState) -> Result<Created, ReconcileError>;
    async fn read(&self, identity: &ResourceIdentity) -> Result<ReadOutcome, ReconcileError>;
    async fn update(
        &self,
        identity: &ResourceIdentity,
        changed: &BTreeSet<String>,
        desired: &DesiredState,
    ) -> Result<ObservedState, ReconcileError>;
    async fn replace(
        &self,
        identity: &ResourceIdentity,
        desired: &DesiredState,
    ) -> Result<Created, ReconcileError>;
    async fn delete(&self, identity: &ResourceIdentity) -> Result<(), ReconcileError>;
    async fn import(&self, raw: &str) -> Result<Imported, ReconcileError>;

    /// Decodes a stored identity string for this type.
    fn decode_identity(
        &self,
        raw: &str,
        operation: Operation,
    ) -> Result<ResourceIdentity, ReconcileError> {
        self.identity_format()
            .decode(raw)
            .map_err(|e| ReconcileError::new(operation, self.type_name(), raw, e))
    }

    /// Runs one pass for a single resource.
    ///
    /// `prior` is the identity recorded by the last pass, if any. `desired` is `None` when the
    /// resource was removed from configuration.
    async fn reconcile(
        &self,
        prior: Option<&str>,
        desired: Option<&DesiredState>,
    ) -> Result<PassOutcome, ReconcileError> {
        let (raw, desired) = match (prior, desired) {
            (None, None) => return Ok(PassOutcome::Absent),
            (Some(raw), None) => {
                let identity = self.decode_identity(raw, Operation::Delete)?;
                self.delete(&identity).await?;
                return Ok(PassOutcome::Deleted);
            }
            (None, Some(desired)) => return self.create(desired).await.map(PassOutcome::Created),
            (Some(raw), Some(desired)) => (raw, desired),
        };

        let identity = self.decode_identity(raw, Operation::Read)?;
        let observed = match self.read(&identity).await? {
            ReadOutcome::Present(observed) => observed,
            ReadOutcome::Removed => {
                info!(resource_type = self.type_name(), %identity, "Recreating removed resource");
                return self.create(desired).await.map(PassOutcome::Created);
            }
        };

        let plan = self.plan(Some(&identity), desired, &observed)?;
        debug!(resource_type = self.type_name(), %identity, action = ?plan.action, "Planned");
        match plan.action {
            PlanAction::NoOp => Ok(PassOutcome::InSync { identity, observed }),
            PlanAction::Update => {
                let observed = self.update(&identity, &plan.changed, desired).await?;
                Ok(PassOutcome::Updated { identity, observed })
            }
            PlanAction::Replace => self
                .replace(&identity, desired)
                .await
                .map(PassOutcome::Replaced),
        }
    }
}

#[async_trait]
impl<R: ManagedResource> ResourceHandler for LifecycleExecutor<R> {
    fn type_name(&self) -> &'static str {
        self.resource().type_name()
    }

    fn schema(&self) -> &ResourceSchema {
        self.resource().schema()
    }

    fn identity_format(&self) -> IdentityFormat {
        self.resource().identity_format()
    }

    fn plan(
        &self,
        identity: Option<&ResourceIdentity>,
        desired: &DesiredState,
        observed: &ObservedState,
    ) -> Result<Plan, ReconcileError> {
        LifecycleExecutor::plan(self, identity, desired, observed)
    }

    async fn create(&self, desired: &DesiredState) -> Result<Created, ReconcileError> {
        LifecycleExecutor::create(self, desired).await
    }

    async fn read(&self, identity: &ResourceIdentity) -> Result<ReadOutcome, ReconcileError> {
        LifecycleExecutor::read(self, identity).await
    }

    async fn update(
        &self,
        identity: &ResourceIdentity,
        changed: &BTreeSet<String>,
        desired: &DesiredState,
    ) -> Result<ObservedState, ReconcileError> {
        LifecycleExecutor::update(self, identity, changed, desired).await
    }

    async fn replace(
        &self,
        identity: &ResourceIdentity,
        desired: &DesiredState,
    ) -> Result<Created, ReconcileError> {
        LifecycleExecutor::replace(self, identity, desired).await
    }

    async fn delete(&self, identity: &ResourceIdentity) -> Result<(), ReconcileError> {
        LifecycleExecutor::delete(self, identity).await
    }

    async fn import(&self, raw: &str) -> Result<Imported, ReconcileError> {
        LifecycleExecutor::import(self, raw).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
    #[error("resource type already registered: {0}")]
    DuplicateResourceType(String),
}

/// Lookup table from type name to handler.
#[derive(Default, Clone)]
pub struct ResourceRegistry {
    handlers: HashMap<&'static str, Arc<dyn ResourceHandler>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) -> Result<(), RegistryError> {
        let name = handler.type_name();
        if self.handlers.contains_key(name) {
            return Err(RegistryError::DuplicateResourceType(name.to_string()));
        }
        debug!(resource_type = name, "Registered resource type");
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Builder form of [`register`](Self::register) for a concrete executor.
    pub fn with<R: ManagedResource>(
        mut self,
        executor: LifecycleExecutor<R>,
    ) -> Result<Self, RegistryError> {
        self.register(Arc::new(executor))?;
        Ok(self)
    }

    pub fn get(&self, type_name: &str) -> Result<Arc<dyn ResourceHandler>, RegistryError> {
        self.handlers
            .get(type_name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownResourceType(type_name.to_string()))
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
