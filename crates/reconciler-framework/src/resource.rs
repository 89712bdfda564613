//! # ManagedResource Trait
//!
//! The contract every resource type (bot association, index policy, ingestion, …) implements
//! to be driven by the generic [`LifecycleExecutor`](crate::executor::LifecycleExecutor).
//!
//! # Architecture Note
//! A resource type only maps its schema onto remote API calls. It never decides *when* to
//! call them: validation, diffing, timeouts, not-found handling and the lifecycle state
//! machine live in the executor and are written once for every type.
//!
//! # Client Injection
//! Hooks receive the remote API client as an explicit `client` argument instead of reaching
//! for a global. The executor owns the client handle, so two executors of the same type can
//! talk to two different accounts or to a mock.
//!
//! # Provided Methods
//! - [`ManagedResource::supports_update`] defaults to `false`: any change means replacement.
//! - [`ManagedResource::on_update`] defaults to [`RemoteError::Unsupported`].
//! - [`ManagedResource::import_state`] defaults to the observed state, restricted to the
//!   attributes a user can configure.

use crate::error::RemoteError;
use crate::identity::{IdentityFormat, ResourceIdentity};
use crate::schema::ResourceSchema;
use crate::state::{DesiredState, ObservedState};
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
pub trait ManagedResource: Send + Sync + 'static {
    /// Handle to the remote API, injected into every hook.
    type Client: Send + Sync;

    /// Registered type name, e.g. `aws_connect_lex_bot_association`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &ResourceSchema;

    /// Names and count of the identity parts.
    fn identity_format(&self) -> IdentityFormat;

    /// Whether non-key attributes can be changed without replacing the remote object.
    fn supports_update(&self) -> bool {
        false
    }

    // --- Remote Hooks (Async) ---

    /// Issues the creation call and returns the identity of the new remote object.
    async fn on_create(
        &self,
        client: &Self::Client,
        desired: &DesiredState,
    ) -> Result<ResourceIdentity, RemoteError>;

    /// Looks the object up. `Ok(None)` and `Err(RemoteError::NotFound)` both mean absent.
    async fn find(
        &self,
        client: &Self::Client,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError>;

    /// Applies in-place changes to non-key attributes.
    async fn on_update(
        &self,
        _client: &Self::Client,
        identity: &ResourceIdentity,
        _changed: &BTreeSet<String>,
        _desired: &DesiredState,
    ) -> Result<(), RemoteError> {
        Err(RemoteError::Unsupported(format!(
            "{} {} has no in-place update",
            self.type_name(),
            identity
        )))
    }

    /// Issues the deletion call. Reporting `NotFound` here is fine; the executor treats it as done.
    async fn on_delete(
        &self,
        client: &Self::Client,
        identity: &ResourceIdentity,
    ) -> Result<(), RemoteError>;

    /// Rebuilds desired state for an adopted resource from what the remote reports.
    fn import_state(&self, _identity: &ResourceIdentity, observed: ObservedState) -> DesiredState {
        observed.retain_configurable(self.schema())
    }
}
