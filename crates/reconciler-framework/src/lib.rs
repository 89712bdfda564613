//! # Reconciler Framework
//!
//! This crate provides the building blocks for reconciling declared cloud resources with what
//! actually exists in a remote API. An orchestrator hands it a desired configuration and the
//! identity it recorded last time; the framework finds out what is really there, decides what
//! has to change, and drives the remote calls that converge the two.
//!
//! ## Why a Generic Executor?
//!
//! Every resource type has the same lifecycle problems: validate before calling out, tell
//! "gone" apart from "could not tell", bound every call with a timeout, refuse to mutate
//! key-forming attributes in place, and treat deleting something already deleted as success.
//! Getting those right once, in [`LifecycleExecutor`], means a resource type only has to map
//! its schema onto four remote calls.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Resource Layer** ([`ManagedResource`]) - Schema, identity format and remote hooks
//! 2. **Runtime Layer** ([`LifecycleExecutor`]) - Validation, diffing, timeouts, lifecycle
//! 3. **Interface Layer** ([`ResourceRegistry`] / [`ResourceHandler`]) - Type-erased dispatch
//!    by registered type name
//!
//! ## Core Abstractions
//!
//! ### [`ResourceIdentity`] - Composite identity
//!
//! A remote object is named by one or more string parts joined with `:`. Parts may contain `:`
//! themselves (ARNs do); such delimiters are escaped as `\:` so that decoding an encoded
//! identity always yields the original parts.
//!
//! ### [`ResourceSchema`] - Attribute rules
//!
//! Declares each attribute's type, whether it is required, optional or computed, whether
//! changing it forces replacement, and its validators.
//!
//! ### [`ManagedResource`] - The remote mapping
//!
//! ```rust
//! use async_trait::async_trait;
//! use reconciler_framework::{
//!     Attribute, DesiredState, ExecutorConfig, IdentityFormat, LifecycleExecutor,
//!     ManagedResource, ObservedState, RemoteError, ResourceIdentity, ResourceSchema,
//! };
//!
//! struct Bucket {
//!     schema: ResourceSchema,
//! }
//!
//! #[async_trait]
//! impl ManagedResource for Bucket {
//!     type Client = ();
//!
//!     fn type_name(&self) -> &'static str { "example_bucket" }
//!     fn schema(&self) -> &ResourceSchema { &self.schema }
//!     fn identity_format(&self) -> IdentityFormat { IdentityFormat::new(&["name"]) }
//!
//!     async fn on_create(&self, _: &(), desired: &DesiredState) -> Result<ResourceIdentity, RemoteError> {
//!         let name = desired.get_str("name").unwrap_or_default();
//!         self.identity_format().identity([name]).map_err(|e| RemoteError::Rejected(e.to_string()))
//!     }
//!     async fn find(&self, _: &(), identity: &ResourceIdentity) -> Result<Option<ObservedState>, RemoteError> {
//!         Ok(Some(ObservedState::new().with("name", identity.parts()[0].as_str())))
//!     }
//!     async fn on_delete(&self, _: &(), _: &ResourceIdentity) -> Result<(), RemoteError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let bucket = Bucket {
//!         schema: ResourceSchema::new().with_attribute("name", Attribute::required_string().force_new()),
//!     };
//!     let executor = LifecycleExecutor::new(bucket, (), ExecutorConfig::default());
//!
//!     let created = executor.create(&DesiredState::new().with("name", "logs")).await.unwrap();
//!     assert_eq!(created.identity.to_string(), "logs");
//!     assert!(created.observed.is_some());
//! }
//! ```
//!
//! ## Error Model
//!
//! Hooks return [`RemoteError`]. The executor folds it into an [`ErrorKind`] and wraps it in a
//! [`ReconcileError`] that names the operation, the resource type and the identity. Callers
//! branch on the kind: [`ErrorKind::is_retryable`] for transient failures and timeouts,
//! [`ErrorKind::ReplacementRequired`] to switch to delete-then-create, [`ErrorKind::NotFound`]
//! for a failed import.
//!
//! ## Concurrency Model
//!
//! - Executors hold no mutable state and can be shared across tasks
//! - Different identities may be reconciled concurrently
//! - Operations on the *same* identity must be serialized by the caller
//! - Nothing is retried internally; the orchestrator owns retry and backoff
//!
//! ## Testing
//!
//! The [`mock`] module provides a `MockRemote` with queued expectations and injectable delays,
//! plus a `MockResource` wired to it, for testing executor semantics without a real API.

pub mod config;
pub mod diff;
pub mod error;
pub mod executor;
pub mod finder;
pub mod identity;
pub mod import;
pub mod mock;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod state;
pub mod tracing;

// Re-export core types for convenience
pub use config::ExecutorConfig;
pub use diff::{diff, plan, Plan, PlanAction};
pub use error::{ErrorKind, Operation, ReconcileError, RemoteError};
pub use executor::{Created, LifecycleExecutor, ReadOutcome};
pub use finder::{find_in_pages, Lookup, Page, RemoteFinder};
pub use identity::{IdentityError, IdentityFormat, ResourceIdentity};
pub use import::{ImportResolver, Imported};
pub use registry::{PassOutcome, RegistryError, ResourceHandler, ResourceRegistry};
pub use resource::ManagedResource;
pub use schema::{Attribute, AttributeType, Presence, ResourceSchema, ValidationError, Validator};
pub use state::{DesiredState, LifecyclePhase, LifecycleRecord, ObservedState, State};
