//! # Mock Remote & Testing Guide
//!
//! [`MockRemote`] stands in for a cloud API. Tests queue the responses the remote should give,
//! in order, and the mock hands them out as the executor calls in. [`MockResource`] is a
//! ready-made [`ManagedResource`] whose hooks talk to a `MockRemote`, so the generic executor
//! can be exercised without writing a resource type.
//!
//! ## When to use the Mock vs a Simulated Cloud
//!
//! | Feature | MockRemote | Provider's in-memory cloud |
//! |---------|------------|----------------------------|
//! | **Determinism** | Exact call sequence asserted | Real state transitions |
//! | **Error Injection** | Any error on any call (`return_err`) | Queued faults only |
//! | **Latency** | Per-call delay (`after`) | None |
//! | **Use Case** | Executor semantics (timeouts, not-found, replacement) | Resource type mapping end to end |
//!
//! ## Example
//!
//! ```rust
//! use reconciler_framework::mock::{MockRemote, MockResource};
//! use reconciler_framework::{ExecutorConfig, LifecycleExecutor, State};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockRemote::new();
//!     let resource = MockResource::new();
//!     let identity = resource.identity(["db-1"]);
//!
//!     mock.expect_create().return_ok(identity.clone());
//!     mock.expect_find(identity.clone())
//!         .return_ok(Some(State::new().with("name", "db-1")));
//!
//!     let executor = LifecycleExecutor::new(resource, mock.clone(), ExecutorConfig::default());
//!     let created = executor.create(&State::new().with("name", "db-1")).await.unwrap();
//!     assert_eq!(created.identity, identity);
//!
//!     mock.verify();
//! }
//! ```
//!
//! ## Testing Timeouts
//!
//! Delays are served with `tokio::time::sleep`, so a test running under
//! `#[tokio::test(start_paused = true)]` can push a call past its bound without waiting for it.
//!
//! ```rust,ignore
//! mock.expect_create().after(Duration::from_secs(600)).return_ok(identity);
//! ```

use crate::error::RemoteError;
use crate::identity::{IdentityFormat, ResourceIdentity};
use crate::resource::ManagedResource;
use crate::schema::{Attribute, ResourceSchema};
use crate::state::{DesiredState, ObservedState};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A remote call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    Find(ResourceIdentity),
    Update(ResourceIdentity),
    Delete(ResourceIdentity),
}

/// A queued reply, typed by the call it answers.
#[derive(Debug)]
pub enum Response {
    Identity(Result<ResourceIdentity, RemoteError>),
    Observed(Result<Option<ObservedState>, RemoteError>),
    Unit(Result<(), RemoteError>),
}

struct Expectation {
    call: Call,
    delay: Option<Duration>,
    response: Response,
}

/// Values a queued expectation can resolve to.
pub trait MockResponse: Sized {
    fn wrap(result: Result<Self, RemoteError>) -> Response;
    fn unwrap_response(response: Response) -> Option<Result<Self, RemoteError>>;
}

impl MockResponse for ResourceIdentity {
    fn wrap(result: Result<Self, RemoteError>) -> Response {
        Response::Identity(result)
    }
    fn unwrap_response(response: Response) -> Option<Result<Self, RemoteError>> {
        match response {
            Response::Identity(r) => Some(r),
            _ => None,
        }
    }
}

impl MockResponse for Option<ObservedState> {
    fn wrap(result: Result<Self, RemoteError>) -> Response {
        Response::Observed(result)
    }
    fn unwrap_response(response: Response) -> Option<Result<Self, RemoteError>> {
        match response {
            Response::Observed(r) => Some(r),
            _ => None,
        }
    }
}

impl MockResponse for () {
    fn wrap(result: Result<Self, RemoteError>) -> Response {
        Response::Unit(result)
    }
    fn unwrap_response(response: Response) -> Option<Result<Self, RemoteError>> {
        match response {
            Response::Unit(r) => Some(r),
            _ => None,
        }
    }
}

/// In-memory stand-in for a remote API.
///
/// Cheap to clone; clones share the expectation queue and the call log.
#[derive(Clone, Default)]
pub struct MockRemote {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn expect<T: MockResponse>(&self, call: Call) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            call,
            delay: None,
            expectations: self.expectations.clone(),
            _response: PhantomData,
        }
    }

    /// Expects a create call.
    pub fn expect_create(&self) -> ExpectationBuilder<ResourceIdentity> {
        self.expect(Call::Create)
    }

    /// Expects a lookup of `identity`.
    pub fn expect_find(&self, identity: ResourceIdentity) -> ExpectationBuilder<Option<ObservedState>> {
        self.expect(Call::Find(identity))
    }

    /// Expects an in-place update of `identity`.
    pub fn expect_update(&self, identity: ResourceIdentity) -> ExpectationBuilder<()> {
        self.expect(Call::Update(identity))
    }

    /// Expects a delete of `identity`.
    pub fn expect_delete(&self, identity: ResourceIdentity) -> ExpectationBuilder<()> {
        self.expect(Call::Delete(identity))
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Serves the next queued response.
    ///
    /// # Panics
    /// When the call does not match the next expectation, or none is left.
    pub async fn respond<T: MockResponse>(&self, call: Call) -> Result<T, RemoteError> {
        lock(&self.calls).push(call.clone());
        let expectation = lock(&self.expectations).pop_front();

        let Some(expectation) = expectation else {
            panic!("Unexpected call {call:?}: no expectations left");
        };
        if expectation.call != call {
            panic!(
                "Expectation mismatch: expected {:?}, got {call:?}",
                expectation.call
            );
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        match T::unwrap_response(expectation.response) {
            Some(response) => response,
            None => panic!("Expectation for {call:?} has the wrong response type"),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = lock(&self.expectations);
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for one queued expectation.
pub struct ExpectationBuilder<T: MockResponse> {
    call: Call,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    _response: PhantomData<T>,
}

impl<T: MockResponse> ExpectationBuilder<T> {
    /// Delays the response by `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RemoteError) {
        self.push(Err(error));
    }

    fn push(self, result: Result<T, RemoteError>) {
        lock(&self.expectations).push_back(Expectation {
            call: self.call,
            delay: self.delay,
            response: T::wrap(result),
        });
    }
}

// =============================================================================
// MOCK RESOURCE TYPE
// =============================================================================

/// A configurable resource type backed by [`MockRemote`].
///
/// The default schema has a key-forming `name`, an updatable `size` and a computed `arn`,
/// identified by `name` alone.
#[derive(Debug, Clone)]
pub struct MockResource {
    type_name: &'static str,
    schema: ResourceSchema,
    format: IdentityFormat,
    supports_update: bool,
}

impl Default for MockResource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResource {
    pub fn new() -> Self {
        Self {
            type_name: "mock_resource",
            schema: ResourceSchema::new()
                .with_attribute("name", Attribute::required_string().force_new())
                .with_attribute("size", Attribute::optional_string())
                .with_attribute("arn", Attribute::computed_string()),
            format: IdentityFormat::new(&["name"]),
            supports_update: false,
        }
    }

    pub fn with_type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    pub fn with_schema(mut self, schema: ResourceSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_identity_format(mut self, format: IdentityFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_update_support(mut self) -> Self {
        self.supports_update = true;
        self
    }

    /// Builds an identity in this type's format.
    ///
    /// # Panics
    /// When the parts do not fit the format.
    pub fn identity<const N: usize>(&self, parts: [&str; N]) -> ResourceIdentity {
        match self.format.identity(parts) {
            Ok(identity) => identity,
            Err(e) => panic!("invalid mock identity: {e}"),
        }
    }
}

#[async_trait]
impl ManagedResource for MockResource {
    type Client = MockRemote;

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn identity_format(&self) -> IdentityFormat {
        self.format
    }

    fn supports_update(&self) -> bool {
        self.supports_update
    }

    async fn on_create(
        &self,
        client: &MockRemote,
        _desired: &DesiredState,
    ) -> Result<ResourceIdentity, RemoteError> {
        client.respond(Call::Create).await
    }

    async fn find(
        &self,
        client: &MockRemote,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError> {
        client.respond(Call::Find(identity.clone())).await
    }

    async fn on_update(
        &self,
        client: &MockRemote,
        identity: &ResourceIdentity,
        _changed: &BTreeSet<String>,
        _desired: &DesiredState,
    ) -> Result<(), RemoteError> {
        client.respond(Call::Update(identity.clone())).await
    }

    async fn on_delete(
        &self,
        client: &MockRemote,
        identity: &ResourceIdentity,
    ) -> Result<(), RemoteError> {
        client.respond(Call::Delete(identity.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;

    #[tokio::test]
    async fn test_mock_remote_with_expectations() {
        let mock = MockRemote::new();
        let resource = MockResource::new();
        let identity = resource.identity(["db-1"]);

        mock.expect_create().return_ok(identity.clone());
        mock.expect_find(identity.clone())
            .return_ok(Some(State::new().with("name", "db-1")));

        let created = resource
            .on_create(&mock, &State::new().with("name", "db-1"))
            .await
            .unwrap();
        assert_eq!(created, identity);

        let found = resource.find(&mock, &identity).await.unwrap();
        assert_eq!(found.unwrap().get_str("name"), Some("db-1"));

        assert_eq!(mock.calls(), vec![Call::Create, Call::Find(identity)]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_remote_returns_injected_error() {
        let mock = MockRemote::new();
        let resource = MockResource::new();
        let identity = resource.identity(["db-1"]);
        mock.expect_delete(identity.clone())
            .return_err(RemoteError::Throttled("rate exceeded".into()));

        let result = resource.on_delete(&mock, &identity).await;
        assert_eq!(result, Err(RemoteError::Throttled("rate exceeded".into())));
    }

    #[tokio::test]
    #[should_panic(expected = "Expectation mismatch")]
    async fn test_mock_remote_panics_on_mismatch() {
        let mock = MockRemote::new();
        let resource = MockResource::new();
        mock.expect_create().return_ok(resource.identity(["db-1"]));
        let _ = resource.on_delete(&mock, &resource.identity(["db-1"])).await;
    }

    #[test]
    #[should_panic(expected = "1 remaining")]
    fn test_verify_reports_unmet_expectations() {
        let mock = MockRemote::new();
        mock.expect_create()
            .return_ok(MockResource::new().identity(["db-1"]));
        mock.verify();
    }
}
