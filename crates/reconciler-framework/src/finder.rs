//! # Remote Finder
//!
//! Answers one question: does the object behind this identity exist right now, and if so
//! what does it look like? The answer must keep "definitely absent" apart from "could not
//! tell": the first lets the orchestrator drop the resource from state, the second must be
//! retried. Nothing is cached.

use crate::error::RemoteError;
use crate::identity::ResourceIdentity;
use crate::resource::ManagedResource;
use crate::state::ObservedState;
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(ObservedState),
    NotFound,
}

/// Read-only view over one resource type and its client.
pub struct RemoteFinder<'a, R: ManagedResource> {
    resource: &'a R,
    client: &'a R::Client,
}

impl<'a, R: ManagedResource> RemoteFinder<'a, R> {
    pub fn new(resource: &'a R, client: &'a R::Client) -> Self {
        Self { resource, client }
    }

    /// Queries the remote API.
    ///
    /// Errors other than `NotFound` are returned as-is; they never mean absent.
    pub async fn find(&self, identity: &ResourceIdentity) -> Result<Lookup, RemoteError> {
        let resource_type = self.resource.type_name();
        match self.resource.find(self.client, identity).await {
            Ok(Some(observed)) => {
                debug!(resource_type, %identity, attributes = observed.len(), "Found");
                Ok(Lookup::Found(observed))
            }
            Ok(None) | Err(RemoteError::NotFound(_)) => {
                debug!(resource_type, %identity, "Not found");
                Ok(Lookup::NotFound)
            }
            Err(e) => {
                warn!(resource_type, %identity, error = %e, "Lookup failed");
                Err(e)
            }
        }
    }
}

/// One page of a paginated list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Walks a paginated list endpoint until `predicate` matches or the pages run out.
///
/// A failure on any page aborts the scan with that error; a partial scan never reports absent.
pub async fn find_in_pages<T, F, Fut, P>(
    mut fetch: F,
    mut predicate: P,
) -> Result<Option<T>, RemoteError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteError>>,
    P: FnMut(&T) -> bool,
{
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        if let Some(found) = page.items.into_iter().find(|item| predicate(item)) {
            return Ok(Some(found));
        }
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(None),
        }
    }
}
