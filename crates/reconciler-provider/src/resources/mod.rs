//! # Resource Types
//!
//! Each submodule maps one remote object kind onto [`ManagedResource`]: a schema, an identity
//! format and the four remote hooks. Everything else (validation, diffing, timeouts,
//! not-found handling) comes from the framework's executor.
//!
//! | type name | identity |
//! |-----------|----------|
//! | `aws_connect_lex_bot_association` | `instance_id:bot_name:lex_region` |
//! | `aws_cloudwatch_log_index_policy` | `log_group_name` |
//! | `aws_appfabric_ingestion` | `app_bundle_arn:arn` |
//!
//! [`ManagedResource`]: reconciler_framework::ManagedResource

pub mod index_policy;
pub mod ingestion;
pub mod lex_bot_association;

pub use index_policy::LogIndexPolicy;
pub use ingestion::AppFabricIngestion;
pub use lex_bot_association::LexBotAssociation;

use reconciler_framework::{IdentityFormat, RemoteError, ResourceIdentity, State};

/// Reads a string attribute the schema already guarantees is present.
fn required<'a>(state: &'a State, name: &str) -> Result<&'a str, RemoteError> {
    state
        .get_str(name)
        .ok_or_else(|| RemoteError::Rejected(format!("missing attribute {name:?}")))
}

/// Reads a named identity part.
fn part<'a>(
    format: IdentityFormat,
    identity: &'a ResourceIdentity,
    name: &str,
) -> Result<&'a str, RemoteError> {
    format.get(identity, name).ok_or_else(|| {
        RemoteError::Rejected(format!("identity {identity} has no {name:?} part ({format})"))
    })
}

/// Builds an identity from values returned by the remote.
fn identity<const N: usize>(
    format: IdentityFormat,
    parts: [&str; N],
) -> Result<ResourceIdentity, RemoteError> {
    format
        .identity(parts)
        .map_err(|e| RemoteError::Rejected(e.to_string()))
}
