//! # Reconciler Errors
//!
//! Errors are layered the same way the calls are:
//!
//! - [`RemoteError`] is what a resource type's hooks return when talking to the remote API.
//!   It only has to say *what kind* of failure happened.
//! - [`ErrorKind`] is the taxonomy the orchestrator acts on (retry, drop from state, replace, give up).
//! - [`ReconcileError`] wraps a kind with the failing operation, the resource type and the identity,
//!   so every user-visible failure says which resource and which step failed.

use crate::identity::IdentityError;
use crate::schema::ValidationError;
use std::fmt;
use std::time::Duration;

/// Failure reported by a remote API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The remote object definitively does not exist.
    #[error("remote object not found: {0}")]
    NotFound(String),
    #[error("request throttled: {0}")]
    Throttled(String),
    /// Network or service-side failure; the outcome of the call is unknown.
    #[error("transient remote failure: {0}")]
    Transient(String),
    /// The remote API refused the request (bad input, conflict, quota).
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("operation not supported: {0}")]
    Unsupported(String),
}

/// The operation a [`ReconcileError`] was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Plan,
    Create,
    Read,
    Update,
    Replace,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Plan => "plan",
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Import => "import",
        };
        f.write_str(name)
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("not found")]
    NotFound,
    /// Network or throttling failure. The orchestrator owns the retry policy.
    #[error("transient error: {0}")]
    Transient(String),
    /// Desired configuration violates the schema. Raised before any remote call.
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    /// A key-forming attribute changed (or the type has no in-place update).
    /// Not a failure: the orchestrator must delete and re-create.
    #[error("replacement required: {}", attributes.join(", "))]
    ReplacementRequired { attributes: Vec<String> },
    /// The bound elapsed before the remote answered. The remote outcome is unknown.
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("remote rejected request: {0}")]
    Rejected(String),
    #[error("ambiguous or malformed identity: {0}")]
    MalformedIdentity(#[from] IdentityError),
}

impl ErrorKind {
    /// Whether the orchestrator may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transient(_) | ErrorKind::Timeout { .. })
    }

    /// Errors that will fail again no matter how often they are retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::MalformedIdentity(_))
    }
}

impl From<RemoteError> for ErrorKind {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(_) => ErrorKind::NotFound,
            RemoteError::Throttled(msg) | RemoteError::Transient(msg) => {
                ErrorKind::Transient(msg)
            }
            RemoteError::Rejected(msg) | RemoteError::Unsupported(msg) => {
                ErrorKind::Rejected(msg)
            }
        }
    }
}

/// A failed lifecycle operation, carrying enough context to be shown to a user as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{operation} {resource_type} ({identity}): {kind}")]
pub struct ReconcileError {
    pub operation: Operation,
    pub resource_type: String,
    /// Encoded identity, or `-` when the failure happened before one was known.
    pub identity: String,
    #[source]
    pub kind: ErrorKind,
}

impl ReconcileError {
    pub fn new(
        operation: Operation,
        resource_type: impl Into<String>,
        identity: impl Into<String>,
        kind: impl Into<ErrorKind>,
    ) -> Self {
        Self {
            operation,
            resource_type: resource_type.into(),
            identity: identity.into(),
            kind: kind.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn is_replacement_required(&self) -> bool {
        matches!(self.kind, ErrorKind::ReplacementRequired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_operation_type_and_identity() {
        let err = ReconcileError::new(
            Operation::Delete,
            "aws_connect_lex_bot_association",
            "i-1:bot-a:us-east-1",
            RemoteError::Rejected("instance is busy".into()),
        );
        assert_eq!(
            err.to_string(),
            "delete aws_connect_lex_bot_association (i-1:bot-a:us-east-1): remote rejected request: instance is busy"
        );
    }

    #[test]
    fn test_remote_errors_classify() {
        assert!(ErrorKind::from(RemoteError::Throttled("rate".into())).is_retryable());
        assert!(ErrorKind::from(RemoteError::Transient("reset".into())).is_retryable());
        assert!(!ErrorKind::from(RemoteError::Rejected("bad".into())).is_retryable());
        assert_eq!(
            ErrorKind::from(RemoteError::NotFound("x".into())),
            ErrorKind::NotFound
        );
        assert!(ErrorKind::Timeout {
            after: Duration::from_secs(1)
        }
        .is_retryable());
    }

    #[test]
    fn test_malformed_identity_is_fatal() {
        let kind = ErrorKind::from(IdentityError::NoComponents);
        assert!(kind.is_fatal());
        assert!(!kind.is_retryable());
        assert!(kind
            .to_string()
            .starts_with("ambiguous or malformed identity"));
    }
}
