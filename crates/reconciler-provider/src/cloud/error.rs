//! Error types for the in-memory cloud service.

use reconciler_framework::RemoteError;
use thiserror::Error;

/// Errors returned by cloud service calls, named after the service-side exceptions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloudError {
    #[error("ResourceNotFoundException: {0}")]
    ResourceNotFound(String),

    /// The request conflicts with existing state (duplicate association, ingestion, ...).
    #[error("ConflictException: {0}")]
    Conflict(String),

    #[error("ThrottlingException: {0}")]
    Throttling(String),

    #[error("ValidationException: {0}")]
    Validation(String),

    #[error("ServiceUnavailableException: {0}")]
    ServiceUnavailable(String),

    /// The service task has shut down and no longer accepts requests.
    #[error("Cloud service closed")]
    ServiceClosed,

    /// The service task dropped the request without answering.
    #[error("Cloud service dropped the request")]
    ServiceDropped,
}

impl From<CloudError> for RemoteError {
    fn from(err: CloudError) -> Self {
        let message = err.to_string();
        match err {
            CloudError::ResourceNotFound(_) => RemoteError::NotFound(message),
            CloudError::Throttling(_) => RemoteError::Throttled(message),
            CloudError::ServiceUnavailable(_)
            | CloudError::ServiceClosed
            | CloudError::ServiceDropped => RemoteError::Transient(message),
            CloudError::Conflict(_) | CloudError::Validation(_) => RemoteError::Rejected(message),
        }
    }
}
