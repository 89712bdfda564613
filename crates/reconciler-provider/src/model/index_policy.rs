use serde::{Deserialize, Serialize};

/// Field index policy attached to a log group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPolicy {
    pub log_group_name: String,
    /// Stored in the service's canonical (compact) JSON form.
    pub policy_document: String,
    /// Where the policy came from; always `LOG_GROUP` for policies set directly.
    pub source: String,
}
