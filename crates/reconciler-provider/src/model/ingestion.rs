use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only ingestion type the service accepts.
pub const INGESTION_TYPE_AUDIT_LOG: &str = "auditLog";

/// An audit-log ingestion defined inside an app bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingestion {
    pub arn: String,
    pub app: String,
    pub app_bundle_arn: String,
    pub tenant_id: String,
    pub ingestion_type: String,
    /// `enabled` or `disabled`. New ingestions start enabled.
    pub state: String,
    pub tags: BTreeMap<String, String>,
}

/// Parameters for creating an ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionCreate {
    pub app: String,
    pub app_bundle_arn: String,
    pub tenant_id: String,
    pub ingestion_type: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}
