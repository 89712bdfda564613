//! Request messages accepted by the [`CloudService`](super::CloudService).
//!
//! Each variant carries its own `oneshot` reply channel, so the service can answer out of
//! band while the caller simply awaits.

use super::error::CloudError;
use crate::model::{IndexPolicy, Ingestion, IngestionCreate, LexBot};
use reconciler_framework::Page;
use std::collections::BTreeMap;
use tokio::sync::oneshot;

pub type Response<T> = oneshot::Sender<Result<T, CloudError>>;

/// Queued misbehavior served to the next data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail the next request with this error.
    Fail(CloudError),
    /// Answer the next read as if the store were empty (a lagging replica).
    StaleRead,
}

#[derive(Debug)]
pub enum CloudRequest {
    // --- Contact center bots ---
    AssociateBot {
        instance_id: String,
        bot: LexBot,
        respond_to: Response<()>,
    },
    ListBots {
        instance_id: String,
        next_token: Option<String>,
        respond_to: Response<Page<LexBot>>,
    },
    DisassociateBot {
        instance_id: String,
        bot: LexBot,
        respond_to: Response<()>,
    },

    // --- Log index policies ---
    PutIndexPolicy {
        log_group_name: String,
        policy_document: String,
        respond_to: Response<IndexPolicy>,
    },
    DescribeIndexPolicy {
        log_group_name: String,
        respond_to: Response<IndexPolicy>,
    },
    DeleteIndexPolicy {
        log_group_name: String,
        respond_to: Response<()>,
    },

    // --- App bundle ingestions ---
    CreateIngestion {
        params: IngestionCreate,
        respond_to: Response<Ingestion>,
    },
    GetIngestion {
        app_bundle_arn: String,
        arn: String,
        respond_to: Response<Ingestion>,
    },
    TagResource {
        arn: String,
        tags: BTreeMap<String, String>,
        respond_to: Response<()>,
    },
    UntagResource {
        arn: String,
        keys: Vec<String>,
        respond_to: Response<()>,
    },
    DeleteIngestion {
        app_bundle_arn: String,
        arn: String,
        respond_to: Response<()>,
    },

    // --- Test control ---
    InjectFault {
        fault: Fault,
        respond_to: Response<()>,
    },
}

impl CloudRequest {
    /// Whether the request only reads state.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            CloudRequest::ListBots { .. }
                | CloudRequest::DescribeIndexPolicy { .. }
                | CloudRequest::GetIngestion { .. }
        )
    }
}
