//! Typed handle for talking to the [`CloudService`](super::CloudService).

use super::error::CloudError;
use super::message::{CloudRequest, Fault, Response};
use crate::model::{IndexPolicy, Ingestion, IngestionCreate, LexBot};
use reconciler_framework::Page;
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};

/// Cheap-to-clone client. Every clone talks to the same service task.
#[derive(Clone)]
pub struct CloudClient {
    sender: mpsc::Sender<CloudRequest>,
}

impl CloudClient {
    pub fn new(sender: mpsc::Sender<CloudRequest>) -> Self {
        Self { sender }
    }

    /// Sends a request built around a fresh reply channel and awaits the answer.
    async fn call<T>(
        &self,
        request: impl FnOnce(Response<T>) -> CloudRequest,
    ) -> Result<T, CloudError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| CloudError::ServiceClosed)?;
        response.await.map_err(|_| CloudError::ServiceDropped)?
    }

    pub async fn associate_bot(
        &self,
        instance_id: impl Into<String>,
        bot: LexBot,
    ) -> Result<(), CloudError> {
        let instance_id = instance_id.into();
        self.call(|respond_to| CloudRequest::AssociateBot {
            instance_id,
            bot,
            respond_to,
        })
        .await
    }

    pub async fn list_bots(
        &self,
        instance_id: impl Into<String>,
        next_token: Option<String>,
    ) -> Result<Page<LexBot>, CloudError> {
        let instance_id = instance_id.into();
        self.call(|respond_to| CloudRequest::ListBots {
            instance_id,
            next_token,
            respond_to,
        })
        .await
    }

    pub async fn disassociate_bot(
        &self,
        instance_id: impl Into<String>,
        bot: LexBot,
    ) -> Result<(), CloudError> {
        let instance_id = instance_id.into();
        self.call(|respond_to| CloudRequest::DisassociateBot {
            instance_id,
            bot,
            respond_to,
        })
        .await
    }

    pub async fn put_index_policy(
        &self,
        log_group_name: impl Into<String>,
        policy_document: impl Into<String>,
    ) -> Result<IndexPolicy, CloudError> {
        let log_group_name = log_group_name.into();
        let policy_document = policy_document.into();
        self.call(|respond_to| CloudRequest::PutIndexPolicy {
            log_group_name,
            policy_document,
            respond_to,
        })
        .await
    }

    pub async fn describe_index_policy(
        &self,
        log_group_name: impl Into<String>,
    ) -> Result<IndexPolicy, CloudError> {
        let log_group_name = log_group_name.into();
        self.call(|respond_to| CloudRequest::DescribeIndexPolicy {
            log_group_name,
            respond_to,
        })
        .await
    }

    pub async fn delete_index_policy(
        &self,
        log_group_name: impl Into<String>,
    ) -> Result<(), CloudError> {
        let log_group_name = log_group_name.into();
        self.call(|respond_to| CloudRequest::DeleteIndexPolicy {
            log_group_name,
            respond_to,
        })
        .await
    }

    pub async fn create_ingestion(&self, params: IngestionCreate) -> Result<Ingestion, CloudError> {
        self.call(|respond_to| CloudRequest::CreateIngestion { params, respond_to })
            .await
    }

    pub async fn get_ingestion(
        &self,
        app_bundle_arn: impl Into<String>,
        arn: impl Into<String>,
    ) -> Result<Ingestion, CloudError> {
        let app_bundle_arn = app_bundle_arn.into();
        let arn = arn.into();
        self.call(|respond_to| CloudRequest::GetIngestion {
            app_bundle_arn,
            arn,
            respond_to,
        })
        .await
    }

    pub async fn tag_resource(
        &self,
        arn: impl Into<String>,
        tags: BTreeMap<String, String>,
    ) -> Result<(), CloudError> {
        let arn = arn.into();
        self.call(|respond_to| CloudRequest::TagResource {
            arn,
            tags,
            respond_to,
        })
        .await
    }

    pub async fn untag_resource(
        &self,
        arn: impl Into<String>,
        keys: Vec<String>,
    ) -> Result<(), CloudError> {
        let arn = arn.into();
        self.call(|respond_to| CloudRequest::UntagResource {
            arn,
            keys,
            respond_to,
        })
        .await
    }

    pub async fn delete_ingestion(
        &self,
        app_bundle_arn: impl Into<String>,
        arn: impl Into<String>,
    ) -> Result<(), CloudError> {
        let app_bundle_arn = app_bundle_arn.into();
        let arn = arn.into();
        self.call(|respond_to| CloudRequest::DeleteIngestion {
            app_bundle_arn,
            arn,
            respond_to,
        })
        .await
    }

    /// Queues a fault for the next request (or, for [`Fault::StaleRead`], the next read).
    pub async fn inject_fault(&self, fault: Fault) -> Result<(), CloudError> {
        self.call(|respond_to| CloudRequest::InjectFault { fault, respond_to })
            .await
    }
}
