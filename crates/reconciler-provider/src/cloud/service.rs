//! The cloud service task: owns every remote object and answers requests one at a time.

use super::client::CloudClient;
use super::error::CloudError;
use super::message::{CloudRequest, Fault};
use crate::model::{IndexPolicy, Ingestion, IngestionCreate, LexBot, INGESTION_TYPE_AUDIT_LOG};
use reconciler_framework::Page;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default number of bots returned per `ListBots` page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory stand-in for the remote cloud API.
///
/// Runs as a single Tokio task. Requests are processed sequentially, so each request sees a
/// consistent store; tests can still make it misbehave by queueing [`Fault`]s.
pub struct CloudService {
    receiver: mpsc::Receiver<CloudRequest>,
    /// Associated bots per contact-center instance.
    instances: HashMap<String, Vec<LexBot>>,
    policies: HashMap<String, IndexPolicy>,
    /// Ingestions keyed by ARN.
    ingestions: BTreeMap<String, Ingestion>,
    faults: VecDeque<Fault>,
    page_size: usize,
}

impl CloudService {
    pub fn new(buffer_size: usize) -> (Self, CloudClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            instances: HashMap::new(),
            policies: HashMap::new(),
            ingestions: BTreeMap::new(),
            faults: VecDeque::new(),
            page_size: DEFAULT_PAGE_SIZE,
        };
        (service, CloudClient::new(sender))
    }

    /// Sets the `ListBots` page size. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn run(mut self) {
        info!(service = "cloud", "Service started");

        while let Some(request) = self.receiver.recv().await {
            match self.take_fault(&request) {
                Some(Fault::Fail(err)) => {
                    warn!(error = %err, "Injected failure");
                    request.reject(err);
                }
                Some(Fault::StaleRead) => {
                    debug!("Stale read");
                    request.answer_stale();
                }
                None => self.handle(request),
            }
        }

        info!(
            service = "cloud",
            instances = self.instances.len(),
            policies = self.policies.len(),
            ingestions = self.ingestions.len(),
            "Shutdown"
        );
    }

    /// Pops the next fault that applies to `request`. Stale reads wait for the next read;
    /// queueing a fault is never itself faulted.
    fn take_fault(&mut self, request: &CloudRequest) -> Option<Fault> {
        if matches!(request, CloudRequest::InjectFault { .. }) {
            return None;
        }
        match self.faults.front() {
            Some(Fault::Fail(_)) => self.faults.pop_front(),
            Some(Fault::StaleRead) if request.is_read() => self.faults.pop_front(),
            _ => None,
        }
    }

    fn handle(&mut self, request: CloudRequest) {
        match request {
            CloudRequest::AssociateBot {
                instance_id,
                bot,
                respond_to,
            } => {
                let _ = respond_to.send(self.associate_bot(instance_id, bot));
            }
            CloudRequest::ListBots {
                instance_id,
                next_token,
                respond_to,
            } => {
                let _ = respond_to.send(self.list_bots(&instance_id, next_token.as_deref()));
            }
            CloudRequest::DisassociateBot {
                instance_id,
                bot,
                respond_to,
            } => {
                let _ = respond_to.send(self.disassociate_bot(&instance_id, &bot));
            }
            CloudRequest::PutIndexPolicy {
                log_group_name,
                policy_document,
                respond_to,
            } => {
                let _ = respond_to.send(self.put_index_policy(log_group_name, &policy_document));
            }
            CloudRequest::DescribeIndexPolicy {
                log_group_name,
                respond_to,
            } => {
                let result = self.policies.get(&log_group_name).cloned().ok_or_else(|| {
                    CloudError::ResourceNotFound(format!("index policy for {log_group_name}"))
                });
                let _ = respond_to.send(result);
            }
            CloudRequest::DeleteIndexPolicy {
                log_group_name,
                respond_to,
            } => {
                let result = match self.policies.remove(&log_group_name) {
                    Some(_) => {
                        info!(%log_group_name, "Index policy deleted");
                        Ok(())
                    }
                    None => Err(CloudError::ResourceNotFound(format!(
                        "index policy for {log_group_name}"
                    ))),
                };
                let _ = respond_to.send(result);
            }
            CloudRequest::CreateIngestion { params, respond_to } => {
                let _ = respond_to.send(self.create_ingestion(params));
            }
            CloudRequest::GetIngestion {
                app_bundle_arn,
                arn,
                respond_to,
            } => {
                let result = self
                    .ingestions
                    .get(&arn)
                    .filter(|i| i.app_bundle_arn == app_bundle_arn)
                    .cloned()
                    .ok_or(CloudError::ResourceNotFound(arn));
                let _ = respond_to.send(result);
            }
            CloudRequest::TagResource {
                arn,
                tags,
                respond_to,
            } => {
                let result = match self.ingestions.get_mut(&arn) {
                    Some(ingestion) => {
                        debug!(%arn, ?tags, "Tag");
                        ingestion.tags.extend(tags);
                        Ok(())
                    }
                    None => Err(CloudError::ResourceNotFound(arn)),
                };
                let _ = respond_to.send(result);
            }
            CloudRequest::UntagResource {
                arn,
                keys,
                respond_to,
            } => {
                let result = match self.ingestions.get_mut(&arn) {
                    Some(ingestion) => {
                        debug!(%arn, ?keys, "Untag");
                        for key in &keys {
                            ingestion.tags.remove(key);
                        }
                        Ok(())
                    }
                    None => Err(CloudError::ResourceNotFound(arn)),
                };
                let _ = respond_to.send(result);
            }
            CloudRequest::DeleteIngestion {
                app_bundle_arn,
                arn,
                respond_to,
            } => {
                let exists = self
                    .ingestions
                    .get(&arn)
                    .is_some_and(|i| i.app_bundle_arn == app_bundle_arn);
                let result = if exists {
                    self.ingestions.remove(&arn);
                    info!(%arn, size = self.ingestions.len(), "Ingestion deleted");
                    Ok(())
                } else {
                    Err(CloudError::ResourceNotFound(arn))
                };
                let _ = respond_to.send(result);
            }
            CloudRequest::InjectFault { fault, respond_to } => {
                debug!(?fault, queued = self.faults.len() + 1, "Fault queued");
                self.faults.push_back(fault);
                let _ = respond_to.send(Ok(()));
            }
        }
    }

    fn associate_bot(&mut self, instance_id: String, bot: LexBot) -> Result<(), CloudError> {
        if bot.name.is_empty() || bot.lex_region.is_empty() {
            return Err(CloudError::Validation(
                "bot name and region are required".into(),
            ));
        }
        let bots = self.instances.entry(instance_id.clone()).or_default();
        if bots.contains(&bot) {
            return Err(CloudError::Conflict(format!(
                "bot {} ({}) is already associated with {instance_id}",
                bot.name, bot.lex_region
            )));
        }
        info!(%instance_id, bot_name = %bot.name, "Bot associated");
        bots.push(bot);
        Ok(())
    }

    fn list_bots(
        &self,
        instance_id: &str,
        next_token: Option<&str>,
    ) -> Result<Page<LexBot>, CloudError> {
        let bots = self
            .instances
            .get(instance_id)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("instance {instance_id}")))?;
        let start = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| CloudError::Validation(format!("invalid next token {token:?}")))?,
        };
        let end = (start + self.page_size).min(bots.len());
        let items = bots.get(start..end).map(<[LexBot]>::to_vec).unwrap_or_default();
        let next_token = (end < bots.len()).then(|| end.to_string());
        debug!(%instance_id, start, returned = items.len(), "ListBots");
        Ok(Page { items, next_token })
    }

    fn disassociate_bot(&mut self, instance_id: &str, bot: &LexBot) -> Result<(), CloudError> {
        let bots = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("instance {instance_id}")))?;
        let position = bots.iter().position(|b| b == bot).ok_or_else(|| {
            CloudError::ResourceNotFound(format!("bot {} on {instance_id}", bot.name))
        })?;
        bots.remove(position);
        info!(%instance_id, bot_name = %bot.name, "Bot disassociated");
        Ok(())
    }

    fn put_index_policy(
        &mut self,
        log_group_name: String,
        policy_document: &str,
    ) -> Result<IndexPolicy, CloudError> {
        let parsed: serde_json::Value = serde_json::from_str(policy_document)
            .map_err(|e| CloudError::Validation(format!("policy document: {e}")))?;
        let policy = IndexPolicy {
            log_group_name: log_group_name.clone(),
            policy_document: parsed.to_string(),
            source: "LOG_GROUP".into(),
        };
        info!(%log_group_name, "Index policy put");
        self.policies.insert(log_group_name, policy.clone());
        Ok(policy)
    }

    fn create_ingestion(&mut self, params: IngestionCreate) -> Result<Ingestion, CloudError> {
        if params.ingestion_type != INGESTION_TYPE_AUDIT_LOG {
            return Err(CloudError::Validation(format!(
                "unsupported ingestion type {:?}",
                params.ingestion_type
            )));
        }
        let duplicate = self.ingestions.values().any(|i| {
            i.app_bundle_arn == params.app_bundle_arn
                && i.app == params.app
                && i.tenant_id == params.tenant_id
        });
        if duplicate {
            return Err(CloudError::Conflict(format!(
                "ingestion for {} / {} already exists",
                params.app, params.tenant_id
            )));
        }

        let arn = format!("{}/ingestion/{}", params.app_bundle_arn, Uuid::new_v4());
        let ingestion = Ingestion {
            arn: arn.clone(),
            app: params.app,
            app_bundle_arn: params.app_bundle_arn,
            tenant_id: params.tenant_id,
            ingestion_type: params.ingestion_type,
            state: "enabled".into(),
            tags: params.tags,
        };
        self.ingestions.insert(arn.clone(), ingestion.clone());
        info!(%arn, size = self.ingestions.len(), "Ingestion created");
        Ok(ingestion)
    }
}

impl CloudRequest {
    /// Answers the request with `err`, whatever its reply type.
    fn reject(self, err: CloudError) {
        match self {
            CloudRequest::AssociateBot { respond_to, .. }
            | CloudRequest::DisassociateBot { respond_to, .. }
            | CloudRequest::DeleteIndexPolicy { respond_to, .. }
            | CloudRequest::TagResource { respond_to, .. }
            | CloudRequest::UntagResource { respond_to, .. }
            | CloudRequest::DeleteIngestion { respond_to, .. }
            | CloudRequest::InjectFault { respond_to, .. } => {
                let _ = respond_to.send(Err(err));
            }
            CloudRequest::ListBots { respond_to, .. } => {
                let _ = respond_to.send(Err(err));
            }
            CloudRequest::PutIndexPolicy { respond_to, .. }
            | CloudRequest::DescribeIndexPolicy { respond_to, .. } => {
                let _ = respond_to.send(Err(err));
            }
            CloudRequest::CreateIngestion { respond_to, .. }
            | CloudRequest::GetIngestion { respond_to, .. } => {
                let _ = respond_to.send(Err(err));
            }
        }
    }

    /// Answers a read as if nothing existed yet.
    fn answer_stale(self) {
        match self {
            CloudRequest::ListBots { respond_to, .. } => {
                let _ = respond_to.send(Ok(Page {
                    items: Vec::new(),
                    next_token: None,
                }));
            }
            CloudRequest::DescribeIndexPolicy {
                log_group_name,
                respond_to,
            } => {
                let _ = respond_to.send(Err(CloudError::ResourceNotFound(log_group_name)));
            }
            CloudRequest::GetIngestion {
                arn, respond_to, ..
            } => {
                let _ = respond_to.send(Err(CloudError::ResourceNotFound(arn)));
            }
            other => other.reject(CloudError::ServiceUnavailable("stale replica".into())),
        }
    }
}
