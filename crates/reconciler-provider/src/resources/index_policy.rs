//! Field index policy on a CloudWatch log group.
//!
//! Put is an upsert, so create and update share one call. The service stores the policy
//! document in its own canonical JSON form; the `Json` attribute type makes sure that
//! reformatting alone never reads as drift.

use super::{identity, part, required};
use crate::cloud::CloudClient;
use crate::error::ProviderError;
use async_trait::async_trait;
use reconciler_framework::{
    Attribute, AttributeType, DesiredState, IdentityFormat, ManagedResource, ObservedState,
    Presence, RemoteError, ResourceIdentity, ResourceSchema, State, Validator,
};
use std::collections::BTreeSet;

pub const TYPE_NAME: &str = "aws_cloudwatch_log_index_policy";

pub const IDENTITY: IdentityFormat = IdentityFormat::new(&["log_group_name"]);

pub struct LogIndexPolicy {
    schema: ResourceSchema,
}

impl LogIndexPolicy {
    pub fn new() -> Result<Self, ProviderError> {
        let schema = ResourceSchema::new()
            .with_attribute(
                "log_group_name",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::length_between(1, 512))
                    .validate(Validator::pattern(r"[\.\-_/#A-Za-z0-9]+")?),
            )
            .with_attribute(
                "policy_document",
                Attribute::new(AttributeType::Json, Presence::Required)
                    .describe("JSON field index policy"),
            );
        Ok(Self { schema })
    }
}

#[async_trait]
impl ManagedResource for LogIndexPolicy {
    type Client = CloudClient;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn identity_format(&self) -> IdentityFormat {
        IDENTITY
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn on_create(
        &self,
        client: &CloudClient,
        desired: &DesiredState,
    ) -> Result<ResourceIdentity, RemoteError> {
        let log_group_name = required(desired, "log_group_name")?;
        let policy = client
            .put_index_policy(log_group_name, required(desired, "policy_document")?)
            .await?;
        identity(IDENTITY, [policy.log_group_name.as_str()])
    }

    async fn find(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError> {
        let log_group_name = part(IDENTITY, identity, "log_group_name")?;
        let policy = client.describe_index_policy(log_group_name).await?;
        Ok(Some(
            State::new()
                .with("log_group_name", policy.log_group_name)
                .with("policy_document", policy.policy_document),
        ))
    }

    async fn on_update(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
        _changed: &BTreeSet<String>,
        desired: &DesiredState,
    ) -> Result<(), RemoteError> {
        let log_group_name = part(IDENTITY, identity, "log_group_name")?;
        client
            .put_index_policy(log_group_name, required(desired, "policy_document")?)
            .await?;
        Ok(())
    }

    async fn on_delete(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<(), RemoteError> {
        let log_group_name = part(IDENTITY, identity, "log_group_name")?;
        Ok(client.delete_index_policy(log_group_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_document_must_be_json() {
        let resource = LogIndexPolicy::new().unwrap();
        let desired = State::new()
            .with("log_group_name", "/aws/lambda/orders")
            .with("policy_document", "Fields: eventName");
        assert!(resource.schema().validate(&desired).is_err());
    }

    #[test]
    fn test_log_group_name_charset() {
        let resource = LogIndexPolicy::new().unwrap();
        let desired = State::new()
            .with("log_group_name", "orders logs")
            .with("policy_document", "{}");
        assert!(resource.schema().validate(&desired).is_err());
    }
}
