//! Audit-log ingestion inside an AppFabric app bundle.
//!
//! The service assigns the ingestion ARN, so the identity is only known once create returns.
//! Both identity parts are ARNs and contain `:`, which the identity codec escapes. Tags are
//! the only attribute that can change in place.

use super::{identity, part, required};
use crate::cloud::CloudClient;
use crate::error::ProviderError;
use crate::model::{Ingestion, IngestionCreate, INGESTION_TYPE_AUDIT_LOG};
use async_trait::async_trait;
use reconciler_framework::{
    Attribute, AttributeType, DesiredState, IdentityFormat, ManagedResource, ObservedState,
    Presence, RemoteError, ResourceIdentity, ResourceSchema, State, Validator,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const TYPE_NAME: &str = "aws_appfabric_ingestion";

pub const IDENTITY: IdentityFormat = IdentityFormat::new(&["app_bundle_arn", "arn"]);

pub struct AppFabricIngestion {
    schema: ResourceSchema,
}

impl AppFabricIngestion {
    pub fn new() -> Result<Self, ProviderError> {
        let schema = ResourceSchema::new()
            .with_attribute("app", Attribute::required_string().force_new())
            .with_attribute(
                "app_bundle_arn",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::pattern(
                        r"arn:[\w-]+:appfabric:[\w-]+:\d{12}:appbundle/[\w-]+",
                    )?),
            )
            .with_attribute("tenant_id", Attribute::required_string().force_new())
            .with_attribute(
                "ingestion_type",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::one_of([INGESTION_TYPE_AUDIT_LOG])),
            )
            .with_attribute(
                "tags",
                Attribute::new(AttributeType::StringMap, Presence::Optional),
            )
            .with_attribute("arn", Attribute::computed_string());
        Ok(Self { schema })
    }
}

fn tags_of(state: &State) -> BTreeMap<String, String> {
    state
        .get("tags")
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn observed(ingestion: Ingestion) -> ObservedState {
    let tags: serde_json::Map<String, Value> = ingestion
        .tags
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    State::new()
        .with("app", ingestion.app)
        .with("app_bundle_arn", ingestion.app_bundle_arn)
        .with("tenant_id", ingestion.tenant_id)
        .with("ingestion_type", ingestion.ingestion_type)
        .with("tags", Value::Object(tags))
        .with("arn", ingestion.arn)
}

#[async_trait]
impl ManagedResource for AppFabricIngestion {
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
        let params = IngestionCreate {
            app: required(desired, "app")?.to_string(),
            app_bundle_arn: required(desired, "app_bundle_arn")?.to_string(),
            tenant_id: required(desired, "tenant_id")?.to_string(),
            ingestion_type: required(desired, "ingestion_type")?.to_string(),
            tags: tags_of(desired),
        };
        let ingestion = client.create_ingestion(params).await?;
        identity(
            IDENTITY,
            [ingestion.app_bundle_arn.as_str(), ingestion.arn.as_str()],
        )
    }

    async fn find(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError> {
        let app_bundle_arn = part(IDENTITY, identity, "app_bundle_arn")?;
        let arn = part(IDENTITY, identity, "arn")?;
        let ingestion = client.get_ingestion(app_bundle_arn, arn).await?;
        Ok(Some(observed(ingestion)))
    }

    async fn on_update(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
        changed: &BTreeSet<String>,
        desired: &DesiredState,
    ) -> Result<(), RemoteError> {
        if !changed.contains("tags") {
            return Ok(());
        }
        let app_bundle_arn = part(IDENTITY, identity, "app_bundle_arn")?;
        let arn = part(IDENTITY, identity, "arn")?;

        let wanted = tags_of(desired);
        let current = client.get_ingestion(app_bundle_arn, arn).await?.tags;
        let removed: Vec<String> = current
            .keys()
            .filter(|key| !wanted.contains_key(*key))
            .cloned()
            .collect();
        debug!(%arn, ?removed, "Retag");

        if !removed.is_empty() {
            client.untag_resource(arn, removed).await?;
        }
        if !wanted.is_empty() {
            client.tag_resource(arn, wanted).await?;
        }
        Ok(())
    }

    async fn on_delete(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<(), RemoteError> {
        let app_bundle_arn = part(IDENTITY, identity, "app_bundle_arn")?;
        let arn = part(IDENTITY, identity, "arn")?;
        Ok(client.delete_ingestion(app_bundle_arn, arn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desired() -> State {
        State::new()
            .with("app", "OKTA")
            .with(
                "app_bundle_arn",
                "arn:aws:appfabric:us-east-1:123456789012:appbundle/a1b2c3",
            )
            .with("tenant_id", "example.okta.com")
            .with("ingestion_type", "auditLog")
    }

    #[test]
    fn test_valid_configuration() {
        let resource = AppFabricIngestion::new().unwrap();
        assert!(resource.schema().validate(&desired()).is_ok());
    }

    #[test]
    fn test_only_audit_log_ingestions() {
        let resource = AppFabricIngestion::new().unwrap();
        let state = desired().with("ingestion_type", "metrics");
        assert!(resource.schema().validate(&state).is_err());
    }

    #[test]
    fn test_arn_cannot_be_configured() {
        let resource = AppFabricIngestion::new().unwrap();
        let state = desired().with("arn", "arn:aws:appfabric:us-east-1:123456789012:x");
        assert!(resource.schema().validate(&state).is_err());
    }

    #[test]
    fn test_tags_of_ignores_non_string_values() {
        let state = desired().with("tags", json!({"team": "sec", "count": 3}));
        assert_eq!(
            tags_of(&state),
            BTreeMap::from([("team".to_string(), "sec".to_string())])
        );
    }

    #[test]
    fn test_only_tags_update_in_place() {
        let resource = AppFabricIngestion::new().unwrap();
        assert!(!resource.schema().is_force_new("tags"));
        assert!(resource.schema().is_force_new("tenant_id"));
        assert!(resource.supports_update());
    }
}
