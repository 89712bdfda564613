//! Association between a contact-center instance and a Lex (V1) bot.
//!
//! The remote API has no "describe association" call, so lookup walks the instance's
//! paginated bot list. Every attribute is part of the identity: any change replaces the
//! association.

use super::{identity, part, required};
use crate::cloud::CloudClient;
use crate::error::ProviderError;
use crate::model::LexBot;
use async_trait::async_trait;
use reconciler_framework::{
    find_in_pages, Attribute, DesiredState, IdentityFormat, ManagedResource, ObservedState,
    RemoteError, ResourceIdentity, ResourceSchema, State, Validator,
};
use tracing::debug;

pub const TYPE_NAME: &str = "aws_connect_lex_bot_association";

pub const IDENTITY: IdentityFormat =
    IdentityFormat::new(&["instance_id", "bot_name", "lex_region"]);

pub struct LexBotAssociation {
    schema: ResourceSchema,
}

impl LexBotAssociation {
    pub fn new() -> Result<Self, ProviderError> {
        let schema = ResourceSchema::new()
            .with_attribute(
                "instance_id",
                Attribute::required_string()
                    .force_new()
                    .describe("Identifier of the contact-center instance"),
            )
            .with_attribute(
                "bot_name",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::length_between(2, 50)),
            )
            .with_attribute(
                "lex_region",
                Attribute::required_string()
                    .force_new()
                    .validate(Validator::pattern(r"[a-z]{2}(-gov)?-[a-z]+-\d+")?)
                    .describe("Region the Lex bot lives in"),
            );
        Ok(Self { schema })
    }
}

#[async_trait]
impl ManagedResource for LexBotAssociation {
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

    async fn on_create(
        &self,
        client: &CloudClient,
        desired: &DesiredState,
    ) -> Result<ResourceIdentity, RemoteError> {
        let instance_id = required(desired, "instance_id")?;
        let bot_name = required(desired, "bot_name")?;
        let lex_region = required(desired, "lex_region")?;

        client
            .associate_bot(instance_id, LexBot::new(bot_name, lex_region))
            .await?;
        identity(IDENTITY, [instance_id, bot_name, lex_region])
    }

    async fn find(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError> {
        let instance_id = part(IDENTITY, identity, "instance_id")?;
        let bot_name = part(IDENTITY, identity, "bot_name")?;
        let lex_region = part(IDENTITY, identity, "lex_region")?;

        let found = find_in_pages(
            |token| async move {
                debug!(instance_id, ?token, "ListBots");
                client
                    .list_bots(instance_id, token)
                    .await
                    .map_err(RemoteError::from)
            },
            |bot: &LexBot| bot.name == bot_name && bot.lex_region == lex_region,
        )
        .await?;

        Ok(found.map(|bot| {
            State::new()
                .with("instance_id", instance_id)
                .with("bot_name", bot.name)
                .with("lex_region", bot.lex_region)
        }))
    }

    async fn on_delete(
        &self,
        client: &CloudClient,
        identity: &ResourceIdentity,
    ) -> Result<(), RemoteError> {
        let instance_id = part(IDENTITY, identity, "instance_id")?;
        let bot = LexBot::new(
            part(IDENTITY, identity, "bot_name")?,
            part(IDENTITY, identity, "lex_region")?,
        );
        Ok(client.disassociate_bot(instance_id, bot).await?)
    }
}
