use reconciler_framework::{ErrorKind, Operation, PassOutcome, RegistryError, State};
use reconciler_provider::config::ProviderConfig;
use reconciler_provider::error::ProviderError;
use reconciler_provider::lifecycle::ProviderSystem;
use reconciler_provider::resources::{index_policy, ingestion, lex_bot_association};

/// Drives every registered type through the registry, the way an orchestrator would.
#[tokio::test]
async fn test_full_provider_integration() {
    let system = ProviderSystem::new(ProviderConfig::default()).unwrap();

    assert_eq!(
        system.registry.type_names(),
        vec![
            ingestion::TYPE_NAME,
            index_policy::TYPE_NAME,
            lex_bot_association::TYPE_NAME,
        ]
    );

    let association = system.handler(lex_bot_association::TYPE_NAME).unwrap();
    let desired = State::new()
        .with("instance_id", "i-1")
        .with("bot_name", "OrderFlowers")
        .with("lex_region", "us-east-1");

    // First pass creates
    let identity = match association.reconcile(None, Some(&desired)).await.unwrap() {
        PassOutcome::Created(created) => created.identity.to_string(),
        other => panic!("expected create, got {other:?}"),
    };
    assert_eq!(identity, "i-1:OrderFlowers:us-east-1");

    // Second pass finds nothing to do
    let again = association
        .reconcile(Some(&identity), Some(&desired))
        .await
        .unwrap();
    assert!(matches!(again, PassOutcome::InSync { .. }));

    // Removed out of band: the next pass re-creates it
    let decoded = association
        .decode_identity(&identity, Operation::Read)
        .unwrap();
    association.delete(&decoded).await.unwrap();
    let recreated = association
        .reconcile(Some(&identity), Some(&desired))
        .await
        .unwrap();
    assert!(matches!(recreated, PassOutcome::Created(_)));

    // Dropped from configuration
    let gone = association.reconcile(Some(&identity), None).await.unwrap();
    assert_eq!(gone, PassOutcome::Deleted);

    let policy = system.handler(index_policy::TYPE_NAME).unwrap();
    let policy_state = State::new()
        .with("log_group_name", "/app/logs")
        .with("policy_document", r#"{"Fields": ["eventName"]}"#);
    let created = policy.reconcile(None, Some(&policy_state)).await.unwrap();
    assert!(matches!(created, PassOutcome::Created(_)));
    assert_eq!(
        policy.reconcile(None, None).await.unwrap(),
        PassOutcome::Absent
    );

    drop(association);
    drop(policy);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_resource_type() {
    let system = ProviderSystem::new(ProviderConfig::default()).unwrap();

    let err = system.handler("aws_s3_bucket").err().unwrap();
    assert!(matches!(
        err,
        ProviderError::Registry(RegistryError::UnknownResourceType(ref name)) if name == "aws_s3_bucket"
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_stored_identity_is_fatal() {
    let system = ProviderSystem::new(ProviderConfig::default()).unwrap();
    let handler = system.handler(lex_bot_association::TYPE_NAME).unwrap();

    let desired = State::new()
        .with("instance_id", "i-1")
        .with("bot_name", "OrderFlowers")
        .with("lex_region", "us-east-1");
    let err = handler
        .reconcile(Some("i-1:OrderFlowers"), Some(&desired))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedIdentity(_)));
    assert!(err.kind.is_fatal());

    drop(handler);
    system.shutdown().await.unwrap();
}
