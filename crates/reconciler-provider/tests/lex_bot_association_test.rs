use reconciler_framework::{
    ErrorKind, ExecutorConfig, IdentityError, LifecycleExecutor, ManagedResource, Operation, PlanAction,
    ReadOutcome, State,
};
use reconciler_provider::cloud::{CloudClient, CloudError, CloudService, Fault};
use reconciler_provider::model::LexBot;
use reconciler_provider::resources::LexBotAssociation;

const INSTANCE: &str = "aaaaaaaa-bbbb-cccc-dddd-111111111111";

fn executor(page_size: usize) -> (LifecycleExecutor<LexBotAssociation>, CloudClient) {
    let (service, cloud) = CloudService::new(16);
    tokio::spawn(service.with_page_size(page_size).run());
    let executor = LifecycleExecutor::new(
        LexBotAssociation::new().unwrap(),
        cloud.clone(),
        ExecutorConfig::default(),
    );
    (executor, cloud)
}

fn desired(bot_name: &str) -> State {
    State::new()
        .with("instance_id", INSTANCE)
        .with("bot_name", bot_name)
        .with("lex_region", "us-east-1")
}

#[tokio::test]
async fn test_create_then_read_is_consistent() {
    let (executor, _cloud) = executor(10);

    let created = executor.create(&desired("OrderFlowers")).await.unwrap();
    assert_eq!(
        created.identity.to_string(),
        format!("{INSTANCE}:OrderFlowers:us-east-1")
    );
    assert_eq!(created.observed.as_ref(), Some(&desired("OrderFlowers")));

    let read = executor.read(&created.identity).await.unwrap();
    assert_eq!(read, ReadOutcome::Present(desired("OrderFlowers")));

    let observed = created.observed.unwrap();
    let plan = executor
        .plan(Some(&created.identity), &desired("OrderFlowers"), &observed)
        .unwrap();
    assert_eq!(plan.action, PlanAction::NoOp);
}

#[tokio::test]
async fn test_import_with_missing_parts_fails_before_any_call() {
    let (executor, cloud) = executor(10);
    // Any remote call would hit this fault first.
    cloud
        .inject_fault(Fault::Fail(CloudError::ServiceUnavailable("down".into())))
        .await
        .unwrap();

    let err = executor.import("onlyonepart").await.unwrap_err();
    assert_eq!(err.operation, Operation::Import);
    assert!(matches!(
        err.kind,
        ErrorKind::MalformedIdentity(IdentityError::WrongPartCount {
            expected: 3,
            found: 1,
            ..
        })
    ));

    // The fault is still queued.
    assert!(cloud.list_bots(INSTANCE, None).await.is_err());
}

#[tokio::test]
async fn test_import_existing_association() {
    let (executor, cloud) = executor(10);
    cloud
        .associate_bot("i-1", LexBot::new("bot-a", "us-east-1"))
        .await
        .unwrap();

    let imported = executor.import("i-1:bot-a:us-east-1").await.unwrap();
    assert_eq!(imported.identity.parts(), ["i-1", "bot-a", "us-east-1"]);
    assert_eq!(
        imported.desired,
        State::new()
            .with("instance_id", "i-1")
            .with("bot_name", "bot-a")
            .with("lex_region", "us-east-1")
    );
}

#[tokio::test]
async fn test_import_absent_association_is_not_found() {
    let (executor, cloud) = executor(10);
    cloud
        .associate_bot("i-1", LexBot::new("bot-a", "us-east-1"))
        .await
        .unwrap();

    let err = executor.import("i-1:bot-b:us-east-1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_external_delete_reads_as_removed() {
    let (executor, cloud) = executor(10);
    let created = executor.create(&desired("OrderFlowers")).await.unwrap();

    cloud
        .disassociate_bot(INSTANCE, LexBot::new("OrderFlowers", "us-east-1"))
        .await
        .unwrap();

    assert_eq!(
        executor.read(&created.identity).await.unwrap(),
        ReadOutcome::Removed
    );
}

#[tokio::test]
async fn test_delete_twice_succeeds() {
    let (executor, _cloud) = executor(10);
    let created = executor.create(&desired("OrderFlowers")).await.unwrap();

    executor.delete(&created.identity).await.unwrap();
    executor.delete(&created.identity).await.unwrap();
    assert_eq!(
        executor.read(&created.identity).await.unwrap(),
        ReadOutcome::Removed
    );
}

#[tokio::test]
async fn test_throttled_read_is_transient_not_removed() {
    let (executor, cloud) = executor(10);
    let created = executor.create(&desired("OrderFlowers")).await.unwrap();

    cloud
        .inject_fault(Fault::Fail(CloudError::Throttling("rate exceeded".into())))
        .await
        .unwrap();

    let err = executor.read(&created.identity).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err.kind, ErrorKind::Transient(_)));

    assert!(matches!(
        executor.read(&created.identity).await.unwrap(),
        ReadOutcome::Present(_)
    ));
}

#[tokio::test]
async fn test_stale_read_after_create_leaves_attributes_unknown() {
    let (executor, cloud) = executor(10);
    cloud.inject_fault(Fault::StaleRead).await.unwrap();

    let created = executor.create(&desired("OrderFlowers")).await.unwrap();
    assert_eq!(created.observed, None);

    // No rollback: the association exists once the replica catches up.
    assert!(matches!(
        executor.read(&created.identity).await.unwrap(),
        ReadOutcome::Present(_)
    ));
}

#[tokio::test]
async fn test_lookup_walks_every_page() {
    let (executor, cloud) = executor(2);
    for i in 0..7 {
        cloud
            .associate_bot(INSTANCE, LexBot::new(format!("bot-{i}"), "us-east-1"))
            .await
            .unwrap();
    }

    let identity = executor
        .resource()
        .identity_format()
        .identity([INSTANCE, "bot-6", "us-east-1"])
        .unwrap();
    assert!(matches!(
        executor.read(&identity).await.unwrap(),
        ReadOutcome::Present(_)
    ));

    let wrong_region = executor
        .resource()
        .identity_format()
        .identity([INSTANCE, "bot-6", "eu-west-1"])
        .unwrap();
    assert_eq!(
        executor.read(&wrong_region).await.unwrap(),
        ReadOutcome::Removed
    );
}

#[tokio::test]
async fn test_renaming_the_bot_requires_replacement() {
    let (executor, _cloud) = executor(10);
    let created = executor.create(&desired("OrderFlowers")).await.unwrap();
    let observed = created.observed.unwrap();

    let plan = executor
        .plan(Some(&created.identity), &desired("BookTrip"), &observed)
        .unwrap();
    assert_eq!(plan.action, PlanAction::Replace);

    let err = executor
        .update(&created.identity, &plan.changed, &desired("BookTrip"))
        .await
        .unwrap_err();
    assert!(err.is_replacement_required());

    // Nothing was touched remotely.
    assert!(matches!(
        executor.read(&created.identity).await.unwrap(),
        ReadOutcome::Present(_)
    ));
}

#[tokio::test]
async fn test_invalid_region_is_rejected_before_create() {
    let (executor, cloud) = executor(10);
    let err = executor
        .create(&desired("OrderFlowers").with("lex_region", "Virginia"))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation(_)));
    assert!(matches!(
        cloud.list_bots(INSTANCE, None).await,
        Err(CloudError::ResourceNotFound(_))
    ));
}
