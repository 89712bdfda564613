use reconciler_framework::mock::{Call, MockRemote, MockResource};
use reconciler_framework::{
    ErrorKind, ExecutorConfig, LifecycleExecutor, Operation, PassOutcome, RegistryError,
    ResourceRegistry, State,
};

fn registry(mock: &MockRemote) -> ResourceRegistry {
    ResourceRegistry::new()
        .with(LifecycleExecutor::new(
            MockResource::new(),
            mock.clone(),
            ExecutorConfig::default(),
        ))
        .unwrap()
        .with(LifecycleExecutor::new(
            MockResource::new()
                .with_type_name("mock_mutable")
                .with_update_support(),
            mock.clone(),
            ExecutorConfig::default(),
        ))
        .unwrap()
}

#[test]
fn test_lookup_by_type_name() {
    let mock = MockRemote::new();
    let registry = registry(&mock);

    assert_eq!(registry.type_names(), vec!["mock_mutable", "mock_resource"]);
    assert_eq!(
        registry.get("mock_resource").unwrap().type_name(),
        "mock_resource"
    );
    assert_eq!(
        registry.get("aws_nonexistent").err(),
        Some(RegistryError::UnknownResourceType("aws_nonexistent".into()))
    );
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mock = MockRemote::new();
    let result = registry(&mock).with(LifecycleExecutor::new(
        MockResource::new(),
        mock.clone(),
        ExecutorConfig::default(),
    ));
    assert_eq!(
        result.err(),
        Some(RegistryError::DuplicateResourceType("mock_resource".into()))
    );
}

#[tokio::test]
async fn test_pass_creates_untracked_resource() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();
    let identity = MockResource::new().identity(["db-1"]);
    mock.expect_create().return_ok(identity.clone());
    mock.expect_find(identity.clone())
        .return_ok(Some(State::new().with("name", "db-1")));

    let outcome = handler
        .reconcile(None, Some(&State::new().with("name", "db-1")))
        .await
        .unwrap();

    assert!(matches!(outcome, PassOutcome::Created(created) if created.identity == identity));
    mock.verify();
}

#[tokio::test]
async fn test_pass_recreates_externally_deleted_resource() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();
    let identity = MockResource::new().identity(["db-1"]);
    mock.expect_find(identity.clone()).return_ok(None);
    mock.expect_create().return_ok(identity.clone());
    mock.expect_find(identity.clone())
        .return_ok(Some(State::new().with("name", "db-1")));

    let outcome = handler
        .reconcile(Some("db-1"), Some(&State::new().with("name", "db-1")))
        .await
        .unwrap();

    assert!(matches!(outcome, PassOutcome::Created(_)));
    mock.verify();
}

#[tokio::test]
async fn test_pass_in_sync_makes_no_changes() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();
    let identity = MockResource::new().identity(["db-1"]);
    mock.expect_find(identity.clone()).return_ok(Some(
        State::new().with("name", "db-1").with("arn", "arn:mock:db/db-1"),
    ));

    let outcome = handler
        .reconcile(Some("db-1"), Some(&State::new().with("name", "db-1")))
        .await
        .unwrap();

    assert!(matches!(outcome, PassOutcome::InSync { .. }));
    assert_eq!(mock.calls(), vec![Call::Find(identity)]);
}

#[tokio::test]
async fn test_pass_invalid_configuration_names_tracked_identity() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();
    let identity = MockResource::new().identity(["db-1"]);
    mock.expect_find(identity.clone())
        .return_ok(Some(State::new().with("name", "db-1")));

    let desired = State::new()
        .with("name", "db-1")
        .with("arn", "arn:mock:db/other");
    let err = handler
        .reconcile(Some("db-1"), Some(&desired))
        .await
        .unwrap_err();

    assert_eq!(err.operation, Operation::Plan);
    assert_eq!(err.identity, "db-1");
    assert!(matches!(err.kind, ErrorKind::Validation(_)));
    assert!(err.to_string().contains("(db-1)"));
    mock.verify();
}

#[tokio::test]
async fn test_pass_updates_mutable_attribute_in_place() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_mutable").unwrap();
    let identity = MockResource::new().identity(["db-1"]);
    let desired = State::new().with("name", "db-1").with("size", "large");
    mock.expect_find(identity.clone())
        .return_ok(Some(State::new().with("name", "db-1").with("size", "small")));
    mock.expect_update(identity.clone()).return_ok(());
    mock.expect_find(identity.clone())
        .return_ok(Some(desired.clone()));

    let outcome = handler
        .reconcile(Some("db-1"), Some(&desired))
        .await
        .unwrap();

    assert!(matches!(outcome, PassOutcome::Updated { observed, .. } if observed == desired));
    mock.verify();
}

#[tokio::test]
async fn test_pass_replaces_on_key_change() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_mutable").unwrap();
    let old = MockResource::new().identity(["db-1"]);
    let new = MockResource::new().identity(["db-2"]);
    let desired = State::new().with("name", "db-2");
    mock.expect_find(old.clone())
        .return_ok(Some(State::new().with("name", "db-1")));
    mock.expect_delete(old.clone()).return_ok(());
    mock.expect_create().return_ok(new.clone());
    mock.expect_find(new.clone()).return_ok(Some(desired.clone()));

    let outcome = handler
        .reconcile(Some("db-1"), Some(&desired))
        .await
        .unwrap();

    assert!(matches!(outcome, PassOutcome::Replaced(created) if created.identity == new));
    mock.verify();
}

#[tokio::test]
async fn test_pass_deletes_resource_removed_from_config() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();
    mock.expect_delete(MockResource::new().identity(["db-1"]))
        .return_ok(());

    let outcome = handler.reconcile(Some("db-1"), None).await.unwrap();
    assert_eq!(outcome, PassOutcome::Deleted);
    assert_eq!(
        handler.reconcile(None, None).await.unwrap(),
        PassOutcome::Absent
    );
    mock.verify();
}

#[tokio::test]
async fn test_pass_with_corrupt_stored_identity_fails_fast() {
    let mock = MockRemote::new();
    let handler = registry(&mock).get("mock_resource").unwrap();

    let err = handler
        .reconcile(Some("db-1:extra"), Some(&State::new().with("name", "db-1")))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::MalformedIdentity(_)));
    assert!(err.kind.is_fatal());
    assert!(mock.calls().is_empty());
}
