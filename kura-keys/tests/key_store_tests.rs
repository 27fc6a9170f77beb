//! Key store backup / restore / delete tests

mod common;

use common::InMemoryService;
use kura_keys::snapshot::{default_snapshot_path, read_snapshot};
use kura_keys::{
    compare_snapshots, BackupOptions, DeleteOptions, KeyStore, RecordStatus, RestoreOptions,
    ScopePolicy, MASTER_SUBSCRIPTION,
};
use std::sync::Arc;
use tempfile::TempDir;

fn source_service() -> Arc<InMemoryService> {
    let service = Arc::new(InMemoryService::new("source-sub", "source-rg", "source-apim"));
    service.seed(MASTER_SUBSCRIPTION, "Built-in all-access subscription", "", "m-p", "m-s");
    service.seed("starter-1", "Starter key", "products/starter", "p1", "s1");
    service.seed("echo-1", "Echo key", "apis/echo-api", "p2", "s2");
    service.seed("unlimited-1", "Unlimited key", "products/unlimited", "p3", "s3");
    service
}

#[tokio::test]
async fn test_backup_writes_complete_records() {
    let temp = TempDir::new().unwrap();
    let service = source_service();
    let store = KeyStore::new(service.clone());
    let output = default_snapshot_path(temp.path(), "source-rg", "source-apim", None);

    let records = store
        .backup(&BackupOptions {
            product_id: None,
            output: output.clone(),
        })
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    let loaded = read_snapshot(&output).await.unwrap();
    assert_eq!(loaded, records);

    let starter = loaded.iter().find(|r| r.name == "starter-1").unwrap();
    assert_eq!(starter.properties.primary_key, "p1");
    assert_eq!(starter.properties.secondary_key, "s1");
    assert_eq!(starter.properties.created_date.as_deref(), Some("2024-01-02T03:04:05Z"));
    assert_eq!(starter.properties.state, "active");

    // one listing, then one secrets call per record in listing order
    assert_eq!(
        service.calls(),
        vec![
            "list *",
            "secrets master",
            "secrets starter-1",
            "secrets echo-1",
            "secrets unlimited-1",
        ]
    );
}

#[tokio::test]
async fn test_backup_product_filter() {
    let temp = TempDir::new().unwrap();
    let store = KeyStore::new(source_service());
    let output = default_snapshot_path(temp.path(), "source-rg", "source-apim", Some("starter"));

    let records = store
        .backup(&BackupOptions {
            product_id: Some("starter".to_string()),
            output: output.clone(),
        })
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "starter-1");
    assert!(output.ends_with("source-rg/source-apim/starter/subscriptions.json"));
    assert!(output.exists());
}

#[tokio::test]
async fn test_backup_aborts_on_secrets_failure() {
    let temp = TempDir::new().unwrap();
    let service = source_service();
    service.fail_secrets("echo-1");
    let store = KeyStore::new(service);
    let output = temp.path().join("out.json");

    let result = store
        .backup(&BackupOptions {
            product_id: None,
            output: output.clone(),
        })
        .await;

    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_restore_rewrites_scopes_and_skips_master() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("target-sub", "target-rg", "target-apim"));
    let store = KeyStore::new(target.clone());
    let tally = store.restore(&records, &RestoreOptions::default()).await;

    assert_eq!(tally.succeeded(), 3);
    assert_eq!(tally.skipped(), 1);
    assert_eq!(tally.failed(), 0);
    assert!(tally.is_success());
    assert_eq!(
        tally.to_string(),
        "3 succeeded, 1 skipped, 0 failed (out of 4 total)"
    );

    assert!(!target.names().contains(&MASTER_SUBSCRIPTION.to_string()));

    let (starter, secrets) = target.get("starter-1").unwrap();
    assert_eq!(
        starter.properties.unwrap().scope.unwrap(),
        "/subscriptions/target-sub/resourceGroups/target-rg/providers/Microsoft.ApiManagement/service/target-apim/products/starter"
    );
    assert_eq!(secrets.primary_key.as_deref(), Some("p1"));

    let (echo, _) = target.get("echo-1").unwrap();
    assert!(echo
        .properties
        .unwrap()
        .scope
        .unwrap()
        .ends_with("/service/target-apim/apis/echo-api"));
}

#[tokio::test]
async fn test_restore_master_with_override() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("target-sub", "target-rg", "target-apim"));
    let store = KeyStore::new(target.clone());
    let options = RestoreOptions {
        include_builtin: true,
        ..RestoreOptions::default()
    };
    let tally = store.restore(&records, &options).await;

    assert_eq!(tally.succeeded(), 4);
    assert_eq!(tally.skipped(), 0);

    // instance-level scope is rebuilt against the target instance
    let (master, _) = target.get(MASTER_SUBSCRIPTION).unwrap();
    assert_eq!(
        master.properties.unwrap().scope.unwrap(),
        "/subscriptions/target-sub/resourceGroups/target-rg/providers/Microsoft.ApiManagement/service/target-apim"
    );
}

#[tokio::test]
async fn test_restore_continues_after_failure() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    target.fail_create("starter-1");
    let store = KeyStore::new(target.clone());
    let tally = store.restore(&records, &RestoreOptions::default()).await;

    assert_eq!(tally.failed(), 1);
    assert_eq!(tally.succeeded(), 2);
    assert!(!tally.is_success());
    assert!(target.get("unlimited-1").is_some());

    let failed = tally
        .outcomes
        .iter()
        .find(|o| o.name == "starter-1")
        .unwrap();
    assert!(matches!(&failed.status, RecordStatus::Failed { error } if error.contains("create rejected")));
}

#[tokio::test]
async fn test_restore_counts_secrets_failure_after_create() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    target.fail_secrets("starter-1");
    let store = KeyStore::new(target.clone());
    let tally = store.restore(&records, &RestoreOptions::default()).await;

    assert_eq!(tally.failed(), 1);
    assert_eq!(tally.succeeded(), 2);
    assert!(!tally.is_success());
    // records after the failing one are still restored
    assert!(target.get("echo-1").is_some());
    assert!(target.get("unlimited-1").is_some());

    let failed = tally
        .outcomes
        .iter()
        .find(|o| o.name == "starter-1")
        .unwrap();
    assert!(matches!(&failed.status, RecordStatus::Failed { error } if error.contains("secrets unavailable for starter-1")));

    let calls = target.calls();
    let create = calls.iter().position(|c| c == "create starter-1").unwrap();
    let secrets = calls.iter().position(|c| c == "secrets starter-1").unwrap();
    assert!(create < secrets);
}

#[tokio::test]
async fn test_restore_fails_when_keys_differ_after_create() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    target.rotate_on_create("echo-1");
    let store = KeyStore::new(target.clone());
    let tally = store.restore(&records, &RestoreOptions::default()).await;

    assert_eq!(tally.failed(), 1);
    assert_eq!(tally.succeeded(), 2);
    assert!(target.get("unlimited-1").is_some());

    let failed = tally.outcomes.iter().find(|o| o.name == "echo-1").unwrap();
    assert!(matches!(&failed.status, RecordStatus::Failed { error } if error.contains("keys of subscription echo-1 differ after restore")));
}

#[tokio::test]
async fn test_restore_dry_run_changes_nothing() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    let store = KeyStore::new(target.clone());
    let options = RestoreOptions {
        dry_run: true,
        ..RestoreOptions::default()
    };
    let tally = store.restore(&records, &options).await;

    assert_eq!(tally.succeeded(), 3);
    assert!(target.calls().is_empty());
    assert!(tally
        .outcomes
        .iter()
        .any(|o| matches!(&o.status, RecordStatus::DryRun { scope: Some(s) } if s.ends_with("/service/apim/products/starter"))));
}

#[tokio::test]
async fn test_restore_require_product_policy() {
    let source = KeyStore::new(source_service());
    let records = source.fetch_records(None).await.unwrap();

    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    let store = KeyStore::new(target.clone());
    let options = RestoreOptions {
        scope_policy: ScopePolicy::RequireProduct,
        ..RestoreOptions::default()
    };
    let tally = store.restore(&records, &options).await;

    // echo-1 is API scoped and cannot be restored under this policy
    assert_eq!(tally.succeeded(), 2);
    assert_eq!(tally.failed(), 1);
    assert_eq!(tally.skipped(), 1);
    assert!(target.get("echo-1").is_none());
}

#[tokio::test]
async fn test_restore_empty_snapshot() {
    let target = Arc::new(InMemoryService::new("t", "rg", "apim"));
    let store = KeyStore::new(target.clone());
    let tally = store.restore(&[], &RestoreOptions::default()).await;
    assert_eq!(tally.total(), 0);
    assert!(tally.is_success());
    assert!(target.calls().is_empty());
}

#[tokio::test]
async fn test_restore_round_trip_compares_clean() {
    let service = source_service();
    let store = KeyStore::new(service.clone());
    let before = store.fetch_records(None).await.unwrap();

    let deleted = store.delete_all(&DeleteOptions::default()).await.unwrap();
    assert_eq!(deleted.succeeded(), 3);

    let tally = store.restore(&before, &RestoreOptions::default()).await;
    assert!(tally.is_success());

    // recreated subscriptions carry a new created date, which compare ignores
    let after = store.fetch_records(None).await.unwrap();
    let report = compare_snapshots(&before, &after);
    assert_eq!(report.matched(), 3);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_delete_skips_master_and_counts_failures() {
    let service = source_service();
    service.fail_delete("echo-1");
    let store = KeyStore::new(service.clone());

    let tally = store.delete_all(&DeleteOptions::default()).await.unwrap();
    assert_eq!(tally.succeeded(), 2);
    assert_eq!(tally.skipped(), 1);
    assert_eq!(tally.failed(), 1);

    let mut remaining = service.names();
    remaining.sort();
    assert_eq!(remaining, vec!["echo-1".to_string(), MASTER_SUBSCRIPTION.to_string()]);
}

#[tokio::test]
async fn test_delete_all_dry_run_and_product_filter() {
    let service = source_service();
    let store = KeyStore::new(service.clone());

    let options = DeleteOptions {
        product_id: Some("starter".to_string()),
        dry_run: true,
        include_builtin: true,
    };
    let tally = store.delete_all(&options).await.unwrap();
    assert_eq!(tally.total(), 1);
    assert_eq!(tally.succeeded(), 1);
    assert_eq!(service.names().len(), 4);

    let everything = DeleteOptions {
        include_builtin: true,
        ..DeleteOptions::default()
    };
    let tally = store.delete_all(&everything).await.unwrap();
    assert_eq!(tally.succeeded(), 4);
    assert!(service.names().is_empty());
}
