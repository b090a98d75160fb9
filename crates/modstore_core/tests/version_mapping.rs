use async_trait::async_trait;
use modstore_core::{
    parse_timestamp, register_module_collections, CollectionDefinition, CollectionVersionMapEntry,
    CurrentVersionPolicy, ExecutorResult, ModuleVersionMappings, OperationExecutor,
    OperationRequest, RegistryError, StorageModule, StorageModuleConfig, StorageModuleRegistry,
    Timestamp, VersionMapError,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

struct NoopExecutor;

#[async_trait]
impl OperationExecutor for NoopExecutor {
    async fn execute(&self, _request: OperationRequest<'_>) -> ExecutorResult<Value> {
        Ok(Value::Null)
    }
}

fn day(value: &str) -> Timestamp {
    parse_timestamp(value).expect("valid date")
}

fn mapping(module: &str, application: &str) -> CollectionVersionMapEntry {
    CollectionVersionMapEntry::new(day(module), day(application))
}

fn sync_log_module() -> StorageModule {
    let config = StorageModuleConfig::from_json_str(
        r#"{
            "collections": {
                "sharedSyncLogEntry": {
                    "version": "2019-03-03",
                    "fields": { "data": { "type": "json" } },
                    "history": [
                        { "version": "2019-01-01", "fields": {} },
                        { "version": "2019-02-02", "fields": { "data": { "type": "string" } } }
                    ]
                },
                "sharedSyncLogDeviceInfo": {
                    "version": "2019-02-05",
                    "fields": { "createdOn": { "type": "timestamp" } }
                }
            }
        }"#,
    )
    .expect("sync log config should parse");
    StorageModule::new("sharedSyncLog", config, Arc::new(NoopExecutor)).expect("module")
}

fn mappings() -> Vec<CollectionVersionMapEntry> {
    vec![
        mapping("2019-03-03", "2019-10-10"),
        mapping("2019-02-02", "2019-09-09"),
    ]
}

#[test]
fn registers_collections_in_application_version_space() {
    let module = sync_log_module();
    let mut backend: BTreeMap<String, CollectionDefinition> = BTreeMap::new();

    let count = register_module_collections(
        &mut backend,
        &module,
        Some(mappings().as_slice()),
        CurrentVersionPolicy::FloorWhenHistoryEmpty,
    )
    .expect("registration should succeed");
    assert_eq!(count, 2);

    let entry = &backend["sharedSyncLogEntry"];
    assert_eq!(entry.version, day("2019-10-10"));
    assert_eq!(
        entry
            .history
            .iter()
            .map(|past| past.version)
            .collect::<Vec<_>>(),
        vec![day("2019-09-09")],
        "history before the earliest mapping is dropped"
    );

    // No mapping for 2019-02-05 and no surviving history: lands on the floor.
    assert_eq!(
        backend["sharedSyncLogDeviceInfo"].version,
        day("2019-09-09")
    );
}

#[test]
fn strict_policy_rejects_unmapped_current_versions() {
    let module = sync_log_module();
    let mut backend: BTreeMap<String, CollectionDefinition> = BTreeMap::new();

    let err = register_module_collections(
        &mut backend,
        &module,
        Some(mappings().as_slice()),
        CurrentVersionPolicy::Strict,
    )
    .expect_err("strict mapping must fail");
    match err {
        RegistryError::VersionMap { module, source } => {
            assert_eq!(module, "sharedSyncLog");
            assert_eq!(
                source,
                VersionMapError::UnmappedCurrentVersion {
                    collection: "sharedSyncLogDeviceInfo".to_string(),
                    version: day("2019-02-05"),
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(backend.is_empty());
}

#[test]
fn unmapped_modules_register_declared_versions() {
    let mut registry = StorageModuleRegistry::new();
    registry.register(sync_log_module()).expect("registration");

    let mut backend: BTreeMap<String, CollectionDefinition> = BTreeMap::new();
    registry
        .register_collections(&mut backend, &ModuleVersionMappings::default())
        .expect("registration should succeed");

    let entry = &backend["sharedSyncLogEntry"];
    assert_eq!(entry.version, day("2019-03-03"));
    assert_eq!(entry.history.len(), 2);
}

#[test]
fn registry_applies_per_module_tables() {
    let mut registry = StorageModuleRegistry::new();
    registry.register(sync_log_module()).expect("registration");

    let tables = ModuleVersionMappings::new(CurrentVersionPolicy::FloorWhenHistoryEmpty)
        .with_table("sharedSyncLog", mappings());
    let collections = registry
        .collections(&tables)
        .expect("mapping should succeed");

    assert_eq!(collections["sharedSyncLogEntry"].version, day("2019-10-10"));
    assert_eq!(
        collections["sharedSyncLogDeviceInfo"].version,
        day("2019-09-09")
    );
}
