//! Finalized module configuration.

use super::{ModuleError, ModuleResult};
use crate::model::access_rules::AccessRules;
use crate::model::config::{
    PublicMethodDefinitions, StorageModuleCollections, StorageModuleConfig,
    StorageOperationDefinitions,
};
use crate::model::operation::OperationDefinition;
use crate::synth::synthesize_operations;
use log::debug;
use serde::Serialize;

/// Immutable runtime configuration of one module.
///
/// Produced once by [`ResolvedModuleConfig::finalize`]; every `createObject`
/// operation has concrete args from then on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModuleConfig {
    collections: StorageModuleCollections,
    operations: StorageOperationDefinitions,
    methods: PublicMethodDefinitions,
    access_rules: AccessRules,
}

impl ResolvedModuleConfig {
    /// Validates a declared configuration and synthesizes missing create args.
    ///
    /// # Errors
    /// - `HistoryOutOfOrder` when a collection history is not strictly
    ///   ascending and older than the current version.
    /// - `Synth` when a `createObject` without args has no usable collection.
    pub fn finalize(config: StorageModuleConfig) -> ModuleResult<Self> {
        for (name, collection) in &config.collections {
            if let Some(version) = collection.history_out_of_order() {
                return Err(ModuleError::HistoryOutOfOrder {
                    collection: name.clone(),
                    version,
                });
            }
        }

        let operations = synthesize_operations(&config.collections, &config.operations)?;
        debug!(
            "event=module_finalize module=storage_module status=ok collections={} operations={}",
            config.collections.len(),
            operations.len()
        );

        Ok(Self {
            collections: config.collections,
            operations,
            methods: config.methods,
            access_rules: config.access_rules.unwrap_or_default(),
        })
    }

    pub fn collections(&self) -> &StorageModuleCollections {
        &self.collections
    }

    pub fn operations(&self) -> &StorageOperationDefinitions {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations.get(name)
    }

    pub fn methods(&self) -> &PublicMethodDefinitions {
        &self.methods
    }

    pub fn access_rules(&self) -> &AccessRules {
        &self.access_rules
    }
}
