//! In-process module registry and collection registration.

use super::runtime::StorageModule;
use crate::model::collection::CollectionDefinition;
use crate::model::config::StorageModuleCollections;
use crate::module::executor::BoxError;
use crate::version_map::{
    map_collection_versions, CollectionVersionMapEntry, CurrentVersionPolicy, VersionMapError,
};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Module registration and collection registration errors.
#[derive(Debug)]
pub enum RegistryError {
    InvalidModuleName(String),
    DuplicateModuleName(String),
    DuplicateCollection {
        collection: String,
        first_module: String,
        second_module: String,
    },
    VersionMap {
        module: String,
        source: VersionMapError,
    },
    Backend {
        collection: String,
        source: BoxError,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidModuleName(value) => write!(f, "module name is invalid: {value}"),
            Self::DuplicateModuleName(value) => {
                write!(f, "module name already registered: {value}")
            }
            Self::DuplicateCollection {
                collection,
                first_module,
                second_module,
            } => write!(
                f,
                "collection `{collection}` is declared by both `{first_module}` and `{second_module}`"
            ),
            Self::VersionMap { module, source } => {
                write!(f, "module `{module}`: {source}")
            }
            Self::Backend { collection, source } => {
                write!(f, "backend rejected collection `{collection}`: {source}")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::VersionMap { source, .. } => Some(source),
            Self::Backend { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Schema registry of the storage backend.
pub trait CollectionRegistry {
    fn register_collection(
        &mut self,
        name: &str,
        definition: CollectionDefinition,
    ) -> Result<(), BoxError>;
}

impl CollectionRegistry for BTreeMap<String, CollectionDefinition> {
    fn register_collection(
        &mut self,
        name: &str,
        definition: CollectionDefinition,
    ) -> Result<(), BoxError> {
        if self.contains_key(name) {
            return Err(format!("collection already registered: {name}").into());
        }
        self.insert(name.to_string(), definition);
        Ok(())
    }
}

/// Version mapping tables keyed by module name.
///
/// Modules without a table register their collections unmapped.
#[derive(Debug, Clone, Default)]
pub struct ModuleVersionMappings {
    pub tables: BTreeMap<String, Vec<CollectionVersionMapEntry>>,
    pub policy: CurrentVersionPolicy,
}

impl ModuleVersionMappings {
    pub fn new(policy: CurrentVersionPolicy) -> Self {
        Self {
            tables: BTreeMap::new(),
            policy,
        }
    }

    pub fn with_table(
        mut self,
        module: impl Into<String>,
        mappings: Vec<CollectionVersionMapEntry>,
    ) -> Self {
        self.tables.insert(module.into(), mappings);
        self
    }
}

/// Returns `module`'s collections in application-version space when a
/// mapping table is supplied, or as declared otherwise.
pub fn module_collections(
    module: &StorageModule,
    mappings: Option<&[CollectionVersionMapEntry]>,
    policy: CurrentVersionPolicy,
) -> RegistryResult<StorageModuleCollections> {
    let declared = module.config().collections();
    match mappings {
        Some(mappings) => map_collection_versions(declared, mappings, policy).map_err(|source| {
            RegistryError::VersionMap {
                module: module.name().to_string(),
                source,
            }
        }),
        None => Ok(declared.clone()),
    }
}

/// Registers one module's collections with a backend schema registry.
pub fn register_module_collections(
    target: &mut dyn CollectionRegistry,
    module: &StorageModule,
    mappings: Option<&[CollectionVersionMapEntry]>,
    policy: CurrentVersionPolicy,
) -> RegistryResult<usize> {
    let collections = module_collections(module, mappings, policy)?;
    let count = collections.len();
    for (name, definition) in collections {
        target
            .register_collection(&name, definition)
            .map_err(|source| RegistryError::Backend {
                collection: name.clone(),
                source,
            })?;
    }
    Ok(count)
}

/// Registry of named storage modules.
#[derive(Default)]
pub struct StorageModuleRegistry {
    modules: BTreeMap<String, Arc<StorageModule>>,
}

impl StorageModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one module under its own name.
    pub fn register(&mut self, module: StorageModule) -> RegistryResult<Arc<StorageModule>> {
        let name = module.name().trim().to_string();
        if !is_valid_module_name(&name) {
            return Err(RegistryError::InvalidModuleName(name));
        }
        if self.modules.contains_key(name.as_str()) {
            return Err(RegistryError::DuplicateModuleName(name));
        }

        let module = Arc::new(module);
        self.modules.insert(name, module.clone());
        Ok(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns sorted module names.
    pub fn names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<StorageModule>> {
        self.modules.get(name.trim()).cloned()
    }

    /// Collects every module's (optionally mapped) collections.
    ///
    /// Rejects a collection name declared by more than one module.
    pub fn collections(
        &self,
        mappings: &ModuleVersionMappings,
    ) -> RegistryResult<BTreeMap<String, CollectionDefinition>> {
        let mut owners: BTreeMap<String, &str> = BTreeMap::new();
        let mut collected = BTreeMap::new();
        for (module_name, module) in &self.modules {
            let table = mappings.tables.get(module_name).map(Vec::as_slice);
            for (name, definition) in module_collections(module, table, mappings.policy)? {
                if let Some(first_module) = owners.get(name.as_str()) {
                    return Err(RegistryError::DuplicateCollection {
                        collection: name,
                        first_module: first_module.to_string(),
                        second_module: module_name.clone(),
                    });
                }
                owners.insert(name.clone(), module_name.as_str());
                collected.insert(name, definition);
            }
        }
        Ok(collected)
    }

    /// Registers all module collections with `target`.
    ///
    /// Nothing is registered when any module fails to map or collides.
    pub fn register_collections(
        &self,
        target: &mut dyn CollectionRegistry,
        mappings: &ModuleVersionMappings,
    ) -> RegistryResult<usize> {
        let collections = self.collections(mappings)?;
        let count = collections.len();
        for (name, definition) in collections {
            target
                .register_collection(&name, definition)
                .map_err(|source| RegistryError::Backend {
                    collection: name.clone(),
                    source,
                })?;
        }
        info!(
            "event=collections_register module=registry status=ok modules={} collections={}",
            self.modules.len(),
            count
        );
        Ok(count)
    }
}

fn is_valid_module_name(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
