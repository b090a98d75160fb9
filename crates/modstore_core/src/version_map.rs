//! Translation of module-internal collection versions into application versions.
//!
//! # Responsibility
//! - Rewrite every collection version (current and historical) through a
//!   caller-supplied mapping table.
//! - Drop history that predates the earliest mapped module version.
//!
//! # Invariants
//! - Inputs are never mutated; mapped definitions are fresh values.
//! - Surviving history keeps its order.
//! - Each module version appears at most once in the mapping table.
//! - A surviving historical version must map exactly; there is no fallback.

use crate::model::collection::CollectionDefinition;
use crate::model::config::StorageModuleCollections;
use crate::model::timestamp::{format_timestamp, serde_timestamp, Timestamp};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VersionMapResult<T> = Result<T, VersionMapError>;

/// One correspondence between the module timeline and the application timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionVersionMapEntry {
    #[serde(with = "serde_timestamp")]
    pub module_version: Timestamp,
    #[serde(with = "serde_timestamp")]
    pub application_version: Timestamp,
}

impl CollectionVersionMapEntry {
    pub fn new(module_version: Timestamp, application_version: Timestamp) -> Self {
        Self {
            module_version,
            application_version,
        }
    }
}

/// What to do when a collection's current version has no table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentVersionPolicy {
    /// Land on the floor application version when no history survives the
    /// cut-off; fail when mapped history exists.
    #[default]
    FloorWhenHistoryEmpty,
    /// Always require an exact entry for the current version.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionMapError {
    EmptyMappingTable,
    DuplicateModuleVersion(Timestamp),
    UnmappedHistoryVersion {
        collection: String,
        version: Timestamp,
    },
    UnmappedCurrentVersion {
        collection: String,
        version: Timestamp,
    },
}

impl Display for VersionMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMappingTable => write!(f, "version mapping table must not be empty"),
            Self::DuplicateModuleVersion(version) => write!(
                f,
                "module version {} is mapped more than once",
                format_timestamp(version)
            ),
            Self::UnmappedHistoryVersion {
                collection,
                version,
            } => write!(
                f,
                "could not map historical version {} of collection `{collection}` to an application version",
                format_timestamp(version)
            ),
            Self::UnmappedCurrentVersion {
                collection,
                version,
            } => write!(
                f,
                "could not map current version {} of collection `{collection}` to an application version",
                format_timestamp(version)
            ),
        }
    }
}

impl Error for VersionMapError {}

/// Lookup table built from mapping entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    entries: BTreeMap<Timestamp, Timestamp>,
}

impl VersionTable {
    /// Builds the table, rejecting empty input and repeated module versions.
    pub fn new(mappings: &[CollectionVersionMapEntry]) -> VersionMapResult<Self> {
        if mappings.is_empty() {
            return Err(VersionMapError::EmptyMappingTable);
        }
        let mut entries = BTreeMap::new();
        for mapping in mappings {
            if entries
                .insert(mapping.module_version, mapping.application_version)
                .is_some()
            {
                return Err(VersionMapError::DuplicateModuleVersion(
                    mapping.module_version,
                ));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, module_version: &Timestamp) -> Option<Timestamp> {
        self.entries.get(module_version).copied()
    }

    /// Earliest mapped module version and its application version.
    pub fn floor(&self) -> (Timestamp, Timestamp) {
        self.entries
            .iter()
            .next()
            .map(|(module, application)| (*module, *application))
            .unwrap_or_default()
    }

    /// Maps one collection and its history.
    pub fn map_collection(
        &self,
        name: &str,
        collection: &CollectionDefinition,
        policy: CurrentVersionPolicy,
    ) -> VersionMapResult<CollectionDefinition> {
        let (floor_module, floor_application) = self.floor();

        let history = collection
            .history
            .iter()
            .filter(|past| past.version >= floor_module)
            .map(|past| {
                let version =
                    self.get(&past.version)
                        .ok_or_else(|| VersionMapError::UnmappedHistoryVersion {
                            collection: name.to_string(),
                            version: past.version,
                        })?;
                Ok(CollectionDefinition {
                    version,
                    ..past.clone()
                })
            })
            .collect::<VersionMapResult<Vec<_>>>()?;

        let version = match self.get(&collection.version) {
            Some(version) => version,
            None if history.is_empty() && policy == CurrentVersionPolicy::FloorWhenHistoryEmpty => {
                info!(
                    "event=version_floor module=version_map status=ok collection={} module_version={} application_version={}",
                    name,
                    format_timestamp(&collection.version),
                    format_timestamp(&floor_application)
                );
                floor_application
            }
            None => {
                return Err(VersionMapError::UnmappedCurrentVersion {
                    collection: name.to_string(),
                    version: collection.version,
                })
            }
        };

        Ok(CollectionDefinition {
            version,
            history,
            ..collection.clone()
        })
    }
}

/// Maps every collection of a module into application-version space.
pub fn map_collection_versions(
    collections: &StorageModuleCollections,
    mappings: &[CollectionVersionMapEntry],
    policy: CurrentVersionPolicy,
) -> VersionMapResult<StorageModuleCollections> {
    let table = VersionTable::new(mappings)?;
    let mapped = collections
        .iter()
        .map(|(name, collection)| {
            table
                .map_collection(name, collection, policy)
                .map(|mapped| (name.clone(), mapped))
        })
        .collect::<VersionMapResult<StorageModuleCollections>>()?;

    debug!(
        "event=version_map module=version_map status=ok collections={} mappings={}",
        mapped.len(),
        mappings.len()
    );
    Ok(mapped)
}
