//! Declared storage module configuration.

use super::access_rules::AccessRules;
use super::collection::CollectionDefinition;
use super::methods::PublicMethodDefinition;
use super::operation::OperationDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub type StorageModuleCollections = BTreeMap<String, CollectionDefinition>;
pub type StorageOperationDefinitions = BTreeMap<String, OperationDefinition>;
pub type PublicMethodDefinitions = BTreeMap<String, PublicMethodDefinition>;

/// Everything a module author declares, exactly as written.
///
/// Every section is optional on the wire. The declared value is turned into a
/// runtime configuration by `ResolvedModuleConfig::finalize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageModuleConfig {
    #[serde(default)]
    pub collections: StorageModuleCollections,
    #[serde(default)]
    pub operations: StorageOperationDefinitions,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: PublicMethodDefinitions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_rules: Option<AccessRules>,
}

impl StorageModuleConfig {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.display().to_string(),
            source: err,
        })?;
        Self::from_json_str(&raw).map_err(|err| ConfigLoadError::Parse {
            path: path.display().to_string(),
            source: err,
        })
    }
}

/// Failure reading a configuration file from disk.
#[derive(Debug)]
pub enum ConfigLoadError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{path}`: {source}"),
            Self::Parse { path, source } => write!(f, "failed to parse `{path}`: {source}"),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}
