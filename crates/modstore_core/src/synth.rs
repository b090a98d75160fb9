//! Default argument templates for `createObject` operations.
//!
//! # Responsibility
//! - Derive a create-args template from a collection's current shape when the
//!   module author declared none.
//!
//! # Invariants
//! - One entry per field (`$field:type`) plus one per child-of relationship
//!   key (`$key`, untyped).
//! - Many-to-many `connects` relationships are never included.
//! - A child-of key that repeats a field name is rejected, never merged.
//! - Operations that already carry `args` are left untouched, so running
//!   synthesis again is a no-op.

use crate::model::collection::CollectionDefinition;
use crate::model::config::{StorageModuleCollections, StorageOperationDefinitions};
use crate::template::format_placeholder;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SynthResult<T> = Result<T, SynthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// `createObject` without a target collection and without args.
    MissingCollection { operation: String },
    /// Target collection is not declared by the module.
    UnknownCollection {
        operation: String,
        collection: String,
    },
    /// A child-of key repeats a field name of the target collection.
    DuplicateKey { collection: String, key: String },
}

impl Display for SynthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCollection { operation } => write!(
                f,
                "createObject operation `{operation}` has neither args nor a collection"
            ),
            Self::UnknownCollection {
                operation,
                collection,
            } => write!(
                f,
                "operation `{operation}` targets unknown collection `{collection}`"
            ),
            Self::DuplicateKey { collection, key } => write!(
                f,
                "collection `{collection}` declares `{key}` both as a field and as a child-of key"
            ),
        }
    }
}

impl Error for SynthError {}

/// Builds the create-args template for the current shape of `collection`,
/// named `name` in its module.
///
/// History entries are ignored.
///
/// # Errors
/// - `DuplicateKey` when a child-of key equals a field name or another
///   child-of key.
pub fn synthesize_create_args(
    name: &str,
    collection: &CollectionDefinition,
) -> SynthResult<Value> {
    let mut args = Map::new();
    for (field_name, field) in &collection.fields {
        args.insert(
            field_name.clone(),
            Value::String(format_placeholder(field_name, Some(field.kind.as_str()))),
        );
    }
    for relationship in collection.child_of_relationships() {
        let key = relationship.key();
        if args.contains_key(key) {
            return Err(SynthError::DuplicateKey {
                collection: name.to_string(),
                key: key.to_string(),
            });
        }
        args.insert(key.to_string(), Value::String(format_placeholder(key, None)));
    }
    Ok(Value::Object(args))
}

/// Fills in missing `createObject` args across a module's operations.
pub fn synthesize_operations(
    collections: &StorageModuleCollections,
    operations: &StorageOperationDefinitions,
) -> SynthResult<StorageOperationDefinitions> {
    let mut synthesized = operations.clone();
    for (name, operation) in synthesized.iter_mut() {
        if !operation.is_create_object() || operation.args.is_some() {
            continue;
        }

        let collection_name =
            operation
                .collection
                .as_deref()
                .ok_or_else(|| SynthError::MissingCollection {
                    operation: name.clone(),
                })?;
        let collection =
            collections
                .get(collection_name)
                .ok_or_else(|| SynthError::UnknownCollection {
                    operation: name.clone(),
                    collection: collection_name.to_string(),
                })?;
        operation.args = Some(synthesize_create_args(collection_name, collection)?);
    }
    Ok(synthesized)
}
