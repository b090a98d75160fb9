//! Collection definitions and their relationship model.
//!
//! # Responsibility
//! - Describe one named collection: version, typed fields, relationships and
//!   the ordered history of earlier shapes.
//! - Classify relationships as typed variants instead of inspecting raw maps.
//!
//! # Invariants
//! - `history` is ordered oldest-first and every entry is older than `version`.
//! - History entries never carry a nested history of their own.
//! - A relationship declaration is exactly one of `childOf`, `singleChildOf`
//!   or `connects`.

use super::is_false;
use super::timestamp::{serde_timestamp, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primitive storage type of one field.
///
/// Serialized with the backend's kebab-case names, which are also the type
/// suffixes used in synthesized placeholders (`$id:auto-pk`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    String,
    Text,
    Json,
    Datetime,
    Timestamp,
    Boolean,
    Float,
    Int,
    Blob,
    Binary,
    AutoPk,
    ForeignKey,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Json => "json",
            Self::Datetime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Int => "int",
            Self::Blob => "blob",
            Self::Binary => "binary",
            Self::AutoPk => "auto-pk",
            Self::ForeignKey => "foreign-key",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Serialized as `type` to match the declaration format.
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

impl FieldDefinition {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    pub fn optional(kind: FieldType) -> Self {
        Self {
            kind,
            optional: true,
        }
    }
}

/// Relationship where this entity stores a reference to one parent entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildOfRelationship {
    /// Parent collection name.
    pub target: String,
    pub alias: Option<String>,
    /// Declared as `singleChildOf`: at most one child per parent.
    pub single: bool,
    pub field_name: Option<String>,
    pub optional: bool,
}

impl ChildOfRelationship {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            alias: None,
            single: false,
            field_name: None,
            optional: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Key under which the parent reference is stored: the alias, or the
    /// parent collection name when no alias is declared.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.target.as_str())
    }
}

/// Many-to-many link between two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectsRelationship {
    pub targets: [String; 2],
    pub aliases: Option<[String; 2]>,
}

/// Typed relationship declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RelationshipDecl", into = "RelationshipDecl")]
pub enum Relationship {
    ChildOf(ChildOfRelationship),
    ConnectsMany(ConnectsRelationship),
}

impl Relationship {
    pub fn child_of(target: impl Into<String>) -> Self {
        Self::ChildOf(ChildOfRelationship::new(target))
    }

    pub fn child_of_aliased(target: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::ChildOf(ChildOfRelationship::new(target).with_alias(alias))
    }

    pub fn connects(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::ConnectsMany(ConnectsRelationship {
            targets: [left.into(), right.into()],
            aliases: None,
        })
    }

    pub fn as_child_of(&self) -> Option<&ChildOfRelationship> {
        match self {
            Self::ChildOf(relationship) => Some(relationship),
            Self::ConnectsMany(_) => None,
        }
    }
}

/// Rejections for malformed relationship declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipError {
    MissingKind,
    AmbiguousKind,
    EmptyTarget,
    AliasOnConnects,
    AliasesOnChildOf,
}

impl Display for RelationshipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKind => write!(
                f,
                "relationship must declare one of childOf, singleChildOf or connects"
            ),
            Self::AmbiguousKind => write!(
                f,
                "relationship declares more than one of childOf, singleChildOf or connects"
            ),
            Self::EmptyTarget => write!(f, "relationship target must not be empty"),
            Self::AliasOnConnects => {
                write!(f, "connects relationships take `aliases`, not `alias`")
            }
            Self::AliasesOnChildOf => {
                write!(f, "childOf relationships take `alias`, not `aliases`")
            }
        }
    }
}

impl Error for RelationshipError {}

/// Wire shape of a relationship declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    single_child_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connects: Option<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aliases: Option<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    optional: bool,
}

impl TryFrom<RelationshipDecl> for Relationship {
    type Error = RelationshipError;

    fn try_from(decl: RelationshipDecl) -> Result<Self, Self::Error> {
        let declared = [
            decl.child_of.is_some(),
            decl.single_child_of.is_some(),
            decl.connects.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        match declared {
            0 => return Err(RelationshipError::MissingKind),
            1 => {}
            _ => return Err(RelationshipError::AmbiguousKind),
        }

        if let Some(targets) = decl.connects {
            if targets.iter().any(|target| target.trim().is_empty()) {
                return Err(RelationshipError::EmptyTarget);
            }
            if decl.alias.is_some() {
                return Err(RelationshipError::AliasOnConnects);
            }
            return Ok(Self::ConnectsMany(ConnectsRelationship {
                targets,
                aliases: decl.aliases,
            }));
        }

        if decl.aliases.is_some() {
            return Err(RelationshipError::AliasesOnChildOf);
        }
        let single = decl.single_child_of.is_some();
        let target = decl
            .child_of
            .or(decl.single_child_of)
            .ok_or(RelationshipError::MissingKind)?;
        if target.trim().is_empty() {
            return Err(RelationshipError::EmptyTarget);
        }
        Ok(Self::ChildOf(ChildOfRelationship {
            target,
            alias: decl.alias,
            single,
            field_name: decl.field_name,
            optional: decl.optional,
        }))
    }
}

impl From<Relationship> for RelationshipDecl {
    fn from(value: Relationship) -> Self {
        match value {
            Relationship::ChildOf(child) => {
                let (child_of, single_child_of) = if child.single {
                    (None, Some(child.target))
                } else {
                    (Some(child.target), None)
                };
                Self {
                    child_of,
                    single_child_of,
                    alias: child.alias,
                    field_name: child.field_name,
                    optional: child.optional,
                    ..Self::default()
                }
            }
            Relationship::ConnectsMany(connects) => Self {
                connects: Some(connects.targets),
                aliases: connects.aliases,
                ..Self::default()
            },
        }
    }
}

/// Index declaration; `field` is one field name or a compound list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub field: IndexField,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pk: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexField {
    Single(String),
    Compound(Vec<String>),
}

/// Grouping hint for backends that nest records in subcollections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByKey {
    pub key: String,
    pub subcollection_name: String,
}

/// Versioned schema of one logical collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDefinition {
    #[serde(with = "serde_timestamp")]
    pub version: Timestamp,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<IndexDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk_index: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<GroupByKey>,
    /// Earlier shapes of this collection, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<CollectionDefinition>,
}

impl CollectionDefinition {
    /// Creates an empty definition at `version`.
    pub fn new(version: Timestamp) -> Self {
        Self {
            version,
            fields: BTreeMap::new(),
            relationships: Vec::new(),
            indices: Vec::new(),
            pk_index: None,
            group_by: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldType) -> Self {
        self.fields.insert(name.into(), FieldDefinition::new(kind));
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_history(mut self, history: Vec<CollectionDefinition>) -> Self {
        self.history = history;
        self
    }

    /// Iterates child-of relationships of the current shape.
    pub fn child_of_relationships(&self) -> impl Iterator<Item = &ChildOfRelationship> {
        self.relationships
            .iter()
            .filter_map(Relationship::as_child_of)
    }

    /// Returns historical versions followed by the current version.
    pub fn versions(&self) -> Vec<Timestamp> {
        self.history
            .iter()
            .map(|past| past.version)
            .chain(std::iter::once(self.version))
            .collect()
    }

    /// Checks the history ordering invariant.
    ///
    /// Returns the first offending historical version, if any.
    pub fn history_out_of_order(&self) -> Option<Timestamp> {
        let versions = self.versions();
        versions
            .windows(2)
            .find(|pair| pair[0] >= pair[1])
            .map(|pair| pair[0])
    }
}
