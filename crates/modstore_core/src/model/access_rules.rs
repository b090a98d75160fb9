//! Access rule trees.
//!
//! Rules are carried from module declarations to whichever rule engine the
//! embedding application uses. Nothing in this crate evaluates them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    List,
    Read,
    Create,
    Update,
    Delete,
}

/// All rule sections a module may declare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRules {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ownership: BTreeMap<String, OwnershipRule>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub permissions: BTreeMap<String, BTreeMap<AccessType, PermissionRule>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation: BTreeMap<String, Vec<ValidationRule>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintRule>,
}

impl AccessRules {
    pub fn is_empty(&self) -> bool {
        self.ownership.is_empty()
            && self.permissions.is_empty()
            && self.validation.is_empty()
            && self.constraints.is_empty()
    }

    /// Collections named as rule keys or as preparation query targets.
    pub fn referenced_collections(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self
            .ownership
            .keys()
            .chain(self.permissions.keys())
            .chain(self.validation.keys())
            .map(String::as_str)
            .collect();

        let preparations = self
            .permissions
            .values()
            .flat_map(|by_type| by_type.values())
            .flat_map(|rule| rule.prepare.iter())
            .chain(self.constraints.iter().flat_map(|rule| rule.prepare.iter()));
        for preparation in preparations {
            names.insert(preparation.query().collection.as_str());
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRule {
    /// Field holding the owning user reference.
    pub field: String,
    pub access: OwnershipAccess,
}

/// `"full"` or an explicit list of access types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnershipAccess {
    Full(FullAccess),
    Only(Vec<AccessType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullAccess {
    #[serde(rename = "full")]
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepare: Vec<RulePreparation>,
    pub rule: RuleLogic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub field: String,
    pub rule: RuleLogic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepare: Vec<RulePreparation>,
    pub rule: RuleLogic,
}

/// Lookup executed before a rule is evaluated; its result is bound to
/// `placeholder` inside the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum RulePreparation {
    FindObject(PreparationQuery),
    CountObjects(PreparationQuery),
}

impl RulePreparation {
    pub fn query(&self) -> &PreparationQuery {
        match self {
            Self::FindObject(query) | Self::CountObjects(query) => query,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparationQuery {
    pub placeholder: String,
    pub collection: String,
    #[serde(rename = "where")]
    pub filter: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Rule expression grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleLogic {
    Value(RuleValue),
    Exists { exists: String },
    Not { not: Box<RuleLogic> },
    Op(BTreeMap<RuleOperator, Vec<RuleLogic>>),
}

impl RuleLogic {
    pub fn op(operator: RuleOperator, operands: Vec<RuleLogic>) -> Self {
        Self::Op(BTreeMap::from([(operator, operands)]))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(RuleValue::String(value.into()))
    }
}

/// Leaf value; strings starting with `$` are rule-engine placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Null,
    Number(Number),
    String(String),
}
