//! Public method signatures used for documentation and introspection.

use super::collection::FieldType;
use super::is_false;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicMethodKind {
    Query,
    Mutation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMethodDefinition {
    #[serde(rename = "type")]
    pub kind: PublicMethodKind,
    #[serde(default)]
    pub args: BTreeMap<String, PublicMethodValue>,
    pub returns: PublicMethodReturn,
}

impl PublicMethodDefinition {
    /// Positional arguments, in declaration-name order.
    pub fn positional_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter(|(_, value)| value.ensure_detailed().positional)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicMethodReturn {
    Void(VoidMarker),
    Value(PublicMethodValueType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoidMarker {
    #[serde(rename = "void")]
    Void,
}

/// Value type of an argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicMethodValueType {
    Scalar(FieldType),
    Collection {
        collection: String,
    },
    Array {
        array: Box<PublicMethodValueType>,
    },
    Object {
        object: BTreeMap<String, PublicMethodValue>,
        singular: String,
    },
}

/// A bare type, or a type with flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicMethodValue {
    Detailed(PublicMethodDetailedValue),
    Bare(PublicMethodValueType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMethodDetailedValue {
    #[serde(rename = "type")]
    pub value_type: PublicMethodValueType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub positional: bool,
}

impl PublicMethodValue {
    /// Normalizes a bare type into its detailed form with default flags.
    pub fn ensure_detailed(&self) -> PublicMethodDetailedValue {
        match self {
            Self::Detailed(detailed) => detailed.clone(),
            Self::Bare(value_type) => PublicMethodDetailedValue {
                value_type: value_type.clone(),
                optional: false,
                positional: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PublicMethodDefinition, PublicMethodKind, PublicMethodReturn, PublicMethodValueType};
    use crate::model::collection::FieldType;
    use serde_json::json;

    #[test]
    fn parses_bare_and_detailed_signatures() {
        let method: PublicMethodDefinition = serde_json::from_value(json!({
            "type": "mutation",
            "args": {
                "deviceId": { "type": "string", "positional": true },
                "entries": { "array": { "collection": "sharedSyncLogEntry" } },
                "limit": { "type": "int", "optional": true }
            },
            "returns": "void"
        }))
        .expect("method should parse");

        assert_eq!(method.kind, PublicMethodKind::Mutation);
        assert!(matches!(method.returns, PublicMethodReturn::Void(_)));
        assert_eq!(method.positional_args(), vec!["deviceId"]);

        let entries = method.args["entries"].ensure_detailed();
        assert!(!entries.optional);
        assert_eq!(
            entries.value_type,
            PublicMethodValueType::Array {
                array: Box::new(PublicMethodValueType::Collection {
                    collection: "sharedSyncLogEntry".to_string()
                })
            }
        );

        let limit = method.args["limit"].ensure_detailed();
        assert!(limit.optional);
        assert_eq!(limit.value_type, PublicMethodValueType::Scalar(FieldType::Int));
    }

    #[test]
    fn parses_object_return_type() {
        let method: PublicMethodDefinition = serde_json::from_value(json!({
            "type": "query",
            "args": {},
            "returns": { "object": { "createdOn": "timestamp" }, "singular": "entry" }
        }))
        .expect("method should parse");
        let PublicMethodReturn::Value(PublicMethodValueType::Object { singular, object }) =
            method.returns
        else {
            panic!("returns should be an object type");
        };
        assert_eq!(singular, "entry");
        assert!(object.contains_key("createdOn"));
    }
}
