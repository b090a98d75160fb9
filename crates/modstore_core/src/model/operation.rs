//! Operation definitions: named backend calls declared as data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Backend primitive an operation forwards to.
///
/// Unknown names are kept verbatim as `Custom` so backends with extra
/// primitives stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    CreateObject,
    FindObject,
    FindObjects,
    UpdateObject,
    UpdateObjects,
    DeleteObject,
    DeleteObjects,
    CountObjects,
    ExecuteBatch,
    Custom(String),
}

impl OperationKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "createObject" => Self::CreateObject,
            "findObject" => Self::FindObject,
            "findObjects" => Self::FindObjects,
            "updateObject" => Self::UpdateObject,
            "updateObjects" => Self::UpdateObjects,
            "deleteObject" => Self::DeleteObject,
            "deleteObjects" => Self::DeleteObjects,
            "countObjects" => Self::CountObjects,
            "executeBatch" => Self::ExecuteBatch,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateObject => "createObject",
            Self::FindObject => "findObject",
            Self::FindObjects => "findObjects",
            Self::UpdateObject => "updateObject",
            Self::UpdateObjects => "updateObjects",
            Self::DeleteObject => "deleteObject",
            Self::DeleteObjects => "deleteObjects",
            Self::CountObjects => "countObjects",
            Self::ExecuteBatch => "executeBatch",
            Self::Custom(name) => name.as_str(),
        }
    }
}

impl From<String> for OperationKind {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<OperationKind> for String {
    fn from(value: OperationKind) -> Self {
        value.as_str().to_string()
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of one named operation.
///
/// `args` is a template whose string leaves may be placeholders. A
/// `createObject` operation may omit it; the synthesizer derives one from the
/// target collection when the module configuration is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub operation: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

impl OperationDefinition {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            collection: None,
            args: None,
        }
    }

    /// `createObject` on `collection` with args left for synthesis.
    pub fn create_object(collection: impl Into<String>) -> Self {
        Self::new(OperationKind::CreateObject).on(collection)
    }

    pub fn on(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn is_create_object(&self) -> bool {
        self.operation == OperationKind::CreateObject
    }
}

#[cfg(test)]
mod tests {
    use super::{OperationDefinition, OperationKind};
    use serde_json::json;

    #[test]
    fn known_and_custom_kinds_round_trip_through_strings() {
        assert_eq!(OperationKind::parse("findObjects"), OperationKind::FindObjects);
        assert_eq!(
            OperationKind::parse("rawQuery"),
            OperationKind::Custom("rawQuery".to_string())
        );
        assert_eq!(OperationKind::parse("rawQuery").as_str(), "rawQuery");
    }

    #[test]
    fn parses_definition_without_args() {
        let definition: OperationDefinition = serde_json::from_value(json!({
            "operation": "createObject",
            "collection": "sharedSyncLogEntry"
        }))
        .expect("definition should parse");
        assert!(definition.is_create_object());
        assert!(definition.args.is_none());
        assert_eq!(
            definition,
            OperationDefinition::create_object("sharedSyncLogEntry")
        );
    }
}
