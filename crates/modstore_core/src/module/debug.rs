//! Operation diagnostics.
//!
//! Debug output is observability only: it is emitted through `log` and never
//! changes what an invocation does or returns.

use super::executor::{ExecutorResult, OperationRequest};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nesting depth shown before shallow diagnostics abbreviate containers.
const SHALLOW_DEPTH: usize = 2;

/// Structured debug configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfig {
    #[serde(default)]
    pub include_return_values: bool,
    /// When set, only these operation names produce diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_module_operations: Option<Vec<String>>,
    #[serde(default)]
    pub print_deep_objects: bool,
}

/// Debug mode of one module: off, on, or structured.
///
/// Deserializes from `false`/`true` or a [`DebugConfig`] object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DebugSettingDecl", into = "DebugSettingDecl")]
pub enum DebugSetting {
    #[default]
    Off,
    On,
    Configured(DebugConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DebugSettingDecl {
    Flag(bool),
    Config(DebugConfig),
}

impl From<DebugSettingDecl> for DebugSetting {
    fn from(value: DebugSettingDecl) -> Self {
        match value {
            DebugSettingDecl::Flag(false) => Self::Off,
            DebugSettingDecl::Flag(true) => Self::On,
            DebugSettingDecl::Config(config) => Self::Configured(config),
        }
    }
}

impl From<DebugSetting> for DebugSettingDecl {
    fn from(value: DebugSetting) -> Self {
        match value {
            DebugSetting::Off => Self::Flag(false),
            DebugSetting::On => Self::Flag(true),
            DebugSetting::Configured(config) => Self::Config(config),
        }
    }
}

impl DebugSetting {
    /// Whether diagnostics are emitted for `operation`.
    pub fn applies_to(&self, operation: &str) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::Configured(config) => config
                .only_module_operations
                .as_ref()
                .map_or(true, |names| names.iter().any(|name| name == operation)),
        }
    }

    pub fn include_return_values(&self) -> bool {
        matches!(self, Self::Configured(config) if config.include_return_values)
    }

    pub fn print_deep_objects(&self) -> bool {
        matches!(self, Self::Configured(config) if config.print_deep_objects)
    }
}

/// Formats `value` for a diagnostic record.
///
/// Shallow mode replaces containers nested deeper than two levels with
/// `[Object]` / `[Array]`.
pub fn describe_value(value: &Value, deep: bool) -> String {
    if deep {
        return value.to_string();
    }
    abbreviate(value, SHALLOW_DEPTH).to_string()
}

fn abbreviate(value: &Value, depth_left: usize) -> Value {
    match value {
        Value::Object(_) if depth_left == 0 => Value::String("[Object]".to_string()),
        Value::Array(_) if depth_left == 0 => Value::String("[Array]".to_string()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, child)| (key.clone(), abbreviate(child, depth_left - 1)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| abbreviate(item, depth_left - 1))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

pub(crate) fn log_pre_call(request: &OperationRequest<'_>) {
    if !request.debug.applies_to(request.name) {
        return;
    }
    let deep = request.debug.print_deep_objects();
    let rendered = serde_json::to_value(request.render()).unwrap_or(Value::Null);
    info!(
        "event=operation_call module=storage_module status=start storage_module={} operation={} method={} invocation_id={} context={} rendered={}",
        request.module,
        request.name,
        request.method.unwrap_or("-"),
        request.invocation_id,
        describe_value(request.context, deep),
        describe_value(&rendered, deep)
    );
}

pub(crate) fn log_post_call(request: &OperationRequest<'_>, result: &ExecutorResult<Value>) {
    if !request.debug.applies_to(request.name) || !request.debug.include_return_values() {
        return;
    }
    match result {
        Ok(value) => info!(
            "event=operation_call module=storage_module status=ok storage_module={} operation={} invocation_id={} result={}",
            request.module,
            request.name,
            request.invocation_id,
            describe_value(value, request.debug.print_deep_objects())
        ),
        Err(err) => info!(
            "event=operation_call module=storage_module status=error storage_module={} operation={} invocation_id={} error={}",
            request.module, request.name, request.invocation_id, err
        ),
    }
}
