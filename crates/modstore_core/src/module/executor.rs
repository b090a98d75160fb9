//! Executor seam between module runtime and storage backend.
//!
//! # Responsibility
//! - Carry one invocation (name, context, method tag, debug flags) to a
//!   pluggable executor together with a way to render it.
//! - Provide the default executor that forwards the rendered call to a
//!   storage backend.
//!
//! # Invariants
//! - Rendering never mutates the operation definition or the context.
//! - `createObject` calls drop undefined values; other kinds keep them as `null`.

use super::debug::DebugSetting;
use crate::model::operation::{OperationDefinition, OperationKind};
use crate::template::{render_args, RenderOptions};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

/// Error type produced by executors and backends.
pub type BoxError = Box<dyn Error + Send + Sync>;
pub type ExecutorResult<T> = Result<T, BoxError>;

/// Concrete backend call produced by rendering one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedOperation {
    pub operation: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Positional arguments. An array template spreads into one argument per
    /// element; any other template is a single argument.
    pub args: Vec<Value>,
}

impl RenderedOperation {
    /// Flattens into `[operation, collection?, args...]`.
    pub fn into_call(self) -> Vec<Value> {
        let mut call = Vec::with_capacity(self.args.len() + 2);
        call.push(Value::String(self.operation.as_str().to_string()));
        if let Some(collection) = self.collection {
            call.push(Value::String(collection));
        }
        call.extend(self.args);
        call
    }
}

/// Renders `definition` against `context`.
pub fn render_operation(definition: &OperationDefinition, context: &Value) -> RenderedOperation {
    let options = if definition.is_create_object() {
        RenderOptions::removing_undefined()
    } else {
        RenderOptions::default()
    };
    let args = match &definition.args {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| render_args(item, context, options))
            .collect(),
        Some(template) => vec![render_args(template, context, options)],
    };

    RenderedOperation {
        operation: definition.operation.clone(),
        collection: definition.collection.clone(),
        args,
    }
}

/// One operation invocation handed to an executor.
#[derive(Debug, Clone, Copy)]
pub struct OperationRequest<'a> {
    /// Correlates pre-call and post-call diagnostics.
    pub invocation_id: Uuid,
    pub module: &'a str,
    pub name: &'a str,
    pub context: &'a Value,
    /// Public method that issued the call, when the caller tagged it.
    pub method: Option<&'a str>,
    pub debug: &'a DebugSetting,
    pub(crate) definition: &'a OperationDefinition,
}

impl<'a> OperationRequest<'a> {
    pub fn definition(&self) -> &'a OperationDefinition {
        self.definition
    }

    /// Renders the operation template against this request's context.
    pub fn render(&self) -> RenderedOperation {
        render_operation(self.definition, self.context)
    }
}

/// Runs one operation invocation.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, request: OperationRequest<'_>) -> ExecutorResult<Value>;
}

/// Storage backend reached by the default executor.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn operation(&self, call: RenderedOperation) -> ExecutorResult<Value>;
}

/// Default executor: render, then forward to the backend.
#[derive(Clone)]
pub struct BackendExecutor {
    backend: Arc<dyn StorageBackend>,
}

impl BackendExecutor {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl OperationExecutor for BackendExecutor {
    async fn execute(&self, request: OperationRequest<'_>) -> ExecutorResult<Value> {
        self.backend.operation(request.render()).await
    }
}
