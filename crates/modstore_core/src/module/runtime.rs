//! Named-operation invocation surface of one storage module.

use super::debug::{log_post_call, log_pre_call, DebugSetting};
use super::executor::{OperationExecutor, OperationRequest};
use super::resolved::ResolvedModuleConfig;
use super::{ModuleError, ModuleResult};
use crate::model::config::StorageModuleConfig;
use log::error;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A finalized module bound to an executor.
pub struct StorageModule {
    name: String,
    config: Arc<ResolvedModuleConfig>,
    executor: Arc<dyn OperationExecutor>,
    debug: DebugSetting,
}

impl StorageModule {
    /// Finalizes `config` and binds it to `executor`.
    pub fn new(
        name: impl Into<String>,
        config: StorageModuleConfig,
        executor: Arc<dyn OperationExecutor>,
    ) -> ModuleResult<Self> {
        let config = ResolvedModuleConfig::finalize(config)?;
        Ok(Self::from_resolved(name, Arc::new(config), executor))
    }

    /// Binds an already finalized configuration, e.g. one shared by several
    /// module instances.
    pub fn from_resolved(
        name: impl Into<String>,
        config: Arc<ResolvedModuleConfig>,
        executor: Arc<dyn OperationExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            executor,
            debug: DebugSetting::Off,
        }
    }

    pub fn with_debug(mut self, debug: DebugSetting) -> Self {
        self.debug = debug;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Arc<ResolvedModuleConfig> {
        &self.config
    }

    pub fn debug(&self) -> &DebugSetting {
        &self.debug
    }

    /// Invokes operation `name` with `context`.
    ///
    /// # Errors
    /// - `UnknownOperation` when `name` is not declared.
    /// - `Executor` when the executor or backend fails.
    pub async fn operation(&self, name: &str, context: Value) -> ModuleResult<Value> {
        self.invoke(name, context, None).await
    }

    /// Invokes operation `name`, tagging the call with the public `method`
    /// that issued it.
    pub async fn operation_from(
        &self,
        method: &str,
        name: &str,
        context: Value,
    ) -> ModuleResult<Value> {
        self.invoke(name, context, Some(method)).await
    }

    async fn invoke(&self, name: &str, context: Value, method: Option<&str>) -> ModuleResult<Value> {
        let Some(definition) = self.config.operation(name) else {
            error!(
                "event=operation_call module=storage_module status=error storage_module={} operation={} error_code=unknown_operation",
                self.name, name
            );
            return Err(ModuleError::UnknownOperation {
                module: self.name.clone(),
                operation: name.to_string(),
            });
        };

        let request = OperationRequest {
            invocation_id: Uuid::new_v4(),
            module: self.name.as_str(),
            name,
            context: &context,
            method,
            debug: &self.debug,
            definition,
        };
        log_pre_call(&request);
        let result = self.executor.execute(request).await;
        log_post_call(&request, &result);

        result.map_err(|source| {
            error!(
                "event=operation_call module=storage_module status=error storage_module={} operation={} invocation_id={} error_code=executor_failed error={}",
                self.name, name, request.invocation_id, source
            );
            ModuleError::Executor {
                operation: name.to_string(),
                source,
            }
        })
    }
}
