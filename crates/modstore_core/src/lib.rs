//! Declarative storage modules.
//! Modules declare collections and named operation templates; this crate
//! finalizes those declarations and renders operations at call time.

pub mod logging;
pub mod model;
pub mod module;
pub mod synth;
pub mod template;
pub mod version_map;

pub use logging::{
    default_log_level, init_logging, logging_status, LogDestination, LoggingConfig, LoggingError,
};
pub use model::collection::{CollectionDefinition, FieldDefinition, FieldType, Relationship};
pub use model::config::{ConfigLoadError, StorageModuleConfig};
pub use model::operation::{OperationDefinition, OperationKind};
pub use model::timestamp::{format_timestamp, parse_timestamp, Timestamp};
pub use module::debug::{DebugConfig, DebugSetting};
pub use module::executor::{
    render_operation, BackendExecutor, BoxError, ExecutorResult, OperationExecutor,
    OperationRequest, RenderedOperation, StorageBackend,
};
pub use module::registry::{
    register_module_collections, CollectionRegistry, ModuleVersionMappings, RegistryError,
    StorageModuleRegistry,
};
pub use module::resolved::ResolvedModuleConfig;
pub use module::runtime::StorageModule;
pub use module::{ModuleError, ModuleResult};
pub use synth::{synthesize_create_args, synthesize_operations, SynthError};
pub use template::{format_placeholder, placeholders, render, render_args, RenderOptions};
pub use version_map::{
    map_collection_versions, CollectionVersionMapEntry, CurrentVersionPolicy, VersionMapError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
