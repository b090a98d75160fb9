//! Storage module runtime.
//!
//! # Responsibility
//! - Finalize declared module configuration once, before first use.
//! - Expose named operations and hand rendered calls to a pluggable executor.
//! - Register module collections (optionally version-mapped) with a backend
//!   schema registry.
//!
//! # Invariants
//! - Invoking an undeclared operation fails immediately.
//! - Finalized configuration is immutable and shared across invocations.
//! - Debug diagnostics never affect control flow.

pub mod debug;
pub mod executor;
pub mod registry;
pub mod resolved;
pub mod runtime;

use crate::model::timestamp::{format_timestamp, Timestamp};
use crate::synth::SynthError;
use executor::BoxError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModuleResult<T> = Result<T, ModuleError>;

/// Module configuration and invocation errors.
#[derive(Debug)]
pub enum ModuleError {
    HistoryOutOfOrder {
        collection: String,
        version: Timestamp,
    },
    Synth(SynthError),
    UnknownOperation {
        module: String,
        operation: String,
    },
    Executor {
        operation: String,
        source: BoxError,
    },
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HistoryOutOfOrder {
                collection,
                version,
            } => write!(
                f,
                "history of collection `{collection}` is out of order at version {}",
                format_timestamp(version)
            ),
            Self::Synth(err) => write!(f, "{err}"),
            Self::UnknownOperation { module, operation } => {
                write!(f, "module `{module}` has no operation `{operation}`")
            }
            Self::Executor { operation, source } => {
                write!(f, "operation `{operation}` failed: {source}")
            }
        }
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Synth(err) => Some(err),
            Self::Executor { source, .. } => Some(source.as_ref()),
            Self::HistoryOutOfOrder { .. } | Self::UnknownOperation { .. } => None,
        }
    }
}

impl From<SynthError> for ModuleError {
    fn from(value: SynthError) -> Self {
        Self::Synth(value)
    }
}
