//! Typed schema model for storage module declarations.
//!
//! # Responsibility
//! - Define the declaration surface module authors write: collections,
//!   operations, access rules and public method signatures.
//! - Keep the wire format (camelCase JSON) stable through serde.
//!
//! # Invariants
//! - Declarations are immutable data; runtime state never lives here.
//! - Access rules and method signatures are transported, never evaluated.

pub mod access_rules;
pub mod collection;
pub mod config;
pub mod methods;
pub mod operation;
pub mod timestamp;

fn is_false(value: &bool) -> bool {
    !*value
}
