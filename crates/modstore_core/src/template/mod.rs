//! Operation template rendering.
//!
//! # Responsibility
//! - Parse placeholder leaves (`$path` / `$path:type`).
//! - Substitute a per-call context into nested argument templates.
//!
//! # Invariants
//! - Rendering is pure: the same template and context always render identically.
//! - Templates without placeholders render to themselves.
//! - A placeholder that resolves to nothing is undefined, never an error.

mod placeholder;
mod render;

pub use placeholder::{format_placeholder, Placeholder};
pub use render::{placeholders, render, render_args, RenderOptions};
