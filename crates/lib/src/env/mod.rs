//! Environment composition.
//!
//! Composition walks a target's dependency graph in postorder and turns every
//! visible exported variable into an [`EnvironmentBinding`]. Bindings are kept
//! in the order a shell has to apply them for `$VAR` chains to resolve: each
//! dependency before the packages that consume it.
//!
//! # Submodules
//!
//! - [`compose`] - graph traversal, scope rules and binding
//! - [`render`] - shell script and key/value renderings

pub mod compose;
pub mod render;
mod scope;
mod types;

pub use compose::compose;
pub use render::{eval_environment, print_environment, shell_quote};
pub(crate) use scope::PackageScope;
pub use types::*;
