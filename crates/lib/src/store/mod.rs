//! Store path resolution.
//!
//! Immutable packages live in the content-addressed store, mutable ones in a
//! store inside the sandbox. Both share one layout, keyed by package id:
//!
//! ```text
//! <store>/
//! ├── b/<id>/    # build directory
//! ├── i/<id>/    # installed package, what dependents see
//! └── s/<id>/    # stage: where the package's own install step writes
//! ```
//!
//! Resolution is pure: paths are computed, never created or checked.

pub mod paths;

pub use paths::{PackagePaths, PathResolutionError, Role, resolve};
