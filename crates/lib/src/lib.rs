//! strata-lib: environment composition for trees of native packages
//!
//! Given an already-resolved graph of build specifications, this crate computes
//! the exact environment and commands needed to build, install and run a package:
//! - `BuildSpec` / `BuildGraph`: immutable, identity-keyed package descriptions
//! - `store`: deterministic store and sandbox locations for each package
//! - `expr`: the `#{pkg.lib / 'ocaml' : $VAR}` expression language
//! - `env`: dependency-ordered environment composition and its renderings
//! - `task`: the fully resolved `BuildTask` handed to an executor

pub mod config;
pub mod consts;
pub mod env;
pub mod expr;
pub mod platform;
pub mod reporter;
pub mod spec;
pub mod store;
pub mod task;
pub mod util;

pub use config::{Config, ConfigError};
pub use env::{Composition, EnvKind, EnvironmentBinding, compose, eval_environment, print_environment};
pub use spec::{BuildGraph, BuildSpec, GraphError, SpecId};
pub use task::{BuildTask, TaskError};
