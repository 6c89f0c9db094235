//! Build specifications and the dependency graph they form.
//!
//! A [`BuildSpec`] describes one package: its identity, its direct
//! dependencies (by id, in declared order), what it exports to consumers and
//! how to build and install it. A [`BuildGraph`] holds every spec reachable
//! from the packages of interest, keyed by id.
//!
//! Both are constructed once by upstream resolution logic and treated as
//! immutable while environments are composed from them.

mod graph;
mod types;

pub use graph::*;
pub use types::*;
