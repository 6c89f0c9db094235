//! Build task assembly.
//!
//! A [`BuildTask`] is everything an executor needs to build and install one
//! package: its resolved store paths, its composed environment, and its build
//! and install commands with every expression substituted.

mod types;

pub use types::*;
