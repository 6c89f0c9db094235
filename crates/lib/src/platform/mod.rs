//! Build platform identification and per-user directories.

pub mod os;
pub mod paths;

pub use os::{BuildPlatform, UnknownPlatform};
