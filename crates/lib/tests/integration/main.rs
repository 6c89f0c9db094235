//! End-to-end tests that run composed environments through a real shell.

#![cfg(unix)]

mod common;
mod dev_dependency_tests;
mod release_tests;
mod shell_tests;
