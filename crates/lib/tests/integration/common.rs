//! Shared test helpers for integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use strata_lib::platform::BuildPlatform;
use strata_lib::{BuildGraph, BuildSpec, Config, EnvironmentBinding, print_environment};
use tempfile::TempDir;

/// Isolated store and sandbox, removed when dropped.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn store_path(&self) -> PathBuf {
    self.temp.path().join("store")
  }

  pub fn sandbox_path(&self) -> PathBuf {
    self.temp.path().join("project")
  }

  pub fn config(&self) -> Config {
    Config::new(self.store_path(), self.sandbox_path(), BuildPlatform::Linux)
  }

  /// Write an executable shell script relative to the store.
  pub fn write_script(&self, relative_path: &str, body: &str) -> PathBuf {
    let path = self.store_path().join(relative_path);
    write_executable(&path, &format!("#!/bin/sh\n{body}\n"));
    path
  }

  /// Render `env` to `build-env` in the temp directory.
  pub fn write_env_file(&self, env: &[EnvironmentBinding]) -> PathBuf {
    let path = self.temp.path().join("build-env");
    std::fs::write(&path, print_environment(env)).unwrap();
    path
  }

  /// Run `script` with `/bin/sh` from an empty environment, inside the temp directory.
  pub fn sh(&self, script: &str) -> Output {
    Command::new("/bin/sh")
      .arg("-c")
      .arg(script)
      .current_dir(self.temp.path())
      .env_clear()
      .output()
      .unwrap()
  }
}

pub fn write_executable(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

pub fn graph(specs: impl IntoIterator<Item = BuildSpec>) -> BuildGraph {
  BuildGraph::from_specs(specs).unwrap()
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}
