//! Process-wide, read-only configuration for composition.
//!
//! A [`Config`] is built once per invocation, either directly or from the
//! `STRATA_*` environment variables, and passed by reference into every call.
//! The engine never mutates it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::consts::{BASE_PATH_ENV, BUILD_PLATFORM_ENV, DEFAULT_BASE_PATH, SANDBOX_ENV, STORE_ENV};
use crate::platform::paths::data_dir;
use crate::platform::{BuildPlatform, UnknownPlatform};
use crate::reporter::{Reporter, TracingReporter};

/// Errors in configuration. Always fatal, checked before any traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("store path is not set")]
  MissingStorePath,

  #[error("sandbox path is not set")]
  MissingSandboxPath,

  #[error("environment variable {0} is not set")]
  MissingVar(&'static str),

  #[error(transparent)]
  UnknownPlatform(#[from] UnknownPlatform),
}

#[derive(Clone)]
pub struct Config {
  /// Diagnostic sink for recoverable problems.
  pub reporter: Arc<dyn Reporter>,

  /// Root of the project; mutable packages are built under it.
  pub sandbox_path: PathBuf,

  /// Content-addressed store for immutable packages.
  pub store_path: PathBuf,

  pub build_platform: BuildPlatform,

  /// Initial `PATH` of every composed environment.
  pub base_path: Vec<PathBuf>,
}

impl Config {
  pub fn new(store_path: impl Into<PathBuf>, sandbox_path: impl Into<PathBuf>, build_platform: BuildPlatform) -> Self {
    Self {
      reporter: Arc::new(TracingReporter),
      sandbox_path: sandbox_path.into(),
      store_path: store_path.into(),
      build_platform,
      base_path: DEFAULT_BASE_PATH.iter().map(PathBuf::from).collect(),
    }
  }

  pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn with_base_path(mut self, base_path: Vec<PathBuf>) -> Self {
    self.base_path = base_path;
    self
  }

  /// Load configuration from `STRATA_*` environment variables.
  ///
  /// - `STRATA_SANDBOX` is required
  /// - `STRATA_STORE` defaults to `<data dir>/store`
  /// - `STRATA_BUILD_PLATFORM` defaults to the running OS
  /// - `STRATA_BASE_PATH` replaces the default `PATH` seed
  pub fn from_env() -> Result<Self, ConfigError> {
    let sandbox_path = std::env::var_os(SANDBOX_ENV)
      .map(PathBuf::from)
      .ok_or(ConfigError::MissingVar(SANDBOX_ENV))?;

    let store_path = match std::env::var_os(STORE_ENV) {
      Some(path) => PathBuf::from(path),
      None => data_dir()
        .map(|dir| dir.join("store"))
        .ok_or(ConfigError::MissingVar(STORE_ENV))?,
    };

    let build_platform = match std::env::var(BUILD_PLATFORM_ENV) {
      Ok(value) => value.parse()?,
      Err(_) => BuildPlatform::current().ok_or_else(|| UnknownPlatform(std::env::consts::OS.to_string()))?,
    };

    let mut config = Self::new(store_path, sandbox_path, build_platform);
    if let Ok(value) = std::env::var(BASE_PATH_ENV) {
      config.base_path = value
        .split(build_platform.path_list_separator())
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect();
    }

    Ok(config)
  }

  /// Check that every required field is set.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.store_path.as_os_str().is_empty() {
      return Err(ConfigError::MissingStorePath);
    }
    if self.sandbox_path.as_os_str().is_empty() {
      return Err(ConfigError::MissingSandboxPath);
    }
    Ok(())
  }

  pub fn path_list_separator(&self) -> &'static str {
    self.build_platform.path_list_separator()
  }
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("sandbox_path", &self.sandbox_path)
      .field("store_path", &self.store_path)
      .field("build_platform", &self.build_platform)
      .field("base_path", &self.base_path)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_vars;

  #[test]
  fn new_seeds_default_base_path() {
    let config = Config::new("/store", "/project", BuildPlatform::Linux);
    assert_eq!(config.base_path.len(), DEFAULT_BASE_PATH.len());
    assert_eq!(config.base_path[0], PathBuf::from("/usr/local/bin"));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn validate_rejects_empty_paths() {
    let config = Config::new("", "/project", BuildPlatform::Linux);
    assert_eq!(config.validate(), Err(ConfigError::MissingStorePath));

    let config = Config::new("/store", "", BuildPlatform::Linux);
    assert_eq!(config.validate(), Err(ConfigError::MissingSandboxPath));
  }

  #[test]
  #[serial]
  fn from_env_reads_all_variables() {
    with_vars(
      [
        (STORE_ENV, Some("/custom/store")),
        (SANDBOX_ENV, Some("/work/project")),
        (BUILD_PLATFORM_ENV, Some("darwin")),
        (BASE_PATH_ENV, Some("/opt/bin::/bin")),
      ],
      || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/custom/store"));
        assert_eq!(config.sandbox_path, PathBuf::from("/work/project"));
        assert_eq!(config.build_platform, BuildPlatform::MacOs);
        assert_eq!(config.base_path, vec![PathBuf::from("/opt/bin"), PathBuf::from("/bin")]);
      },
    );
  }

  #[test]
  #[serial]
  fn from_env_requires_sandbox() {
    with_vars(
      [(SANDBOX_ENV, None::<&str>), (STORE_ENV, Some("/custom/store"))],
      || {
        assert_eq!(Config::from_env().unwrap_err(), ConfigError::MissingVar(SANDBOX_ENV));
      },
    );
  }

  #[test]
  #[serial]
  #[cfg(not(windows))]
  fn from_env_defaults_store_to_data_dir() {
    with_vars(
      [
        (STORE_ENV, None::<&str>),
        (SANDBOX_ENV, Some("/work/project")),
        (BUILD_PLATFORM_ENV, None::<&str>),
        (BASE_PATH_ENV, None::<&str>),
        ("XDG_DATA_HOME", Some("/data")),
      ],
      || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/data/strata/store"));
        assert_eq!(Some(config.build_platform), BuildPlatform::current());
      },
    );
  }

  #[test]
  #[serial]
  fn from_env_rejects_unknown_platform() {
    with_vars(
      [
        (STORE_ENV, Some("/custom/store")),
        (SANDBOX_ENV, Some("/work/project")),
        (BUILD_PLATFORM_ENV, Some("amiga")),
      ],
      || {
        assert_eq!(
          Config::from_env().unwrap_err(),
          ConfigError::UnknownPlatform(UnknownPlatform("amiga".to_string()))
        );
      },
    );
  }
}
