use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::consts::{BUILD_DIR, INSTALL_DIR, SANDBOX_STORE_DIR, STAGE_DIR};
use crate::spec::{BuildSpec, BuildType, SourceType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathResolutionError {
  #[error("malformed package id '{0}'")]
  MalformedId(String),

  #[error("{0} path is not configured")]
  UnsetPath(&'static str),

  #[error("unknown namespace '{0}'")]
  UnknownNamespace(String),
}

/// Which side of a build a package is seen from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  /// The package currently being built; it installs into its stage directory.
  Own,
  /// A dependency of the package being built, already installed.
  Dependency,
}

/// Namespaces that resolve under a package's installation prefix.
const PREFIX_NAMESPACES: &[(&str, &[&str])] = &[
  ("install", &[]),
  ("bin", &["bin"]),
  ("sbin", &["sbin"]),
  ("lib", &["lib"]),
  ("man", &["man"]),
  ("doc", &["doc"]),
  ("stublibs", &["lib", "stublibs"]),
  ("toplevel", &["lib", "toplevel"]),
  ("share", &["share"]),
  ("etc", &["etc"]),
];

/// Every namespace accepted by [`PackagePaths::namespace`].
pub const NAMESPACES: &[&str] = &[
  "root",
  "original_root",
  "target_dir",
  "install",
  "bin",
  "sbin",
  "lib",
  "man",
  "doc",
  "stublibs",
  "toplevel",
  "share",
  "etc",
];

/// Resolved locations of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePaths {
  /// Source tree as declared.
  pub source: PathBuf,
  /// Where build commands run: the build directory for in-source builds,
  /// the source tree otherwise.
  pub root: PathBuf,
  pub build: PathBuf,
  pub install: PathBuf,
  pub stage: PathBuf,
}

impl PackagePaths {
  /// Installation prefix as seen from `role`.
  pub fn prefix(&self, role: Role) -> &Path {
    match role {
      Role::Own => &self.stage,
      Role::Dependency => &self.install,
    }
  }

  /// Resolve a namespace such as `lib` or `root`.
  pub fn namespace(&self, name: &str, role: Role) -> Result<PathBuf, PathResolutionError> {
    match name {
      "root" => return Ok(self.root.clone()),
      "original_root" => return Ok(self.source.clone()),
      "target_dir" => return Ok(self.build.clone()),
      _ => {}
    }

    let (_, components) = PREFIX_NAMESPACES
      .iter()
      .find(|(ns, _)| *ns == name)
      .ok_or_else(|| PathResolutionError::UnknownNamespace(name.to_string()))?;

    Ok(components.iter().fold(self.prefix(role).to_path_buf(), |path, c| path.join(c)))
  }
}

/// Store prefix holding packages of the given source type.
pub fn store_prefix(source_type: SourceType, config: &Config) -> Result<PathBuf, PathResolutionError> {
  match source_type {
    SourceType::Immutable => {
      if config.store_path.as_os_str().is_empty() {
        return Err(PathResolutionError::UnsetPath("store"));
      }
      Ok(config.store_path.clone())
    }
    SourceType::Mutable => Ok(SANDBOX_STORE_DIR.iter().fold(sandbox(config)?.to_path_buf(), |p, c| p.join(c))),
  }
}

fn sandbox(config: &Config) -> Result<&Path, PathResolutionError> {
  if config.sandbox_path.as_os_str().is_empty() {
    return Err(PathResolutionError::UnsetPath("sandbox"));
  }
  Ok(&config.sandbox_path)
}

/// Resolve every location of `spec`.
///
/// The same id always maps to the same paths, which is what lets builds of
/// immutable packages be reused across projects.
pub fn resolve(spec: &BuildSpec, config: &Config) -> Result<PackagePaths, PathResolutionError> {
  if !spec.id.is_well_formed() {
    return Err(PathResolutionError::MalformedId(spec.id.to_string()));
  }

  let prefix = store_prefix(spec.source_type, config)?;
  let id = spec.id.as_str();
  let build = prefix.join(BUILD_DIR).join(id);
  let install = prefix.join(INSTALL_DIR).join(id);
  let stage = prefix.join(STAGE_DIR).join(id);

  let source = if spec.source_path.is_absolute() {
    spec.source_path.clone()
  } else {
    sandbox(config)?.join(&spec.source_path)
  };

  let root = match spec.build_type {
    BuildType::InSource => build.clone(),
    BuildType::OutOfSource => source.clone(),
  };

  Ok(PackagePaths {
    source,
    root,
    build,
    install,
    stage,
  })
}
