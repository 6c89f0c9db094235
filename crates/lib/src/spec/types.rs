use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::util::hash::{HashError, Hashable};

/// Stable identity of a distinct build (name + version + configuration).
///
/// Used as the deduplication key during traversal and as the store-path key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecId(pub String);

impl SpecId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Whether the id can be used as a single store path component.
  pub fn is_well_formed(&self) -> bool {
    !self.0.is_empty()
      && self.0 != "."
      && self.0 != ".."
      && !self
        .0
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_whitespace())
  }
}

impl fmt::Display for SpecId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for SpecId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

/// Visibility of an exported variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  /// Visible to the package itself and every direct and transitive dependent.
  #[default]
  Global,
  /// Visible only while building and installing the package itself.
  Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
  /// Stored content-addressed, never rebuilt in place.
  Immutable,
  /// Rebuilt inside the sandbox.
  Mutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildType {
  /// The build runs in (a copy of) the source tree.
  InSource,
  /// The build stages its artifacts in a separate directory.
  OutOfSource,
}

/// A variable a package exports, as a value expression plus its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportedVar {
  pub val: String,
  #[serde(default)]
  pub scope: Scope,
}

impl ExportedVar {
  pub fn global(val: impl Into<String>) -> Self {
    Self {
      val: val.into(),
      scope: Scope::Global,
    }
  }

  pub fn local(val: impl Into<String>) -> Self {
    Self {
      val: val.into(),
      scope: Scope::Local,
    }
  }
}

/// One node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
  pub id: SpecId,
  pub name: String,
  pub version: String,

  /// Direct dependencies in declared order. The order is the traversal order
  /// used when composing chained values.
  #[serde(default)]
  pub dependencies: Vec<SpecId>,

  /// Development-only dependencies, never part of the build environment.
  #[serde(default)]
  pub dev_dependencies: Vec<SpecId>,

  /// Exported variables in declared order; a later entry may read an
  /// earlier one through `$NAME`.
  #[serde(default)]
  pub exported_env: IndexMap<String, ExportedVar>,

  /// Source tree; relative paths are relative to the sandbox.
  pub source_path: PathBuf,

  #[serde(default)]
  pub package_path: PathBuf,

  pub source_type: SourceType,
  pub build_type: BuildType,

  /// Commands run to build the package, each an argv of expressions.
  #[serde(default)]
  pub build_command: Vec<Vec<String>>,

  #[serde(default)]
  pub install_command: Vec<Vec<String>>,

  /// Validation errors already found for this spec upstream.
  #[serde(default)]
  pub errors: Vec<String>,
}

/// The parts of a spec that determine what gets built.
#[derive(Serialize)]
struct BuildIdentity<'a> {
  name: &'a str,
  version: &'a str,
  dependencies: &'a [SpecId],
  exported_env: &'a IndexMap<String, ExportedVar>,
  source_type: SourceType,
  build_type: BuildType,
  build_command: &'a [Vec<String>],
  install_command: &'a [Vec<String>],
}

impl Hashable for BuildIdentity<'_> {}

impl BuildSpec {
  /// A spec with no dependencies, exports or commands, built out of source
  /// from an immutable source tree named after the package.
  pub fn new(id: impl Into<SpecId>, name: impl Into<String>, version: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      id: id.into(),
      source_path: PathBuf::from(&name),
      package_path: PathBuf::from(&name),
      name,
      version: version.into(),
      dependencies: Vec::new(),
      dev_dependencies: Vec::new(),
      exported_env: IndexMap::new(),
      source_type: SourceType::Immutable,
      build_type: BuildType::OutOfSource,
      build_command: Vec::new(),
      install_command: Vec::new(),
      errors: Vec::new(),
    }
  }

  pub fn with_dependency(mut self, id: impl Into<SpecId>) -> Self {
    self.dependencies.push(id.into());
    self
  }

  pub fn with_dev_dependency(mut self, id: impl Into<SpecId>) -> Self {
    self.dev_dependencies.push(id.into());
    self
  }

  pub fn with_export(mut self, name: &str, var: ExportedVar) -> Self {
    self.exported_env.insert(name.to_string(), var);
    self
  }

  pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.source_path = path.into();
    self
  }

  pub fn with_source_type(mut self, source_type: SourceType) -> Self {
    self.source_type = source_type;
    self
  }

  pub fn with_build_type(mut self, build_type: BuildType) -> Self {
    self.build_type = build_type;
    self
  }

  pub fn with_build_command<S: Into<String>>(mut self, argv: impl IntoIterator<Item = S>) -> Self {
    self.build_command.push(argv.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_install_command<S: Into<String>>(mut self, argv: impl IntoIterator<Item = S>) -> Self {
    self.install_command.push(argv.into_iter().map(Into::into).collect());
    self
  }

  /// Derive a content-addressed id: `<name>-<version>-<hash>`.
  ///
  /// The hash covers everything that affects the build output, including the
  /// ids of dependencies, so a change anywhere below a package changes its id.
  pub fn compute_id(&self) -> Result<SpecId, HashError> {
    let identity = BuildIdentity {
      name: &self.name,
      version: &self.version,
      dependencies: &self.dependencies,
      exported_env: &self.exported_env,
      source_type: self.source_type,
      build_type: self.build_type,
      build_command: &self.build_command,
      install_command: &self.install_command,
    };
    let hash = identity.compute_hash()?;
    Ok(SpecId(format!(
      "{}-{}-{}",
      path_safe(&self.name),
      path_safe(&self.version),
      hash
    )))
  }
}

/// `@scope/pkg` style names become `scope__pkg`.
fn path_safe(s: &str) -> String {
  s.trim_start_matches('@')
    .replace('/', "__")
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+') {
        c
      } else {
        '_'
      }
    })
    .collect()
}
