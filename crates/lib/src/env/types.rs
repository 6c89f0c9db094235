use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::expr::ExpressionError;
use crate::spec::{GraphError, SpecId};

/// Where a binding came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum Origin {
  /// Synthesized by the engine, e.g. the `PATH` seed or `cur__*` variables.
  BuiltIn,
  /// Exported by a package.
  Package(SpecId),
}

impl fmt::Display for Origin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Origin::BuiltIn => write!(f, "built-in"),
      Origin::Package(id) => write!(f, "{id}"),
    }
  }
}

/// How a binding relates to earlier bindings of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMode {
  /// First binding of the name.
  Set,
  /// Extends the earlier value through a `$NAME` reference.
  Augment,
  /// Replaces the earlier value.
  Override,
}

/// One resolved variable assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentBinding {
  pub name: String,
  /// Fully resolved; needs no further expansion.
  pub value: String,
  pub origin: Origin,
  pub mode: BindingMode,
}

/// Which environment to compose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnvKind {
  /// Environment for building and installing the target.
  #[default]
  Build,
  /// Environment for running commands in the target's project; additionally
  /// includes the target's development dependencies.
  Command,
}

/// A binding that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} (from {origin}): {source} in '{expression}'")]
pub struct BindingError {
  pub name: String,
  pub origin: Origin,
  /// The raw expression, as declared.
  pub expression: String,
  pub source: ExpressionError,
}

/// Errors that abort composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Result of composing an environment: every binding that resolved, in
/// application order, and every one that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
  pub env: Vec<EnvironmentBinding>,
  pub errors: Vec<BindingError>,
}

impl Composition {
  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  /// Final value of a variable.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .env
      .iter()
      .rev()
      .find(|binding| binding.name == name)
      .map(|binding| binding.value.as_str())
  }

  /// Every binding of a variable, oldest first.
  pub fn history<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EnvironmentBinding> + 'a {
    self.env.iter().filter(move |binding| binding.name == name)
  }
}
