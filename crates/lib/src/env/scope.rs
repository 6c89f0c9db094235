//! Resolver used when evaluating a package's expressions.

use std::collections::HashMap;

use crate::config::Config;
use crate::expr::{ExpressionError, Resolver};
use crate::spec::{BuildGraph, BuildSpec, SpecId};
use crate::store::{self, PathResolutionError, Role};

/// Resolves references made from within one package.
///
/// `self` and the package's own name refer to `owner`; any other package name
/// must be one of its direct dependencies, or one of the target's development
/// dependencies when those are part of the composition. Paths of `target`
/// resolve to its stage directory, every other package to its install
/// directory.
pub(crate) struct PackageScope<'a> {
  graph: &'a BuildGraph,
  config: &'a Config,
  owner: &'a BuildSpec,
  target: &'a SpecId,
  vars: &'a HashMap<String, String>,
  dev_dependencies: bool,
}

impl<'a> PackageScope<'a> {
  pub(crate) fn new(
    graph: &'a BuildGraph,
    config: &'a Config,
    owner: &'a BuildSpec,
    target: &'a SpecId,
    vars: &'a HashMap<String, String>,
  ) -> Self {
    Self {
      graph,
      config,
      owner,
      target,
      vars,
      dev_dependencies: false,
    }
  }

  /// Make the target's development dependencies visible to the target.
  pub(crate) fn with_dev_dependencies(mut self, enabled: bool) -> Self {
    self.dev_dependencies = enabled;
    self
  }

  fn package(&self, name: &str) -> Result<&'a BuildSpec, ExpressionError> {
    if name == "self" || name == self.owner.name {
      return Ok(self.owner);
    }

    let dev: &'a [SpecId] = if self.dev_dependencies && &self.owner.id == self.target {
      &self.owner.dev_dependencies
    } else {
      &[]
    };

    self
      .owner
      .dependencies
      .iter()
      .chain(dev)
      .filter_map(|id| self.graph.get(id))
      .find(|dep| dep.name == name)
      .ok_or_else(|| ExpressionError::UnknownPackage(name.to_string()))
  }
}

impl Resolver for PackageScope<'_> {
  fn resolve_field(&self, package: &str, field: &str) -> Result<String, ExpressionError> {
    let spec = self.package(package)?;

    match field {
      "name" => return Ok(spec.name.clone()),
      "version" => return Ok(spec.version.clone()),
      "id" => return Ok(spec.id.to_string()),
      _ => {}
    }

    let role = if &spec.id == self.target { Role::Own } else { Role::Dependency };
    let path = store::resolve(spec, self.config)?
      .namespace(field, role)
      .map_err(|e| match e {
        PathResolutionError::UnknownNamespace(_) => ExpressionError::UnknownField {
          package: package.to_string(),
          field: field.to_string(),
        },
        other => ExpressionError::Path(other),
      })?;

    Ok(path.display().to_string())
  }

  fn resolve_var(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(|s| s.as_str())
  }

  fn list_separator(&self) -> &str {
    self.config.path_list_separator()
  }
}
