//! Dependency-ordered environment composition.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::Config;
use crate::consts::BUILTIN_PREFIX;
use crate::env::{BindingError, BindingMode, ComposeError, Composition, EnvKind, EnvironmentBinding, Origin, PackageScope};
use crate::expr::{Expression, ExpressionError, is_valid_var_name};
use crate::spec::{BuildGraph, BuildSpec, Scope, SpecId};

/// Built-in variables describing the target, bound before its own exports.
const TARGET_PATHS: &[(&str, &str)] = &[
  ("root", "#{self.root}"),
  ("original_root", "#{self.original_root}"),
  ("target_dir", "#{self.target_dir}"),
  ("install", "#{self.install}"),
  ("bin", "#{self.bin}"),
  ("sbin", "#{self.sbin}"),
  ("lib", "#{self.lib}"),
  ("man", "#{self.man}"),
  ("doc", "#{self.doc}"),
  ("stublibs", "#{self.stublibs}"),
  ("toplevel", "#{self.toplevel}"),
  ("share", "#{self.share}"),
  ("etc", "#{self.etc}"),
];

/// Variables every dependency extends with its own directories.
const DEPENDENCY_PATHS: &[(&str, &str)] = &[("PATH", "#{self.bin : $PATH}"), ("MAN_PATH", "#{self.man : $MAN_PATH}")];

/// Compose the environment of `target`.
///
/// Bindings come out in application order:
/// 1. `PATH`, seeded from `config.base_path`
/// 2. for every dependency in postorder, its `bin`/`man` directories on
///    `PATH`/`MAN_PATH`, then its `global` exports in declared order
/// 3. the target's `cur__*` variables, then all of its exports in declared
///    order
///
/// Each value is evaluated against the bindings made before it, so a package
/// chaining `$VAR` sees what its dependencies contributed but not what
/// siblings visited later will. When two unrelated packages set the same
/// name without chaining, the later one in traversal order wins.
///
/// # Errors
///
/// Configuration problems and graph problems (cycles, missing dependencies)
/// abort composition. Bindings that fail to resolve are collected in
/// [`Composition::errors`], reported through `config.reporter`, and left out
/// of the environment.
pub fn compose(graph: &BuildGraph, target: &SpecId, config: &Config, kind: EnvKind) -> Result<Composition, ComposeError> {
  config.validate()?;
  let order = graph.postorder(target, kind == EnvKind::Command)?;

  let mut composer = Composer {
    graph,
    config,
    target,
    kind,
    values: HashMap::new(),
    composition: Composition::default(),
  };

  composer.seed();
  for spec in order {
    if &spec.id == target {
      composer.bind_target_builtins(spec);
    } else {
      for (name, expression) in DEPENDENCY_PATHS {
        composer.bind_expression(spec, Origin::Package(spec.id.clone()), name, expression);
      }
    }
    composer.bind_exports(spec);
  }

  debug!(
    target = %target,
    bindings = composer.composition.env.len(),
    errors = composer.composition.errors.len(),
    "composed environment"
  );

  Ok(composer.composition)
}

struct Composer<'a> {
  graph: &'a BuildGraph,
  config: &'a Config,
  target: &'a SpecId,
  kind: EnvKind,
  /// Current value of every bound name.
  values: HashMap<String, String>,
  composition: Composition,
}

impl<'a> Composer<'a> {
  fn seed(&mut self) {
    if self.config.base_path.is_empty() {
      return;
    }
    let path = self
      .config
      .base_path
      .iter()
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join(self.config.path_list_separator());
    self.push("PATH", path, Origin::BuiltIn, false);
  }

  fn bind_target_builtins(&mut self, spec: &'a BuildSpec) {
    let depends = spec
      .dependencies
      .iter()
      .filter_map(|id| self.graph.get(id))
      .map(|dep| dep.name.as_str())
      .collect::<Vec<_>>()
      .join(" ");

    self.push(&format!("{BUILTIN_PREFIX}name"), spec.name.clone(), Origin::BuiltIn, false);
    self.push(&format!("{BUILTIN_PREFIX}version"), spec.version.clone(), Origin::BuiltIn, false);
    self.push(&format!("{BUILTIN_PREFIX}depends"), depends, Origin::BuiltIn, false);

    for (suffix, expression) in TARGET_PATHS {
      self.bind_expression(spec, Origin::BuiltIn, &format!("{BUILTIN_PREFIX}{suffix}"), expression);
    }
  }

  fn bind_exports(&mut self, spec: &'a BuildSpec) {
    let is_target = &spec.id == self.target;
    for (name, var) in &spec.exported_env {
      if !is_target && var.scope == Scope::Local {
        trace!(package = %spec.id, name = %name, "skipping local export of dependency");
        continue;
      }
      self.bind_expression(spec, Origin::Package(spec.id.clone()), name, &var.val);
    }
  }

  /// Evaluate `expression` in the scope of `owner` and bind the result.
  fn bind_expression(&mut self, owner: &'a BuildSpec, origin: Origin, name: &str, expression: &str) {
    match self.evaluate(owner, name, expression) {
      Ok((value, chained)) => self.push(name, value, origin, chained),
      Err(source) => {
        let error = BindingError {
          name: name.to_string(),
          origin,
          expression: expression.to_string(),
          source,
        };
        self.config.reporter.warn(&error.to_string());
        self.composition.errors.push(error);
      }
    }
  }

  fn evaluate(&self, owner: &'a BuildSpec, name: &str, expression: &str) -> Result<(String, bool), ExpressionError> {
    if !is_valid_var_name(name) {
      return Err(ExpressionError::InvalidName(name.to_string()));
    }
    let expr = Expression::parse(expression)?;
    let scope = PackageScope::new(self.graph, self.config, owner, self.target, &self.values)
      .with_dev_dependencies(self.kind == EnvKind::Command);
    let value = expr.evaluate(&scope)?;
    Ok((value, expr.references_var(name)))
  }

  fn push(&mut self, name: &str, value: String, origin: Origin, chained: bool) {
    let mode = match (self.values.contains_key(name), chained) {
      (false, _) => BindingMode::Set,
      (true, true) => BindingMode::Augment,
      (true, false) => BindingMode::Override,
    };
    if mode == BindingMode::Override {
      trace!(name = %name, origin = %origin, "binding overrides earlier value");
    }

    self.values.insert(name.to_string(), value.clone());
    self.composition.env.push(EnvironmentBinding {
      name: name.to_string(),
      value,
      origin,
      mode,
    });
  }
}
