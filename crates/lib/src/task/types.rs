use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::env::{BindingError, ComposeError, EnvKind, EnvironmentBinding, PackageScope, compose, eval_environment};
use crate::expr::{ExpressionError, interpolate};
use crate::spec::{BuildGraph, BuildSpec, SpecId};
use crate::store::{self, PackagePaths, PathResolutionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Build,
  Install,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Build => write!(f, "build"),
      Phase::Install => write!(f, "install"),
    }
  }
}

/// A recoverable problem found while assembling a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
  #[error(transparent)]
  Binding(#[from] BindingError),

  #[error("{phase} command {index}: {source} in '{expression}'")]
  Command {
    phase: Phase,
    index: usize,
    expression: String,
    source: ExpressionError,
  },

  #[error("cannot resolve paths of {id}: {source}")]
  Paths { id: SpecId, source: PathResolutionError },

  /// Carried over from [`BuildSpec::errors`].
  #[error("{id}: {message}")]
  Spec { id: SpecId, message: String },
}

/// A fully resolved build and install recipe for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTask {
  pub id: SpecId,
  pub name: String,
  pub version: String,

  /// `None` only when the package's own paths failed to resolve.
  pub paths: Option<PackagePaths>,

  pub env: Vec<EnvironmentBinding>,

  /// Build commands as argv, in order.
  pub build_commands: Vec<Vec<String>>,

  pub install_commands: Vec<Vec<String>>,

  #[serde(serialize_with = "serialize_errors")]
  pub errors: Vec<TaskError>,
}

fn serialize_errors<S: Serializer>(errors: &[TaskError], serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

impl BuildTask {
  /// Assemble the task for `spec`, which must be the graph's own entry for
  /// `spec.id`.
  ///
  /// Command arguments are evaluated like exported values: `self` is `spec`,
  /// other names refer to its direct dependencies, and `$VAR` reads the
  /// final composed environment.
  ///
  /// # Errors
  ///
  /// Fatal graph and configuration errors are returned. Everything else is
  /// collected in [`BuildTask::errors`]; arguments that failed to resolve are
  /// kept as written.
  pub fn from_build_spec(graph: &BuildGraph, spec: &BuildSpec, config: &Config) -> Result<Self, ComposeError> {
    let composition = compose(graph, &spec.id, config, EnvKind::Build)?;
    debug_assert_eq!(
      graph.get(&spec.id),
      Some(spec),
      "build spec {} differs from the graph entry it was composed from",
      spec.id
    );

    let mut errors: Vec<TaskError> = spec
      .errors
      .iter()
      .map(|message| TaskError::Spec {
        id: spec.id.clone(),
        message: message.clone(),
      })
      .collect();
    errors.extend(composition.errors.into_iter().map(TaskError::from));

    let paths = match store::resolve(spec, config) {
      Ok(paths) => Some(paths),
      Err(source) => {
        errors.push(TaskError::Paths {
          id: spec.id.clone(),
          source,
        });
        None
      }
    };

    let vars: HashMap<String, String> = eval_environment(&composition.env).into_iter().collect();
    let scope = PackageScope::new(graph, config, spec, &spec.id, &vars);
    let build_commands = interpolate_commands(&spec.build_command, Phase::Build, &scope, &mut errors);
    let install_commands = interpolate_commands(&spec.install_command, Phase::Install, &scope, &mut errors);

    for error in errors.iter().filter(|e| !matches!(e, TaskError::Binding(_))) {
      config.reporter.warn(&error.to_string());
    }

    debug!(
      id = %spec.id,
      bindings = composition.env.len(),
      commands = build_commands.len() + install_commands.len(),
      errors = errors.len(),
      "assembled build task"
    );
    if errors.is_empty() {
      config.reporter.info(&format!("build task for {} ready", spec.id));
    }

    Ok(Self {
      id: spec.id.clone(),
      name: spec.name.clone(),
      version: spec.version.clone(),
      paths,
      env: composition.env,
      build_commands,
      install_commands,
      errors,
    })
  }

  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  /// The exact environment to spawn build and install commands with.
  pub fn command_env(&self) -> BTreeMap<String, String> {
    eval_environment(&self.env)
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}

fn interpolate_commands(
  commands: &[Vec<String>],
  phase: Phase,
  scope: &PackageScope<'_>,
  errors: &mut Vec<TaskError>,
) -> Vec<Vec<String>> {
  commands
    .iter()
    .enumerate()
    .map(|(index, argv)| {
      argv
        .iter()
        .map(|arg| match interpolate(arg, scope) {
          Ok(value) => value,
          Err(source) => {
            errors.push(TaskError::Command {
              phase,
              index,
              expression: arg.clone(),
              source,
            });
            arg.clone()
          }
        })
        .collect()
    })
    .collect()
}
