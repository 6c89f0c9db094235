use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{BuildSpec, SpecId};

/// Errors in the shape of the dependency graph. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  /// The ids form a cycle; the first and last entries are the same id.
  #[error("dependency cycle detected: {}", cycle_path(.0))]
  Cycle(Vec<SpecId>),

  #[error("{dependent} depends on {missing}, which is not in the graph")]
  MissingDependency { dependent: SpecId, missing: SpecId },

  #[error("target {0} is not in the graph")]
  UnknownTarget(SpecId),

  #[error("duplicate build spec id: {0}")]
  DuplicateId(SpecId),

  #[error("invalid build graph: {0}")]
  Invalid(String),
}

fn cycle_path(ids: &[SpecId]) -> String {
  ids.iter().map(SpecId::as_str).collect::<Vec<_>>().join(" -> ")
}

/// Every build spec of interest, keyed by id.
///
/// Dependencies are stored as ids, so diamond-shaped graphs share nodes
/// without shared ownership and the graph can be read from many threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<BuildSpec>", try_from = "Vec<BuildSpec>")]
pub struct BuildGraph {
  specs: BTreeMap<SpecId, BuildSpec>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a graph, rejecting specs that share an id.
  pub fn from_specs(specs: impl IntoIterator<Item = BuildSpec>) -> Result<Self, GraphError> {
    let mut graph = Self::new();
    for spec in specs {
      if graph.specs.contains_key(&spec.id) {
        return Err(GraphError::DuplicateId(spec.id));
      }
      graph.specs.insert(spec.id.clone(), spec);
    }
    Ok(graph)
  }

  /// Parse a JSON array of build specs.
  pub fn from_json(json: &str) -> Result<Self, GraphError> {
    serde_json::from_str(json).map_err(|e| GraphError::Invalid(e.to_string()))
  }

  /// Insert a spec, returning the one it replaced.
  pub fn insert(&mut self, spec: BuildSpec) -> Option<BuildSpec> {
    self.specs.insert(spec.id.clone(), spec)
  }

  pub fn get(&self, id: &SpecId) -> Option<&BuildSpec> {
    self.specs.get(id)
  }

  pub fn contains(&self, id: &SpecId) -> bool {
    self.specs.contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.specs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.specs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &BuildSpec> {
    self.specs.values()
  }

  /// Specs reachable from `target` in dependency postorder.
  ///
  /// Every dependency comes before the specs that depend on it, siblings keep
  /// their declared order, and a spec reachable through several paths appears
  /// once, at its first visit. The target is always last. With
  /// `include_dev`, the target's development dependencies are walked after its
  /// regular ones.
  ///
  /// # Errors
  ///
  /// - `UnknownTarget` if `target` is not in the graph
  /// - `MissingDependency` if a reachable spec names an id that is not
  /// - `Cycle` if a spec is reached again while its own dependencies are
  ///   still being walked
  pub fn postorder(&self, target: &SpecId, include_dev: bool) -> Result<Vec<&BuildSpec>, GraphError> {
    let root = self
      .get(target)
      .ok_or_else(|| GraphError::UnknownTarget(target.clone()))?;

    let mut walk = Walk {
      graph: self,
      marks: HashMap::new(),
      path: Vec::new(),
      order: Vec::new(),
    };
    let extra: &[SpecId] = if include_dev { &root.dev_dependencies } else { &[] };
    walk.visit(root, extra)?;
    Ok(walk.order)
  }
}

impl From<BuildGraph> for Vec<BuildSpec> {
  fn from(graph: BuildGraph) -> Self {
    graph.specs.into_values().collect()
  }
}

impl TryFrom<Vec<BuildSpec>> for BuildGraph {
  type Error = GraphError;

  fn try_from(specs: Vec<BuildSpec>) -> Result<Self, Self::Error> {
    Self::from_specs(specs)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  InProgress,
  Done,
}

struct Walk<'g> {
  graph: &'g BuildGraph,
  marks: HashMap<&'g SpecId, Mark>,
  /// Ids currently being walked, outermost first.
  path: Vec<&'g SpecId>,
  order: Vec<&'g BuildSpec>,
}

impl<'g> Walk<'g> {
  fn visit(&mut self, spec: &'g BuildSpec, extra: &'g [SpecId]) -> Result<(), GraphError> {
    match self.marks.get(&spec.id) {
      Some(Mark::Done) => return Ok(()),
      Some(Mark::InProgress) => {
        let start = self.path.iter().position(|id| **id == spec.id).unwrap_or(0);
        let mut cycle: Vec<SpecId> = self.path[start..].iter().map(|id| (*id).clone()).collect();
        cycle.push(spec.id.clone());
        return Err(GraphError::Cycle(cycle));
      }
      None => {}
    }

    self.marks.insert(&spec.id, Mark::InProgress);
    self.path.push(&spec.id);

    for dep_id in spec.dependencies.iter().chain(extra) {
      let dep = self.graph.get(dep_id).ok_or_else(|| GraphError::MissingDependency {
        dependent: spec.id.clone(),
        missing: dep_id.clone(),
      })?;
      self.visit(dep, &[])?;
    }

    self.path.pop();
    self.marks.insert(&spec.id, Mark::Done);
    self.order.push(spec);
    Ok(())
  }
}
