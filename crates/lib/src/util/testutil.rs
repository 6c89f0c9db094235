//! Test utilities for strata-lib.
//!
//! Shared fixtures and a reporter that records what it is told.

use std::sync::Mutex;

use crate::reporter::Reporter;
use crate::spec::{BuildGraph, BuildSpec, ExportedVar};

/// Reporter that keeps every message for later inspection.
#[derive(Debug, Default)]
pub struct CollectingReporter {
  messages: Mutex<Vec<String>>,
  infos: Mutex<Vec<String>>,
}

impl CollectingReporter {
  /// Warnings, in the order they were reported.
  pub fn messages(&self) -> Vec<String> {
    self.messages.lock().map(|m| m.clone()).unwrap_or_default()
  }

  pub fn infos(&self) -> Vec<String> {
    self.infos.lock().map(|m| m.clone()).unwrap_or_default()
  }
}

impl Reporter for CollectingReporter {
  fn warn(&self, message: &str) {
    if let Ok(mut messages) = self.messages.lock() {
      messages.push(message.to_string());
    }
  }

  fn info(&self, message: &str) {
    if let Ok(mut infos) = self.infos.lock() {
      infos.push(message.to_string());
    }
  }
}

/// `app` depends on `ocamlfind` and `lwt`, which both depend on `ocaml`.
/// Every package chains onto `CAML_LD_LIBRARY_PATH`, except `ocaml`, which
/// starts it.
pub fn ocaml_graph() -> BuildGraph {
  let chained = |name: &str, val: &str| {
    BuildSpec::new(name, name, "0.1.0").with_export("CAML_LD_LIBRARY_PATH", ExportedVar::global(val))
  };

  let ocaml = chained("ocaml", "#{ocaml.lib / 'ocaml'}");
  let ocamlfind =
    chained("ocamlfind", "#{ocamlfind.lib / 'ocaml' : $CAML_LD_LIBRARY_PATH}").with_dependency("ocaml");
  let lwt = chained("lwt", "#{lwt.lib / 'ocaml' : $CAML_LD_LIBRARY_PATH}").with_dependency("ocaml");
  let app = chained("app", "#{app.lib : $CAML_LD_LIBRARY_PATH}")
    .with_dependency("ocamlfind")
    .with_dependency("lwt");

  BuildGraph::from_specs([ocaml, ocamlfind, lwt, app]).expect("fixture ids are unique")
}
