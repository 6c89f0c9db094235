//! Renderings of a composed environment.
//!
//! Both renderings are pure functions of the bindings and agree on every value:
//! sourcing the output of [`print_environment`] in a POSIX shell leaves exactly
//! the variables returned by [`eval_environment`].

use std::collections::BTreeMap;

use super::types::{EnvironmentBinding, Origin};

/// Render bindings as a shell script, one `export` per binding, in order.
///
/// Values are single-quoted, so sourcing the script performs no further
/// expansion. A `# <origin>` comment precedes each run of bindings from the
/// same origin; control characters in the origin are replaced so the comment
/// stays on one line.
pub fn print_environment(env: &[EnvironmentBinding]) -> String {
  let mut script = String::new();
  let mut current: Option<&Origin> = None;

  for binding in env {
    if current != Some(&binding.origin) {
      script.push_str(&format!("# {}\n", comment_text(&binding.origin.to_string())));
      current = Some(&binding.origin);
    }
    script.push_str(&format!("export {}={}\n", binding.name, shell_quote(&binding.value)));
  }

  script
}

fn comment_text(text: &str) -> String {
  text.chars().map(|c| if c.is_control() { '?' } else { c }).collect()
}

/// Final value of every variable, for spawning processes directly.
pub fn eval_environment(env: &[EnvironmentBinding]) -> BTreeMap<String, String> {
  env
    .iter()
    .map(|binding| (binding.name.clone(), binding.value.clone()))
    .collect()
}

/// Quote a value for POSIX shells: `it's` becomes `'it'\''s'`.
pub fn shell_quote(value: &str) -> String {
  format!("'{}'", value.replace('\'', r"'\''"))
}
