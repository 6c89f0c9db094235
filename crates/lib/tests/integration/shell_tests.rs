//! The printed environment, sourced by a shell, must match the evaluated one.

use strata_lib::spec::ExportedVar;
use strata_lib::{BuildSpec, EnvKind, compose, eval_environment};

use super::common::{TestEnv, graph, stdout};

fn roundtrip_graph() -> strata_lib::BuildGraph {
  graph([
    BuildSpec::new("ocaml", "ocaml", "4.6.0")
      .with_export("CAML_LD_LIBRARY_PATH", ExportedVar::global("#{ocaml.lib / 'ocaml'}"))
      .with_export("OCAML_GREETING", ExportedVar::global("it's $HOME, `whoami` and \"quotes\"")),
    BuildSpec::new("lwt", "lwt", "3.1.0")
      .with_dependency("ocaml")
      .with_export("CAML_LD_LIBRARY_PATH", ExportedVar::global("#{lwt.lib / 'ocaml' : $CAML_LD_LIBRARY_PATH}")),
    BuildSpec::new("app", "app", "0.1.0")
      .with_dependency("lwt")
      .with_dependency("ocaml")
      .with_export("OCAMLPATH", ExportedVar::local("#{self.lib : lwt.lib : $OCAMLPATH}")),
  ])
}

#[test]
fn sourced_environment_matches_evaluated() {
  let env = TestEnv::new();
  let graph = roundtrip_graph();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  assert!(composition.is_ok(), "unexpected errors: {:?}", composition.errors);
  env.write_env_file(&composition.env);

  let expected = eval_environment(&composition.env);
  let mut script = String::from(". ./build-env");
  for name in expected.keys() {
    script.push_str(&format!(" && printf '%s\\0' \"${name}\""));
  }

  let output = env.sh(&script);
  assert!(output.status.success(), "shell failed: {}", String::from_utf8_lossy(&output.stderr));

  let printed = stdout(&output);
  let values: Vec<&str> = printed.trim_end_matches('\0').split('\0').collect();
  assert_eq!(values.len(), expected.len());
  for ((name, want), got) in expected.iter().zip(values) {
    assert_eq!(got, want, "value of {name} differs after sourcing");
  }
}

#[test]
fn shell_syntax_is_not_expanded() {
  let env = TestEnv::new();
  let graph = roundtrip_graph();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && printf '%s' \"$OCAML_GREETING\"");

  assert_eq!(stdout(&output), "it's $HOME, `whoami` and \"quotes\"");
}

#[test]
fn chained_list_survives_sourcing() {
  let env = TestEnv::new();
  let graph = roundtrip_graph();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && printf '%s' \"$CAML_LD_LIBRARY_PATH\"");

  let store = env.store_path();
  assert_eq!(
    stdout(&output),
    format!(
      "{}:{}",
      store.join("i/lwt/lib/ocaml").display(),
      store.join("i/ocaml/lib/ocaml").display()
    )
  );
}

#[test]
fn origin_with_newline_does_not_run_as_code() {
  let env = TestEnv::new();
  let graph = graph([
    BuildSpec::new("evil\nexport INJECTED=pwned", "evil", "1.0.0").with_export("FOO", ExportedVar::global("1")),
    BuildSpec::new("app", "app", "0.1.0").with_dependency("evil\nexport INJECTED=pwned"),
  ]);
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && printf '%s %s' \"$FOO\" \"${INJECTED-unset}\"");

  assert!(output.status.success(), "shell failed: {}", String::from_utf8_lossy(&output.stderr));
  assert_eq!(stdout(&output), "1 unset");
  assert!(!eval_environment(&composition.env).contains_key("INJECTED"));
}
