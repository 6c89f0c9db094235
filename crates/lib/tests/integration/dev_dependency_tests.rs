//! Dependencies land on `PATH`; development dependencies only in the command environment.

use strata_lib::{BuildGraph, BuildSpec, EnvKind, compose};

use super::common::{TestEnv, graph, stdout};

fn setup() -> (TestEnv, BuildGraph) {
  let env = TestEnv::new();
  env.write_script("i/dep/bin/dep", "echo __dep__");
  env.write_script("i/devDep/bin/devDep", "echo __devDep__");

  let graph = graph([
    BuildSpec::new("dep", "dep", "1.0.0"),
    BuildSpec::new("devDep", "devDep", "1.0.0"),
    BuildSpec::new("app", "app", "1.0.0")
      .with_dependency("dep")
      .with_dev_dependency("devDep"),
  ]);
  (env, graph)
}

#[test]
fn dependency_is_on_build_path() {
  let (env, graph) = setup();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && dep");

  assert!(output.status.success());
  assert_eq!(stdout(&output), "__dep__\n");
}

#[test]
fn dev_dependency_is_not_on_build_path() {
  let (env, graph) = setup();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Build).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && devDep");

  assert!(!output.status.success());
  assert_eq!(stdout(&output), "");
}

#[test]
fn dev_dependency_is_on_command_path() {
  let (env, graph) = setup();
  let composition = compose(&graph, &"app".into(), &env.config(), EnvKind::Command).unwrap();
  env.write_env_file(&composition.env);

  let output = env.sh(". ./build-env && dep && devDep");

  assert!(output.status.success());
  assert_eq!(stdout(&output), "__dep__\n__devDep__\n");
}
