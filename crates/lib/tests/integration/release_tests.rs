//! Running an assembled task's commands with its command environment.

use std::process::Command;

use strata_lib::spec::BuildType;
use strata_lib::{BuildGraph, BuildSpec, BuildTask};

use super::common::{TestEnv, graph, stdout};

fn release_graph() -> BuildGraph {
  graph([
    BuildSpec::new("releaseDep", "releaseDep", "1.0.0"),
    BuildSpec::new("release", "release", "1.0.0")
      .with_dependency("releaseDep")
      .with_build_type(BuildType::InSource)
      .with_build_command(["#{self.root / self.name}"])
      .with_install_command(["cp", "#{self.root / self.name}", "#{self.bin / self.name}"]),
  ])
}

fn release_task(env: &TestEnv, graph: &BuildGraph) -> BuildTask {
  let spec = graph.get(&"release".into()).unwrap();
  let task = BuildTask::from_build_spec(graph, spec, &env.config()).unwrap();
  assert!(task.is_ok(), "unexpected errors: {:?}", task.errors);
  task
}

fn run(task: &BuildTask, argv: &[String]) -> std::process::Output {
  Command::new(&argv[0])
    .args(&argv[1..])
    .env_clear()
    .envs(task.command_env())
    .env("NAME", "ME")
    .output()
    .unwrap()
}

#[test]
fn build_command_runs_in_build_dir() {
  let env = TestEnv::new();
  env.write_script("b/release/release", "echo \"RELEASE-HELLO-FROM-$NAME\"");
  let graph = release_graph();
  let task = release_task(&env, &graph);

  let output = run(&task, &task.build_commands[0]);

  assert!(output.status.success());
  assert_eq!(stdout(&output), "RELEASE-HELLO-FROM-ME\n");
}

#[test]
fn install_command_copies_into_stage() {
  let env = TestEnv::new();
  env.write_script("b/release/release", "echo \"RELEASE-HELLO-FROM-$NAME\"");
  std::fs::create_dir_all(env.store_path().join("s/release/bin")).unwrap();
  let graph = release_graph();
  let task = release_task(&env, &graph);

  let output = run(&task, &task.install_commands[0]);
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let installed = env.store_path().join("s/release/bin/release");
  assert!(installed.exists());
  let output = run(&task, &[installed.display().to_string()]);
  assert_eq!(stdout(&output), "RELEASE-HELLO-FROM-ME\n");
}

#[test]
fn dependency_binaries_are_reachable() {
  let env = TestEnv::new();
  env.write_script("i/releaseDep/bin/releaseDep", "echo \"RELEASE-DEP-HELLO-FROM-$NAME\"");
  let graph = release_graph();
  let task = release_task(&env, &graph);

  let output = run(&task, &["/bin/sh".to_string(), "-c".to_string(), "releaseDep".to_string()]);

  assert!(output.status.success());
  assert_eq!(stdout(&output), "RELEASE-DEP-HELLO-FROM-ME\n");
}
