//! Builder and engine behavior through the public API.

use helmrun_lib::command::*;
use helmrun_lib::{BuildError, HelmCmd, Mode, Phase, RunContext, RunError};

use super::common::{RecordingRunner, argv};

#[test]
fn upgrade_with_release_and_chart_only() {
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![with_release("api"), with_chart("./charts/api"), with_runner(RecordingRunner::new().shared())],
  )
  .unwrap();

  assert_eq!(cmd.args(), argv(&["upgrade", "--install", "api", "./charts/api"]));
}

#[test]
fn rollback_ends_with_release() {
  let cmd = HelmCmd::new(
    Mode::Rollback,
    vec![with_release("api"), with_namespace("prod"), with_runner(RecordingRunner::new().shared())],
  )
  .unwrap();

  assert_eq!(cmd.args(), argv(&["rollback", "-n", "prod", "api"]));
}

#[test]
fn chart_required_only_for_upgrade() {
  let options = || vec![with_release("api"), with_chart(""), with_runner(RecordingRunner::new().shared())];

  let err = HelmCmd::new(Mode::InstallUpgrade, options()).unwrap_err();
  assert_eq!(err, BuildError::MissingChart);
  assert!(HelmCmd::new(Mode::Rollback, options()).is_ok());
}

#[test]
fn runner_always_required() {
  for mode in [Mode::InstallUpgrade, Mode::Rollback] {
    let err = HelmCmd::new(mode, vec![with_release("api"), with_chart("./chart")]).unwrap_err();
    assert_eq!(err.to_string(), "runner is required");
  }
}

#[test]
fn repos_expand_to_adds_and_one_update() {
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_helm_repos(["a=https://a.example", "b=https://b.example"]),
      with_helm_repos(Vec::<String>::new()),
      with_runner(RecordingRunner::new().shared()),
    ],
  )
  .unwrap();

  assert_eq!(
    cmd.pre_cmds(),
    [
      argv(&["helm", "repo", "add", "a", "https://a.example"]),
      argv(&["helm", "repo", "add", "b", "https://b.example"]),
      argv(&["helm", "repo", "update"]),
    ]
  );
}

#[test]
fn malformed_repo_fails_construction() {
  let err = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_helm_repos(["bad"]),
      with_runner(RecordingRunner::new().shared()),
    ],
  )
  .unwrap_err();

  assert_eq!(err.to_string(), "unable to parse option: not in key=value format: bad");
}

#[test]
fn repeated_options_are_not_deduplicated() {
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_atomic(true),
      with_atomic(true),
      with_values(["a=b=c"]),
      with_values(["a=b=c"]),
      with_runner(RecordingRunner::new().shared()),
    ],
  )
  .unwrap();

  assert_eq!(
    cmd.args(),
    argv(&[
      "upgrade",
      "--install",
      "--atomic",
      "--atomic",
      "--set",
      "a=b=c",
      "--set",
      "a=b=c",
      "api",
      "./chart"
    ])
  );
}

#[tokio::test]
async fn failing_pre_command_prevents_main_and_post() {
  let runner = RecordingRunner::new().exit_with("./prepare.sh", None, 2).shared();
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_pre_command(["./prepare.sh"]),
      with_post_command(["./notify.sh"]),
      with_runner(runner.clone()),
    ],
  )
  .unwrap();

  let err = cmd.run(&RunContext::background()).await.unwrap_err();

  assert_eq!(err.phase(), Some(Phase::Pre));
  assert_eq!(err.to_string(), "precmd failed: ./prepare.sh exited with exit status 2");
  assert_eq!(runner.lines(), vec!["./prepare.sh"]);
}

#[tokio::test]
async fn failed_test_with_successful_rollback_returns_test_error() {
  let runner = RecordingRunner::new().exit_with("helm", Some("test"), 1).shared();
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_atomic(true),
      with_test(true),
      with_test_rollback(true),
      with_post_command(["./notify.sh"]),
      with_runner(runner.clone()),
    ],
  )
  .unwrap();

  let err = cmd.run(&RunContext::background()).await.unwrap_err();

  assert!(matches!(err, RunError::Test(_)));
  assert_eq!(err.to_string(), "helm exited with exit status 1");
  assert_eq!(
    runner.lines(),
    vec![
      "helm upgrade --install --atomic api ./chart",
      "helm test --logs api",
      "helm rollback api",
    ]
  );
}

#[tokio::test]
async fn failed_rollback_is_reported_instead_of_test() {
  let runner = RecordingRunner::new()
    .exit_with("helm", Some("test"), 1)
    .exit_with("helm", Some("rollback"), 3)
    .shared();
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_test(true),
      with_test_rollback(true),
      with_runner(runner.clone()),
    ],
  )
  .unwrap();

  let err = cmd.run(&RunContext::background()).await.unwrap_err();

  assert_eq!(err.phase(), Some(Phase::Rollback));
  assert_eq!(err.runner_error().and_then(|e| e.exit_code()), Some(3));
}

#[tokio::test]
async fn passing_test_runs_posts_in_order() {
  let runner = RecordingRunner::new().shared();
  let cmd = HelmCmd::new(
    Mode::InstallUpgrade,
    vec![
      with_release("api"),
      with_chart("./chart"),
      with_test(true),
      with_post_command(["./first.sh"]),
      with_post_command(["./second.sh", "--flag"]),
      with_runner(runner.clone()),
    ],
  )
  .unwrap();

  cmd.run(&RunContext::background()).await.unwrap();

  assert_eq!(
    runner.lines(),
    vec![
      "helm upgrade --install api ./chart",
      "helm test --logs api",
      "./first.sh",
      "./second.sh --flag",
    ]
  );
}

#[tokio::test]
async fn invocations_match_a_successful_run() {
  let runner = RecordingRunner::new().shared();
  let build = || {
    HelmCmd::new(
      Mode::InstallUpgrade,
      vec![
        with_release("api"),
        with_chart("./chart"),
        with_lint(true),
        with_test(true),
        with_post_command(["./notify.sh"]),
        with_runner(runner.clone()),
      ],
    )
    .unwrap()
  };

  let planned: Vec<String> = build().invocations().iter().map(|i| i.command_line()).collect();
  build().run(&RunContext::background()).await.unwrap();

  assert_eq!(planned, runner.lines());
}
