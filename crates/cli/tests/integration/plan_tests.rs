//! Plan command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

const DEPLOY_YAML: &str = r#"
release: api
chart: ./charts/api
namespace: prod
atomic: true
timeout: 5m
helm-repos:
  - bitnami=https://charts.bitnami.com/bitnami
test: true
test-rollback: true
post-commands:
  - [./notify.sh, api]
"#;

#[test]
fn plan_text_lists_commands_in_order() {
  let env = TestEnv::new();
  let config = env.write_file("deploy.yaml", DEPLOY_YAML);

  let assert = env.helmrun_cmd().arg("--config").arg(&config).arg("plan").assert().success();
  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

  let positions: Vec<usize> = [
    "helm repo add bitnami https://charts.bitnami.com/bitnami",
    "helm repo update",
    "helm upgrade --install -n prod --atomic --timeout 5m0s api ./charts/api",
    "helm test --logs api",
    "./notify.sh api",
  ]
  .iter()
  .map(|line| stdout.find(line).unwrap_or_else(|| panic!("missing {:?} in:\n{}", line, stdout)))
  .collect();

  assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order:\n{}", stdout);
  assert!(stdout.contains("On test failure: helm rollback api"));
  assert!(stdout.contains("5 command(s) planned"));
}

#[test]
fn plan_json_output() {
  let env = TestEnv::new();
  let config = env.write_file("deploy.yaml", DEPLOY_YAML);

  let assert = env
    .helmrun_cmd()
    .arg("--config")
    .arg(&config)
    .args(["plan", "--output", "json"])
    .assert()
    .success();

  let json: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(json["release"], "api");
  assert_eq!(json["rollback_on_test_failure"], true);

  let invocations = json["invocations"].as_array().unwrap();
  assert_eq!(invocations.len(), 5);
  assert_eq!(invocations[2]["phase"], "main");
  assert_eq!(invocations[2]["program"], "helm");
  assert_eq!(invocations[3]["args"], serde_json::json!(["test", "--logs", "api"]));
  assert_eq!(invocations[4]["phase"], "post");
}

#[test]
fn flags_override_deploy_file() {
  let env = TestEnv::new();
  let config = env.write_file("deploy.yaml", DEPLOY_YAML);

  env
    .helmrun_cmd()
    .arg("--config")
    .arg(&config)
    .args(["plan", "--release", "api-canary", "--namespace", "canary", "--set", "canary=true"])
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "helm upgrade --install -n canary --atomic --timeout 5m0s --set canary=true api-canary ./charts/api",
    ));
}

#[test]
fn flags_from_environment() {
  let env = TestEnv::new();

  env
    .helmrun_cmd()
    .env("HELMRUN_RELEASE", "api")
    .env("HELMRUN_CHART", "./chart")
    .env("HELMRUN_WAIT", "true")
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("helm upgrade --install --wait api ./chart"));
}

#[test]
fn plan_runs_nothing() {
  let env = TestEnv::new();

  env
    .helmrun_cmd()
    .args(["plan", "-r", "api", "--chart", "./chart", "--pre", "touch should-not-exist"])
    .assert()
    .success()
    .stdout(predicate::str::contains("touch should-not-exist"));

  assert!(!env.temp.path().join("should-not-exist").exists());
}
