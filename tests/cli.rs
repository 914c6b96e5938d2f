// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowdag contributors

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const LINEAR: &str = r#"
name: triage
steps:
  - id: fetch
    name: Fetch ticket
    action: delay
    params:
      duration_seconds: 5
  - id: wait
    action: delay
    params:
      duration_seconds: 10
    depends_on: [fetch]
"#;

const CYCLE: &str = r#"
name: loop
steps:
  - id: a
    action: delay
    params:
      duration_seconds: 1
    depends_on: [b]
  - id: b
    action: delay
    params:
      duration_seconds: 1
    depends_on: [a]
"#;

fn flowdag(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flowdag").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn new_workflow_is_valid() {
    let dir = TempDir::new().unwrap();

    flowdag(dir.path())
        .args(["new", "fresh", "-o", "fresh.yaml"])
        .assert()
        .success();

    flowdag(dir.path())
        .args(["validate", "fresh.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start node is not connected"));
}

#[test]
fn new_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "taken.yaml", LINEAR);

    flowdag(dir.path())
        .args(["new", "again", "-o", "taken.yaml"])
        .assert()
        .failure();
}

#[test]
fn validate_reports_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "dup.yaml",
        r#"
name: dup
steps:
  - id: x
    action: notify
  - id: x
    action: notify
"#,
    );

    flowdag(dir.path())
        .args(["validate", "dup.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate step ID 'x'"));
}

#[test]
fn validate_expands_globs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.yaml", LINEAR);
    write(dir.path(), "two.yaml", LINEAR);

    flowdag(dir.path())
        .args(["validate", "*.yaml", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one.yaml").and(predicate::str::contains("two.yaml")));
}

#[test]
fn cycle_rule_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loop.yaml", CYCLE);

    flowdag(dir.path())
        .args(["validate", "loop.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("dependency cycle"));

    write(
        dir.path(),
        "relaxed.toml",
        "[validation]\ndisabled_rules = [\"acyclic\"]\n",
    );

    flowdag(dir.path())
        .args(["--config", "relaxed.toml", "validate", "loop.yaml"])
        .assert()
        .success();
}

#[test]
fn flow_and_back() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "p.yaml", LINEAR);

    flowdag(dir.path())
        .args(["flow", "p.yaml", "-o", "p.flow.json"])
        .assert()
        .success();

    let graph = std::fs::read_to_string(dir.path().join("p.flow.json")).unwrap();
    assert!(graph.contains("\"stepId\": \"fetch\""));

    flowdag(dir.path())
        .args(["dag", "p.flow.json", "--base", "p.yaml", "-o", "back.yaml"])
        .assert()
        .success();

    let back = std::fs::read_to_string(dir.path().join("back.yaml")).unwrap();
    assert!(back.contains("name: triage"));
    assert!(back.contains("- fetch"));
}

#[test]
fn graph_as_mermaid() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "p.yaml", LINEAR);

    flowdag(dir.path())
        .args(["graph", "p.yaml", "--format", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph LR"))
        .stdout(predicate::str::contains("step_fetch --> step_wait"));
}

#[test]
fn levels_lists_columns() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "p.yaml", LINEAR);

    flowdag(dir.path())
        .args(["levels", "p.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 0").and(predicate::str::contains("Level 1")));
}

#[test]
fn params_reports_range_errors() {
    let dir = TempDir::new().unwrap();

    flowdag(dir.path())
        .args(["params", "delay", r#"{"duration_seconds": 0}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains("must be at least 1"));

    flowdag(dir.path())
        .args(["params", "delay", r#"{"duration_seconds": 30}"#])
        .assert()
        .success();
}

#[test]
fn actions_show_one_action() {
    let dir = TempDir::new().unwrap();

    flowdag(dir.path())
        .args(["actions", "--action", "conditional"])
        .assert()
        .success()
        .stdout(predicate::str::contains("condition").and(predicate::str::contains("branches")));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();

    flowdag(dir.path())
        .args(["graph", "nope.yaml"])
        .assert()
        .failure();
}
