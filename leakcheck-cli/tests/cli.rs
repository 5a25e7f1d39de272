//! End-to-end tests driving the built `leakcheck` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("leakcheck").unwrap()
}

#[test]
fn clean_header_exits_zero_and_prints_ok() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("clean.h");
    fs::write(
        &file,
        "class Clean { public: Clean() { data = new int(1); } ~Clean() { delete data; } private: int* data; };",
    )
    .unwrap();

    cmd()
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] No potential memory leaks detected."));
}

#[test]
fn leaking_header_exits_one_and_names_the_variable() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("widget.h");
    fs::write(
        &file,
        "class Widget { public: Widget() { data = new int(1); } ~Widget() {} private: int* data; };",
    )
    .unwrap();

    cmd()
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Widget::data"))
        .stdout(predicate::str::contains("Summary: 1 error(s)"));
}

#[test]
fn json_flag_emits_parseable_structured_report() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("widget.h");
    fs::write(
        &file,
        "class Widget { public: Widget() { data = new int(1); } ~Widget() {} private: int* data; };",
    )
    .unwrap();

    let output = cmd().arg(&file).arg("--json").assert().code(1).get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["summary"]["total_issues"], 1);
    assert_eq!(value["leaks"][0]["variable"], "data");
}

#[test]
fn exclude_flag_prunes_matching_directories() {
    let tmp = TempDir::new().unwrap();
    let vendor_dir = tmp.path().join("vendor");
    fs::create_dir_all(&vendor_dir).unwrap();
    fs::write(
        vendor_dir.join("leaky.h"),
        "class Leaky { public: Leaky() { p = new int(1); } ~Leaky() {} private: int* p; };",
    )
    .unwrap();

    cmd()
        .arg(tmp.path())
        .arg("--exclude")
        .arg("vendor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] No potential memory leaks detected."));
}

#[test]
fn no_paths_is_a_fatal_usage_error() {
    cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no paths specified"));
}

#[test]
fn version_flag_prints_exact_format() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("leakcheck version "));
}

#[test]
fn help_flag_exits_successfully() {
    cmd().arg("--help").assert().success();
}
