//! The `artdeps` binary against snapshot-backed descriptors.

use artdeps::test_utils::{DescriptorFixture, TestEnvironment};
use assert_cmd::Command;
use predicates::prelude::*;

/// `artdeps` running in the project directory with an isolated config file.
fn artdeps(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("artdeps").unwrap();
    cmd.current_dir(&env.project_dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&env.config_path);
    cmd
}

#[test]
fn test_check_valid_descriptor() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    artdeps(&env)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 server(s), 2 dependency section(s)"));
}

#[test]
fn test_check_with_resolve() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    artdeps(&env).args(["check", "--resolve"]).assert().success().stderr(predicate::str::contains("2 resolved, 3 job(s)"));
}

#[test]
fn test_check_reports_line_errors() {
    let env = TestEnvironment::new().unwrap();
    DescriptorFixture::with_errors(&env.snapshot_path).write_to(&env.project_dir).unwrap();

    artdeps(&env)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server 'ghost' is not declared"))
        .stderr(predicate::str::contains("Condition=Sometimes"))
        .stderr(predicate::str::contains("Descriptor has 2 error(s)"));
}

#[test]
fn test_missing_descriptor_suggests_flag() {
    let env = TestEnvironment::new().unwrap();
    artdeps(&env)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Descriptor file not found"))
        .stderr(predicate::str::contains("--descriptor"));
}

#[test]
fn test_resolve_text_and_variant_filter() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    artdeps(&env)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("/repository/download/Lib_Build/.lastSuccessful/build/x.zip -> lib/x.zip"))
        .stdout(predicate::str::contains("-> tools/tool.exe [Debug]"))
        .stdout(predicate::str::contains("build/y.txt").not());

    artdeps(&env)
        .args(["resolve", "--variant", "Release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib/z.zip"))
        .stdout(predicate::str::contains("tools/tool.exe").not());
}

#[test]
fn test_resolve_json() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    let output = artdeps(&env).args(["resolve", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["entries"].as_array().unwrap().len(), 2);
    assert_eq!(report["entries"][0]["section"], "ci::Lib_Build");
    assert_eq!(report["jobs"].as_array().unwrap().len(), 3);
    assert_eq!(report["jobs"][2]["condition"], "Debug");
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_configured_variant_and_server_override() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();

    env.write_config("variant = \"Release\"\n").unwrap();
    let output = artdeps(&env).args(["resolve", "--format", "json"]).output().unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["variant"], "Release");
    assert_eq!(report["jobs"].as_array().unwrap().len(), 2);

    // Pointing the server at a missing snapshot breaks every section, without touching the descriptor.
    let missing = env.temp_dir.path().join("missing.json");
    env.write_config(&format!("[servers]\nci = \"{}\"\n", missing.display())).unwrap();
    artdeps(&env)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport"))
        .stderr(predicate::str::contains("dependency problem(s)"));
    assert!(env.read_file("artifacts.deps").unwrap().contains("ci-snapshot.json"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    env.write_config("variant = [").unwrap();
    artdeps(&env).arg("check").assert().failure().stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_fmt_check_and_write() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();

    artdeps(&env).args(["fmt", "--check"]).assert().failure().stderr(predicate::str::contains("not formatted"));
    artdeps(&env).args(["fmt", "--write"]).assert().success();
    artdeps(&env).args(["fmt", "--check"]).assert().success();

    let text = env.read_file("artifacts.deps").unwrap();
    assert!(text.contains("[ci::Tools_Build]\nRevisionName=buildNumber\nRevisionValue=42\nCondition=Debug\n"));
    assert!(text.contains("Path=bin/*.exe=>tools/\n@Release: bin/*.pdb=>symbols/\n"));
}

#[test]
fn test_fmt_refuses_descriptor_with_errors() {
    let env = TestEnvironment::new().unwrap();
    let path = DescriptorFixture::with_errors(&env.snapshot_path).write_to(&env.project_dir).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    artdeps(&env).args(["fmt", "--write"]).assert().failure();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_list_server() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    artdeps(&env)
        .args(["list", "ci"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Library [Lib]"))
        .stdout(predicate::str::contains("Build [Tools_Build]"));

    artdeps(&env)
        .args(["list", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server 'nope' is not declared"));
}

#[test]
fn test_import_declared_dependencies() {
    let env = TestEnvironment::new().unwrap();
    artdeps::test_utils::SnapshotFixture::basic().write_to(env.temp_dir.path()).unwrap();
    env.write_descriptor(&format!("[[ci]]\nType=Snapshot\nUrl={}\n", env.snapshot_path.display())).unwrap();

    artdeps(&env)
        .args(["import", "ci", "App_Build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 1 of 1"));

    let text = env.read_file("artifacts.deps").unwrap();
    assert!(text.contains("[ci::Lib_Build]\nRevisionName=lastPinned\nRevisionValue=latest.lastPinned\n"));
    assert!(text.contains("CleanDestination=true\nPath=build/*.zip=>lib/\n"));

    artdeps(&env)
        .args(["import", "ci", "App_Build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 0 of 1"));
}
