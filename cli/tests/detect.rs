//! # Dashgraft CLI Detect and Backups Integration Tests
//!
//! File: cli/tests/detect.rs
//!
//! ## Overview
//!
//! `dashgraft detect` must describe the project without touching it, and
//! `dashgraft backups` must list what an install left behind.
//!

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_detect_reports_browser_router() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    write(project.path(), "pnpm-lock.yaml", "lockfileVersion: '9.0'\n");

    dashgraft_cmd(home.path())
        .arg("detect")
        .arg(project.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("pnpm")
                .and(predicate::str::contains("src/main.tsx"))
                .and(predicate::str::contains("browserRouter"))
                .and(predicate::str::contains("src/App.tsx"))
                .and(predicate::str::is_match(r"Installed:\s+no").unwrap()),
        );
    assert_eq!(read(project.path(), "src/App.tsx"), APP_BROWSER_ROUTER);
}

#[test]
fn test_detect_reports_data_router_and_install_state() {
    let home = tempdir().unwrap();
    let project = data_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success();

    dashgraft_cmd(home.path())
        .arg("detect")
        .arg(project.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("createBrowserRouter")
                .and(predicate::str::contains("npm"))
                .and(predicate::str::contains(format!(
                    "yes (v{}",
                    env!("CARGO_PKG_VERSION")
                ))),
        );
}

#[test]
fn test_detect_without_package_json_fails() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();

    dashgraft_cmd(home.path())
        .arg("detect")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no package.json"));
}

#[test]
fn test_backups_lists_install_backups() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("backups")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success();

    dashgraft_cmd(home.path())
        .arg("backups")
        .arg(project.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("-> src/App.tsx")
                .and(predicate::str::contains("-> src/main.tsx")),
        );
}
