//! # Dashgraft CLI Install Integration Tests
//!
//! File: cli/tests/install.rs
//!
//! ## Overview
//!
//! End-to-end runs of `dashgraft install` against temporary React projects.
//! Every test passes `--skip-install` so no package manager is needed.
//!

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_dry_run_prints_plan_without_changes() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .arg("--template")
        .arg(template.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Install plan (dry run)")
                .and(predicate::str::contains("browserRouter"))
                .and(predicate::str::contains("Register /app/* in src/App.tsx"))
                .and(predicate::str::contains("No files were changed.")),
        );

    assert_eq!(read(project.path(), "src/App.tsx"), APP_BROWSER_ROUTER);
    assert_eq!(read(project.path(), "src/main.tsx"), MAIN_PLAIN);
    assert!(!project.path().join("src/dashboard").exists());
    assert!(!project.path().join(".dashgraft.json").exists());
}

#[test]
fn test_install_browser_router_project() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--base", "/admin", "--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Dashboard installed")
                .and(predicate::str::contains("Backups"))
                .and(predicate::str::contains(".dashgraft-")),
        );

    let root = project.path();
    let app = read(root, "src/App.tsx");
    assert!(app.contains("import { DashboardApp } from \"./dashboard\";"));
    assert!(app.contains("        <Route path=\"/admin/*\" element={<DashboardApp />} />\n        <Route path=\"/\""));
    assert_eq!(app.matches("import { BrowserRouter, Routes, Route }").count(), 1);

    let main = read(root, "src/main.tsx");
    assert!(main.contains("import \"./dashboard/styles.css\";"));

    assert!(root.join("src/dashboard/app/DashboardApp.tsx").is_file());
    assert_eq!(
        read(root, "src/dashboard/config.ts"),
        "export const basePath = \"/admin\";\n"
    );
    let routes = read(root, "src/dashboard/routes.tsx");
    assert!(routes.contains("export const dashboardRoutes = ["));
    assert!(routes.contains("path: \"/admin/*\""));

    let marker = read(root, ".dashgraft.json");
    assert!(marker.contains("\"installedAt\""));
}

#[test]
fn test_install_data_router_project() {
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

    let main = read(project.path(), "src/main.tsx");
    assert!(main.contains("import { dashboardRoutes } from \"./dashboard/routes\";"));
    assert!(main.contains("import \"./dashboard/styles.css\";"));
    assert!(main.contains("...dashboardRoutes,"));
    let spread = main.find("...dashboardRoutes").unwrap();
    let home_route = main.find("{ path: \"/\"").unwrap();
    assert!(spread < home_route);
}

#[test]
fn test_second_install_is_refused() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    let run = || {
        let mut cmd = dashgraft_cmd(home.path());
        cmd.arg("install")
            .arg(project.path())
            .args(["--skip-install", "--template"])
            .arg(template.path());
        cmd
    };
    run().assert().success();
    let after_first = read(project.path(), "src/App.tsx");

    run()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already installed"));
    assert_eq!(read(project.path(), "src/App.tsx"), after_first);
}

#[test]
fn test_unrecognised_router_prints_instructions() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    write(project.path(), "package.json", PACKAGE_JSON);
    write(project.path(), "src/main.tsx", MAIN_PLAIN);
    write(project.path(), "src/App.tsx", "export default () => <h1>Hi</h1>;\n");
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("! Router")
                .and(predicate::str::contains("Register the dashboard route yourself"))
                .and(predicate::str::contains("...dashboardRoutes")),
        );

    assert!(project.path().join(".dashgraft.json").is_file());
    assert_eq!(
        read(project.path(), "src/App.tsx"),
        "export default () => <h1>Hi</h1>;\n"
    );
}

#[test]
fn test_skip_router_patch_leaves_router_untouched() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--skip-router-patch", "--template"])
        .arg(template.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("add this as the first child of <Routes>"));

    assert_eq!(read(project.path(), "src/App.tsx"), APP_BROWSER_ROUTER);
}

#[test]
fn test_root_base_path_falls_back_to_app() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--base", "/", "--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("! Base path"));

    assert!(read(project.path(), "src/App.tsx").contains("<Route path=\"/app/*\""));
}

#[test]
fn test_missing_entrypoint_fails() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    write(project.path(), "package.json", PACKAGE_JSON);
    let template = template_dir();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no entrypoint found"));
    assert!(!project.path().join(".dashgraft.json").exists());
}

#[test]
fn test_missing_package_json_fails() {
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    write(project.path(), "src/main.tsx", MAIN_PLAIN);

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no package.json"));
}

#[test]
fn test_missing_template_dir_fails_even_in_dry_run() {
    let home = tempdir().unwrap();
    let project = browser_router_project();

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("template directory not found"));
}

#[test]
fn test_template_dir_from_environment() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();

    dashgraft_cmd(home.path())
        .env("DASHGRAFT_TEMPLATE_DIR", template.path())
        .arg("install")
        .arg(project.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(template.path().display().to_string()));
}

#[test]
fn test_project_config_sets_base_path() {
    let home = tempdir().unwrap();
    let project = browser_router_project();
    let template = template_dir();
    write(
        project.path(),
        ".dashgraft.toml",
        "[install]\nbase_path = \"/ops\"\n",
    );

    dashgraft_cmd(home.path())
        .arg("install")
        .arg(project.path())
        .args(["--skip-install", "--template"])
        .arg(template.path())
        .assert()
        .success();

    assert!(read(project.path(), "src/App.tsx").contains("<Route path=\"/ops/*\""));
}
