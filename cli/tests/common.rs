//! # Dashgraft CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests: a command builder that points
//! the binary at an isolated config home, and small fixtures for host
//! projects and template payloads.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// # Get Dashgraft Command (`dashgraft_cmd`)
///
/// Builds a `Command` for the compiled `dashgraft` binary with `HOME` and
/// `XDG_CONFIG_HOME` pointed at `config_home`, so the developer's own
/// configuration never leaks into a test run.
///
/// ## Panics
/// Panics if the `dashgraft` binary cannot be found via `Command::cargo_bin`.
pub fn dashgraft_cmd(config_home: &Path) -> Command {
    let mut cmd =
        Command::cargo_bin("dashgraft").expect("Failed to find dashgraft binary for testing");
    cmd.env("HOME", config_home)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("DASHGRAFT_TEMPLATE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(path, content).expect("write fixture file");
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("read fixture file")
}

pub const PACKAGE_JSON: &str =
    r#"{ "name": "shop", "dependencies": { "react": "^18.3.0", "react-router-dom": "^6.26.0" } }"#;

pub const MAIN_PLAIN: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import App from "./App";

ReactDOM.createRoot(document.getElementById("root")!).render(<App />);
"#;

pub const APP_BROWSER_ROUTER: &str = r#"import { BrowserRouter, Routes, Route } from "react-router-dom";
import Home from "./Home";

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path="/" element={<Home />} />
      </Routes>
    </BrowserRouter>
  );
}
"#;

pub const MAIN_DATA_ROUTER: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import { createBrowserRouter, RouterProvider } from "react-router-dom";
import Home from "./Home";

const router = createBrowserRouter([
  { path: "/", element: <Home /> },
]);

ReactDOM.createRoot(document.getElementById("root")!).render(
  <RouterProvider router={router} />
);
"#;

/// A TypeScript React project whose `App.tsx` renders `<BrowserRouter>`.
pub fn browser_router_project() -> TempDir {
    let dir = tempfile::tempdir().expect("create project dir");
    write(dir.path(), "package.json", PACKAGE_JSON);
    write(dir.path(), "src/main.tsx", MAIN_PLAIN);
    write(dir.path(), "src/App.tsx", APP_BROWSER_ROUTER);
    dir
}

/// A project whose entrypoint builds a data router.
pub fn data_router_project() -> TempDir {
    let dir = tempfile::tempdir().expect("create project dir");
    write(dir.path(), "package.json", PACKAGE_JSON);
    write(dir.path(), "src/main.tsx", MAIN_DATA_ROUTER);
    dir
}

/// A minimal dashboard payload with a stylesheet and a Tera file.
pub fn template_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create template dir");
    write(
        dir.path(),
        "index.tsx",
        "export { DashboardApp } from \"./app/DashboardApp\";\n",
    );
    write(
        dir.path(),
        "app/DashboardApp.tsx",
        "export function DashboardApp() {\n  return <div className=\"dash\" />;\n}\n",
    );
    write(dir.path(), "styles.css", ".dash { display: grid; }\n");
    write(
        dir.path(),
        "config.ts.tera",
        "export const basePath = \"{{ base_path }}\";\n",
    );
    dir
}
