//! # Dashgraft Codemod Engine (`codemod`)
//!
//! File: cli/src/codemod/mod.rs
//!
//! ## Overview
//!
//! The text-level engine that integrates the dashboard into a host project.
//! Nothing here parses JavaScript: every decision is a line scan or a regex
//! over the raw source, and every edit is a splice that leaves the rest of
//! the file byte-for-byte intact.
//!
//! - **`detector`**: package manager, entrypoint and router module discovery.
//! - **`classifier`**: which router API the host uses.
//! - **`imports`** / **`injector`**: import statement analysis and
//!   minimal-diff import insertion.
//! - **`patcher`**: the structural edit that registers the dashboard route.
//! - **`rewriter`**: scoped-package to relative import rewriting for the
//!   template payload.
//!
use std::path::{Component, Path};

pub mod classifier;
pub mod detector;
pub mod imports;
pub mod injector;
pub mod patcher;
pub mod rewriter;
pub mod text;

/// Import specifier that reaches `target` from a module located at
/// `from_file`, using forward slashes and a `./` prefix for siblings.
/// `target` should carry no file extension.
pub fn relative_specifier(from_file: &Path, target: &Path) -> String {
    let from_dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(target, from_dir).unwrap_or_else(|| target.to_path_buf());
    let joined = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        ".".to_string()
    } else if joined == ".." || joined.starts_with("../") {
        joined
    } else {
        format!("./{joined}")
    }
}
