//! # Dashgraft Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The top-level commands of the dashgraft CLI. Each module defines its
//! clap arguments struct and an async `handle_*` function called from
//! `main.rs`.
//!
//! - `install`: inject the dashboard into a React project
//! - `detect`: report project and router detection without changes
//! - `package`: rewrite a dashboard source tree into a template payload
//! - `backups`: list backups left by earlier installs
//!

/// Lists backup files left next to patched sources.
pub mod backups;
/// Read-only detection report.
pub mod detect;
/// The install pipeline, its plan, marker and generated snippets.
pub mod install;
/// Template packaging via the import rewriter.
pub mod package;
