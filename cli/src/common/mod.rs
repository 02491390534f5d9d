//! # Dashgraft Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the codemod engine and the command handlers,
//! kept apart from command-specific logic (`commands::`) and core
//! infrastructure (`core::`).
//!
//! - **`fs`**: file I/O, backup-guarded writes, bounded source scans.
//! - **`process`**: running the host project's package manager.
//! - **`ui`**: formatting of the plans, summaries and notices on stdout.
//!
//! ```rust
//! use crate::common::fs::backup::BackupManager;
//! use crate::common::process;
//! use crate::common::ui::{self, Notice};
//! ```
//!

/// Filesystem operations (I/O, backups, scans).
pub mod fs;
/// External process execution for the package manager.
pub mod process;
/// Terminal output formatting.
pub mod ui;
