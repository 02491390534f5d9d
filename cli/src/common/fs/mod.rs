//! # Dashgraft Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the codemod engine and the commands.
//!
//! - **`io`**: basic reads and writes with path context on errors.
//! - **`backup`**: the backup-before-mutate guarantee. Every rewrite of an
//!   existing host file goes through `BackupManager::write_guarded`.
//! - **`scan`**: bounded, breadth-first source file collection.
//!
//! Users import from the specific submodule, e.g.
//! `use crate::common::fs::backup::BackupManager;`.
//!

/// Timestamped sibling backups and backup-guarded writes.
pub mod backup;
/// Basic file I/O operations (`ensure_dir_exists`, `read_file_to_string`, `write_string_to_file`).
pub mod io;
/// Bounded work-queue traversal over source trees.
pub mod scan;
