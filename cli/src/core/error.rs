//! # Dashgraft Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout dashgraft. Only
//! *fatal* conditions are errors: they abort the whole run and surface as a
//! single actionable message printed by `main`. Outcomes that the pipeline
//! can survive (an unrecognised router layout, a structural pattern that
//! could not be found, a project that is already integrated) are modelled as
//! values (`PatchResult`, `Notice`, `RewriteReport`) and never travel through
//! this enum.
//!
//! ## Architecture
//!
//! - `DashgraftError`: a `thiserror` enum with one variant per fatal class.
//! - `Result<T>`: an alias for `anyhow::Result<T>` so call sites can attach
//!   context with `anyhow::Context`.
//!
//! ## Examples
//!
//! ```rust
//! if entrypoint.is_none() {
//!     anyhow::bail!(DashgraftError::Detection(
//!         "no src/main.tsx, src/main.jsx, src/main.ts or src/main.js found".into()
//!     ));
//! }
//!
//! let text = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for dashgraft.
#[derive(Error, Debug)]
pub enum DashgraftError {
    /// The target directory is not a usable React project (no package.json,
    /// no entrypoint). The message carries the remediation text.
    #[error("Project detection failed: {0}")]
    Detection(String),

    /// The install marker is present; the project was already patched.
    #[error("dashgraft is already installed in this project (marker found at {marker}). Remove the marker file to reinstall.")]
    AlreadyInstalled { marker: String },

    /// The package manager exited with a non-zero status.
    #[error("Dependency installation failed: `{cmd}` exited with {status}")]
    Install { cmd: String, status: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    /// Imports left after rewriting a template tree that are neither relative
    /// nor recognised packages.
    #[error("Template rewrite left {count} unrecognised import(s): {imports}")]
    RewriteValidation { count: usize, imports: String },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
