//! # Dashgraft Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Renders the dashboard payload into the host project and renders the small
//! generated snippets (the routes module, manual integration instructions).
//!
//! ## Architecture
//!
//! `render_template_directory` walks the payload directory:
//! 1. Hidden files and directories are skipped.
//! 2. Files ending in a template extension (`.tera`, `.tmpl`) are rendered
//!    with Tera and written without that extension.
//! 3. Every other file is copied byte for byte.
//!
//! All writes go through `BackupManager`, so re-running over a customised
//! payload never silently discards the user's edits: replaced files are
//! backed up first, identical files are left untouched.
//!
//! Rendering uses Tera with autoescaping disabled since the output is source
//! code, not HTML.
//!
//! ## Examples
//!
//! ```rust
//! let mut context = HashMap::new();
//! context.insert("base_path".to_string(), "/app".to_string());
//!
//! let report = templating::render_template_directory(
//!     &template_dir,
//!     &project_root.join("src/dashboard"),
//!     &context,
//!     &BackupManager::new(),
//! )?;
//! ```
//!
use crate::common::fs::backup::{BackupManager, BackupRecord, WriteOutcome};
use crate::common::fs::io::{ensure_dir_exists, read_file_to_string};
use crate::core::error::{DashgraftError, Result};
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File suffixes that mark a payload file as a Tera template.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".tera", ".tmpl"];

/// What rendering the payload did to the target directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadReport {
    pub created: Vec<PathBuf>,
    pub replaced: Vec<BackupRecord>,
    pub unchanged: usize,
}

impl PayloadReport {
    fn record(&mut self, path: &Path, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.created.push(path.to_path_buf()),
            WriteOutcome::Replaced(record) => self.replaced.push(record),
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.replaced.len() + self.unchanged
    }
}

fn tera_context(context_map: &HashMap<String, String>) -> Result<tera::Context> {
    tera::Context::from_serialize(context_map).map_err(|e| {
        anyhow!(DashgraftError::Template { source: e })
            .context("Failed to create Tera context from map")
    })
}

/// Renders a template held in memory. `name` identifies it in errors.
pub fn render_snippet(
    name: &str,
    template: &str,
    context_map: &HashMap<String, String>,
) -> Result<String> {
    let context = tera_context(context_map)?;
    Tera::one_off(template, &context, false).map_err(|e| {
        anyhow!(DashgraftError::Template { source: e })
            .context(format!("Tera rendering failed for snippet '{}'", name))
    })
}

/// Renders or copies every file of `source_dir` into `target_dir`. Hidden
/// files and directories are not part of the payload.
pub fn render_template_directory(
    source_dir: &Path,
    target_dir: &Path,
    context_map: &HashMap<String, String>,
    backups: &BackupManager,
) -> Result<PayloadReport> {
    info!(
        "Installing payload {} into {}",
        source_dir.display(),
        target_dir.display()
    );
    ensure_dir_exists(target_dir)?;
    let context = tera_context(context_map)?;
    let mut report = PayloadReport::default();

    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable payload entry: {}", e);
                continue;
            }
        };
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .with_context(|| format!("Payload entry outside {}", source_dir.display()))?;
        let destination = target_dir.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir_exists(&destination)?;
            continue;
        }
        if !entry.file_type().is_file() {
            debug!("Ignoring special payload entry {}", entry.path().display());
            continue;
        }

        match template_stem(&entry.file_name().to_string_lossy()) {
            Some(stem) => {
                let source = read_file_to_string(entry.path())?;
                let rendered = Tera::one_off(&source, &context, false).map_err(|e| {
                    anyhow!(DashgraftError::Template { source: e })
                        .context(format!("Cannot render {}", entry.path().display()))
                })?;
                let output = destination.with_file_name(stem);
                debug!("{} rendered to {}", relative.display(), output.display());
                let outcome = backups.write_guarded(&output, &rendered)?;
                report.record(&output, outcome);
            }
            None => {
                let outcome = backups.copy_guarded(entry.path(), &destination)?;
                report.record(&destination, outcome);
            }
        }
    }

    info!(
        "Payload: {} created, {} replaced, {} unchanged",
        report.created.len(),
        report.replaced.len(),
        report.unchanged
    );
    Ok(report)
}

/// `name` without its template suffix, if it has one.
fn template_stem(name: &str) -> Option<&str> {
    let lower = name.to_ascii_lowercase();
    TEMPLATE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext) && lower.len() > ext.len())
        .map(|ext| &name[..name.len() - ext.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn context() -> HashMap<String, String> {
        let mut context = HashMap::new();
        context.insert("base_path".to_string(), "/app".to_string());
        context.insert("component".to_string(), "DashboardApp".to_string());
        context
    }

    #[test]
    fn test_render_and_copy() -> Result<()> {
        let source = tempdir()?;
        let target = tempdir()?;
        create_file(
            &source.path().join("config.ts.tera"),
            "export const basePath = \"{{ base_path }}\";\nexport const tag = \"<{{ component }} />\";\n",
        );
        create_file(&source.path().join("pages/Home.tsx"), "export const Home = () => null;\n");
        create_file(&source.path().join(".DS_Store"), "junk");

        let report =
            render_template_directory(source.path(), &target.path().join("dashboard"), &context(), &BackupManager::new())?;
        assert_eq!(report.created.len(), 2);
        assert!(report.replaced.is_empty());

        let config = fs::read_to_string(target.path().join("dashboard/config.ts"))?;
        // No HTML escaping of source code.
        assert_eq!(
            config,
            "export const basePath = \"/app\";\nexport const tag = \"<DashboardApp />\";\n"
        );
        assert!(target.path().join("dashboard/pages/Home.tsx").is_file());
        assert!(!target.path().join("dashboard/.DS_Store").exists());
        Ok(())
    }

    #[test]
    fn test_rerender_backs_up_customised_files() -> Result<()> {
        let source = tempdir()?;
        let target = tempdir()?;
        create_file(&source.path().join("index.tsx"), "original\n");
        let backups = BackupManager::new();

        render_template_directory(source.path(), target.path(), &context(), &backups)?;
        fs::write(target.path().join("index.tsx"), "customised\n")?;

        let report = render_template_directory(source.path(), target.path(), &context(), &backups)?;
        assert_eq!(report.replaced.len(), 1);
        assert_eq!(fs::read_to_string(&report.replaced[0].backup_path)?, "customised\n");
        assert_eq!(fs::read_to_string(target.path().join("index.tsx"))?, "original\n");

        let again = render_template_directory(source.path(), target.path(), &context(), &backups)?;
        assert_eq!(again.unchanged, 1);
        assert_eq!(again.total(), 1);
        Ok(())
    }

    #[test]
    fn test_render_invalid_template_syntax() -> Result<()> {
        let source = tempdir()?;
        let target = tempdir()?;
        create_file(&source.path().join("invalid.ts.tera"), "Hello {{ base_path");

        let result =
            render_template_directory(source.path(), target.path(), &context(), &BackupManager::new());
        let error_string = format!("{:#}", result.unwrap_err());
        assert!(error_string.contains("Tera rendering failed"));
        assert!(error_string.contains("invalid.ts.tera"));
        assert!(!target.path().join("invalid.ts").exists());
        Ok(())
    }

    #[test]
    fn test_render_snippet() -> Result<()> {
        let out = render_snippet("route", "path: \"{{ base_path }}/*\"", &context())?;
        assert_eq!(out, "path: \"/app/*\"");
        assert!(render_snippet("broken", "{{ missing_var }}", &context()).is_err());
        Ok(())
    }
}
