//! # Dashgraft Bounded Source Scan
//!
//! File: cli/src/common/fs/scan.rs
//!
//! ## Overview
//!
//! Breadth-first collection of source files below a directory, driven by an
//! explicit work queue. The number of files returned is capped by a caller
//! supplied limit so that scans over large, unknown host projects have a
//! bounded cost. Entries within a directory are visited in sorted order,
//! which makes "first match wins" decisions reproducible across platforms.
//!
//! Dependency and build output directories (`node_modules`, `dist`, `build`,
//! `coverage`) and hidden directories are never entered.
//!
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Extensions considered JavaScript/TypeScript source.
pub const SOURCE_EXTENSIONS: &[&str] = &["tsx", "jsx", "ts", "js", "mjs", "cjs"];

const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage", "out"];

/// Returns true if `path` has one of the given extensions.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// Collects at most `limit` files with one of `extensions` below `root`.
pub fn collect_source_files(root: &Path, extensions: &[&str], limit: usize) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let entries = match fs::read_dir(&dir) {
            Ok(iter) => iter,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };
        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        paths.sort();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if path.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                    trace!("Not descending into {}", path.display());
                    continue;
                }
                queue.push_back(path);
            } else if path.is_file() && has_extension(&path, extensions) {
                files.push(path);
                if files.len() >= limit {
                    debug!(
                        "Scan of {} stopped at the {} file limit",
                        root.display(),
                        limit
                    );
                    return files;
                }
            }
        }
    }
    files
}
