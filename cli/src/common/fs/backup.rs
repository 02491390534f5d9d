//! # Dashgraft Backup Manager
//!
//! File: cli/src/common/fs/backup.rs
//!
//! ## Overview
//!
//! Every host file dashgraft rewrites is first copied to a sibling backup.
//! Backups are plain copies of the pre-mutation bytes, named
//!
//! ```text
//! <file name>.dashgraft-<YYYYmmddTHHMMSSmmm>.bak
//! ```
//!
//! There is no index of backups: they are discovered by this naming
//! convention (`find_backups`) and are never deleted by dashgraft.
//!
//! ## Architecture
//!
//! - `BackupManager::backup` copies a file and returns a `BackupRecord`. If a
//!   backup with the same timestamp already exists a numeric suffix is added,
//!   so repeated runs never overwrite an earlier backup.
//! - `BackupManager::write_guarded` is the only way engine code replaces an
//!   existing file. It skips the write (and the backup) when the new content
//!   is identical, backs up before replacing, and creates new files without a
//!   backup since there is nothing to preserve.
//!
//! ## Usage
//!
//! ```rust
//! let backups = BackupManager::new();
//! match backups.write_guarded(&app_tsx, &patched)? {
//!     WriteOutcome::Replaced(record) => println!("backup: {}", record.backup_path.display()),
//!     WriteOutcome::Created | WriteOutcome::Unchanged => {}
//! }
//! ```
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::{DashgraftError, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Tag embedded in every backup file name.
pub const BACKUP_TAG: &str = "dashgraft";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3f";

/// A pre-mutation snapshot of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub timestamp: DateTime<Local>,
}

/// What `write_guarded` did to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content was identical; nothing written, no backup taken.
    Unchanged,
    /// The file did not exist before.
    Created,
    /// The file existed and was replaced after being backed up.
    Replaced(BackupRecord),
}

impl WriteOutcome {
    pub fn backup(&self) -> Option<&BackupRecord> {
        match self {
            WriteOutcome::Replaced(record) => Some(record),
            _ => None,
        }
    }
}

/// Creates backups and performs backup-guarded writes.
#[derive(Debug, Default, Clone)]
pub struct BackupManager;

impl BackupManager {
    pub fn new() -> Self {
        BackupManager
    }

    /// Copies `path` to a uniquely named sibling backup file.
    pub fn backup(&self, path: &Path) -> Result<BackupRecord> {
        if !path.is_file() {
            bail!(DashgraftError::FileSystem(format!(
                "Cannot back up {:?}: not a regular file",
                path
            )));
        }
        let timestamp = Local::now();
        let backup_path = unique_backup_path(path, &timestamp)?;
        fs::copy(path, &backup_path)
            .with_context(|| format!("Failed to back up {:?} to {:?}", path, backup_path))?;
        info!("Backed up {:?} to {:?}", path, backup_path);
        Ok(BackupRecord {
            original_path: path.to_path_buf(),
            backup_path,
            timestamp,
        })
    }

    /// Writes `content` to `path`, backing up any existing different content
    /// first. Identical content is a no-op.
    pub fn write_guarded(&self, path: &Path, content: &str) -> Result<WriteOutcome> {
        if path.is_file() {
            let current = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
            if current == content.as_bytes() {
                debug!("{:?} already up to date, skipping write", path);
                return Ok(WriteOutcome::Unchanged);
            }
            let record = self.backup(path)?;
            fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
            info!("Rewrote {:?}", path);
            return Ok(WriteOutcome::Replaced(record));
        }
        if path.exists() {
            bail!(DashgraftError::FileSystem(format!(
                "Refusing to overwrite non-file path {:?}",
                path
            )));
        }
        if let Some(parent) = path.parent() {
            ensure_dir_exists(parent)?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Created {:?}", path);
        Ok(WriteOutcome::Created)
    }

    /// Copies `source` over `target` with the same guarantees as
    /// `write_guarded`, byte for byte.
    pub fn copy_guarded(&self, source: &Path, target: &Path) -> Result<WriteOutcome> {
        let bytes = fs::read(source).with_context(|| format!("Failed to read {:?}", source))?;
        if target.is_file() {
            let current =
                fs::read(target).with_context(|| format!("Failed to read {:?}", target))?;
            if current == bytes {
                return Ok(WriteOutcome::Unchanged);
            }
            let record = self.backup(target)?;
            fs::write(target, &bytes).with_context(|| format!("Failed to write {:?}", target))?;
            return Ok(WriteOutcome::Replaced(record));
        }
        if let Some(parent) = target.parent() {
            ensure_dir_exists(parent)?;
        }
        fs::write(target, &bytes).with_context(|| format!("Failed to write {:?}", target))?;
        Ok(WriteOutcome::Created)
    }
}

fn unique_backup_path(path: &Path, timestamp: &DateTime<Local>) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot back up {:?}: path has no file name", path))?;
    let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

    let mut candidate = path.with_file_name(format!("{file_name}.{BACKUP_TAG}-{stamp}.bak"));
    let mut counter = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{file_name}.{BACKUP_TAG}-{stamp}-{counter}.bak"));
        counter += 1;
    }
    Ok(candidate)
}

fn backup_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<original>.+)\.dashgraft-(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})(\d{3})(?:-(?P<seq>\d+))?\.bak$",
        )
        .expect("valid backup name regex")
    })
}

/// Parses a backup file name into the original file name, its timestamp and
/// its collision counter (0 when absent).
pub fn parse_backup_name(file_name: &str) -> Option<(String, NaiveDateTime, u32)> {
    let caps = backup_name_regex().captures(file_name)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let stamp = NaiveDate::from_ymd_opt(num(2)? as i32, num(3)?, num(4)?)?
        .and_hms_milli_opt(num(5)?, num(6)?, num(7)?, num(8)?)?;
    let seq = caps
        .name("seq")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some((caps["original"].to_string(), stamp, seq))
}

/// A backup file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundBackup {
    pub backup_path: PathBuf,
    pub original_path: PathBuf,
    pub taken_at: NaiveDateTime,
}

/// Finds every dashgraft backup under `root`, oldest first. Skips
/// `node_modules` and hidden directories.
pub fn find_backups(root: &Path) -> Result<Vec<FoundBackup>> {
    let mut found = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !(name == "node_modules" || name.starts_with('.'))
    });
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to access entry while searching for backups: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some((original, taken_at, seq)) = parse_backup_name(&name) {
            found.push((
                seq,
                FoundBackup {
                    backup_path: entry.path().to_path_buf(),
                    original_path: entry.path().with_file_name(original),
                    taken_at,
                },
            ));
        }
    }
    found.sort_by(|(seq_a, a), (seq_b, b)| {
        a.taken_at
            .cmp(&b.taken_at)
            .then(seq_a.cmp(seq_b))
            .then(a.backup_path.cmp(&b.backup_path))
    });
    Ok(found.into_iter().map(|(_, backup)| backup).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backup_copies_content_alongside_original() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("App.tsx");
        fs::write(&file, "export default App;\n")?;

        let record = BackupManager::new().backup(&file)?;
        assert_eq!(record.original_path, file);
        assert_eq!(record.backup_path.parent(), Some(dir.path()));
        assert_eq!(fs::read_to_string(&record.backup_path)?, "export default App;\n");
        let name = record.backup_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("App.tsx.dashgraft-"));
        assert!(name.ends_with(".bak"));
        Ok(())
    }

    #[test]
    fn test_repeated_backups_never_overwrite() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("main.tsx");
        fs::write(&file, "one")?;
        let manager = BackupManager::new();
        let first = manager.backup(&file)?;
        fs::write(&file, "two")?;
        let second = manager.backup(&file)?;

        assert_ne!(first.backup_path, second.backup_path);
        assert_eq!(fs::read_to_string(&first.backup_path)?, "one");
        assert_eq!(fs::read_to_string(&second.backup_path)?, "two");
        Ok(())
    }

    #[test]
    fn test_write_guarded_outcomes() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("src/App.tsx");
        let manager = BackupManager::new();

        assert_eq!(manager.write_guarded(&file, "a")?, WriteOutcome::Created);
        assert_eq!(manager.write_guarded(&file, "a")?, WriteOutcome::Unchanged);

        let outcome = manager.write_guarded(&file, "b")?;
        let record = outcome.backup().expect("replacement must be backed up");
        assert_eq!(fs::read_to_string(&record.backup_path)?, "a");
        assert_eq!(fs::read_to_string(&file)?, "b");
        Ok(())
    }

    #[test]
    fn test_backup_of_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = BackupManager::new().backup(&dir.path().join("missing.tsx"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_backup_name() {
        let parsed = parse_backup_name("App.tsx.dashgraft-20261019T101500123.bak");
        let (original, stamp, seq) = parsed.expect("name should parse");
        assert_eq!(original, "App.tsx");
        assert_eq!(stamp.format("%Y-%m-%d").to_string(), "2026-10-19");
        assert_eq!(seq, 0);

        let (_, _, seq) = parse_backup_name("App.tsx.dashgraft-20261019T101500123-2.bak").unwrap();
        assert_eq!(seq, 2);

        assert!(parse_backup_name("App.tsx.bak").is_none());
        assert!(parse_backup_name("App.tsx").is_none());
    }

    #[test]
    fn test_find_backups_sorted_and_skips_node_modules() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir_all(&src)?;
        fs::create_dir_all(dir.path().join("node_modules/pkg"))?;
        fs::write(src.join("main.tsx.dashgraft-20260101T000000000.bak"), "")?;
        fs::write(src.join("App.tsx.dashgraft-20250101T000000000.bak"), "")?;
        fs::write(
            dir.path().join("node_modules/pkg/x.js.dashgraft-20240101T000000000.bak"),
            "",
        )?;

        let backups = find_backups(dir.path())?;
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].original_path, src.join("App.tsx"));
        assert_eq!(backups[1].original_path, src.join("main.tsx"));
        Ok(())
    }
}
