//! # Dashgraft Backups Command
//!
//! File: cli/src/commands/backups.rs
//!
//! ## Overview
//!
//! `dashgraft backups [PROJECT_DIR]` lists the backups written by earlier
//! installs (`<name>.dashgraft-<timestamp>.bak`), oldest first, next to the
//! file each one preserves. Restoring is a plain copy back over the
//! original; dashgraft itself never deletes a backup.
//!
use crate::common::fs::backup::find_backups;
use crate::common::ui;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
pub struct BackupsArgs {
    /// Project to search for backups.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,
}

pub async fn handle_backups(args: BackupsArgs) -> Result<()> {
    info!("Handling backups command...");
    debug!("Backups args: {:?}", args);

    let root = args
        .project_dir
        .canonicalize()
        .with_context(|| format!("Cannot access {}", args.project_dir.display()))?;
    let backups = find_backups(&root)?;
    if backups.is_empty() {
        println!("No backups found in {}", root.display());
        return Ok(());
    }

    ui::print_heading(&format!("Backups in {}", root.display()));
    for backup in &backups {
        let rel = |p: &std::path::Path| {
            p.strip_prefix(&root).unwrap_or(p).display().to_string()
        };
        ui::print_step(&format!(
            "{}  {} -> {}",
            backup.taken_at.format("%Y-%m-%d %H:%M:%S"),
            rel(&backup.backup_path),
            rel(&backup.original_path)
        ));
    }
    Ok(())
}
