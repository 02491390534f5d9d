//! # Dashgraft Detect Command
//!
//! File: cli/src/commands/detect.rs
//!
//! ## Overview
//!
//! `dashgraft detect [PROJECT_DIR]` reports what `install` would find:
//! the package manager, entrypoint, router file, the router strategy with
//! the reason it was chosen, and whether the dashboard is already
//! installed. It never writes anything.
//!
use crate::codemod::classifier::classify;
use crate::codemod::detector::detect_project;
use crate::commands::install::marker;
use crate::common::ui;
use crate::core::config;
use crate::core::error::{DashgraftError, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Root of the React project to inspect.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,
}

pub async fn handle_detect(args: DetectArgs) -> Result<()> {
    info!("Handling detect command...");
    debug!("Detect args: {:?}", args);

    let root = args.project_dir.canonicalize().map_err(|e| {
        anyhow::anyhow!(DashgraftError::Detection(format!(
            "cannot access project directory {}: {}",
            args.project_dir.display(),
            e
        )))
    })?;
    let config = config::load_config(&root)?;
    let project = detect_project(&root)?;
    let classification = classify(&project, config.scan.max_files);

    let show = |path: Option<&Path>| {
        path.map(|p| project.relative(p).display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };

    ui::print_heading(&format!("Project {}", root.display()));
    ui::print_field(
        "Name",
        project.package_name.as_deref().unwrap_or("(unnamed)"),
    );
    ui::print_field("Package manager", project.package_manager.program());
    ui::print_field("Entrypoint", &show(project.entrypoint.as_deref()));
    ui::print_field("Router file", &show(project.router_file.as_deref()));
    ui::print_field(
        "React",
        if project.declares_react { "declared" } else { "not declared" },
    );
    ui::print_field("Strategy", &classification.strategy.to_string());
    ui::print_field("Target", &show(classification.target.as_deref()));
    ui::print_field("Reason", &classification.reason);

    let installed = match marker::read_marker(&root)? {
        Some(m) => format!("yes (v{}, {})", m.version, m.installed_at.to_rfc3339()),
        None => "no".to_string(),
    };
    ui::print_field("Installed", &installed);
    Ok(())
}
