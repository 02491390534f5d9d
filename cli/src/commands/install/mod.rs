//! # Dashgraft Install Command
//!
//! File: cli/src/commands/install/mod.rs
//!
//! ## Overview
//!
//! `dashgraft install [PROJECT_DIR]` injects the prebuilt dashboard into a
//! React project. Steps run strictly in sequence and every file is re-read
//! from disk right before it is edited:
//!
//! 1. Refuse to run if the install marker exists.
//! 2. Load configuration, detect the project, normalise the base path,
//!    resolve the template directory, classify the router.
//! 3. With `--dry-run`, print the plan and stop.
//! 4. Add dependencies with the project's package manager.
//! 5. Render the template payload into the target directory.
//! 6. Generate the routes module.
//! 7. Import the template stylesheet from the entrypoint.
//! 8. Patch the router (unless `--skip-router-patch`).
//! 9. Write the install marker and print a summary.
//!
//! Fatal problems (no entrypoint, missing template, failing package manager)
//! abort with an error. Everything else is collected as notices, so an
//! unrecognised router still ends in a successful install with manual
//! instructions.
//!
//! ## Examples
//!
//! ```bash
//! dashgraft install
//! dashgraft install ../shop --base /admin --skip-install
//! dashgraft install --dry-run -vv
//! ```
//!
use crate::codemod::classifier::classify;
use crate::codemod::detector::detect_project;
use crate::codemod::injector::ensure_side_effect_import;
use crate::codemod::patcher::{patch_router, PatchResult};
use crate::codemod::relative_specifier;
use crate::common::fs::backup::{BackupManager, WriteOutcome};
use crate::common::fs::io::read_file_to_string;
use crate::common::process;
use crate::common::ui::{self, Notice};
use crate::core::config::{self, Config};
use crate::core::error::{DashgraftError, Result};
use crate::core::templating;
use anyhow::bail;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod marker;
pub mod plan;
mod snippets;

use plan::{InstallPlan, PlanOptions};

/// # Install Arguments (`InstallArgs`)
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Root of the React project to install into.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// URL prefix the dashboard is mounted under (default from config, `/app`).
    #[arg(long)]
    pub base: Option<String>,

    /// Do not edit router files; print manual instructions instead.
    #[arg(long)]
    pub skip_router_patch: bool,

    /// Print what would be done without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not run the package manager.
    #[arg(long)]
    pub skip_install: bool,

    /// Directory holding the dashboard template payload.
    #[arg(long, env = "DASHGRAFT_TEMPLATE_DIR")]
    pub template: Option<PathBuf>,
}

/// # Handle Install Command (`handle_install`)
///
/// ## Returns
///
/// * `Ok(())` after a completed install (router patched or not) or a dry run.
/// * `Err` for fatal conditions: marker present, detection failure, bad
///   configuration, package manager failure, filesystem errors.
pub async fn handle_install(args: InstallArgs) -> Result<()> {
    info!("Handling install command...");
    debug!("Install args: {:?}", args);

    let root = resolve_project_dir(&args.project_dir)?;
    marker::ensure_not_installed(&root)?;

    let config = config::load_config(&root)?;
    let project = detect_project(&root)?;
    let entrypoint = project.require_entrypoint()?.to_path_buf();

    let mut notices = Vec::new();
    if !project.declares_react {
        notices.push(Notice::warning(
            "Project",
            "package.json does not list react; the dashboard needs a React app",
        ));
    }
    let base_path = plan::normalize_base_path(
        args.base.as_deref().unwrap_or(&config.install.base_path),
        &mut notices,
    )?;
    let template_dir = resolve_template_dir(args.template.as_deref(), &config)?;
    let classification = classify(&project, config.scan.max_files);
    info!("Router strategy: {} ({})", classification.strategy, classification.reason);

    let plan = InstallPlan::new(
        project,
        entrypoint,
        classification,
        &config,
        PlanOptions {
            base_path,
            template_dir,
            skip_install: args.skip_install,
            skip_router_patch: args.skip_router_patch,
        },
    );

    if args.dry_run {
        plan.print();
        return Ok(());
    }
    run_install(&plan, notices).await
}

fn resolve_project_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize().map_err(|e| {
        anyhow::anyhow!(DashgraftError::Detection(format!(
            "cannot access project directory {}: {}",
            dir.display(),
            e
        )))
    })
}

/// Template directory from `--template`/`DASHGRAFT_TEMPLATE_DIR`, else from
/// configuration. Must exist.
fn resolve_template_dir(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    let raw = match flag {
        Some(path) => shellexpand::tilde(&path.to_string_lossy()).into_owned(),
        None => config.template.directory.clone(),
    };
    let dir = PathBuf::from(raw);
    if !dir.is_dir() {
        bail!(DashgraftError::Config(format!(
            "template directory not found: {}. Pass --template <DIR> or set DASHGRAFT_TEMPLATE_DIR.",
            dir.display()
        )));
    }
    Ok(dir)
}

async fn run_install(plan: &InstallPlan, mut notices: Vec<Notice>) -> Result<()> {
    let backups = BackupManager::new();
    let mut backup_paths: Vec<PathBuf> = Vec::new();

    // Dependencies
    if plan.skip_install {
        notices.push(Notice::info("Dependencies", "skipped (--skip-install)"));
    } else if !plan.dependencies.is_empty() {
        process::install_dependencies(
            plan.project.package_manager,
            &plan.dependencies,
            &plan.project.root,
        )
        .await?;
        notices.push(Notice::info(
            "Dependencies",
            format!(
                "ran `{}`",
                process::describe_install(plan.project.package_manager, &plan.dependencies)
            ),
        ));
    }

    // Payload
    let payload = templating::render_template_directory(
        &plan.template_dir,
        &plan.integration.dashboard_dir,
        &plan.context,
        &backups,
    )?;
    for record in &payload.replaced {
        backup_paths.push(record.backup_path.clone());
    }
    notices.push(Notice::info(
        "Template",
        format!(
            "{} file(s) in {}: {} created, {} replaced, {} unchanged",
            payload.total(),
            plan.rel(&plan.integration.dashboard_dir),
            payload.created.len(),
            payload.replaced.len(),
            payload.unchanged
        ),
    ));

    // Routes module
    let routes_source = snippets::routes_module(&plan.context)?;
    let outcome = backups.write_guarded(&plan.routes_module_file, &routes_source)?;
    track(&mut backup_paths, &outcome);
    notices.push(Notice::info(
        "Routes module",
        format!("{} ({})", plan.rel(&plan.routes_module_file), describe_outcome(&outcome)),
    ));

    // Stylesheet
    match &plan.stylesheet {
        Some(css) => {
            let specifier = relative_specifier(&plan.entrypoint, css);
            let text = read_file_to_string(&plan.entrypoint)?;
            let injection = ensure_side_effect_import(&text, &specifier);
            if injection.outcome.changed() {
                let outcome = backups.write_guarded(&plan.entrypoint, &injection.text)?;
                track(&mut backup_paths, &outcome);
                notices.push(Notice::info(
                    "Stylesheet",
                    format!("imported \"{}\" in {}", specifier, plan.rel(&plan.entrypoint)),
                ));
            } else {
                notices.push(Notice::info(
                    "Stylesheet",
                    format!("already imported in {}", plan.rel(&plan.entrypoint)),
                ));
            }
        }
        None => notices.push(Notice::info("Stylesheet", "template has no stylesheet")),
    }

    // Router
    if plan.skip_router_patch {
        notices.push(
            Notice::info("Router", "not patched (--skip-router-patch)")
                .with_instructions(snippets::manual_instructions(plan)?),
        );
    } else {
        let result = patch_router(&plan.classification, &plan.integration, &backups)?;
        if let Some(backup) = &result.backup_path {
            backup_paths.push(backup.clone());
        }
        notices.push(router_notice(plan, &result)?);
    }

    let marker_path = marker::write_marker(&plan.project.root)?;
    notices.push(Notice::info("Marker", plan.rel(&marker_path)));

    print_summary(plan, &notices, &backup_paths);
    Ok(())
}

fn router_notice(plan: &InstallPlan, result: &PatchResult) -> Result<Notice> {
    let file = result
        .file
        .as_deref()
        .map(|f| plan.rel(f))
        .unwrap_or_default();
    if result.success {
        return Ok(Notice::info(
            "Router",
            format!(
                "registered {}/* in {} ({})",
                plan.integration.base_path, file, result.strategy
            ),
        ));
    }
    if result.already_integrated {
        return Ok(Notice::info("Router", format!("{} already registers the dashboard", file)));
    }
    warn!("{}", result.message);
    Ok(Notice::warning("Router", result.message.clone())
        .with_instructions(snippets::manual_instructions(plan)?))
}

fn track(backup_paths: &mut Vec<PathBuf>, outcome: &WriteOutcome) {
    if let Some(record) = outcome.backup() {
        backup_paths.push(record.backup_path.clone());
    }
}

fn describe_outcome(outcome: &WriteOutcome) -> &'static str {
    match outcome {
        WriteOutcome::Created => "created",
        WriteOutcome::Replaced(_) => "replaced, backup written",
        WriteOutcome::Unchanged => "unchanged",
    }
}

fn print_summary(plan: &InstallPlan, notices: &[Notice], backups: &[PathBuf]) {
    ui::print_heading(&format!(
        "Dashboard installed into {}",
        plan.project.root.display()
    ));
    ui::print_notices(notices);
    if !backups.is_empty() {
        ui::print_heading("Backups");
        for backup in backups {
            ui::print_step(&plan.rel(backup));
        }
    }
    println!(
        "\nStart your dev server and open {}/ to see the dashboard.",
        plan.integration.base_path
    );
}
