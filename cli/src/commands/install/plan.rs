//! # Install Plan
//!
//! File: cli/src/commands/install/plan.rs
//!
//! ## Overview
//!
//! Everything `dashgraft install` is going to do, resolved up front from the
//! configuration, the command-line flags, project detection and router
//! classification. Building the plan performs no writes, which is what makes
//! `--dry-run` a faithful preview: it prints the same plan the real run
//! executes.
//!
use crate::codemod::classifier::{Classification, RouterStrategy};
use crate::codemod::detector::ProjectInfo;
use crate::codemod::patcher::RouterIntegration;
use crate::common::process::describe_install;
use crate::common::ui::{self, Notice};
use crate::core::config::Config;
use crate::core::error::{DashgraftError, Result};
use crate::core::templating::TEMPLATE_EXTENSIONS;
use anyhow::bail;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Base path used when the requested one would shadow the host's root.
pub const DEFAULT_BASE_PATH: &str = "/app";

#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub project: ProjectInfo,
    pub entrypoint: PathBuf,
    pub template_dir: PathBuf,
    pub classification: Classification,
    pub integration: RouterIntegration,
    /// Generated routes module, with extension.
    pub routes_module_file: PathBuf,
    /// Installed location of the template stylesheet, if the template has one.
    pub stylesheet: Option<PathBuf>,
    pub dependencies: Vec<String>,
    pub skip_install: bool,
    pub skip_router_patch: bool,
    /// Variables available to `.tera` payload files and generated snippets.
    pub context: HashMap<String, String>,
}

/// Inputs that come from the command line rather than the project.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub base_path: String,
    pub template_dir: PathBuf,
    pub skip_install: bool,
    pub skip_router_patch: bool,
}

impl InstallPlan {
    pub fn new(
        project: ProjectInfo,
        entrypoint: PathBuf,
        classification: Classification,
        config: &Config,
        options: PlanOptions,
    ) -> Self {
        let dashboard_dir = project.root.join(&config.install.target_dir);
        let extension = if project.is_typescript() { "tsx" } else { "jsx" };
        let routes_module = dashboard_dir.join(&config.integration.routes_module);
        let routes_module_file =
            dashboard_dir.join(format!("{}.{}", config.integration.routes_module, extension));

        let stylesheet = template_has_file(&options.template_dir, &config.install.stylesheet)
            .then(|| dashboard_dir.join(&config.install.stylesheet));

        let project_name = project.package_name.clone().unwrap_or_else(|| {
            project
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string())
        });
        let context: HashMap<String, String> = [
            ("base_path", options.base_path.clone()),
            ("component", config.integration.component.clone()),
            ("routes_export", config.integration.routes_export.clone()),
            ("scope", config.rewriter.scope.clone()),
            ("project_name", project_name),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        InstallPlan {
            integration: RouterIntegration {
                component: config.integration.component.clone(),
                routes_export: config.integration.routes_export.clone(),
                base_path: options.base_path,
                dashboard_dir,
                routes_module,
            },
            project,
            entrypoint,
            template_dir: options.template_dir,
            classification,
            routes_module_file,
            stylesheet,
            dependencies: config.install.dependencies.clone(),
            skip_install: options.skip_install,
            skip_router_patch: options.skip_router_patch,
            context,
        }
    }

    /// Project-relative display form of `path`.
    pub fn rel(&self, path: &Path) -> String {
        self.project.relative(path).display().to_string()
    }

    /// The lines describing each step, in execution order.
    pub fn steps(&self) -> Vec<String> {
        let mut steps = Vec::new();
        if self.skip_install || self.dependencies.is_empty() {
            steps.push("Skip dependency installation".to_string());
        } else {
            steps.push(format!(
                "Run `{}`",
                describe_install(self.project.package_manager, &self.dependencies)
            ));
        }
        steps.push(format!(
            "Copy the dashboard template into {}",
            self.rel(&self.integration.dashboard_dir)
        ));
        steps.push(format!("Generate {}", self.rel(&self.routes_module_file)));
        match &self.stylesheet {
            Some(css) => steps.push(format!(
                "Import {} from {}",
                self.rel(css),
                self.rel(&self.entrypoint)
            )),
            None => steps.push("No template stylesheet to import".to_string()),
        }
        let router_step = match (&self.classification.strategy, &self.classification.target) {
            _ if self.skip_router_patch => {
                "Skip the router patch and print manual instructions".to_string()
            }
            (RouterStrategy::Fallback, _) | (_, None) => {
                "Print manual routing instructions (router not recognised)".to_string()
            }
            (strategy, Some(target)) => format!(
                "Register {}/* in {} ({})",
                self.integration.base_path,
                self.rel(target),
                strategy
            ),
        };
        steps.push(router_step);
        steps.push(format!("Write {}", super::marker::MARKER_FILENAME));
        steps
    }

    /// Prints the plan for `--dry-run`.
    pub fn print(&self) {
        ui::print_heading("Install plan (dry run)");
        ui::print_field("Project", &self.project.root.display().to_string());
        ui::print_field("Package manager", self.project.package_manager.program());
        ui::print_field("Entrypoint", &self.rel(&self.entrypoint));
        ui::print_field(
            "Router",
            &format!(
                "{} ({})",
                self.classification.strategy, self.classification.reason
            ),
        );
        ui::print_field("Base path", &self.integration.base_path);
        ui::print_field("Template", &self.template_dir.display().to_string());
        println!();
        for step in self.steps() {
            ui::print_step(&step);
        }
        println!("\nNo files were changed.");
    }
}

/// True if `dir` has `name` either as-is or as a Tera template.
fn template_has_file(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
        || TEMPLATE_EXTENSIONS
            .iter()
            .any(|ext| dir.join(format!("{name}{ext}")).is_file())
}

/// # Normalize Base Path (`normalize_base_path`)
///
/// Ensures a leading slash and no trailing slash. The bare root `/` would
/// mount the dashboard over the whole host app, so it is replaced with
/// `/app` and a warning notice is recorded.
///
/// ## Returns
///
/// * `Err(DashgraftError::ArgumentParsing)` if the path contains characters
///   that cannot appear inside the generated route string.
pub fn normalize_base_path(raw: &str, notices: &mut Vec<Notice>) -> Result<String> {
    let trimmed = raw.trim();
    if let Some(bad) = trimmed
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '<' | '>' | '{' | '}' | '\\'))
    {
        bail!(DashgraftError::ArgumentParsing(format!(
            "base path {:?} contains an unsupported character {:?}",
            raw, bad
        )));
    }

    let stripped = trimmed.trim_matches('/');
    if stripped.is_empty() {
        warn!("Base path {:?} would shadow the host app; using {}", raw, DEFAULT_BASE_PATH);
        notices.push(Notice::warning(
            "Base path",
            format!(
                "{:?} would take over every route of the host app; using {} instead",
                raw, DEFAULT_BASE_PATH
            ),
        ));
        return Ok(DEFAULT_BASE_PATH.to_string());
    }
    Ok(format!("/{stripped}"))
}
