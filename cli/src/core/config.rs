//! # Dashgraft Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates dashgraft's configuration. Every
//! setting has a built-in default, so running without any configuration file
//! is the normal case; files only exist to adapt the installer to unusual
//! host projects or template layouts.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags and environment variables (applied by the command handlers)
//! 2. Project-specific `.dashgraft.toml` in the target project or its ancestors
//! 3. User-specific `<config dir>/dashgraft/config.toml`
//! 4. Default values defined in the code
//!
//! The project search stops at the first directory containing `.git`, so a
//! host project never picks up configuration from an enclosing repository.
//!
//! ## Examples
//!
//! ```rust
//! let cfg = config::load_config(&project_dir)?;
//! let base = &cfg.install.base_path;
//! let limit = cfg.scan.max_files;
//! ```
//!
use crate::core::error::{DashgraftError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub rewriter: RewriterConfig,
}

/// Settings for `dashgraft install`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    /// Route prefix under which the dashboard is mounted.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Directory (relative to the project root) the template is copied into.
    #[serde(default = "default_target_dir")]
    pub target_dir: String,
    /// Packages added to the host project by its package manager.
    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<String>,
    /// Stylesheet inside the template imported from the entrypoint.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
}

/// Location of the prebuilt dashboard payload.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Directory holding the template payload (can use ~). Will be expanded.
    #[serde(default = "default_template_dir")]
    pub directory: String,
}

/// Names the router patch inserts into host files. These double as the
/// "already integrated" markers.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Root component exported by the template's index module.
    #[serde(default = "default_component")]
    pub component: String,
    /// Name of the route array exported by the generated routes module.
    #[serde(default = "default_routes_export")]
    pub routes_export: String,
    /// File stem of the generated routes module inside `target_dir`.
    #[serde(default = "default_routes_module")]
    pub routes_module: String,
}

/// Bounds for directory scans over the host project.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Maximum number of source files the app-shell scan will inspect.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

/// Settings for `dashgraft package` (template import rewriting).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RewriterConfig {
    /// npm scope of the internal packages, e.g. `@dashgraft`.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Internal package name -> directory inside the template tree.
    #[serde(default = "default_packages")]
    pub packages: BTreeMap<String, String>,
    /// Bare packages treated as recognised framework dependencies. Entries
    /// ending in `/` match every package under that prefix.
    #[serde(default = "default_known_packages")]
    pub known_packages: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            target_dir: default_target_dir(),
            dependencies: default_dependencies(),
            stylesheet: default_stylesheet(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            directory: default_template_dir(),
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            component: default_component(),
            routes_export: default_routes_export(),
            routes_module: default_routes_module(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
        }
    }
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            packages: default_packages(),
            known_packages: default_known_packages(),
        }
    }
}

fn default_base_path() -> String {
    "/app".to_string()
}
fn default_target_dir() -> String {
    "src/dashboard".to_string()
}
fn default_dependencies() -> Vec<String> {
    vec![
        "react-router-dom".to_string(),
        "@tanstack/react-query".to_string(),
    ]
}
fn default_stylesheet() -> String {
    "styles.css".to_string()
}
fn default_template_dir() -> String {
    "~/.config/dashgraft/template".to_string()
}
fn default_component() -> String {
    "DashboardApp".to_string()
}
fn default_routes_export() -> String {
    "dashboardRoutes".to_string()
}
fn default_routes_module() -> String {
    "routes".to_string()
}
fn default_max_files() -> usize {
    200
}
fn default_scope() -> String {
    "@dashgraft".to_string()
}
fn default_packages() -> BTreeMap<String, String> {
    ["app", "ui", "core"]
        .iter()
        .map(|name| (name.to_string(), name.to_string()))
        .collect()
}
fn default_known_packages() -> Vec<String> {
    [
        "react",
        "react-dom",
        "react-router",
        "react-router-dom",
        "@tanstack/",
        "@radix-ui/",
        "lucide-react",
        "clsx",
        "tailwind-merge",
        "class-variance-authority",
        "zod",
        "date-fns",
        "sonner",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILENAME: &str = ".dashgraft.toml";

/// Loads the merged, expanded and validated configuration for a project.
pub fn load_config(project_dir: &Path) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(project_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    let Some(proj_dirs) = ProjectDirs::from("dev", "Dashgraft", "dashgraft") else {
        debug!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_project_config(project_dir: &Path) -> Result<Option<Config>> {
    match find_project_config_path(project_dir) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            load_config_from_path(&path).map(Some)
        }
        None => {
            debug!("No {} found for {}", PROJECT_CONFIG_FILENAME, project_dir.display());
            Ok(None)
        }
    }
}

/// Walks from `start` towards the filesystem root looking for
/// `.dashgraft.toml`, stopping at the first directory containing `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Picks the project value when it differs from the built-in default,
/// otherwise keeps the user value.
fn pick<T: PartialEq>(project: T, user: T, default: T) -> T {
    if project != default {
        project
    } else {
        user
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };
    let defaults = Config::default();
    Config {
        install: InstallConfig {
            base_path: pick(
                project.install.base_path,
                user.install.base_path,
                defaults.install.base_path,
            ),
            target_dir: pick(
                project.install.target_dir,
                user.install.target_dir,
                defaults.install.target_dir,
            ),
            dependencies: pick(
                project.install.dependencies,
                user.install.dependencies,
                defaults.install.dependencies,
            ),
            stylesheet: pick(
                project.install.stylesheet,
                user.install.stylesheet,
                defaults.install.stylesheet,
            ),
        },
        template: TemplateConfig {
            directory: pick(
                project.template.directory,
                user.template.directory,
                defaults.template.directory,
            ),
        },
        integration: IntegrationConfig {
            component: pick(
                project.integration.component,
                user.integration.component,
                defaults.integration.component,
            ),
            routes_export: pick(
                project.integration.routes_export,
                user.integration.routes_export,
                defaults.integration.routes_export,
            ),
            routes_module: pick(
                project.integration.routes_module,
                user.integration.routes_module,
                defaults.integration.routes_module,
            ),
        },
        scan: ScanConfig {
            max_files: pick(
                project.scan.max_files,
                user.scan.max_files,
                defaults.scan.max_files,
            ),
        },
        rewriter: RewriterConfig {
            scope: pick(
                project.rewriter.scope,
                user.rewriter.scope,
                defaults.rewriter.scope,
            ),
            packages: pick(
                project.rewriter.packages,
                user.rewriter.packages,
                defaults.rewriter.packages,
            ),
            known_packages: pick(
                project.rewriter.known_packages,
                user.rewriter.known_packages,
                defaults.rewriter.known_packages,
            ),
        },
    }
}

fn expand_config_paths(config: &mut Config) {
    config.template.directory = shellexpand::tilde(&config.template.directory).into_owned();
    debug!("Expanded template directory: {}", config.template.directory);
}

fn validate_config(config: &Config) -> Result<()> {
    if !config.rewriter.scope.starts_with('@') || config.rewriter.scope.len() < 2 {
        return Err(anyhow!(DashgraftError::Config(format!(
            "Invalid rewriter scope '{}'. Expected an npm scope such as '@dashgraft'.",
            config.rewriter.scope
        ))));
    }
    if config.scan.max_files == 0 {
        return Err(anyhow!(DashgraftError::Config(
            "scan.max_files must be greater than zero.".to_string()
        )));
    }
    let target = Path::new(&config.install.target_dir);
    if config.install.target_dir.trim().is_empty() || target.is_absolute() {
        return Err(anyhow!(DashgraftError::Config(format!(
            "install.target_dir '{}' must be a non-empty path relative to the project root.",
            config.install.target_dir
        ))));
    }
    for (name, value) in [
        ("integration.component", &config.integration.component),
        ("integration.routes_export", &config.integration.routes_export),
    ] {
        let valid = value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid {
            return Err(anyhow!(DashgraftError::Config(format!(
                "{} '{}' is not a valid JavaScript identifier.",
                name, value
            ))));
        }
    }
    Ok(())
}
