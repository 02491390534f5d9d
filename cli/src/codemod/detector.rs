//! # Project Detector
//!
//! File: cli/src/codemod/detector.rs
//!
//! ## Overview
//!
//! Inspects a host project directory and reports what the rest of the
//! pipeline needs to know about it:
//!
//! - the package manager, from the lockfile present (pnpm, then yarn, then
//!   bun, then npm as the default),
//! - the entrypoint, the first of `src/main.{tsx,jsx,ts,js}` that exists,
//! - an optional dedicated router module (`src/router.tsx` and friends),
//! - the package name and whether React is declared as a dependency.
//!
//! Detection only reads the filesystem. A missing `package.json` is fatal
//! here; a missing entrypoint is reported as `None` and turned into a fatal
//! error by `ProjectInfo::require_entrypoint` when a command needs one.
//!
use crate::core::error::{DashgraftError, Result};
use anyhow::{bail, Context};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Candidate entrypoints, in priority order.
pub const ENTRYPOINT_CANDIDATES: &[&str] =
    &["src/main.tsx", "src/main.jsx", "src/main.ts", "src/main.js"];

/// Candidate dedicated router modules, in priority order.
pub const ROUTER_FILE_CANDIDATES: &[&str] = &[
    "src/router.tsx",
    "src/router.jsx",
    "src/router.ts",
    "src/router.js",
    "src/routes.tsx",
    "src/routes.jsx",
    "src/router/index.tsx",
    "src/router/index.ts",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Pnpm,
    Yarn,
    Bun,
    Npm,
}

impl PackageManager {
    /// Detects the package manager from the lockfile in `root`.
    pub fn detect(root: &Path) -> Self {
        let lockfiles = [
            ("pnpm-lock.yaml", PackageManager::Pnpm),
            ("yarn.lock", PackageManager::Yarn),
            ("bun.lockb", PackageManager::Bun),
            ("bun.lock", PackageManager::Bun),
        ];
        lockfiles
            .iter()
            .find(|(file, _)| root.join(file).is_file())
            .map(|(_, manager)| *manager)
            .unwrap_or(PackageManager::Npm)
    }

    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
            PackageManager::Npm => "npm",
        }
    }

    /// Subcommand that adds dependencies to the project manifest.
    pub fn add_subcommand(&self) -> &'static str {
        match self {
            PackageManager::Npm => "install",
            _ => "add",
        }
    }

    /// Full argument vector for adding `dependencies`.
    pub fn add_args(&self, dependencies: &[String]) -> Vec<String> {
        std::iter::once(self.add_subcommand().to_string())
            .chain(dependencies.iter().cloned())
            .collect()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Facts about the host project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub package_manager: PackageManager,
    pub entrypoint: Option<PathBuf>,
    pub router_file: Option<PathBuf>,
    pub package_name: Option<String>,
    pub declares_react: bool,
}

impl ProjectInfo {
    /// The entrypoint, or a detection error carrying remediation text.
    pub fn require_entrypoint(&self) -> Result<&Path> {
        match &self.entrypoint {
            Some(path) => Ok(path),
            None => bail!(DashgraftError::Detection(format!(
                "no entrypoint found in {}. Expected one of: {}. Run dashgraft from the root of a Vite/React project.",
                self.root.display(),
                ENTRYPOINT_CANDIDATES.join(", ")
            ))),
        }
    }

    /// True when the project uses TypeScript sources.
    pub fn is_typescript(&self) -> bool {
        match &self.entrypoint {
            Some(path) => path
                .extension()
                .is_some_and(|ext| ext == "tsx" || ext == "ts"),
            None => self.root.join("tsconfig.json").is_file(),
        }
    }

    /// Path relative to the project root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Detects the project rooted at `root`.
pub fn detect_project(root: &Path) -> Result<ProjectInfo> {
    if !root.is_dir() {
        bail!(DashgraftError::Detection(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    let manifest_path = root.join("package.json");
    if !manifest_path.is_file() {
        bail!(DashgraftError::Detection(format!(
            "no package.json in {}. Run dashgraft from the root of your React project.",
            root.display()
        )));
    }

    let manifest_text = fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: Value = serde_json::from_str(&manifest_text).map_err(|e| {
        DashgraftError::Detection(format!("package.json is not valid JSON: {}", e))
    })?;

    let package_name = manifest
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let declares_react = ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .any(|section| manifest.get(section).and_then(|deps| deps.get("react")).is_some());
    if !declares_react {
        warn!("package.json does not declare a dependency on react");
    }

    let package_manager = PackageManager::detect(root);
    let entrypoint = first_existing(root, ENTRYPOINT_CANDIDATES);
    let router_file = first_existing(root, ROUTER_FILE_CANDIDATES);

    info!(
        "Detected project {} (package manager: {})",
        package_name.as_deref().unwrap_or("<unnamed>"),
        package_manager
    );
    debug!("Entrypoint: {:?}, router file: {:?}", entrypoint, router_file);

    Ok(ProjectInfo {
        root: root.to_path_buf(),
        package_manager,
        entrypoint,
        router_file,
        package_name,
        declares_react,
    })
}

fn first_existing(root: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|rel| root.join(rel))
        .find(|path| path.is_file())
}
