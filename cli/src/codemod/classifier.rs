//! # Router Classifier
//!
//! File: cli/src/codemod/classifier.rs
//!
//! ## Overview
//!
//! Decides how the host application routes, so the patcher knows which
//! structural edit applies:
//!
//! - `CreateBrowserRouter`: the data-router API. Recognised when the
//!   entrypoint mentions both `createBrowserRouter` and `RouterProvider`, or
//!   when a dedicated router module calls `createBrowserRouter([`.
//! - `BrowserRouter`: the component API. Recognised when one app shell file
//!   contains `<BrowserRouter`, an opening `<Routes>` and at least one
//!   `<Route` child.
//! - `Fallback`: anything else, including ambiguous files that match both
//!   shapes. The user gets manual instructions instead of an edit.
//!
//! Classification is a heuristic text search. It does not parse JSX. Files
//! are re-read from disk on every call.
//!
use crate::codemod::detector::ProjectInfo;
use crate::common::fs::scan::{collect_source_files, SOURCE_EXTENSIONS};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// App shell files checked before the bounded scan of `src/`.
const APP_SHELL_CANDIDATES: &[&str] = &[
    "src/App.tsx",
    "src/App.jsx",
    "src/App.ts",
    "src/App.js",
    "src/app.tsx",
    "src/app.jsx",
    "src/AppRoutes.tsx",
    "src/AppRoutes.jsx",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterStrategy {
    CreateBrowserRouter,
    BrowserRouter,
    Fallback,
}

impl fmt::Display for RouterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouterStrategy::CreateBrowserRouter => "createBrowserRouter",
            RouterStrategy::BrowserRouter => "browserRouter",
            RouterStrategy::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub strategy: RouterStrategy,
    /// The file to patch; `None` for `Fallback`.
    pub target: Option<PathBuf>,
    /// Human readable explanation, shown in plans and summaries.
    pub reason: String,
}

impl Classification {
    fn fallback(reason: impl Into<String>) -> Self {
        Classification {
            strategy: RouterStrategy::Fallback,
            target: None,
            reason: reason.into(),
        }
    }
}

pub(crate) fn data_router_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"createBrowserRouter\s*\(\s*\[").expect("valid regex"))
}

fn browser_router_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<BrowserRouter[\s>]").expect("valid regex"))
}

pub(crate) fn routes_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Routes(?:\s[^>]*?)?>").expect("valid regex"))
}

fn route_child_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Route[\s/>]").expect("valid regex"))
}

/// True if `text` uses the data-router API in the entrypoint form.
pub fn uses_data_router(text: &str) -> bool {
    text.contains("createBrowserRouter") && text.contains("RouterProvider")
}

/// True if `text` declares its routes with `createBrowserRouter([ ... ])`.
pub fn has_data_router_array(text: &str) -> bool {
    data_router_array_regex().is_match(text)
}

/// True if `text` contains the `<BrowserRouter>` + `<Routes>` + `<Route>`
/// conjunction. A self-closing `<Routes />` does not count.
pub fn uses_component_router(text: &str) -> bool {
    browser_router_regex().is_match(text)
        && routes_open_regex()
            .find_iter(text)
            .any(|m| !m.as_str().ends_with("/>"))
        && route_child_regex().is_match(text)
}

/// Classifies the routing setup of `project`, scanning at most `max_files`
/// files of `src/` after the conventional candidates.
pub fn classify(project: &ProjectInfo, max_files: usize) -> Classification {
    if let Some(entrypoint) = &project.entrypoint {
        if let Some(text) = read_candidate(entrypoint) {
            if uses_data_router(&text) {
                if uses_component_router(&text) {
                    return Classification::fallback(format!(
                        "{} uses both createBrowserRouter and <BrowserRouter>",
                        project.relative(entrypoint).display()
                    ));
                }
                info!("Entrypoint uses createBrowserRouter");
                return Classification {
                    strategy: RouterStrategy::CreateBrowserRouter,
                    target: Some(entrypoint.clone()),
                    reason: format!(
                        "{} creates a data router",
                        project.relative(entrypoint).display()
                    ),
                };
            }
        }
    }

    if let Some(router_file) = &project.router_file {
        if let Some(text) = read_candidate(router_file) {
            if has_data_router_array(&text) && !uses_component_router(&text) {
                info!("Router module {} uses createBrowserRouter", router_file.display());
                return Classification {
                    strategy: RouterStrategy::CreateBrowserRouter,
                    target: Some(router_file.clone()),
                    reason: format!(
                        "{} declares routes with createBrowserRouter",
                        project.relative(router_file).display()
                    ),
                };
            }
        }
    }

    let candidates = app_shell_candidates(project, max_files);
    debug!("Checking {} app shell candidate(s)", candidates.len());
    let matches: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|path| read_candidate(path).is_some_and(|text| uses_component_router(&text)))
        .collect();

    match matches.split_first() {
        Some((first, rest)) => {
            if !rest.is_empty() {
                debug!(
                    "Multiple files contain <BrowserRouter>/<Routes>; using {} and ignoring {:?}",
                    first.display(),
                    rest
                );
            }
            info!("{} uses <BrowserRouter> with <Routes>", first.display());
            Classification {
                strategy: RouterStrategy::BrowserRouter,
                target: Some(first.clone()),
                reason: format!(
                    "{} renders <BrowserRouter> with <Routes>",
                    project.relative(first).display()
                ),
            }
        }
        None => Classification::fallback("no supported router setup was recognised"),
    }
}

/// Conventional app shell names first, then the entrypoint and router
/// module, then a bounded breadth-first scan of `src/`. Duplicates removed,
/// order preserved.
fn app_shell_candidates(project: &ProjectInfo, max_files: usize) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();
    let conventional = APP_SHELL_CANDIDATES
        .iter()
        .map(|rel| project.root.join(rel))
        .filter(|path| path.is_file());
    let known = project.entrypoint.iter().chain(project.router_file.iter()).cloned();
    let scanned = collect_source_files(&project.root.join("src"), SOURCE_EXTENSIONS, max_files);

    for path in conventional.chain(known).chain(scanned) {
        if seen.insert(path.clone()) {
            ordered.push(path);
        }
    }
    ordered
}

fn read_candidate(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}
