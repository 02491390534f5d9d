//! # Template Import Rewriter
//!
//! File: cli/src/codemod/rewriter.rs
//!
//! ## Overview
//!
//! Builds the self-contained dashboard payload from a monorepo-style source
//! tree. Inside the source tree, modules import each other through scoped
//! workspace packages (`@dashgraft/ui/menu`); once copied into a host
//! project those packages do not exist, so every scoped import is rewritten
//! to a relative path inside the copied tree.
//!
//! ## Architecture
//!
//! 1. `ExportMap::build` walks the source tree (bounded work queue) and maps
//!    module paths and base names to tree-relative paths.
//! 2. `rewrite_tree` copies the tree. Source files have their `from`,
//!    side-effect, dynamic `import()` and `require()` specifiers rewritten;
//!    other files are copied verbatim.
//! 3. A validation pass over the rewritten sources classifies every
//!    remaining specifier: relative paths are checked on disk, scoped
//!    leftovers are "unresolved internal", bare specifiers are external
//!    dependencies and are critical unless on the known-packages list.
//!
//! All findings are accumulated in a `RewriteReport` that is returned to the
//! caller; nothing is kept in global state.
//!
use crate::codemod::relative_specifier;
use crate::common::fs::io::{ensure_dir_exists, read_file_to_string, write_string_to_file};
use crate::common::fs::scan::{collect_source_files, has_extension, SOURCE_EXTENSIONS};
use crate::core::config::RewriterConfig;
use crate::core::error::{DashgraftError, Result};
use anyhow::Context;
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Extensions tried when checking that a relative import resolves.
const RESOLVE_EXTENSIONS: &[&str] = &[
    "tsx", "ts", "jsx", "js", "mjs", "cjs", "json", "css", "scss", "svg", "png",
];

/// Module lookup tables for one source tree. Values are tree-relative paths
/// without extension, using forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMap {
    by_path: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
}

impl ExportMap {
    /// Indexes at most `limit` source files under `root`.
    pub fn build(root: &Path, limit: usize) -> Self {
        let mut map = ExportMap::default();
        for file in collect_source_files(root, SOURCE_EXTENSIONS, limit) {
            let Ok(relative) = file.strip_prefix(root) else {
                continue;
            };
            let rel = to_slash(&relative.with_extension(""));
            if rel.ends_with(".d") {
                continue;
            }
            map.by_path.insert(rel.clone(), rel.clone());

            let (module, name) = match rel.rsplit_once('/') {
                Some((dir, "index")) => (dir.to_string(), dir.rsplit('/').next().unwrap_or(dir)),
                Some((_, base)) => (rel.clone(), base),
                None if rel == "index" => continue,
                None => (rel.clone(), rel.as_str()),
            };
            map.by_path.entry(module.clone()).or_insert_with(|| module.clone());
            match map.by_name.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(module);
                }
                Entry::Occupied(slot) if slot.get() != &module => {
                    trace!("Base name {} already maps to {}, ignoring {}", name, slot.get(), module)
                }
                Entry::Occupied(_) => {}
            }
        }
        debug!(
            "Export map for {}: {} module path(s), {} base name(s)",
            root.display(),
            map.by_path.len(),
            map.by_name.len()
        );
        map
    }

    /// Resolves `subpath` inside the package directory `package_dir`: an
    /// exact module path first, then a base-name lookup within the package,
    /// then the constructed path.
    pub fn resolve(&self, package_dir: &str, subpath: &str) -> String {
        let package_dir = package_dir.trim_matches('/');
        if subpath.is_empty() {
            return package_dir.to_string();
        }
        let direct = join_slash(package_dir, subpath);
        if let Some(found) = self.by_path.get(&direct) {
            return found.clone();
        }
        let name = subpath.rsplit('/').next().unwrap_or(subpath);
        if let Some(found) = self.by_name.get(name) {
            if package_dir.is_empty() || found.starts_with(&format!("{package_dir}/")) {
                return found.clone();
            }
        }
        direct
    }
}

/// A specifier that needs attention, located by tree-relative file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportIssue {
    pub file: PathBuf,
    pub specifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_copied: usize,
    pub files_rewritten: usize,
    pub imports_rewritten: usize,
    /// Relative imports whose target does not exist in the output tree.
    pub unverified: Vec<ImportIssue>,
    /// Scoped imports that could not be rewritten.
    pub unresolved_internal: Vec<ImportIssue>,
    /// Bare package names imported by the payload.
    pub external_dependencies: BTreeSet<String>,
    /// Bare imports of packages outside the known list.
    pub critical: Vec<ImportIssue>,
}

impl RewriteReport {
    pub fn has_critical(&self) -> bool {
        !self.critical.is_empty()
    }
}

fn specifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?P<lead>\bfrom\s*|\bimport\s*\(\s*|\bimport\s+|\brequire\s*\(\s*)['"](?P<spec>[^'"\r\n]+)['"]"#,
        )
        .expect("valid specifier regex")
    })
}

/// Rewrites every `@scope/<package>/...` specifier in `text`. `file` is the
/// tree-relative path of the module being rewritten. Returns the new text
/// and the number of specifiers changed.
pub fn rewrite_source(
    text: &str,
    file: &Path,
    map: &ExportMap,
    options: &RewriterConfig,
) -> (String, usize) {
    let prefix = format!("{}/", options.scope);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for caps in specifier_regex().captures_iter(text) {
        let Some(spec) = caps.name("spec") else {
            continue;
        };
        let Some(rest) = spec.as_str().strip_prefix(&prefix) else {
            continue;
        };
        let (package, subpath) = rest.split_once('/').unwrap_or((rest, ""));
        let Some(package_dir) = options.packages.get(package) else {
            debug!("{}: no package mapping for {}", file.display(), spec.as_str());
            continue;
        };
        let target = map.resolve(package_dir, subpath);
        let replacement = relative_specifier(&Path::new("/").join(file), &Path::new("/").join(&target));
        trace!("{}: {} -> {}", file.display(), spec.as_str(), replacement);

        out.push_str(&text[last..spec.start()]);
        out.push_str(&replacement);
        last = spec.end();
        count += 1;
    }
    out.push_str(&text[last..]);
    (out, count)
}

/// Copies `source` to `dest`, rewriting scoped imports, and validates the
/// result.
pub fn rewrite_tree(
    source: &Path,
    dest: &Path,
    options: &RewriterConfig,
    max_files: usize,
) -> Result<RewriteReport> {
    if !source.is_dir() {
        anyhow::bail!(DashgraftError::Config(format!(
            "Template source directory not found: {}",
            source.display()
        )));
    }
    let map = ExportMap::build(source, max_files);
    let mut report = RewriteReport::default();
    let mut written_sources = Vec::new();
    ensure_dir_exists(dest)?;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || name == "node_modules")
        });
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to access entry while walking template source: {}", e);
                continue;
            }
        };
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Failed to relativize {}", entry.path().display()))?
            .to_path_buf();
        let target = dest.join(&relative);

        if entry.file_type().is_dir() {
            ensure_dir_exists(&target)?;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        if has_extension(entry.path(), SOURCE_EXTENSIONS) {
            let text = read_file_to_string(entry.path())?;
            let (rewritten, count) = rewrite_source(&text, &relative, &map, options);
            write_string_to_file(&target, &rewritten)?;
            if count > 0 {
                report.files_rewritten += 1;
                report.imports_rewritten += count;
            }
            written_sources.push((relative, rewritten));
        } else {
            if let Some(parent) = target.parent() {
                ensure_dir_exists(parent)?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!("Failed to copy {} to {}", entry.path().display(), target.display())
            })?;
        }
        report.files_copied += 1;
    }

    for (relative, text) in &written_sources {
        validate_source(text, relative, dest, options, &mut report);
    }
    report.critical.sort();
    report.unverified.sort();
    report.unresolved_internal.sort();

    info!(
        "Rewrote {} import(s) in {} of {} file(s)",
        report.imports_rewritten, report.files_rewritten, report.files_copied
    );
    Ok(report)
}

fn validate_source(
    text: &str,
    file: &Path,
    dest: &Path,
    options: &RewriterConfig,
    report: &mut RewriteReport,
) {
    for caps in specifier_regex().captures_iter(text) {
        let raw = &caps["spec"];
        let spec = raw.split(['?', '#']).next().unwrap_or(raw);
        let issue = || ImportIssue {
            file: file.to_path_buf(),
            specifier: raw.to_string(),
        };

        if spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../") {
            let base = dest.join(file).parent().map(|dir| dir.join(spec));
            if !base.as_deref().is_some_and(resolves) {
                report.unverified.push(issue());
            }
        } else if spec == options.scope || spec.starts_with(&format!("{}/", options.scope)) {
            report.unresolved_internal.push(issue());
        } else if spec.starts_with("node:") || spec.starts_with('/') || spec.contains("://") {
            continue;
        } else {
            let package = package_name(spec);
            if !is_known_package(&package, &options.known_packages) {
                report.critical.push(issue());
            }
            report.external_dependencies.insert(package);
        }
    }
}

/// True if `base` names a file, a file once an extension is added, or a
/// directory with an index module.
fn resolves(base: &Path) -> bool {
    if base.is_file() {
        return true;
    }
    let with_ext = |path: &Path, ext: &str| {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    };
    RESOLVE_EXTENSIONS.iter().any(|ext| with_ext(base, ext).is_file())
        || (base.is_dir()
            && RESOLVE_EXTENSIONS
                .iter()
                .any(|ext| with_ext(&base.join("index"), ext).is_file()))
}

/// `@scope/pkg/sub` -> `@scope/pkg`, `pkg/sub` -> `pkg`.
pub fn package_name(spec: &str) -> String {
    let mut parts = spec.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
        (Some(name), _) => name.to_string(),
        _ => spec.to_string(),
    }
}

/// Known entries ending in `/` match any package under that scope.
fn is_known_package(package: &str, known: &[String]) -> bool {
    known.iter().any(|entry| {
        if entry.ends_with('/') {
            package.starts_with(entry.as_str())
        } else {
            package == entry
        }
    })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn join_slash(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{dir}/{rest}")
    }
}
