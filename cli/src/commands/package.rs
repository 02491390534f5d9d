//! # Dashgraft Package Command
//!
//! File: cli/src/commands/package.rs
//!
//! ## Overview
//!
//! `dashgraft package --source <DIR> --dest <DIR>` turns a dashboard source
//! tree that imports its sibling packages through the workspace scope
//! (`@scope/ui/...`) into a self-contained payload with relative imports,
//! ready to be used as the `install` template.
//!
//! The report lists anything that still needs a human: relative imports
//! pointing at missing files, scoped imports that could not be mapped, and
//! bare imports of packages outside the known list. The last group is
//! fatal unless `--allow-external` is passed, since the host project would
//! fail to build without those packages.
//!
//! ## Examples
//!
//! ```bash
//! dashgraft package --source ../dashboard/packages --dest ./template
//! dashgraft package --source src --dest out --allow-external
//! ```
//!
use crate::codemod::rewriter::{rewrite_tree, ImportIssue, RewriteReport};
use crate::common::ui::{self, Notice};
use crate::core::config;
use crate::core::error::{DashgraftError, Result};
use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Source tree of the dashboard packages.
    #[arg(long)]
    pub source: PathBuf,

    /// Output directory for the self-contained template.
    #[arg(long)]
    pub dest: PathBuf,

    /// Do not fail when the template imports packages outside the known list.
    #[arg(long)]
    pub allow_external: bool,
}

pub async fn handle_package(args: PackageArgs) -> Result<()> {
    info!("Handling package command...");
    debug!("Package args: {:?}", args);

    let cwd = std::env::current_dir()?;
    let config = config::load_config(&cwd)?;
    let report = rewrite_tree(
        &args.source,
        &args.dest,
        &config.rewriter,
        config.scan.max_files,
    )?;

    print_report(&args, &report);

    if report.has_critical() {
        if args.allow_external {
            println!(
                "\n{} external import(s) allowed; add these packages to the host project.",
                report.critical.len()
            );
        } else {
            bail!(DashgraftError::RewriteValidation {
                count: report.critical.len(),
                imports: join_issues(&report.critical),
            });
        }
    }
    Ok(())
}

fn print_report(args: &PackageArgs, report: &RewriteReport) {
    ui::print_heading(&format!(
        "Packaged {} -> {}",
        args.source.display(),
        args.dest.display()
    ));
    ui::print_field("Files copied", &report.files_copied.to_string());
    ui::print_field("Files rewritten", &report.files_rewritten.to_string());
    ui::print_field("Imports rewritten", &report.imports_rewritten.to_string());

    let mut notices = Vec::new();
    if !report.external_dependencies.is_empty() {
        let deps: Vec<&str> = report
            .external_dependencies
            .iter()
            .map(String::as_str)
            .collect();
        notices.push(Notice::info("Dependencies", deps.join(", ")));
    }
    if !report.unverified.is_empty() {
        notices.push(Notice::warning(
            "Unverified",
            format!("relative imports with no target: {}", join_issues(&report.unverified)),
        ));
    }
    if !report.unresolved_internal.is_empty() {
        notices.push(Notice::warning(
            "Unresolved",
            format!(
                "scoped imports left as-is: {}",
                join_issues(&report.unresolved_internal)
            ),
        ));
    }
    if report.has_critical() {
        notices.push(Notice::warning(
            "External",
            format!("unrecognised packages: {}", join_issues(&report.critical)),
        ));
    }
    if !notices.is_empty() {
        println!();
        ui::print_notices(&notices);
    }
}

fn join_issues(issues: &[ImportIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} ({})", issue.specifier, issue.file.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_args_require_source_and_dest() {
        assert!(PackageArgs::try_parse_from(["package"]).is_err());
        assert!(PackageArgs::try_parse_from(["package", "--source", "a"]).is_err());

        let args =
            PackageArgs::try_parse_from(["package", "--source", "a", "--dest", "b", "--allow-external"])
                .unwrap();
        assert_eq!(args.source, PathBuf::from("a"));
        assert_eq!(args.dest, PathBuf::from("b"));
        assert!(args.allow_external);
    }

    #[test]
    fn test_join_issues() {
        let issues = vec![
            ImportIssue {
                file: PathBuf::from("ui/Button.tsx"),
                specifier: "left-pad".into(),
            },
            ImportIssue {
                file: PathBuf::from("app.tsx"),
                specifier: "lodash".into(),
            },
        ];
        assert_eq!(
            join_issues(&issues),
            "left-pad (ui/Button.tsx), lodash (app.tsx)"
        );
    }
}
