//! # Dashgraft Process Execution (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Runs the host project's package manager to add the dashboard's runtime
//! dependencies. The child inherits stdio so the user sees the package
//! manager's own progress output; dashgraft only inspects the exit status.
//!
//! A non-zero exit is fatal (`DashgraftError::Install`): nothing has been
//! written to the project yet at that point, so aborting leaves it as it was.
//!
use crate::codemod::detector::PackageManager;
use crate::core::error::{DashgraftError, Result};
use anyhow::{anyhow, Context};
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, error, info};

/// Display form of the install command, e.g. `pnpm add react-router-dom`.
pub fn describe_install(manager: PackageManager, dependencies: &[String]) -> String {
    std::iter::once(manager.program().to_string())
        .chain(manager.add_args(dependencies))
        .collect::<Vec<_>>()
        .join(" ")
}

/// # Check Program Availability (`program_available`)
///
/// Runs `<program> --version` with captured output.
///
/// ## Returns
///
/// * `Ok(true)` if the program ran (whatever its exit status).
/// * `Ok(false)` if it was not found on `PATH`.
pub async fn program_available(program: &str) -> Result<bool> {
    let result = tokio::process::Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match result {
        Ok(status) => {
            debug!("'{} --version' exited with {}", program, status);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to execute availability check for '{}'", program))),
    }
}

/// # Install Dependencies (`install_dependencies`)
///
/// Adds `dependencies` to the project at `project_root` with `manager`.
///
/// ## Returns
///
/// * `Ok(())` when the package manager exits successfully or there is
///   nothing to install.
/// * `Err(DashgraftError::Install)` when it cannot be started or exits
///   non-zero.
pub async fn install_dependencies(
    manager: PackageManager,
    dependencies: &[String],
    project_root: &Path,
) -> Result<()> {
    if dependencies.is_empty() {
        debug!("No dependencies configured, skipping install");
        return Ok(());
    }
    let cmd = describe_install(manager, dependencies);
    if !program_available(manager.program()).await? {
        return Err(anyhow!(DashgraftError::Install {
            cmd,
            status: format!("'{}' not found in PATH", manager.program()),
        }));
    }

    info!("Executing command: {}", cmd);
    let status = tokio::process::Command::new(manager.program())
        .args(manager.add_args(dependencies))
        .current_dir(project_root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("Failed to execute '{}'", cmd))?;

    if !status.success() {
        let exit_code = status
            .code()
            .map_or("a signal".to_string(), |c| format!("exit code {}", c));
        error!("'{}' failed with {}", cmd, exit_code);
        return Err(anyhow!(DashgraftError::Install {
            cmd,
            status: exit_code,
        }));
    }
    info!("'{}' completed successfully", cmd);
    Ok(())
}
