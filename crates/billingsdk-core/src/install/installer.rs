//! Dependency installation through the detected package manager

use super::package_manager::PackageManager;
use crate::settings::Settings;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Result of the dependency install stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The descriptor lists no dependencies
    NothingToInstall,
    /// Installation suppressed by `BILLINGSDK_SKIP_INSTALL`
    Skipped { manual_command: String },
    /// Package manager exited successfully
    Installed { manager: PackageManager },
    /// Package manager failed; the operator should run `manual_command`
    Failed {
        reason: String,
        manual_command: String,
    },
}

/// Install `dependencies` into `project_dir`
///
/// Never returns an error: failures are reported as [`InstallOutcome::Failed`]
/// so completed scaffolding is kept.
pub async fn install_dependencies(
    settings: &Settings,
    dependencies: &[String],
    project_dir: &Path,
) -> InstallOutcome {
    if dependencies.is_empty() {
        return InstallOutcome::NothingToInstall;
    }

    let manager = settings.package_manager;
    if settings.skip_install {
        tracing::debug!("dependency installation skipped by environment");
        return InstallOutcome::Skipped {
            manual_command: manager.manual_command(dependencies),
        };
    }

    install_with(
        &manager.program(),
        manager,
        dependencies,
        project_dir,
        settings.install_timeout,
    )
    .await
}

/// Run the add command through `program`, mapping any failure to [`InstallOutcome::Failed`]
async fn install_with(
    program: &str,
    manager: PackageManager,
    dependencies: &[String],
    project_dir: &Path,
    limit: Duration,
) -> InstallOutcome {
    let args = manager.install_args(dependencies);
    match run_command(program, &args, project_dir, limit).await {
        Ok(()) => InstallOutcome::Installed { manager },
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(%reason, "dependency installation failed");
            InstallOutcome::Failed {
                reason,
                manual_command: manager.manual_command(dependencies),
            }
        }
    }
}

/// Run a command in `cwd`, streaming its output, killed after `limit`
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    limit: Duration,
) -> Result<()> {
    let display = format!("{} {}", program, args.join(" "));
    println!();
    println!("{} {}", "Running:".dimmed(), display.yellow());
    println!();

    let mut child = TokioCommand::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;

    let stdout = child
        .stdout
        .take()
        .context("Failed to capture stdout")?;
    let stderr = child
        .stderr
        .take()
        .context("Failed to capture stderr")?;

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    let output_task = async {
        let mut stdout_open = true;
        let mut stderr_open = true;
        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_reader.next_line(), if stdout_open => {
                    match line {
                        Ok(Some(line)) => println!("  {}", line),
                        Ok(None) => stdout_open = false,
                        Err(e) => {
                            eprintln!("{} {}", "Error reading stdout:".red(), e);
                            stdout_open = false;
                        }
                    }
                }
                line = stderr_reader.next_line(), if stderr_open => {
                    match line {
                        Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            eprintln!("{} {}", "Error reading stderr:".red(), e);
                            stderr_open = false;
                        }
                    }
                }
            }
        }
    };

    if timeout(limit, output_task).await.is_err() {
        let _ = child.kill().await;
        println!();
        anyhow::bail!("{} timed out after {} seconds", display, limit.as_secs());
    }

    match timeout(Duration::from_secs(5), child.wait()).await {
        Ok(Ok(status)) => {
            println!();
            if status.success() {
                Ok(())
            } else {
                anyhow::bail!(
                    "{} failed with exit code: {}",
                    display,
                    status.code().unwrap_or(-1)
                );
            }
        }
        Ok(Err(e)) => {
            anyhow::bail!("Failed to wait for {}: {}", program, e);
        }
        Err(_) => {
            let _ = child.kill().await;
            anyhow::bail!("{} hung after closing its output", display);
        }
    }
}
