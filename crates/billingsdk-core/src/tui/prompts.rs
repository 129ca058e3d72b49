//! Charm-style CLI prompts using cliclack

use crate::detect::detect_framework;
use crate::install::{install_dependencies, InstallOutcome};
use crate::registry::{Framework, Provider, RegistryResolver, ResolvedDescriptor};
use crate::scaffold::{
    materialize, AlwaysOverwrite, ConflictPrompt, FileOutcome, ProjectRoot, ScaffoldReport,
};
use crate::settings::{Settings, SKIP_INSTALL_ENV};
use anyhow::{Context, Result};
use std::io;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Framework to scaffold for (prompted when absent)
    pub framework: Option<Framework>,

    /// Payment provider (prompted when absent)
    pub provider: Option<Provider>,

    /// Project directory (defaults to the current directory)
    pub cwd: Option<PathBuf>,

    /// Read descriptors from this directory only, skipping the remote registry
    pub registry_dir: Option<PathBuf>,

    /// Overwrite existing files without asking
    pub yes: bool,
}

/// Asks before overwriting with a cliclack confirm; cancelling counts as "no"
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackPrompt;

impl ConflictPrompt for CliclackPrompt {
    fn confirm_overwrite(&mut self, display_path: &str) -> io::Result<bool> {
        let answer = cliclack::confirm(format!(
            "File {} already exists. Do you want to overwrite it?",
            display_path
        ))
        .initial_value(false)
        .interact();

        match answer {
            Ok(overwrite) => Ok(overwrite),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Run the init flow with interactive prompts
pub async fn run(args: InitArgs) -> Result<()> {
    cliclack::intro("Welcome to Billing SDK Setup!")?;

    let settings = Settings::from_env()?;

    // Step 1: Locate the project
    let project = open_project(&args)?;

    // Step 2: Select framework and provider
    let Some(framework) = select_framework(&project, &args)? else {
        cliclack::outro_cancel("Setup cancelled.")?;
        return Ok(());
    };
    let Some(provider) = select_provider(&args)? else {
        cliclack::outro_cancel("Setup cancelled.")?;
        return Ok(());
    };

    // Step 3: Resolve the template descriptor (fatal on failure)
    let resolved = resolve_template(&settings, &project, &args, framework, provider).await?;

    // Step 4: Write files
    let report = add_files(&project, &resolved, args.yes).await?;

    // Step 5: Install dependencies
    let install = install_stage(&settings, &project, &resolved).await?;

    // Step 6: Show next steps
    print_next_steps(&project, &args, provider, &report, &install)?;

    Ok(())
}

fn open_project(args: &InitArgs) -> Result<ProjectRoot> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let dir = match &args.cwd {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !dir.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", dir.display());
    }

    let project = ProjectRoot::open(&dir)
        .with_context(|| format!("Failed to open project directory {}", dir.display()))?;

    if args.cwd.is_some() {
        cliclack::log::info(format!("Using directory: {}", project.root().display()))?;
    }

    Ok(project)
}

/// Turn a cancelled prompt into `None`
fn cancellable<T>(result: io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn select_framework(project: &ProjectRoot, args: &InitArgs) -> Result<Option<Framework>> {
    if let Some(framework) = args.framework {
        cliclack::log::info(format!("Framework: {}", framework.display_name()))?;
        return Ok(Some(framework));
    }

    let detected = detect_framework(project.root());

    let mut select =
        cliclack::select("Which framework are you using? (Adding more frameworks soon)");
    for framework in Framework::ALL {
        let label = if detected == Some(framework) {
            format!("{} (detected)", framework.display_name())
        } else {
            framework.display_name().to_string()
        };
        select = select.item(framework, label, framework.hint());
    }
    if let Some(framework) = detected {
        select = select.initial_value(framework);
    }

    cancellable(select.interact())
}

fn select_provider(args: &InitArgs) -> Result<Option<Provider>> {
    if let Some(provider) = args.provider {
        cliclack::log::info(format!("Provider: {}", provider.display_name()))?;
        return Ok(Some(provider));
    }

    let mut select = cliclack::select(
        "Which payment provider would you like to use? (Adding more providers soon)",
    );
    for provider in Provider::ALL {
        select = select.item(provider, provider.display_name(), "");
    }

    cancellable(select.interact())
}

async fn resolve_template(
    settings: &Settings,
    project: &ProjectRoot,
    args: &InitArgs,
    framework: Framework,
    provider: Provider,
) -> Result<ResolvedDescriptor> {
    let resolver = match &args.registry_dir {
        Some(dir) => {
            cliclack::log::info(format!("Using local registry from {}", dir.display()))?;
            RegistryResolver::local_only(dir.clone(), settings)
        }
        None => RegistryResolver::from_settings(settings, project.root()),
    };

    let spinner = cliclack::spinner();
    spinner.start(format!("Loading {}-{} template...", framework, provider));

    match resolver.resolve(framework, provider).await {
        Ok(resolved) => {
            spinner.stop(format!(
                "Loaded {} file(s) from {}",
                resolved.descriptor.files.len(),
                resolved.origin
            ));
            Ok(resolved)
        }
        Err(e) => {
            spinner.stop("Setup failed!");
            Err(e.into())
        }
    }
}

async fn add_files(
    project: &ProjectRoot,
    resolved: &ResolvedDescriptor,
    yes: bool,
) -> Result<ScaffoldReport> {
    if project.uses_src() {
        cliclack::log::info("Found src/ directory, adding files there")?;
    }

    let mut prompt: Box<dyn ConflictPrompt> = if yes {
        Box::new(AlwaysOverwrite)
    } else {
        Box::new(CliclackPrompt)
    };

    let report = materialize(project, &resolved.descriptor.files, prompt.as_mut()).await;

    for file in &report.files {
        let path = &file.display_path;
        match &file.outcome {
            FileOutcome::Created => cliclack::log::success(format!("Added {}", path))?,
            FileOutcome::Merged { added } => cliclack::log::success(format!(
                "Merged {} new key(s) into {}",
                added.len(),
                path
            ))?,
            FileOutcome::Unchanged => {
                cliclack::log::info(format!("{} already has every key", path))?
            }
            FileOutcome::Overwritten => cliclack::log::success(format!("Overwrote {}", path))?,
            FileOutcome::Kept => cliclack::log::info(format!("Kept existing {}", path))?,
            FileOutcome::Rejected(reason) => {
                cliclack::log::warning(format!("Skipped {}: {}", path, reason))?
            }
            FileOutcome::Failed(reason) => {
                cliclack::log::error(format!("Failed to add file {}: {}", path, reason))?
            }
        }
    }

    Ok(report)
}

async fn install_stage(
    settings: &Settings,
    project: &ProjectRoot,
    resolved: &ResolvedDescriptor,
) -> Result<InstallOutcome> {
    let dependencies = &resolved.descriptor.dependencies;

    if !dependencies.is_empty() && !settings.skip_install {
        let manager = settings.package_manager;
        let version = manager.version().unwrap_or_else(|| "not found".to_string());
        cliclack::log::info(format!(
            "Installing dependencies with {} ({})...",
            manager, version
        ))?;
    }

    let outcome = install_dependencies(settings, dependencies, project.root()).await;

    match &outcome {
        InstallOutcome::NothingToInstall => {}
        InstallOutcome::Skipped { manual_command } => cliclack::log::info(format!(
            "Skipping dependency installation ({} is set). Install later with: {}",
            SKIP_INSTALL_ENV, manual_command
        ))?,
        InstallOutcome::Installed { manager } => {
            cliclack::log::success(format!("Dependencies installed with {}", manager))?
        }
        InstallOutcome::Failed {
            reason,
            manual_command,
        } => {
            cliclack::log::error(format!("Failed to install dependencies: {}", reason))?;
            cliclack::log::info(format!("Run this command manually: {}", manual_command))?;
        }
    }

    Ok(outcome)
}

fn print_next_steps(
    project: &ProjectRoot,
    args: &InitArgs,
    provider: Provider,
    report: &ScaffoldReport,
    install: &InstallOutcome,
) -> Result<()> {
    let mut steps = Vec::new();

    if args.cwd.is_some() {
        steps.push(format!("cd {}", project.root().display()));
    }

    if let InstallOutcome::Skipped { manual_command }
    | InstallOutcome::Failed { manual_command, .. } = install
    {
        steps.push(manual_command.clone());
    }

    if let Some(env_file) = report
        .files
        .iter()
        .find(|f| f.outcome.wrote() && f.target.ends_with(".env.example"))
    {
        steps.push(format!(
            "Copy {} to .env and fill in your {} credentials",
            env_file.display_path,
            provider.display_name()
        ));
    }

    if report.problems().next().is_some() {
        steps.push("Review the files reported above that could not be added".to_string());
    }

    if !steps.is_empty() {
        println!();
        println!("  Next steps");
        println!();

        for (i, step) in steps.iter().enumerate() {
            println!("  {}.  {}", i + 1, step);
        }
    }

    cliclack::outro("Thanks for using Billing SDK CLI!")?;

    Ok(())
}
