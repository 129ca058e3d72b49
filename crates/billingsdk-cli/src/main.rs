//! Billing SDK CLI - Add billing integrations to an existing project

use anyhow::Result;
use billingsdk_core::registry::{Framework, Provider};
use billingsdk_core::tui::InitArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter
const LOG_ENV: &str = "BILLINGSDK_LOG";

#[derive(Parser, Debug)]
#[command(name = "billingsdk")]
#[command(about = "CLI for adding billing components and payment provider glue to your project")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize billing in the current project
    Init(CliInitArgs),
    /// Build registry descriptors from the template directory (for development use)
    BuildRegistry(BuildRegistryArgs),
}

#[derive(Parser, Debug)]
pub struct CliInitArgs {
    /// Framework used by the project
    #[arg(short, long, value_enum)]
    pub framework: Option<Framework>,

    /// Payment provider to integrate
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Local registry directory to use instead of the remote registry (for development use)
    #[arg(long = "registry-dir")]
    pub registry_dir: Option<PathBuf>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            framework: args.framework,
            provider: args.provider,
            cwd: args.cwd,
            registry_dir: args.registry_dir,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct BuildRegistryArgs {
    /// Directory containing registry.yaml and template sources
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Directory to write descriptors to (defaults to public/tr)
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    init_tracing();

    let args = Args::parse();

    match args.command {
        Some(Command::Init(init_args)) => {
            let result = billingsdk_core::run(init_args.into()).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::BuildRegistry(build_args)) => {
            billingsdk_core::build_registry(
                build_args.template_dir.as_deref(),
                build_args.out_dir.as_deref(),
            )?;
            Ok(())
        }
        None => {
            // No subcommand provided, default to init behavior (interactive mode)
            let result = billingsdk_core::run(InitArgs::default()).await;

            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}
