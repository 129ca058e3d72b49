//! Billing SDK Core - Shared library for the billingsdk scaffolding CLI
//!
//! This library copies framework-specific billing templates (API routes,
//! hooks, payment provider glue) into an existing JavaScript project.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Registry resolution, path containment,
//!   `.env.example` merging, package manager detection
//! - **Layer 2: Stages** - [`scaffold::materialize`] and
//!   [`install::install_dependencies`], each reporting per-item outcomes
//!   instead of aborting
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based `init` flow
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use billingsdk_core::{registry, scaffold, Settings};
//!
//! let settings = Settings::from_env()?;
//! let project = scaffold::ProjectRoot::open(&std::env::current_dir()?)?;
//! let resolver = registry::RegistryResolver::from_settings(&settings, project.root());
//! let resolved = resolver
//!     .resolve(registry::Framework::Nextjs, registry::Provider::Paypal)
//!     .await?;
//! let report = scaffold::materialize(
//!     &project,
//!     &resolved.descriptor.files,
//!     &mut scaffold::NeverOverwrite,
//! )
//! .await;
//! ```

pub mod detect;
pub mod error;
pub mod install;
pub mod registry;
pub mod scaffold;
pub mod settings;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use detect::detect_framework;
pub use error::{BillingError, Result};
pub use install::{install_dependencies, InstallOutcome, PackageManager};
pub use registry::{
    build_registry, FileEntry, Framework, Provider, RegistryResolver, TemplateDescriptor,
};
pub use scaffold::{materialize, ConflictPrompt, FileOutcome, ProjectRoot, ScaffoldReport};
pub use settings::Settings;

#[cfg(feature = "tui")]
pub use tui::run;
