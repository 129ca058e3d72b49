//! Dependency installation
//!
//! This module provides:
//! - Package manager detection from `npm_config_user_agent`
//! - Install subprocess execution with streamed output and a timeout

pub mod installer;
pub mod package_manager;

pub use installer::{install_dependencies, InstallOutcome};
pub use package_manager::PackageManager;
