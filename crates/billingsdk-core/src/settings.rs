//! Environment-driven settings for the scaffolder
//!
//! Everything the scaffolder reads from the environment is resolved once into
//! [`Settings`]. Tests build settings through [`Settings::from_lookup`] so they
//! never touch the process environment.

use crate::install::PackageManager;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default remote registry serving `<framework>-<provider>.json` descriptors
pub const DEFAULT_REGISTRY_URL: &str = "https://billingsdk.com/tr";

/// Overrides the remote registry base URL
pub const REGISTRY_URL_ENV: &str = "BILLINGSDK_REGISTRY_URL";

/// Explicit local registry directory, tried first among local candidates
pub const REGISTRY_LOCAL_PATH_ENV: &str = "BILLINGSDK_REGISTRY_LOCAL_PATH";

/// When truthy, dependency installation is skipped
pub const SKIP_INSTALL_ENV: &str = "BILLINGSDK_SKIP_INSTALL";

/// Set by npm, pnpm, yarn and bun when they launch a binary
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// Timeout for the remote descriptor fetch
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the dependency install subprocess
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Resolved scaffolder settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Remote registry base URL
    pub registry_url: Url,
    /// Explicit local registry directory from the environment
    pub local_registry_dir: Option<PathBuf>,
    /// Skip dependency installation entirely
    pub skip_install: bool,
    /// Package manager that launched us (or the default)
    pub package_manager: PackageManager,
    /// Remote fetch timeout
    pub fetch_timeout: Duration,
    /// Install subprocess timeout
    pub install_timeout: Duration,
}

impl Settings {
    /// Resolve settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url_str = lookup(REGISTRY_URL_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());
        let registry_url =
            Url::parse(&url_str).with_context(|| format!("Invalid registry URL: {}", url_str))?;

        let local_registry_dir = lookup(REGISTRY_LOCAL_PATH_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let skip_install = lookup(SKIP_INSTALL_ENV).is_some_and(|v| is_truthy(&v));

        let package_manager = PackageManager::from_user_agent(lookup(USER_AGENT_ENV).as_deref());

        Ok(Self {
            registry_url,
            local_registry_dir,
            skip_install,
            package_manager,
            fetch_timeout: FETCH_TIMEOUT,
            install_timeout: INSTALL_TIMEOUT,
        })
    }

    /// User agent sent with registry requests
    pub fn user_agent(&self) -> String {
        format!("billingsdk/{}", env!("CARGO_PKG_VERSION"))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_with(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings_with(&[]);
        assert_eq!(settings.registry_url.as_str(), "https://billingsdk.com/tr");
        assert!(settings.local_registry_dir.is_none());
        assert!(!settings.skip_install);
        assert_eq!(settings.package_manager, PackageManager::Npm);
    }

    #[test]
    fn test_overrides() {
        let settings = settings_with(&[
            (REGISTRY_URL_ENV, "http://localhost:3000/tr"),
            (REGISTRY_LOCAL_PATH_ENV, "/opt/registry"),
            (SKIP_INSTALL_ENV, "1"),
            (USER_AGENT_ENV, "pnpm/9.1.0 npm/? node/v20.11.0 linux x64"),
        ]);
        assert_eq!(settings.registry_url.as_str(), "http://localhost:3000/tr");
        assert_eq!(
            settings.local_registry_dir,
            Some(PathBuf::from("/opt/registry"))
        );
        assert!(settings.skip_install);
        assert_eq!(settings.package_manager, PackageManager::Pnpm);
    }

    #[test]
    fn test_skip_install_values() {
        for value in ["1", "true", "TRUE", "yes", "on"] {
            assert!(settings_with(&[(SKIP_INSTALL_ENV, value)]).skip_install);
        }
        for value in ["0", "false", "", "nope"] {
            assert!(!settings_with(&[(SKIP_INSTALL_ENV, value)]).skip_install);
        }
    }

    #[test]
    fn test_invalid_registry_url() {
        let result = Settings::from_lookup(|key| {
            (key == REGISTRY_URL_ENV).then(|| "not a url".to_string())
        });
        assert!(result.is_err());
    }
}
