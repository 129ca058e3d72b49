//! Package manager detection from the launching user agent

use std::fmt;
use std::process::Command;

/// JavaScript package managers the scaffolder can install with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Map an `npm_config_user_agent` value to a package manager
    ///
    /// The agent string starts with `<name>/<version>`; unknown or missing
    /// agents fall back to npm.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(agent) = user_agent else {
            return Self::default();
        };
        let name = agent.trim_start().split('/').next().unwrap_or_default();
        match name {
            "pnpm" => PackageManager::Pnpm,
            "yarn" => PackageManager::Yarn,
            "bun" => PackageManager::Bun,
            _ => PackageManager::Npm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Executable to spawn (Node shims are `.cmd` files on Windows)
    pub fn program(&self) -> String {
        if cfg!(windows) && *self != PackageManager::Bun {
            format!("{}.cmd", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }

    /// Subcommand that adds packages to the project
    pub fn add_subcommand(&self) -> &'static str {
        match self {
            PackageManager::Npm => "install",
            PackageManager::Pnpm | PackageManager::Yarn | PackageManager::Bun => "add",
        }
    }

    /// Full argument list for installing `dependencies`
    pub fn install_args(&self, dependencies: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(dependencies.len() + 1);
        args.push(self.add_subcommand().to_string());
        args.extend(dependencies.iter().cloned());
        args
    }

    /// Command the operator can run themselves
    pub fn manual_command(&self, dependencies: &[String]) -> String {
        format!("{} {}", self.as_str(), self.install_args(dependencies).join(" "))
    }

    /// Installed version, if the package manager is on PATH
    pub fn version(&self) -> Option<String> {
        Command::new(self.program())
            .arg("--version")
            .output()
            .ok()
            .and_then(|output| {
                if output.status.success() {
                    String::from_utf8(output.stdout)
                        .ok()
                        .map(|s| s.trim().to_string())
                } else {
                    None
                }
            })
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
