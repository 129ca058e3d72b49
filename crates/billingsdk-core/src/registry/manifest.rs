//! Registry source manifest (templates/registry.yaml)

use super::descriptor::{Framework, Provider};
use serde::{Deserialize, Serialize};

/// Maps a template source file or directory to a project target path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the templates directory; may be a directory
    pub source: String,

    /// Target path in the project; for directory sources, the target prefix
    pub target: String,
}

/// A file from the templates directory bundled into every matching entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Source path relative to templates/ directory
    pub source: String,

    /// Destination path in each descriptor (defaults to source if not specified)
    #[serde(default)]
    pub dest: Option<String>,

    /// Only bundle into entries for this provider
    #[serde(default)]
    pub provider: Option<Provider>,
}

impl SharedFile {
    /// Get the destination path (falls back to source if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.source)
    }

    pub fn applies_to(&self, provider: Provider) -> bool {
        self.provider.map_or(true, |p| p == provider)
    }
}

/// One framework/provider descriptor to build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub framework: Framework,
    pub provider: Provider,

    #[serde(default)]
    pub dependencies: Vec<String>,

    pub files: Vec<SourceFile>,
}

impl RegistryEntry {
    pub fn name(&self) -> String {
        format!("{}-{}", self.framework, self.provider)
    }
}

/// Root registry manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryManifest {
    pub entries: Vec<RegistryEntry>,

    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}
