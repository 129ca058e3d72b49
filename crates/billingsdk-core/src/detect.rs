//! Framework detection from a project's package.json

use crate::registry::Framework;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Dependency names checked in order; `next` wins over `react`
const FRAMEWORK_MARKERS: &[(&str, Framework)] = &[
    ("next", Framework::Nextjs),
    ("express", Framework::Express),
    ("fastify", Framework::Fastify),
    ("hono", Framework::Hono),
    ("react", Framework::React),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageJson {
    fn has(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

/// Detect the framework used by the project at `root`
///
/// Returns `None` when there is no readable package.json or none of the
/// known framework packages is listed.
pub fn detect_framework(root: &Path) -> Option<Framework> {
    let path = root.join("package.json");
    let content = std::fs::read_to_string(&path).ok()?;
    let package: PackageJson = match serde_json::from_str(&content) {
        Ok(package) => package,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable package.json");
            return None;
        }
    };

    FRAMEWORK_MARKERS
        .iter()
        .find(|(name, _)| package.has(name))
        .map(|(_, framework)| *framework)
}
