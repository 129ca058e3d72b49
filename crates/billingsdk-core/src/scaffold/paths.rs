//! Project root handling and destination path containment

use crate::error::{BillingError, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// The project files are materialized into
#[derive(Debug, Clone)]
pub struct ProjectRoot {
    /// Canonicalized root directory
    root: PathBuf,
    /// Whether targets are placed under `src/`
    src_prefix: bool,
}

impl ProjectRoot {
    /// Open a project root, detecting whether a `src` directory exists
    pub fn open(dir: &Path) -> Result<Self> {
        let root = dir.canonicalize().map_err(|e| BillingError::io(dir, e))?;
        let src_prefix = root.join("src").is_dir();
        Ok(Self { root, src_prefix })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uses_src(&self) -> bool {
        self.src_prefix
    }

    /// Target path as shown to the operator (`src/` prefixed when applicable)
    pub fn display_path(&self, target: &str) -> String {
        if self.src_prefix {
            format!("src/{}", target)
        } else {
            target.to_string()
        }
    }

    /// Resolve a template target to a destination inside the root
    ///
    /// The target must be relative. `..` components may not climb above the
    /// root, and the deepest existing ancestor of the destination is
    /// canonicalized so symlinks pointing out of the project are rejected too.
    pub fn resolve(&self, target: &str) -> Result<PathBuf> {
        let target_path = Path::new(target);
        if target_path.is_absolute() || target_path.has_root() {
            return Err(BillingError::AbsoluteTarget {
                target: target.to_string(),
            });
        }

        let mut parts: Vec<OsString> = Vec::new();
        if self.src_prefix {
            parts.push(OsString::from("src"));
        }

        for component in target_path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_os_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(BillingError::PathEscapesRoot {
                            target: target.to_string(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(BillingError::AbsoluteTarget {
                        target: target.to_string(),
                    });
                }
            }
        }

        if parts.is_empty() {
            return Err(BillingError::EmptyTarget {
                target: target.to_string(),
            });
        }

        let destination: PathBuf = parts.iter().fold(self.root.clone(), |acc, p| acc.join(p));
        self.ensure_contained(&destination, target)?;
        Ok(destination)
    }

    fn ensure_contained(&self, destination: &Path, target: &str) -> Result<()> {
        let mut existing = destination;
        while std::fs::symlink_metadata(existing).is_err() {
            match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            }
        }

        let canonical = existing
            .canonicalize()
            .map_err(|e| BillingError::io(existing, e))?;
        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            Err(BillingError::PathEscapesRoot {
                target: target.to_string(),
            })
        }
    }
}
