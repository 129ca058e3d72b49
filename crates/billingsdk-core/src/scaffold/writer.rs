//! Template file materialization into a project

use super::env_merge::{is_env_example, merge_env};
use super::paths::ProjectRoot;
use crate::error::{BillingError, Result};
use crate::registry::FileEntry;
use std::path::Path;
use tokio::fs;

/// Decides whether an existing file may be overwritten
pub trait ConflictPrompt {
    /// Ask whether `display_path` should be replaced; only `Ok(true)` overwrites
    fn confirm_overwrite(&mut self, display_path: &str) -> std::io::Result<bool>;
}

/// Overwrites every conflicting file (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl ConflictPrompt for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _display_path: &str) -> std::io::Result<bool> {
        Ok(true)
    }
}

/// Keeps every existing file untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl ConflictPrompt for NeverOverwrite {
    fn confirm_overwrite(&mut self, _display_path: &str) -> std::io::Result<bool> {
        Ok(false)
    }
}

/// What happened to a single file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Written to a previously missing path
    Created,
    /// Env example file existed; these keys were appended
    Merged { added: Vec<String> },
    /// Env example file existed and already had every key
    Unchanged,
    /// Existing file replaced after confirmation
    Overwritten,
    /// Existing file left as is
    Kept,
    /// Target rejected before touching the filesystem
    Rejected(String),
    /// I/O or prompt failure
    Failed(String),
}

impl FileOutcome {
    pub fn is_problem(&self) -> bool {
        matches!(self, FileOutcome::Rejected(_) | FileOutcome::Failed(_))
    }

    /// Whether the file on disk was modified
    pub fn wrote(&self) -> bool {
        matches!(
            self,
            FileOutcome::Created | FileOutcome::Merged { .. } | FileOutcome::Overwritten
        )
    }
}

/// Outcome for one descriptor entry
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Target as listed in the descriptor
    pub target: String,
    /// Path shown to the operator
    pub display_path: String,
    pub outcome: FileOutcome,
}

/// Outcomes for every descriptor entry, in descriptor order
#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    pub files: Vec<FileReport>,
}

impl ScaffoldReport {
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.wrote()).count()
    }

    pub fn problems(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_problem())
    }

    pub fn outcome_for(&self, target: &str) -> Option<&FileOutcome> {
        self.files
            .iter()
            .find(|f| f.target == target)
            .map(|f| &f.outcome)
    }
}

/// Materialize descriptor files into the project, one at a time
///
/// A failing or rejected entry is recorded and the remaining entries still run.
pub async fn materialize<P>(
    project: &ProjectRoot,
    files: &[FileEntry],
    prompt: &mut P,
) -> ScaffoldReport
where
    P: ConflictPrompt + ?Sized,
{
    let mut report = ScaffoldReport::default();

    for entry in files {
        let display_path = project.display_path(&entry.target);

        let outcome = match project.resolve(&entry.target) {
            Ok(destination) => {
                match write_entry(&destination, &display_path, entry, prompt).await {
                    Ok(outcome) => outcome,
                    Err(e) => FileOutcome::Failed(e.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!(target_path = %entry.target, error = %e, "skipping template file");
                FileOutcome::Rejected(e.to_string())
            }
        };

        tracing::debug!(path = %display_path, ?outcome, "materialized template file");
        report.files.push(FileReport {
            target: entry.target.clone(),
            display_path,
            outcome,
        });
    }

    report
}

async fn write_entry<P>(
    destination: &Path,
    display_path: &str,
    entry: &FileEntry,
    prompt: &mut P,
) -> Result<FileOutcome>
where
    P: ConflictPrompt + ?Sized,
{
    let exists = fs::try_exists(destination)
        .await
        .map_err(|e| BillingError::io(destination, e))?;

    if !exists {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BillingError::io(parent, e))?;
        }
        fs::write(destination, &entry.content)
            .await
            .map_err(|e| BillingError::io(destination, e))?;
        return Ok(FileOutcome::Created);
    }

    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    if is_env_example(&file_name) {
        let existing = fs::read_to_string(destination)
            .await
            .map_err(|e| BillingError::io(destination, e))?;
        let merged = merge_env(&existing, &entry.content);
        if merged.is_unchanged() {
            return Ok(FileOutcome::Unchanged);
        }
        fs::write(destination, &merged.content)
            .await
            .map_err(|e| BillingError::io(destination, e))?;
        return Ok(FileOutcome::Merged {
            added: merged.added,
        });
    }

    let overwrite = prompt
        .confirm_overwrite(display_path)
        .map_err(|e| BillingError::io(destination, e))?;
    if !overwrite {
        return Ok(FileOutcome::Kept);
    }

    fs::write(destination, &entry.content)
        .await
        .map_err(|e| BillingError::io(destination, e))?;
    Ok(FileOutcome::Overwritten)
}
