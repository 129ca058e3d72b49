//! Compiles template sources into registry descriptors

use super::descriptor::{FileEntry, TemplateDescriptor};
use super::manifest::{RegistryEntry, SharedFile};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Build the descriptor for one registry entry
///
/// Directory sources are walked recursively in file-name order and mapped
/// under their target prefix. Shared files are appended after the entry's own
/// files unless an entry file already claims the same target.
pub fn build_descriptor(
    template_dir: &Path,
    entry: &RegistryEntry,
    shared_files: &[SharedFile],
) -> Result<TemplateDescriptor> {
    let mut files = Vec::new();

    for source_file in &entry.files {
        let source_path = template_dir.join(&source_file.source);

        if source_path.is_dir() {
            for dir_entry in WalkDir::new(&source_path).sort_by_file_name() {
                let dir_entry = dir_entry
                    .with_context(|| format!("Failed to walk {}", source_path.display()))?;
                if !dir_entry.file_type().is_file() {
                    continue;
                }
                let relative = dir_entry
                    .path()
                    .strip_prefix(&source_path)
                    .with_context(|| format!("Unexpected path {}", dir_entry.path().display()))?;
                let target = join_target(&source_file.target, relative);
                files.push(FileEntry {
                    target,
                    content: read_text(dir_entry.path())?,
                });
            }
        } else if source_path.is_file() {
            files.push(FileEntry {
                target: source_file.target.clone(),
                content: read_text(&source_path)?,
            });
        } else {
            // Warn but don't fail - entry may list a file that hasn't been written yet
            eprintln!(
                "Warning: Source '{}' not found (listed for {})",
                source_path.display(),
                entry.name()
            );
        }
    }

    let claimed: HashSet<String> = files.iter().map(|f| f.target.clone()).collect();
    for shared in shared_files.iter().filter(|s| s.applies_to(entry.provider)) {
        if claimed.contains(shared.destination()) {
            continue;
        }
        let source_path = template_dir.join(&shared.source);
        if source_path.is_file() {
            files.push(FileEntry {
                target: shared.destination().to_string(),
                content: read_text(&source_path)?,
            });
        } else {
            eprintln!(
                "Warning: Shared file '{}' not found in {}",
                shared.source,
                template_dir.display()
            );
        }
    }

    Ok(TemplateDescriptor {
        name: Some(entry.name()),
        framework: Some(entry.framework),
        provider: Some(entry.provider),
        files,
        dependencies: entry.dependencies.clone(),
    })
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Join a target prefix and a relative path using forward slashes
fn join_target(prefix: &str, relative: &Path) -> String {
    let mut target = prefix.trim_end_matches('/').to_string();
    for component in relative.components() {
        if !target.is_empty() {
            target.push('/');
        }
        target.push_str(&component.as_os_str().to_string_lossy());
    }
    target
}
