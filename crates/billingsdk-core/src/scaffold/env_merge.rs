//! Key-based merging for `.env.example` files

use std::collections::HashSet;

/// Whether a file name is an environment example file (`.env.example`, `.env.local.example`, ...)
pub fn is_env_example(file_name: &str) -> bool {
    file_name == ".env.example" || (file_name.starts_with(".env.") && file_name.ends_with(".example"))
}

/// Key of a `KEY=VALUE` line, ignoring comments, blanks and an `export ` prefix
///
/// A leading byte order mark is not part of the key.
pub fn env_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(trimmed);
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

/// Result of merging new env content into existing content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvMerge {
    /// Merged file content
    pub content: String,
    /// Keys appended, in order
    pub added: Vec<String>,
}

impl EnvMerge {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// Merge `incoming` into `existing`
///
/// Every existing line is kept. Incoming `KEY=VALUE` lines are appended only
/// when their key is not yet present; comment and blank lines travel with the
/// key line that follows them and are dropped if that key is skipped.
pub fn merge_env(existing: &str, incoming: &str) -> EnvMerge {
    let mut known: HashSet<&str> = existing.lines().filter_map(env_key).collect();
    let mut appended: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut added = Vec::new();

    for line in incoming.lines() {
        match env_key(line) {
            Some(key) => {
                if known.insert(key) {
                    appended.append(&mut pending);
                    appended.push(line);
                    added.push(key.to_string());
                } else {
                    pending.clear();
                }
            }
            None => pending.push(line),
        }
    }

    if added.is_empty() {
        return EnvMerge {
            content: existing.to_string(),
            added,
        };
    }

    let mut content = existing.to_string();
    if !content.is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        let starts_blank = appended.first().is_some_and(|l| l.trim().is_empty());
        if !content.ends_with("\n\n") && !starts_blank {
            content.push('\n');
        }
    }
    for line in appended {
        content.push_str(line);
        content.push('\n');
    }

    EnvMerge { content, added }
}
