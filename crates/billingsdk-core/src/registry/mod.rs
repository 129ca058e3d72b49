//! Template registry: descriptor types, resolution, and building
//!
//! This module provides:
//! - Descriptor types (TemplateDescriptor, FileEntry) and the Framework/Provider keys
//! - Descriptor resolution from the remote registry with local fallbacks
//! - Compilation of `templates/registry.yaml` into per-pair JSON descriptors

pub mod builder;
pub mod descriptor;
pub mod manifest;
pub mod resolver;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub use builder::build_descriptor;
pub use descriptor::{descriptor_file_name, FileEntry, Framework, Provider, TemplateDescriptor};
pub use manifest::{RegistryEntry, RegistryManifest, SharedFile, SourceFile};
pub use resolver::{local_candidates, DescriptorOrigin, RegistryResolver, ResolvedDescriptor};

/// Build JSON descriptors for every entry in `<template_dir>/registry.yaml`
///
/// Returns the number of descriptors written to `out_dir`.
pub fn build_registry(template_dir: Option<&Path>, out_dir: Option<&Path>) -> Result<usize> {
    let dir = template_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("templates"));
    let out = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("public").join("tr"));

    if !dir.exists() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    let manifest_path = dir.join("registry.yaml");
    if !manifest_path.exists() {
        anyhow::bail!("registry.yaml not found in {}", dir.display());
    }

    let manifest_content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let manifest: RegistryManifest =
        serde_yaml::from_str(&manifest_content).context("Failed to parse registry.yaml")?;

    std::fs::create_dir_all(&out)
        .with_context(|| format!("Failed to create {}", out.display()))?;

    println!(
        "{}",
        format!("Building {} registry descriptors...", manifest.entries.len())
            .cyan()
            .bold()
    );
    println!();

    let mut built = 0;
    for entry in &manifest.entries {
        print!("  {} {}...", "->".blue(), entry.name());

        match build_descriptor(&dir, entry, &manifest.shared_files) {
            Ok(descriptor) => {
                let json = serde_json::to_string_pretty(&descriptor)
                    .context("Failed to serialize descriptor")?;
                let path = out.join(descriptor_file_name(entry.framework, entry.provider));
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(" {} ({} files)", "done".green(), descriptor.files.len());
                built += 1;
            }
            Err(e) => {
                println!(" {}", "failed".red());
                eprintln!("    Error: {:#}", e);
            }
        }
    }

    println!();
    println!(
        "{} {} descriptor(s) in {}",
        "Built".green().bold(),
        built,
        out.display()
    );

    Ok(built)
}
