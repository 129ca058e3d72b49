//! Scaffolding: materializing descriptor files into a project
//!
//! This module provides:
//! - Project root handling with `src/` detection and path containment
//! - Key-based `.env.example` merging
//! - Sequential file writing with per-file outcomes

pub mod env_merge;
pub mod paths;
pub mod writer;

pub use env_merge::{is_env_example, merge_env, EnvMerge};
pub use paths::ProjectRoot;
pub use writer::{
    materialize, AlwaysOverwrite, ConflictPrompt, FileOutcome, FileReport, NeverOverwrite,
    ScaffoldReport,
};
