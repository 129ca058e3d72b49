//! Error types for registry resolution and file materialization

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the core library
#[derive(Error, Debug)]
pub enum BillingError {
    /// Neither the remote registry nor any local candidate produced a descriptor
    #[error(
        "Unable to load registry file \"{filename}\".\n{}\n\
         Set BILLINGSDK_REGISTRY_LOCAL_PATH to your registry directory or ensure public/tr exists near your CWD.",
        format_attempts(.attempts)
    )]
    RegistryUnavailable {
        filename: String,
        attempts: Vec<String>,
    },

    /// A descriptor body could not be parsed
    #[error("Invalid template descriptor from {origin}: {source}")]
    InvalidDescriptor {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A template target is absolute or carries a root component
    #[error("Refusing absolute target path '{target}'")]
    AbsoluteTarget { target: String },

    /// A template target resolves outside the project root
    #[error("Target path '{target}' resolves outside the project root")]
    PathEscapesRoot { target: String },

    /// A template target names the project root itself
    #[error("Target path '{target}' does not name a file")]
    EmptyTarget { target: String },

    /// Filesystem errors, tagged with the path involved
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BillingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_attempts(attempts: &[String]) -> String {
    attempts
        .iter()
        .map(|a| format!("  - {}", a))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_unavailable_lists_attempts() {
        let err = BillingError::RegistryUnavailable {
            filename: "nextjs-paypal.json".to_string(),
            attempts: vec![
                "https://billingsdk.com/tr/nextjs-paypal.json: HTTP 404".to_string(),
                "/tmp/public/tr/nextjs-paypal.json: not found".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"nextjs-paypal.json\""));
        assert!(msg.contains("  - https://billingsdk.com/tr/nextjs-paypal.json: HTTP 404"));
        assert!(msg.contains("BILLINGSDK_REGISTRY_LOCAL_PATH"));
    }
}
