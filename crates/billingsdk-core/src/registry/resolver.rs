//! Registry resolution: remote first, local directories as fallback
//!
//! The remote registry is tried once. On any network failure, non-success
//! status, or unparsable body, the local candidate directories are tried in
//! order and the first one holding a valid descriptor wins.

use super::descriptor::{descriptor_file_name, Framework, Provider, TemplateDescriptor};
use crate::error::{BillingError, Result};
use crate::settings::Settings;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use url::Url;

/// Where a resolved descriptor came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorOrigin {
    Remote(Url),
    Local(PathBuf),
}

impl fmt::Display for DescriptorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorOrigin::Remote(url) => write!(f, "{}", url),
            DescriptorOrigin::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A descriptor together with its origin
#[derive(Debug, Clone)]
pub struct ResolvedDescriptor {
    pub descriptor: TemplateDescriptor,
    pub origin: DescriptorOrigin,
}

/// Resolves template descriptors for a framework/provider pair
pub struct RegistryResolver {
    remote: Option<Url>,
    local_dirs: Vec<PathBuf>,
    /// Build failures surface as a failed remote attempt
    client: std::result::Result<reqwest::Client, String>,
}

impl RegistryResolver {
    /// Create a resolver with an explicit remote base and local candidates
    pub fn new(
        remote: Option<Url>,
        local_dirs: Vec<PathBuf>,
        user_agent: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            remote,
            local_dirs,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .map_err(|e| format!("HTTP client unavailable: {}", e)),
        }
    }

    /// Remote registry from settings, with the standard local fallbacks around `cwd`
    pub fn from_settings(settings: &Settings, cwd: &Path) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let candidates =
            local_candidates(settings.local_registry_dir.as_deref(), cwd, exe_dir.as_deref());
        Self::new(
            Some(settings.registry_url.clone()),
            candidates,
            &settings.user_agent(),
            settings.fetch_timeout,
        )
    }

    /// Only read from a single local registry directory
    pub fn local_only(dir: PathBuf, settings: &Settings) -> Self {
        Self::new(
            None,
            vec![dir],
            &settings.user_agent(),
            settings.fetch_timeout,
        )
    }

    /// Local directories tried after the remote, in order
    pub fn local_dirs(&self) -> &[PathBuf] {
        &self.local_dirs
    }

    /// Build a URL by appending a path segment, preserving query parameters
    fn build_url(base: &Url, path_segment: &str) -> std::result::Result<Url, String> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| format!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(path_segment);
        Ok(url)
    }

    /// Resolve the descriptor for a framework/provider pair
    pub async fn resolve(
        &self,
        framework: Framework,
        provider: Provider,
    ) -> Result<ResolvedDescriptor> {
        let filename = descriptor_file_name(framework, provider);
        let mut attempts = Vec::new();

        if let Some(base) = &self.remote {
            match self.fetch_remote(base, &filename).await {
                Ok(resolved) => return Ok(resolved),
                Err(reason) => {
                    tracing::debug!(%reason, "remote registry unavailable, trying local candidates");
                    attempts.push(reason);
                }
            }
        }

        for dir in &self.local_dirs {
            match Self::read_local(dir, &filename).await {
                Ok(resolved) => return Ok(resolved),
                Err(reason) => attempts.push(reason),
            }
        }

        Err(BillingError::RegistryUnavailable { filename, attempts })
    }

    async fn fetch_remote(
        &self,
        base: &Url,
        filename: &str,
    ) -> std::result::Result<ResolvedDescriptor, String> {
        let url = Self::build_url(base, filename)?;
        let client = self
            .client
            .as_ref()
            .map_err(|e| format!("{}: {}", url, e))?;
        tracing::debug!(%url, "fetching template descriptor");

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| format!("{}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("{}: HTTP {}", url, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("{}: {}", url, e))?;
        let descriptor =
            TemplateDescriptor::from_json(&body, url.as_str()).map_err(|e| e.to_string())?;

        Ok(ResolvedDescriptor {
            descriptor,
            origin: DescriptorOrigin::Remote(url),
        })
    }

    async fn read_local(
        dir: &Path,
        filename: &str,
    ) -> std::result::Result<ResolvedDescriptor, String> {
        let path = dir.join(filename);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(format!("{}: not found", path.display()));
            }
            Err(e) => return Err(format!("{}: {}", path.display(), e)),
        };

        match TemplateDescriptor::from_json(&raw, &path.display().to_string()) {
            Ok(descriptor) => {
                tracing::debug!(path = %path.display(), "using local template descriptor");
                Ok(ResolvedDescriptor {
                    descriptor,
                    origin: DescriptorOrigin::Local(path),
                })
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid local descriptor");
                Err(e.to_string())
            }
        }
    }
}

/// Local registry directories, in the order they are tried
///
/// Covers running from the project root, from a package two levels down in a
/// monorepo, and from a binary installed next to a `public/tr` checkout.
pub fn local_candidates(explicit: Option<&Path>, cwd: &Path, exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = explicit {
        candidates.push(dir.to_path_buf());
    }
    candidates.push(cwd.join("public").join("tr"));
    candidates.push(cwd.join("..").join("..").join("public").join("tr"));
    if let Some(exe_dir) = exe_dir {
        candidates.push(exe_dir.join("..").join("public").join("tr"));
        candidates.push(exe_dir.join("..").join("..").join("public").join("tr"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_appends_segment() {
        let base = Url::parse("https://billingsdk.com/tr").unwrap();
        let url = RegistryResolver::build_url(&base, "nextjs-paypal.json").unwrap();
        assert_eq!(url.as_str(), "https://billingsdk.com/tr/nextjs-paypal.json");
    }

    #[test]
    fn test_build_url_trailing_slash_and_query() {
        let base = Url::parse("https://example.com/registry/?ref=main").unwrap();
        let url = RegistryResolver::build_url(&base, "react-paypal.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/registry/react-paypal.json?ref=main"
        );
    }

    #[test]
    fn test_local_candidates_order() {
        let cwd = Path::new("/work/app");
        let candidates = local_candidates(
            Some(Path::new("/opt/registry")),
            cwd,
            Some(Path::new("/usr/local/bin")),
        );
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/registry"),
                PathBuf::from("/work/app/public/tr"),
                PathBuf::from("/work/app/../../public/tr"),
                PathBuf::from("/usr/local/bin/../public/tr"),
                PathBuf::from("/usr/local/bin/../../public/tr"),
            ]
        );
    }

    #[tokio::test]
    async fn test_client_build_failure_falls_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nextjs-paypal.json"),
            r#"{"files":[{"target":"lib/paypal.ts","content":"local"}]}"#,
        )
        .unwrap();
        let remote = Url::parse("https://billingsdk.com/tr").unwrap();

        // A newline is not a valid header value, so the client cannot be built
        let resolver = RegistryResolver::new(
            Some(remote),
            vec![dir.path().to_path_buf()],
            "billingsdk\nbroken",
            Duration::from_secs(5),
        );
        assert!(resolver.client.is_err());

        let resolved = resolver
            .resolve(Framework::Nextjs, Provider::Paypal)
            .await
            .unwrap();
        assert!(matches!(resolved.origin, DescriptorOrigin::Local(_)));
    }

    #[tokio::test]
    async fn test_client_build_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Url::parse("https://billingsdk.com/tr").unwrap();
        let resolver = RegistryResolver::new(
            Some(remote),
            vec![dir.path().to_path_buf()],
            "billingsdk\nbroken",
            Duration::from_secs(5),
        );

        match resolver.resolve(Framework::Express, Provider::Paypal).await {
            Err(BillingError::RegistryUnavailable { attempts, .. }) => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].contains("HTTP client unavailable"));
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.origin)),
        }
    }

    #[test]
    fn test_local_candidates_without_explicit() {
        let candidates = local_candidates(None, Path::new("/work/app"), None);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], PathBuf::from("/work/app/public/tr"));
    }

    #[test]
    fn test_origin_display() {
        let origin = DescriptorOrigin::Local(PathBuf::from("/tmp/tr/react-paypal.json"));
        assert_eq!(origin.to_string(), "/tmp/tr/react-paypal.json");
    }
}
