//! Client configuration
//!
//! The backend origin comes from a single environment-style setting read at
//! boot. Validation policy and timeout are fixed configuration and are never
//! negotiated with the backend.

use crate::error::{OcrClientError, Result};
use std::time::Duration;
use url::Url;

/// Environment variable holding the backend origin
pub const BASE_URL_ENV: &str = "OCR_API_BASE_URL";

/// Backend origin used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Wall-clock bound for one submission, measured from request start
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Largest accepted upload (16 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 16 * 1024 * 1024;

/// Image extensions the backend accepts
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

/// Static file acceptance policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: u64,
}

impl ValidationPolicy {
    /// Create a policy; extensions are stored lowercased and without a leading dot
    pub fn new<I, S>(allowed_extensions: I, max_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = Vec::new();
        for ext in allowed_extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }

        Self {
            allowed_extensions: extensions,
            max_bytes,
        }
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Case-insensitive membership check
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == extension)
    }

    /// Maximum size expressed in whole megabytes, for messages
    pub fn max_megabytes(&self) -> u64 {
        self.max_bytes / (1024 * 1024)
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_BYTES)
    }
}

/// Configuration shared by the transport and the workflow controller
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub policy: ValidationPolicy,
}

impl ClientConfig {
    /// Configuration for the given backend origin with default policy and timeout
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ClientConfigBuilder::new().base_url(base_url.as_ref()).build()
    }

    /// Read the backend origin from `OCR_API_BASE_URL`, falling back to the loopback default
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Resolve an API path against the backend origin, keeping any path prefix
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Origin as shown to users (without the trailing slash added for joining)
    pub fn display_url(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    policy: Option<ValidationPolicy>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let base_url = normalize_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(OcrClientError::invalid_config("timeout must be greater than zero"));
        }

        let policy = self.policy.unwrap_or_default();
        if policy.allowed_extensions().is_empty() {
            return Err(OcrClientError::invalid_config(
                "at least one allowed extension is required",
            ));
        }

        Ok(ClientConfig {
            base_url,
            timeout,
            policy,
        })
    }
}

/// Parse the origin and make sure its path ends with `/` so joins append
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(OcrClientError::invalid_config(format!(
                "unsupported URL scheme '{other}', expected http or https"
            )))
        }
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
