//! Configuration types for the portal dev proxy.

mod cors;
mod listen;
mod upstream;

use std::path::Path;

use hyper::header::{HeaderName, HeaderValue};
use hyper::Method;
use serde::{Deserialize, Serialize};

pub use cors::CorsConfig;
pub use listen::ListenConfig;
pub use upstream::UpstreamConfig;

/// Process-wide configuration. Built once at startup and never mutated;
/// request handling receives it behind an `Arc`.
///
/// Every section has defaults, so an empty YAML document (or no file at all)
/// yields the stock setup: listen on port 3001, forward `/api` to the sandbox.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl ShimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {e}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        // serde_yaml rejects an empty document; treat it as "all defaults"
        let config: ShimConfig = if contents.trim().is_empty() {
            ShimConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.upstream.origin_uri().map_err(|e| anyhow::anyhow!(e))?;

        let prefix = &self.upstream.path_prefix;
        if !prefix.starts_with('/') {
            anyhow::bail!("Proxied path prefix must start with '/': '{prefix}'");
        }

        if self.upstream.timeout_secs == Some(0) {
            anyhow::bail!("upstream.timeout_secs must be at least 1; omit it to wait indefinitely");
        }

        if HeaderValue::from_str(&self.cors.allow_origin).is_err() {
            anyhow::bail!(
                "Invalid cors.allow_origin value: '{}'",
                self.cors.allow_origin
            );
        }

        for method in &self.cors.allow_methods {
            Method::from_bytes(method.as_bytes())
                .map_err(|_| anyhow::anyhow!("Invalid HTTP method in cors.allow_methods: '{method}'"))?;
        }

        for header in &self.cors.allow_headers {
            HeaderName::from_bytes(header.as_bytes())
                .map_err(|_| anyhow::anyhow!("Invalid header name in cors.allow_headers: '{header}'"))?;
        }

        Ok(())
    }

    /// Prefix with any trailing slash removed, so `/api/` and `/api` mount the same way.
    pub fn normalized_prefix(&self) -> &str {
        let trimmed = self.upstream.path_prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            "/"
        } else {
            trimmed
        }
    }
}
