//! Upstream (sandbox API) configuration.

use hyper::Uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Absolute origin every proxied request is sent to, e.g. `https://sandbox.remitapi.dev`
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Requests whose path is mounted under this prefix are forwarded
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Bound on the wait for upstream response headers. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Skip TLS certificate verification (for self-signed sandbox certs)
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl UpstreamConfig {
    /// Parse the origin into a URI, checking it is absolute http(s) with an authority.
    pub fn origin_uri(&self) -> Result<Uri, String> {
        let uri: Uri = self
            .origin
            .parse()
            .map_err(|e| format!("Invalid upstream origin '{}': {e}", self.origin))?;

        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            Some(other) => {
                return Err(format!(
                    "Unsupported upstream scheme '{other}' in '{}'. Currently supported: http, https",
                    self.origin
                ))
            }
            None => {
                return Err(format!(
                    "Invalid upstream origin '{}' (missing scheme)",
                    self.origin
                ))
            }
        }

        if uri.authority().is_none() {
            return Err(format!(
                "Invalid upstream origin '{}' (missing host)",
                self.origin
            ));
        }

        Ok(uri)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_origin() -> String {
    "https://sandbox.remitapi.dev".to_string()
}

fn default_path_prefix() -> String {
    "/api".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            path_prefix: default_path_prefix(),
            timeout_secs: None,
            tls_skip_verify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origin(origin: &str) -> UpstreamConfig {
        UpstreamConfig {
            origin: origin.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_origin_parses() {
        let uri = UpstreamConfig::default().origin_uri().unwrap();
        assert_eq!(uri.scheme_str(), Some("https"));
        assert_eq!(uri.host(), Some("sandbox.remitapi.dev"));
    }

    #[test]
    fn test_origin_with_port() {
        let uri = with_origin("http://127.0.0.1:8080").origin_uri().unwrap();
        assert_eq!(uri.authority().unwrap().as_str(), "127.0.0.1:8080");
    }

    #[test]
    fn test_origin_missing_scheme() {
        let err = with_origin("/relative/path").origin_uri().unwrap_err();
        assert!(err.contains("missing scheme"));
    }

    #[test]
    fn test_origin_unsupported_scheme() {
        let err = with_origin("ftp://example.com").origin_uri().unwrap_err();
        assert!(err.contains("Unsupported upstream scheme"));
    }

    #[test]
    fn test_timeout_unset_by_default() {
        assert_eq!(UpstreamConfig::default().timeout(), None);
        let config = UpstreamConfig {
            timeout_secs: Some(30),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }
}
