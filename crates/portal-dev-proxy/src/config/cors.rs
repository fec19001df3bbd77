//! Cross-origin header configuration.

use serde::{Deserialize, Serialize};

/// Values for the four `Access-Control-*` headers the shim writes.
///
/// The defaults combine a wildcard origin with `allow_credentials: true`,
/// a pair browsers refuse for credentialed requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
    #[serde(default = "default_allow_methods")]
    pub allow_methods: Vec<String>,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

impl CorsConfig {
    /// True when the configured pair is one browsers reject for credentialed requests.
    pub fn has_credentialed_wildcard(&self) -> bool {
        self.allow_origin.trim() == "*" && self.allow_credentials
    }
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allow_headers() -> Vec<String> {
    [
        "Content-Type",
        "Authorization",
        "sender",
        "channel",
        "company",
        "branch",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_allow_credentials() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            allow_credentials: default_allow_credentials(),
        }
    }
}
