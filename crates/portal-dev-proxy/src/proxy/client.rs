//! Upstream abstraction and the hyper-util client behind it.
//!
//! [`Relay`](super::forwarding::Relay) only talks to an [`Upstream`], so tests
//! can swap the network for an in-memory fake.

use super::body::ProxyBody;
use super::tls::NoVerifier;
use crate::config::UpstreamConfig;
use crate::error::ForwardError;
use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::http::uri::Scheme;
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use tracing::{info, warn};

/// Something that can answer a fully built outbound request.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send one request. Resolves once response headers are in; the body streams afterwards.
    async fn send(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, ForwardError>;
}

/// Type alias for the HTTP client used by the shim.
pub type HttpClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, ProxyBody>;

/// Create the HTTP(S) client used for forwarding.
///
/// No connect timeout is set on purpose: the only bound on an upstream
/// exchange is `upstream.timeout_secs`, and it is off unless configured.
pub fn create_http_client(config: &UpstreamConfig) -> Result<HttpClient, anyhow::Error> {
    let mut http_connector = HttpConnector::new();
    http_connector.enforce_http(false); // Allow both HTTP and HTTPS

    let https_connector = if config.tls_skip_verify {
        warn!("TLS certificate verification DISABLED for the upstream (development only)");
        hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(
                rustls::ClientConfig::builder()
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(NoVerifier))
                    .with_no_client_auth(),
            )
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector)
    } else {
        let plain_http = config
            .origin_uri()
            .map(|uri| uri.scheme() == Some(&Scheme::HTTP))
            .unwrap_or(false);
        let builder = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder,
            // A plain-http upstream (local mock sandbox) never needs a root store
            Err(e) if plain_http => {
                warn!("No native root certificates available ({e}); HTTPS upstreams will fail");
                hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(
                    rustls::ClientConfig::builder()
                        .with_root_certificates(rustls::RootCertStore::empty())
                        .with_no_client_auth(),
                )
            }
            Err(e) => anyhow::bail!("Failed to load native root certificates: {e}"),
        };
        builder.https_or_http().enable_http1().wrap_connector(http_connector)
    };

    let http_client = Client::builder(TokioExecutor::new()).build(https_connector);

    info!(
        "Upstream client configured (HTTP/1.1): tls_skip_verify={}",
        config.tls_skip_verify
    );

    Ok(http_client)
}

/// [`Upstream`] backed by the pooled hyper-util client.
#[derive(Clone)]
pub struct HyperUpstream {
    client: HttpClient,
}

impl HyperUpstream {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, anyhow::Error> {
        Ok(Self::new(create_http_client(config)?))
    }
}

#[async_trait]
impl Upstream for HyperUpstream {
    async fn send(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, ForwardError> {
        let response = self
            .client
            .request(req)
            .await
            .map_err(ForwardError::upstream)?;
        Ok(response.map(|body| body.boxed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(origin: &str) -> UpstreamConfig {
        UpstreamConfig {
            origin: origin.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_plain_http_origin_builds_client() {
        assert!(create_http_client(&config("http://127.0.0.1:9000")).is_ok());
        assert!(create_http_client(&config("HTTP://127.0.0.1:9000")).is_ok());
    }

    #[tokio::test]
    async fn test_skip_verify_builds_client_without_roots() {
        let config = UpstreamConfig {
            tls_skip_verify: true,
            ..config("https://sandbox.remitapi.dev")
        };
        assert!(create_http_client(&config).is_ok());
    }
}
