//! Request forwarding to the upstream origin.
//!
//! One inbound request becomes exactly one outbound request: same method,
//! same end-to-end headers, same streamed body, `Host` pointed at the
//! upstream. There are no retries.

use super::body::ProxyBody;
use super::client::Upstream;
use super::headers::strip_hop_by_hop;
use super::hooks::{ForwardHooks, RequestSummary};
use crate::error::ForwardError;
use hyper::header::{HeaderValue, HOST};
use hyper::{Request, Response, Uri};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Owns the upstream and the hooks, and runs a single forwarding attempt per call.
pub struct Relay {
    origin: Uri,
    upstream: Arc<dyn Upstream>,
    hooks: Arc<dyn ForwardHooks>,
    timeout: Option<Duration>,
}

impl Relay {
    pub fn new(origin: Uri, upstream: Arc<dyn Upstream>, hooks: Arc<dyn ForwardHooks>) -> Self {
        Self {
            origin,
            upstream,
            hooks,
            timeout: None,
        }
    }

    /// Bound the wait for upstream response headers. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn origin(&self) -> &Uri {
        &self.origin
    }

    /// Forward `req` and return whatever the caller should see.
    ///
    /// Never fails: every [`ForwardError`] is handed to `on_failure`.
    pub async fn forward(&self, req: Request<ProxyBody>) -> Response<ProxyBody> {
        let summary = RequestSummary::from_request(&req);

        let outbound = match build_outbound_request(&self.origin, req) {
            Ok(outbound) => outbound,
            Err(err) => return self.hooks.on_failure(&summary, &err),
        };

        self.hooks.before_forward(&outbound, &summary);

        let result = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.upstream.send(outbound)).await {
                    Ok(result) => result,
                    Err(_) => Err(ForwardError::Timeout(limit)),
                }
            }
            None => self.upstream.send(outbound).await,
        };

        match result {
            Ok(mut response) => {
                strip_hop_by_hop(response.headers_mut());
                self.hooks.after_forward(&summary, &mut response);
                response
            }
            Err(err) => self.hooks.on_failure(&summary, &err),
        }
    }
}

/// Turn an inbound request into the request sent upstream.
pub fn build_outbound_request(
    origin: &Uri,
    req: Request<ProxyBody>,
) -> Result<Request<ProxyBody>, ForwardError> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let target = target_uri(origin, path_and_query)?;
    let host = host_header(origin)?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.insert(HOST, host);

    debug!("Forwarding to: {}", target);

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(target)
        .body(body)?;
    *outbound.headers_mut() = headers;
    Ok(outbound)
}

/// `origin` + inbound path and query. A path on the origin is kept as a base.
pub fn target_uri(origin: &Uri, path_and_query: &str) -> Result<Uri, ForwardError> {
    let scheme = origin.scheme_str().unwrap_or("http");
    let authority = origin
        .authority()
        .ok_or_else(|| ForwardError::InvalidRequest(format!("Upstream origin '{origin}' has no host")))?;
    let base = origin.path().trim_end_matches('/');

    format!("{scheme}://{authority}{base}{path_and_query}")
        .parse::<Uri>()
        .map_err(|e| ForwardError::InvalidRequest(format!("Invalid upstream URI: {e}")))
}

/// `Host` value for the upstream: hostname, plus the port when the origin names one.
fn host_header(origin: &Uri) -> Result<HeaderValue, ForwardError> {
    let authority = origin
        .authority()
        .ok_or_else(|| ForwardError::InvalidRequest(format!("Upstream origin '{origin}' has no host")))?;
    let host = match authority.port_u16() {
        Some(port) => format!("{}:{}", authority.host(), port),
        None => authority.host().to_string(),
    };
    HeaderValue::from_str(&host)
        .map_err(|e| ForwardError::InvalidRequest(format!("Invalid Host header '{host}': {e}")))
}
