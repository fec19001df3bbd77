//! Customization points around a single forwarding attempt.
//!
//! [`Relay`](super::forwarding::Relay) calls these three hooks in order:
//! `before_forward` on the built outbound request, then either
//! `after_forward` on the upstream response or `on_failure` to synthesize one.

use super::body::ProxyBody;
use super::cors::CorsPolicy;
use super::info::json_response;
use crate::error::ForwardError;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{error, info};

/// What the hooks get to know about the inbound request once it has been consumed.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub method: Method,
    /// Path plus query, as received
    pub path: String,
}

impl RequestSummary {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
        }
    }
}

pub trait ForwardHooks: Send + Sync {
    /// Observe the outbound request just before it is handed to the upstream.
    fn before_forward(&self, outbound: &Request<ProxyBody>, inbound: &RequestSummary);

    /// Decorate the upstream response before it is relayed to the caller.
    fn after_forward(&self, inbound: &RequestSummary, response: &mut Response<ProxyBody>);

    /// Produce the response the caller sees when forwarding failed.
    fn on_failure(&self, inbound: &RequestSummary, err: &ForwardError) -> Response<ProxyBody>;
}

/// Default hooks: log both legs to stdout, stamp cross-origin headers, and
/// answer failures with the `Proxy Error` JSON envelope.
pub struct CorsLoggingHooks {
    cors: Arc<CorsPolicy>,
    target: String,
}

impl CorsLoggingHooks {
    pub fn new(cors: Arc<CorsPolicy>, target: impl Into<String>) -> Self {
        Self {
            cors,
            target: target.into(),
        }
    }
}

impl ForwardHooks for CorsLoggingHooks {
    fn before_forward(&self, outbound: &Request<ProxyBody>, inbound: &RequestSummary) {
        info!(
            method = %inbound.method,
            path = %inbound.path,
            target = %outbound.uri(),
            headers = ?header_pairs(outbound.headers()),
            "Proxying request"
        );
    }

    fn after_forward(&self, inbound: &RequestSummary, response: &mut Response<ProxyBody>) {
        info!(
            status = response.status().as_u16(),
            path = %inbound.path,
            headers = ?header_pairs(response.headers()),
            "Received upstream response"
        );
        self.cors.apply(response);
    }

    fn on_failure(&self, inbound: &RequestSummary, err: &ForwardError) -> Response<ProxyBody> {
        error!(
            method = %inbound.method,
            path = %inbound.path,
            target = %self.target,
            kind = err.kind(),
            "Proxy error: {}",
            err
        );
        let mut response = proxy_error_response(&err.to_string(), &self.target);
        self.cors.apply(&mut response);
        response
    }
}

/// 500 with `{"error": "Proxy Error", "message": ..., "target": ...}`.
pub fn proxy_error_response(message: &str, target: &str) -> Response<ProxyBody> {
    let body = serde_json::json!({
        "error": "Proxy Error",
        "message": message,
        "target": target,
    });
    json_response(StatusCode::INTERNAL_SERVER_ERROR, &body)
}

/// Render a header map for logging; non-UTF-8 values show as `<binary>`.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::body::full;
    use crate::proxy::headers::ACCESS_CONTROL_ALLOW_ORIGIN;
    use http_body_util::BodyExt;

    fn hooks() -> CorsLoggingHooks {
        CorsLoggingHooks::new(Arc::new(CorsPolicy::default()), "https://sandbox.remitapi.dev")
    }

    fn summary() -> RequestSummary {
        RequestSummary {
            method: Method::POST,
            path: "/api/transfers?dry_run=1".to_string(),
        }
    }

    #[test]
    fn test_summary_from_request_keeps_query() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/rates?from=USD&to=NPR")
            .body(())
            .unwrap();
        let summary = RequestSummary::from_request(&req);
        assert_eq!(summary.method, Method::GET);
        assert_eq!(summary.path, "/api/rates?from=USD&to=NPR");
    }

    #[test]
    fn test_after_forward_adds_cors() {
        let mut response = Response::new(full("{}"));
        hooks().after_forward(&summary(), &mut response);
        assert_eq!(
            response.headers().get(&ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_on_failure_envelope() {
        let err = ForwardError::Upstream("connect ECONNREFUSED".to_string());
        let response = hooks().on_failure(&summary(), &err);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(&ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Proxy Error");
        assert_eq!(body["message"], "connect ECONNREFUSED");
        assert_eq!(body["target"], "https://sandbox.remitapi.dev");
    }

    #[test]
    fn test_header_pairs_binary_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-raw",
            hyper::header::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        headers.insert("sender", hyper::header::HeaderValue::from_static("portal"));
        let pairs = header_pairs(&headers);
        assert!(pairs.contains(&("x-raw".to_string(), "<binary>".to_string())));
        assert!(pairs.contains(&("sender".to_string(), "portal".to_string())));
    }
}
