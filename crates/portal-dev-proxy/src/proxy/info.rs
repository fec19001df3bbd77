//! Informational endpoints (`/`, `/health`) and the not-found page.

use super::body::{ProxyBody, ResponseExt};
use super::headers::{CONTENT_TYPE_HTML, CONTENT_TYPE_JSON};
use crate::config::ShimConfig;
use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Response, StatusCode};

pub const SERVICE_NAME: &str = "Remittance API Sandbox CORS Proxy";

/// Serialize `value` as the body of a JSON response.
pub fn json_response(status: StatusCode, value: &serde_json::Value) -> Response<ProxyBody> {
    let mut response = Response::new(Full::new(Bytes::from(value.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, CONTENT_TYPE_JSON.clone());
    response.into_boxed()
}

/// GET / - service description
pub fn handle_root(config: &ShimConfig) -> Response<ProxyBody> {
    let prefix = config.normalized_prefix();
    let api_pattern = if prefix == "/" {
        "/*".to_string()
    } else {
        format!("{prefix}/*")
    };
    let body = serde_json::json!({
        "service": SERVICE_NAME,
        "status": "running",
        "port": config.listen.port,
        "target": config.upstream.origin,
        "endpoints": {
            "health": "/health",
            "api": api_pattern,
        }
    });
    json_response(StatusCode::OK, &body)
}

/// GET /health - liveness probe
pub fn handle_health(config: &ShimConfig) -> Response<ProxyBody> {
    let body = serde_json::json!({
        "status": "ok",
        "proxy": "running",
        "port": config.listen.port,
        "target": config.upstream.origin,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    json_response(StatusCode::OK, &body)
}

/// 404 page in the shape browsers and the portal's dev tooling already expect.
pub fn not_found(method: &Method, path: &str) -> Response<ProxyBody> {
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Error</title>\n</head>\n<body>\n<pre>Cannot {} {}</pre>\n</body>\n</html>\n",
        method,
        escape_html(path)
    );
    let mut response = Response::new(Full::new(Bytes::from(html)));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, CONTENT_TYPE_HTML.clone());
    response.into_boxed()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
