//! Safe header insertion helpers and hop-by-hop filtering.
//!
//! Static header names avoid runtime `.parse().unwrap()` calls at the call
//! sites that decorate responses.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::Response;

pub static ACCESS_CONTROL_ALLOW_ORIGIN: HeaderName =
    HeaderName::from_static("access-control-allow-origin");
pub static ACCESS_CONTROL_ALLOW_METHODS: HeaderName =
    HeaderName::from_static("access-control-allow-methods");
pub static ACCESS_CONTROL_ALLOW_HEADERS: HeaderName =
    HeaderName::from_static("access-control-allow-headers");
pub static ACCESS_CONTROL_ALLOW_CREDENTIALS: HeaderName =
    HeaderName::from_static("access-control-allow-credentials");

pub static CONTENT_TYPE_JSON: HeaderValue = HeaderValue::from_static("application/json");
pub static CONTENT_TYPE_HTML: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
pub static VALUE_TRUE: HeaderValue = HeaderValue::from_static("true");

/// Connection-scoped headers (RFC 9110 §7.6.1). They describe one transport
/// hop and are never relayed in either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any extra names listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(hyper::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(&name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Extension trait for inserting headers into responses.
pub trait ShimHeadersExt {
    /// Insert a header with a static name and value, replacing any existing values.
    /// Accepts references; cloning is cheap for `from_static` headers.
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue);
}

impl<B> ShimHeadersExt for Response<B> {
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        self.headers_mut().insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;

    #[test]
    fn test_static_header_names() {
        assert_eq!(
            ACCESS_CONTROL_ALLOW_ORIGIN.as_str(),
            "access-control-allow-origin"
        );
        assert_eq!(
            ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str(),
            "access-control-allow-credentials"
        );
    }

    #[test]
    fn test_set_header_overwrites() {
        let mut response = Response::new(Full::new(Bytes::new()));
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN.clone(), HeaderValue::from_static("https://a.example"));
        response.set_header(&ACCESS_CONTROL_ALLOW_ORIGIN, &HeaderValue::from_static("*"));
        let values: Vec<_> = response
            .headers()
            .get_all(&ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .collect();
        assert_eq!(values, vec!["*"]);
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, x-session-hint"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("x-session-hint", HeaderValue::from_static("abc"));
        headers.insert("authorization", HeaderValue::from_static("Bearer t"));
        headers.insert("sender", HeaderValue::from_static("portal"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("connection").is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert!(headers.get("x-session-hint").is_none());
        assert_eq!(headers.get("authorization").unwrap(), "Bearer t");
        assert_eq!(headers.get("sender").unwrap(), "portal");
    }
}
