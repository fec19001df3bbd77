//! Permissive cross-origin policy.
//!
//! The shim answers every preflight affirmatively and stamps the same four
//! `Access-Control-*` headers on every response it produces or relays. There
//! is no origin check; this process only ever fronts local development.

use super::body::{empty, ProxyBody};
use super::headers::{
    ShimHeadersExt, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VALUE_TRUE,
};
use crate::config::CorsConfig;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};

/// Header values precomputed from [`CorsConfig`].
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
}

impl CorsPolicy {
    /// Build the policy. Fails only on values `ShimConfig::validate` would reject.
    pub fn from_config(config: &CorsConfig) -> Result<Self, anyhow::Error> {
        let allow_origin = HeaderValue::from_str(config.allow_origin.trim())
            .map_err(|e| anyhow::anyhow!("Invalid allow_origin: {e}"))?;
        let allow_methods = HeaderValue::from_str(&config.allow_methods.join(", "))
            .map_err(|e| anyhow::anyhow!("Invalid allow_methods: {e}"))?;
        let allow_headers = HeaderValue::from_str(&config.allow_headers.join(", "))
            .map_err(|e| anyhow::anyhow!("Invalid allow_headers: {e}"))?;

        Ok(Self {
            allow_origin,
            allow_methods,
            allow_headers,
            allow_credentials: config.allow_credentials,
        })
    }

    /// Set (overwriting) the cross-origin headers on a response.
    pub fn apply<B>(&self, response: &mut Response<B>) {
        response.set_header(&ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin);
        response.set_header(&ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods);
        response.set_header(&ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers);
        if self.allow_credentials {
            response.set_header(&ACCESS_CONTROL_ALLOW_CREDENTIALS, &VALUE_TRUE);
        } else {
            response
                .headers_mut()
                .remove(&ACCESS_CONTROL_ALLOW_CREDENTIALS);
        }
    }

    /// Answer to an `OPTIONS` request: 204, no body, cross-origin headers.
    ///
    /// Whatever the browser asked for in `Access-Control-Request-*` is ignored.
    pub fn preflight_response(&self) -> Response<ProxyBody> {
        let mut response = Response::new(empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply(&mut response);
        response
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS, PATCH"),
            allow_headers: HeaderValue::from_static(
                "Content-Type, Authorization, sender, channel, company, branch",
            ),
            allow_credentials: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_default_matches_default_config() {
        let from_config = CorsPolicy::from_config(&CorsConfig::default()).unwrap();
        let default = CorsPolicy::default();
        assert_eq!(from_config.allow_origin, default.allow_origin);
        assert_eq!(from_config.allow_methods, default.allow_methods);
        assert_eq!(from_config.allow_headers, default.allow_headers);
        assert_eq!(from_config.allow_credentials, default.allow_credentials);
    }

    #[tokio::test]
    async fn test_preflight_response() {
        let response = CorsPolicy::default().preflight_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let headers = response.headers();
        assert_eq!(headers.get(&ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(&ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS, PATCH"
        );
        assert_eq!(
            headers.get(&ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type, Authorization, sender, channel, company, branch"
        );
        assert_eq!(headers.get(&ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_apply_overwrites_upstream_values() {
        let mut response = Response::new(());
        response.headers_mut().insert(
            ACCESS_CONTROL_ALLOW_ORIGIN.clone(),
            HeaderValue::from_static("https://portal.example"),
        );
        response.headers_mut().append(
            ACCESS_CONTROL_ALLOW_ORIGIN.clone(),
            HeaderValue::from_static("https://other.example"),
        );

        CorsPolicy::default().apply(&mut response);

        let origins: Vec<_> = response
            .headers()
            .get_all(&ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .collect();
        assert_eq!(origins, vec!["*"]);
    }

    #[test]
    fn test_credentials_disabled() {
        let config = CorsConfig {
            allow_origin: "http://localhost:5173".to_string(),
            allow_credentials: false,
            ..Default::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();

        let mut response = Response::new(());
        response.headers_mut().insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS.clone(),
            HeaderValue::from_static("true"),
        );
        policy.apply(&mut response);

        assert_eq!(
            response.headers().get(&ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert!(response
            .headers()
            .get(&ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }
}
