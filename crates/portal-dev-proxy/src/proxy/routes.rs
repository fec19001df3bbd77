//! Route classification for inbound requests.

use hyper::Method;

/// Where an inbound request goes. Evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `OPTIONS` on any path
    Preflight,
    /// `GET /`
    Root,
    /// `GET /health`
    Health,
    /// Path mounted under the proxied prefix
    Proxy,
    /// Anything else
    NotFound,
}

impl Route {
    pub fn classify(method: &Method, path: &str, prefix: &str) -> Self {
        if *method == Method::OPTIONS {
            return Route::Preflight;
        }

        let readable = *method == Method::GET || *method == Method::HEAD;
        match path {
            "/" if readable => return Route::Root,
            "/health" if readable => return Route::Health,
            _ => {}
        }

        if is_under_prefix(path, prefix) {
            Route::Proxy
        } else {
            Route::NotFound
        }
    }
}

/// Mount-style prefix match: `/api` covers `/api` and `/api/...` but not `/apiary`.
pub fn is_under_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_is_preflight_everywhere() {
        for path in ["/", "/health", "/api/transfers", "/nowhere"] {
            assert_eq!(
                Route::classify(&Method::OPTIONS, path, "/api"),
                Route::Preflight,
                "path {path}"
            );
        }
    }

    #[test]
    fn test_info_endpoints() {
        assert_eq!(Route::classify(&Method::GET, "/", "/api"), Route::Root);
        assert_eq!(Route::classify(&Method::HEAD, "/", "/api"), Route::Root);
        assert_eq!(
            Route::classify(&Method::GET, "/health", "/api"),
            Route::Health
        );
    }

    #[test]
    fn test_info_endpoints_are_get_only() {
        assert_eq!(Route::classify(&Method::POST, "/", "/api"), Route::NotFound);
        assert_eq!(
            Route::classify(&Method::DELETE, "/health", "/api"),
            Route::NotFound
        );
    }

    #[test]
    fn test_proxy_prefix_any_method() {
        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ] {
            assert_eq!(
                Route::classify(&method, "/api/v1/quotes", "/api"),
                Route::Proxy
            );
        }
        assert_eq!(Route::classify(&Method::GET, "/api", "/api"), Route::Proxy);
    }

    #[test]
    fn test_prefix_is_segment_aligned() {
        assert!(is_under_prefix("/api", "/api"));
        assert!(is_under_prefix("/api/", "/api"));
        assert!(is_under_prefix("/api/send-money", "/api"));
        assert!(!is_under_prefix("/apiary", "/api"));
        assert!(!is_under_prefix("/v1/api", "/api"));
        assert!(is_under_prefix("/anything", "/"));
    }

    #[test]
    fn test_unmatched_paths() {
        assert_eq!(
            Route::classify(&Method::GET, "/healthz", "/api"),
            Route::NotFound
        );
        assert_eq!(
            Route::classify(&Method::GET, "/static/app.js", "/api"),
            Route::NotFound
        );
    }
}
