//! Per-request dispatch.
//!
//! `Received -> {Preflight | Info endpoint | Proxy prefix | Unmatched} -> Responding`.
//! Nothing here keeps state between requests.

use super::body::ProxyBody;
use super::cors::CorsPolicy;
use super::forwarding::Relay;
use super::info::{handle_health, handle_root, not_found};
use super::routes::Route;
use crate::config::ShimConfig;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Read-only state shared by every connection.
pub struct ShimContext {
    pub config: Arc<ShimConfig>,
    pub cors: Arc<CorsPolicy>,
    pub relay: Relay,
}

/// Handle one inbound request. Errors are always rendered as responses.
pub async fn handle_request(
    ctx: &ShimContext,
    req: Request<ProxyBody>,
) -> Result<Response<ProxyBody>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let route = Route::classify(&method, &path, ctx.config.normalized_prefix());
    debug!("Received request: {} {} -> {:?}", method, req.uri(), route);

    let response = match route {
        Route::Preflight => ctx.cors.preflight_response(),
        Route::Proxy => return Ok(ctx.relay.forward(req).await),
        Route::Root => with_cors(ctx, handle_root(&ctx.config)),
        Route::Health => with_cors(ctx, handle_health(&ctx.config)),
        Route::NotFound => with_cors(ctx, not_found(&method, &path)),
    };

    Ok(response)
}

fn with_cors(ctx: &ShimContext, mut response: Response<ProxyBody>) -> Response<ProxyBody> {
    ctx.cors.apply(&mut response);
    response
}
