//! ShimServer struct and main accept loop.
//!
//! One tokio task per accepted connection, each driven by hyper's HTTP/1
//! connection handler. The shared [`ShimContext`] is read-only.

use super::client::{HyperUpstream, Upstream};
use super::cors::CorsPolicy;
use super::forwarding::Relay;
use super::handler::{handle_request, ShimContext};
use super::hooks::{CorsLoggingHooks, ForwardHooks};
use super::network::create_listener;
use crate::config::ShimConfig;
use http_body_util::BodyExt;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Pause after a failed `accept`. Errors such as EMFILE repeat until a
/// connection closes, so retrying immediately would spin.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The forwarding shim.
pub struct ShimServer {
    ctx: Arc<ShimContext>,
}

impl ShimServer {
    /// Create a server that forwards through the real HTTP(S) client.
    pub fn new(config: ShimConfig) -> Result<Self, anyhow::Error> {
        let upstream = HyperUpstream::from_config(&config.upstream)?;
        Self::with_upstream(config, Arc::new(upstream))
    }

    /// Create a server around any [`Upstream`] with the default logging/CORS hooks.
    pub fn with_upstream(
        config: ShimConfig,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, anyhow::Error> {
        let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let hooks = Arc::new(CorsLoggingHooks::new(
            Arc::clone(&cors),
            config.upstream.origin.clone(),
        ));
        Self::with_parts(config, cors, upstream, hooks)
    }

    /// Create a server from explicit parts.
    pub fn with_parts(
        config: ShimConfig,
        cors: Arc<CorsPolicy>,
        upstream: Arc<dyn Upstream>,
        hooks: Arc<dyn ForwardHooks>,
    ) -> Result<Self, anyhow::Error> {
        config.validate()?;
        let origin = config
            .upstream
            .origin_uri()
            .map_err(|e| anyhow::anyhow!(e))?;

        if config.cors.has_credentialed_wildcard() {
            warn!(
                "CORS is configured with Access-Control-Allow-Origin '*' and \
                 Access-Control-Allow-Credentials 'true'; browsers ignore credentials \
                 for wildcard origins"
            );
        }

        let relay = Relay::new(origin, upstream, hooks).with_timeout(config.upstream.timeout());

        Ok(Self {
            ctx: Arc::new(ShimContext {
                config: Arc::new(config),
                cors,
                relay,
            }),
        })
    }

    pub fn context(&self) -> &ShimContext {
        &self.ctx
    }

    /// Bind the configured address and serve forever.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.ctx.config.listen.socket_addr();
        let listener = create_listener(addr)
            .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        let local_addr = listener.local_addr()?;
        self.log_banner(local_addr);

        loop {
            let (stream, remote_addr) = accept_with_backoff(|| listener.accept()).await;
            let ctx = Arc::clone(&self.ctx);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let ctx = Arc::clone(&ctx);
                    async move { handle_request(&ctx, req.map(|body| body.boxed())).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }

    fn log_banner(&self, local_addr: SocketAddr) {
        let config = &self.ctx.config;
        info!("CORS proxy listening on http://{}", local_addr);
        info!(
            "Proxying {}/* to {}",
            config.normalized_prefix().trim_end_matches('/'),
            self.ctx.relay.origin()
        );
        info!("Health check: http://{}/health", local_addr);
        match config.upstream.timeout() {
            Some(timeout) => info!("Upstream timeout: {:?}", timeout),
            None => info!("Upstream timeout: none"),
        }
    }
}

/// Retry `accept` until it yields a connection, sleeping [`ACCEPT_ERROR_BACKOFF`]
/// after each failure.
pub async fn accept_with_backoff<F, Fut, T>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(err) => {
                error!("Failed to accept connection: {}", err);
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}
