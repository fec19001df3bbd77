//! Forwarding shim.
//!
//! # Module Structure
//!
//! - `server` - ShimServer struct and accept loop
//! - `handler` - per-request dispatch
//! - `routes` - route classification
//! - `forwarding` - outbound request construction and the forwarding attempt
//! - `hooks` - before/after/failure hooks around a forwarding attempt
//! - `client` - `Upstream` trait and the hyper-util client
//! - `cors` - cross-origin headers and preflight answers
//! - `info` - `/` and `/health` endpoints, not-found page
//! - `headers` - static header names and hop-by-hop filtering
//! - `network` - listener creation
//! - `tls` - certificate verification bypass for self-signed sandboxes

mod body;
mod client;
mod cors;
mod forwarding;
mod handler;
mod headers;
mod hooks;
mod info;
mod network;
mod routes;
mod server;
mod tls;


pub use body::{empty, full, ProxyBody};
pub use client::{HyperUpstream, Upstream};
pub use cors::CorsPolicy;
pub use forwarding::{build_outbound_request, Relay};
pub use handler::{handle_request, ShimContext};
pub use hooks::{proxy_error_response, CorsLoggingHooks, ForwardHooks, RequestSummary};
pub use info::SERVICE_NAME;
pub use routes::Route;
pub use server::ShimServer;
