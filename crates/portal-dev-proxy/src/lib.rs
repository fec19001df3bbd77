//! Local development relay for the remittance developer portal.
//!
//! Forwards `/api/*` from the front-end dev server to the sandbox API,
//! answers CORS preflights, and stamps permissive cross-origin headers on
//! every response. Not meant to carry production traffic.

pub mod cli;
pub mod config;
pub mod error;
pub mod proxy;

pub use config::ShimConfig;
pub use error::ForwardError;
pub use proxy::ShimServer;
