//! Command-line arguments.
//!
//! With no arguments the shim runs on its built-in defaults. A YAML file and
//! individual flags (or their environment variables) override them, in that order.

use crate::config::ShimConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "portal-dev-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "PORTAL_PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORTAL_PROXY_PORT")]
    pub port: Option<u16>,

    /// Upstream origin, e.g. https://sandbox.remitapi.dev
    #[arg(short, long, env = "PORTAL_PROXY_TARGET")]
    pub target: Option<String>,

    /// Path prefix that is forwarded upstream
    #[arg(long, env = "PORTAL_PROXY_PREFIX")]
    pub prefix: Option<String>,

    /// Give up on the upstream after this many seconds (waits forever when unset)
    #[arg(long, env = "PORTAL_PROXY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then file, then flags.
    pub fn load_config(&self) -> Result<ShimConfig, anyhow::Error> {
        let mut config = match &self.config {
            Some(path) => ShimConfig::from_file(path)?,
            None => ShimConfig::default(),
        };

        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(ref target) = self.target {
            config.upstream.origin = target.clone();
        }
        if let Some(ref prefix) = self.prefix {
            config.upstream.path_prefix = prefix.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.upstream.timeout_secs = Some(timeout_secs);
        }

        config.validate()?;
        Ok(config)
    }
}
