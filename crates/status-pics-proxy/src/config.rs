//! Command-line configuration

use crate::error::Result;
use clap::{ArgAction, Parser};
use http_cat_client::HttpCatClient;
use std::path::PathBuf;
use std::time::Duration;

/// Default cap on PUT bodies (50 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Serve HTTP status code images from a local cache with a remote fallback
#[derive(Parser, Debug)]
#[command(name = "status-pics-proxy")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Address to bind
    #[arg(short = 'h', long, env = "STATUS_PICS_HOST")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "STATUS_PICS_PORT")]
    pub port: u16,

    /// Cache directory, created if missing
    #[arg(short, long, env = "STATUS_PICS_CACHE")]
    pub cache: PathBuf,

    /// Base URL of the remote image source, fetched as <URL>/<code>
    #[arg(long, env = "STATUS_PICS_SOURCE_URL", default_value = HttpCatClient::DEFAULT_BASE_URL)]
    pub source_url: String,

    /// Timeout for remote image requests, in seconds
    #[arg(long, env = "STATUS_PICS_SOURCE_TIMEOUT_SECS", default_value_t = 30)]
    pub source_timeout_secs: u64,

    /// Largest accepted PUT body, in bytes
    #[arg(long, env = "STATUS_PICS_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Print help (`-h` is taken by --host)
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// Process configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Absolute path of the cache root
    pub cache_dir: PathBuf,
    pub source_url: String,
    pub source_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Cli {
    /// Resolve parsed arguments into the configuration handed to the server
    pub fn into_config(self) -> Result<ProxyConfig> {
        let cache_dir = std::path::absolute(&self.cache)?;

        Ok(ProxyConfig {
            host: self.host,
            port: self.port,
            cache_dir,
            source_url: self.source_url,
            source_timeout: Duration::from_secs(self.source_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        })
    }
}
