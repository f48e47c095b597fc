//! Runtime configuration.
//!
//! [`ClientConfig`] is a `clap` argument group, so the binary can flatten it into its
//! command line; every field also falls back to an environment variable.

use clap::Args;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 12;

/// Where the API lives and how the client talks to it.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Base URL of the product API
    #[arg(long, env = "PRODUCT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "PRODUCT_API_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Live feed polling interval in milliseconds
    #[arg(long, env = "PRODUCT_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Capacity of the store's command channel
    #[arg(
        long,
        env = "PRODUCT_STORE_BUFFER",
        default_value_t = 32,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub store_buffer: usize,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Never zero: `tokio::time::interval` rejects a zero period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            poll_interval_ms: 2000,
            store_buffer: 32,
        }
    }
}
