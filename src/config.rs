//! # config — read [`Config`] from environment variables
//!
//! `.env` is loaded by `main` through `dotenvy` before this runs, so local
//! development can keep everything in a file while CI/prod uses real env vars.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_LISTINGS_URL: &str = "https://adurite.com/api/market/roblox";
pub const DEFAULT_PROJECTIONS_URL: &str = "https://api.rolimons.com/items/v1/itemdetails";
pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.app/latest";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on.
    pub bind_addr: SocketAddr,
    /// Listings source (catalog with rap + price).
    pub listings_url: String,
    /// Projection source (per-id signal vectors). Also served verbatim by the
    /// passthrough route.
    pub projections_url: String,
    /// Rate source for the currency converter.
    pub rates_url: String,
    /// Period between scheduled refreshes.
    pub refresh_interval: Duration,
    /// Per-request timeout on every outbound call.
    pub http_timeout: Duration,
    /// Some upstreams reject requests without a browser-like agent.
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5174".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address, e.g. 127.0.0.1:5174")?;

        let refresh_secs: u64 = std::env::var("REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("REFRESH_INTERVAL_SECS must be a number")?;
        anyhow::ensure!(refresh_secs > 0, "REFRESH_INTERVAL_SECS must be greater than 0");

        let timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a number")?;

        Ok(Self {
            bind_addr,
            listings_url:     env_or("LISTINGS_URL", DEFAULT_LISTINGS_URL),
            projections_url:  env_or("PROJECTIONS_URL", DEFAULT_PROJECTIONS_URL),
            rates_url:        env_or("RATES_URL", DEFAULT_RATES_URL),
            refresh_interval: Duration::from_secs(refresh_secs),
            http_timeout:     Duration::from_secs(timeout_secs),
            user_agent:       env_or("HTTP_USER_AGENT", "Mozilla/5.0 (limitedwatch)"),
        })
    }

    /// Shared outbound client: connection pooling, one timeout, one agent.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .context("failed to build HTTP client")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr:        SocketAddr::from(([127, 0, 0, 1], 5174)),
            listings_url:     DEFAULT_LISTINGS_URL.to_string(),
            projections_url:  DEFAULT_PROJECTIONS_URL.to_string(),
            rates_url:        DEFAULT_RATES_URL.to_string(),
            refresh_interval: Duration::from_secs(60),
            http_timeout:     Duration::from_secs(10),
            user_agent:       "Mozilla/5.0 (limitedwatch)".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
