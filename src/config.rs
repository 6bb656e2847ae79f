//! Runtime configuration, built once by the caller and passed down.
//!
//! Nothing in the pipeline reads the environment directly; the binary
//! constructs a `Config` at startup (from `STOREPROBE_*` variables plus
//! defaults) and hands it to the auditor.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the audit pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the external rendering-proxy service. `None` disables
    /// the proxy strategy entirely (never an error).
    pub proxy_api_key: Option<String>,
    /// Base endpoint of the rendering-proxy service.
    pub proxy_endpoint: String,
    /// Country hint forwarded to the proxy service.
    pub proxy_country: String,
    /// Timeout for one proxy-rendered fetch.
    pub proxy_timeout: Duration,
    /// Navigation timeout for one browser-rendered fetch. Much larger than
    /// the direct-HTTP timeout; rendering is expected to be slow.
    pub render_timeout: Duration,
    /// Fixed delay after navigation to let client-side hydration settle.
    pub settle_delay: Duration,
    /// How long to poll for a site-specific wait marker before giving up.
    pub marker_timeout: Duration,
    /// Timeout for one direct HTTP fetch.
    pub http_timeout: Duration,
    /// Fixed cooldown before reversing to the rendered strategy on sites
    /// that aggressively rate-limit after a block.
    pub strategy_backoff: Duration,
    /// Directory for cached audit results.
    pub cache_dir: PathBuf,
    /// Time-to-live for cached audit results.
    pub cache_ttl: Duration,
    /// Path of the JSONL audit journal.
    pub journal_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        Self {
            proxy_api_key: None,
            proxy_endpoint: "https://api.scraperapi.com".to_string(),
            proxy_country: "in".to_string(),
            proxy_timeout: Duration::from_secs(60),
            render_timeout: Duration::from_secs(45),
            settle_delay: Duration::from_millis(2000),
            marker_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(20),
            strategy_backoff: Duration::from_millis(1500),
            cache_dir: home.join(".storeprobe").join("cache"),
            cache_ttl: Duration::from_secs(300),
            journal_path: home.join(".storeprobe").join("journal.jsonl"),
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(key) = std::env::var("STOREPROBE_PROXY_KEY") {
            if !key.trim().is_empty() {
                cfg.proxy_api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var("STOREPROBE_PROXY_ENDPOINT") {
            cfg.proxy_endpoint = endpoint;
        }
        if let Ok(country) = std::env::var("STOREPROBE_PROXY_COUNTRY") {
            cfg.proxy_country = country;
        }
        if let Some(secs) = env_u64("STOREPROBE_RENDER_TIMEOUT_SECS") {
            cfg.render_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("STOREPROBE_HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("STOREPROBE_CACHE_TTL_SECS") {
            cfg.cache_ttl = Duration::from_secs(secs);
        }
        if let Ok(dir) = std::env::var("STOREPROBE_CACHE_DIR") {
            cfg.cache_dir = PathBuf::from(dir);
        }

        cfg
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
