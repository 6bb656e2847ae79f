//! `storeprobe cache clear` — manage cached audit results.

use crate::cache::AuditCache;
use crate::config::Config;
use anyhow::Result;

/// Clear every cached audit result.
pub async fn run_clear() -> Result<()> {
    let config = Config::from_env();
    let mut cache = AuditCache::new(config.cache_dir.clone(), config.cache_ttl)?;
    let removed = cache.clear();
    println!("Cleared {removed} cached audit(s) from {}", config.cache_dir.display());
    Ok(())
}
