//! Environment readiness check.

use crate::config::Config;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Check Chromium availability, proxy credentials, and cache directory.
pub async fn run() -> Result<()> {
    println!("Storeprobe Doctor");
    println!("=================");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let config = Config::from_env();

    // Chromium powers the rendered strategy; audits still run without it.
    let chromium = find_chromium();
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Rendered fetches disabled; install Chrome or set STOREPROBE_CHROMIUM_PATH."
        ),
    }

    // Proxy credential powers the proxy strategy.
    if config.proxy_api_key.is_some() {
        println!("[OK] Proxy API key configured ({})", config.proxy_endpoint);
    } else {
        println!("[!!] Proxy API key not set. Set STOREPROBE_PROXY_KEY to enable proxy fetches.");
    }

    // Cache directory must be creatable and writable.
    match std::fs::create_dir_all(&config.cache_dir) {
        Ok(()) => {
            let probe = config.cache_dir.join(".doctor-probe");
            match std::fs::write(&probe, b"ok") {
                Ok(()) => {
                    let _ = std::fs::remove_file(&probe);
                    println!("[OK] Cache directory writable: {}", config.cache_dir.display());
                }
                Err(e) => println!(
                    "[!!] Cache directory not writable: {} ({e})",
                    config.cache_dir.display()
                ),
            }
        }
        Err(e) => println!(
            "[!!] Cannot create cache directory: {} ({e})",
            config.cache_dir.display()
        ),
    }

    println!();
    // Direct HTTP always works, so the pipeline is never fully dark; READY
    // means at least one anti-bot-capable strategy is usable.
    if chromium.is_some() || config.proxy_api_key.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: DEGRADED (direct HTTP only — bot-protected sites will likely block)");
    }

    Ok(())
}
