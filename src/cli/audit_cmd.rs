//! `storeprobe audit <url>` — run the full audit pipeline for one page.

use crate::auditor::{AuditResult, Auditor};
use crate::config::Config;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Run the audit command.
pub async fn run(url: &str, json: bool, fresh: bool) -> Result<()> {
    let config = Config::from_env();

    let renderer: Arc<dyn Renderer> = match ChromiumRenderer::new().await {
        Ok(r) => Arc::new(r),
        Err(e) => {
            warn!("Chromium unavailable, continuing without rendering: {e:#}");
            Arc::new(NoopRenderer)
        }
    };

    let auditor = Auditor::new(&config, renderer.clone())?;
    let outcome = auditor.audit(url, fresh).await;
    if let Err(e) = renderer.shutdown().await {
        warn!("renderer shutdown failed: {e:#}");
    }

    let result = outcome?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

fn print_report(result: &AuditResult) {
    println!("Agent-Readiness Report");
    println!("======================");
    println!();
    println!("URL:    {}", result.url);
    println!("Score:  {:.2} / 100", result.score);
    if result.degraded {
        println!("Note:   page appeared blocked; fields below are best-effort");
    }
    println!();

    let p = &result.product_info;
    println!("  Name:         {}", field(&p.name));
    println!("  Price:        {}", field(&p.price));
    println!("  Currency:     {}", field(&p.currency));
    println!("  Availability: {}", field(&p.availability));
    println!();

    println!("Recommendations:");
    for rec in &result.recommendations {
        println!("  - {rec}");
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(missing)")
}
