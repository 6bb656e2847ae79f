//! Top-level audit pipeline: cache → fetch → extract → score.

use crate::acquisition::http_client::{DirectFetch, HttpClient};
use crate::acquisition::proxy::ProxyFetch;
use crate::acquisition::rendered::RenderedFetch;
use crate::acquisition::{FetchOrchestrator, FetchRequest, FetchStrategy};
use crate::cache::AuditCache;
use crate::config::Config;
use crate::extraction::{self, ProductRecord};
use crate::journal::Journal;
use crate::renderer::Renderer;
use crate::scoring;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The caller-facing audit outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub product_info: ProductRecord,
    pub score: f64,
    pub recommendations: Vec<String>,
    /// True when the fields were extracted from a blocked page as a
    /// last-resort degraded result.
    pub degraded: bool,
}

/// The only two terminal failure states surfaced to the caller. Everything
/// else is recovered inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// No acquisition strategy produced any HTML.
    #[error("fetch failed: no strategy produced HTML for {url}")]
    FetchFailed { url: String },
    /// HTML was obtained but even the generic fallback found neither a
    /// name nor a price.
    #[error("extraction failed: no product fields found at {url}")]
    ExtractionFailed { url: String },
}

/// Audit pipeline with its collaborators. One instance serves many
/// concurrent audits; the cache and journal are the only shared state.
pub struct Auditor {
    orchestrator: FetchOrchestrator,
    cache: Mutex<AuditCache>,
    journal: Option<Mutex<Journal>>,
}

impl Auditor {
    /// Build an auditor from configuration and a renderer.
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let strategies: Vec<Box<dyn FetchStrategy>> = vec![
            Box::new(RenderedFetch::new(
                renderer,
                config.render_timeout,
                config.settle_delay,
                config.marker_timeout,
            )),
            Box::new(ProxyFetch::new(
                config.proxy_api_key.clone(),
                config.proxy_endpoint.clone(),
                config.proxy_country.clone(),
                config.proxy_timeout,
            )),
            Box::new(DirectFetch::new(HttpClient::new(config.http_timeout))),
        ];
        let orchestrator = FetchOrchestrator::new(strategies, config.strategy_backoff);

        let cache = AuditCache::new(config.cache_dir.clone(), config.cache_ttl)?;
        let journal = match Journal::open(&config.journal_path) {
            Ok(j) => Some(Mutex::new(j)),
            Err(e) => {
                warn!("journal disabled: {e:#}");
                None
            }
        };

        Ok(Self {
            orchestrator,
            cache: Mutex::new(cache),
            journal,
        })
    }

    /// Construct from pre-built parts. Used by tests to script strategies.
    pub fn with_parts(
        orchestrator: FetchOrchestrator,
        cache: AuditCache,
        journal: Option<Journal>,
    ) -> Self {
        Self {
            orchestrator,
            cache: Mutex::new(cache),
            journal: journal.map(Mutex::new),
        }
    }

    /// Audit a product URL.
    ///
    /// Reads the cache first (unless `fresh`), then runs the acquisition
    /// pipeline and the extraction waterfall, scores the record, and writes
    /// the result back to the cache and the journal.
    pub async fn audit(&self, url: &str, fresh: bool) -> Result<AuditResult, AuditError> {
        let start = Instant::now();

        if !fresh {
            if let Some(hit) = self.cache.lock().await.get(url) {
                info!(url, "cache hit");
                return Ok(hit);
            }
        }

        let request = FetchRequest::new(url);
        let fetched = self.orchestrator.fetch_page(&request).await;
        let strategy = fetched.strategy.as_str();

        let Some(html) = fetched.html else {
            self.journal_entry(
                url,
                &request,
                strategy,
                fetched.blocked,
                None,
                "fetch_failed",
                start,
            )
            .await;
            return Err(AuditError::FetchFailed {
                url: url.to_string(),
            });
        };

        // Blocked-but-non-empty HTML still goes through the waterfall as an
        // explicit degraded mode; the result is flagged.
        let Some(product) = extraction::extract_product(&html, request.site) else {
            self.journal_entry(
                url,
                &request,
                strategy,
                fetched.blocked,
                None,
                "extraction_failed",
                start,
            )
            .await;
            return Err(AuditError::ExtractionFailed {
                url: url.to_string(),
            });
        };

        let (score, recommendations) = scoring::score(&product);
        let result = AuditResult {
            url: url.to_string(),
            product_info: product,
            score,
            recommendations,
            degraded: fetched.blocked,
        };

        if let Err(e) = self.cache.lock().await.put(url, &result) {
            // Cache is best-effort; an unwritable cache never fails an audit.
            warn!("cache write failed: {e:#}");
        }
        self.journal_entry(
            url,
            &request,
            strategy,
            fetched.blocked,
            Some(score),
            "ok",
            start,
        )
        .await;

        info!(url, score, degraded = result.degraded, "audit complete");
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    async fn journal_entry(
        &self,
        url: &str,
        request: &FetchRequest,
        strategy: &str,
        blocked: bool,
        score: Option<f64>,
        status: &str,
        start: Instant,
    ) {
        if let Some(journal) = &self.journal {
            let outcome = journal.lock().await.log_audit(
                url,
                request.site.as_str(),
                strategy,
                blocked,
                score,
                status,
                start.elapsed().as_millis() as u64,
            );
            if let Err(e) = outcome {
                warn!("journal write failed: {e:#}");
            }
        }
    }
}
