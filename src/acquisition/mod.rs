//! Acquisition pipeline — get usable HTML for a URL by whatever means works.
//!
//! Three strategies (browser-rendered, proxy-rendered, direct HTTP) are
//! attempted strictly sequentially in a site-tuned order. After each attempt
//! the block detector classifies the payload; the first non-empty, unblocked
//! result wins. Later strategies exist only as fallback — running them
//! speculatively would burn rendering/proxy budget for nothing.

pub mod block;
pub mod http_client;
pub mod proxy;
pub mod rendered;

use crate::site::SiteHint;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which acquisition strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Rendered,
    Proxy,
    Direct,
    /// No strategy produced anything.
    None,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Rendered => "rendered",
            StrategyKind::Proxy => "proxy",
            StrategyKind::Direct => "direct",
            StrategyKind::None => "none",
        }
    }
}

/// One audit's fetch request. Immutable once created.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub site: SiteHint,
}

impl FetchRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            site: SiteHint::from_url(url),
        }
    }
}

/// Outcome of the acquisition pipeline. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Best-available HTML, possibly from a blocked page.
    pub html: Option<String>,
    /// Strategy that produced `html`.
    pub strategy: StrategyKind,
    /// True when `html` is absent or came from a block/challenge page.
    pub blocked: bool,
}

/// A single acquisition strategy. Each is independently fallible: a failed
/// or declined attempt yields `Ok(None)` or an error, never a panic, and the
/// orchestrator recovers both locally.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether the strategy can run at all (e.g. proxy credential present).
    fn available(&self) -> bool {
        true
    }

    /// Try to fetch the page. `Ok(None)` means "no result, move on".
    async fn attempt(&self, req: &FetchRequest) -> Result<Option<String>>;
}

/// Attempt order per site, tuned to known blocking behavior.
///
/// Amazon's bot defense favors datacenter egress, so the proxy goes first
/// there; hydration-heavy sites get the browser first.
fn attempt_order(site: SiteHint) -> &'static [StrategyKind] {
    match site {
        SiteHint::Amazon => &[
            StrategyKind::Proxy,
            StrategyKind::Rendered,
            StrategyKind::Direct,
        ],
        _ => &[
            StrategyKind::Rendered,
            StrategyKind::Proxy,
            StrategyKind::Direct,
        ],
    }
}

/// Whether a fixed cooldown applies before this strategy on this site.
/// Amazon rate-limits hard right after serving a challenge; give it a beat
/// before reversing from proxy to browser.
fn needs_cooldown(site: SiteHint, kind: StrategyKind) -> bool {
    site == SiteHint::Amazon && kind == StrategyKind::Rendered
}

/// Site-aware orchestrator over the acquisition strategies.
pub struct FetchOrchestrator {
    strategies: Vec<Box<dyn FetchStrategy>>,
    backoff: Duration,
}

impl FetchOrchestrator {
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>, backoff: Duration) -> Self {
        Self {
            strategies,
            backoff,
        }
    }

    fn strategy(&self, kind: StrategyKind) -> Option<&dyn FetchStrategy> {
        self.strategies
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Fetch the best-available HTML for the request.
    ///
    /// Stops at the first non-empty, unblocked payload. On exhaustion the
    /// most recently attempted non-empty HTML (if any) is returned with
    /// `blocked = true` so the caller can decide whether a degraded result
    /// is still usable; nothing is silently discarded.
    pub async fn fetch_page(&self, req: &FetchRequest) -> FetchResult {
        let mut last_blocked: Option<(String, StrategyKind)> = None;
        let mut attempted_any = false;

        for &kind in attempt_order(req.site) {
            let Some(strategy) = self.strategy(kind) else {
                continue;
            };
            if !strategy.available() {
                debug!(strategy = kind.as_str(), "strategy unavailable, skipping");
                continue;
            }

            if attempted_any && needs_cooldown(req.site, kind) {
                tokio::time::sleep(self.backoff).await;
            }
            attempted_any = true;

            debug!(url = %req.url, strategy = kind.as_str(), "attempting fetch");
            match strategy.attempt(req).await {
                Ok(Some(html)) => {
                    if !block::is_blocked(req.site, &html) {
                        info!(
                            url = %req.url,
                            strategy = kind.as_str(),
                            bytes = html.len(),
                            "fetch succeeded"
                        );
                        return FetchResult {
                            html: Some(html),
                            strategy: kind,
                            blocked: false,
                        };
                    }
                    warn!(url = %req.url, strategy = kind.as_str(), "block page detected");
                    // Most recently attempted non-empty payload wins as the
                    // degraded last resort.
                    last_blocked = Some((html, kind));
                }
                Ok(None) => {
                    debug!(strategy = kind.as_str(), "strategy produced no result");
                }
                Err(e) => {
                    // Transient failure: recovered here, never propagated.
                    warn!(strategy = kind.as_str(), "strategy failed: {e:#}");
                }
            }
        }

        match last_blocked {
            Some((html, kind)) => FetchResult {
                html: Some(html),
                strategy: kind,
                blocked: true,
            },
            None => FetchResult {
                html: None,
                strategy: StrategyKind::None,
                blocked: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted strategy for orchestrator tests.
    struct Scripted {
        kind: StrategyKind,
        available: bool,
        response: Option<String>,
        fail: bool,
        calls: Arc<AtomicUsize>,
        order_log: Arc<Mutex<Vec<StrategyKind>>>,
    }

    impl Scripted {
        fn new(
            kind: StrategyKind,
            response: Option<&str>,
            order_log: Arc<Mutex<Vec<StrategyKind>>>,
        ) -> Self {
            Self {
                kind,
                available: true,
                response: response.map(String::from),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
                order_log,
            }
        }
    }

    #[async_trait]
    impl FetchStrategy for Scripted {
        fn kind(&self) -> StrategyKind {
            self.kind
        }
        fn available(&self) -> bool {
            self.available
        }
        async fn attempt(&self, _req: &FetchRequest) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order_log.lock().unwrap().push(self.kind);
            if self.fail {
                anyhow::bail!("scripted failure");
            }
            Ok(self.response.clone())
        }
    }

    fn orchestrator(strategies: Vec<Box<dyn FetchStrategy>>) -> FetchOrchestrator {
        FetchOrchestrator::new(strategies, Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_first_unblocked_wins() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = orchestrator(vec![
            Box::new(Scripted::new(
                StrategyKind::Rendered,
                Some("<html>Welcome</html>"),
                log.clone(),
            )),
            Box::new(Scripted::new(StrategyKind::Proxy, Some("x"), log.clone())),
            Box::new(Scripted::new(StrategyKind::Direct, Some("x"), log.clone())),
        ]);

        let result = o.fetch_page(&FetchRequest::new("https://shop.example/p/1")).await;
        assert!(!result.blocked);
        assert_eq!(result.strategy, StrategyKind::Rendered);
        // Later strategies were never consulted.
        assert_eq!(log.lock().unwrap().as_slice(), &[StrategyKind::Rendered]);
    }

    #[tokio::test]
    async fn test_amazon_is_proxy_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = orchestrator(vec![
            Box::new(Scripted::new(StrategyKind::Rendered, None, log.clone())),
            Box::new(Scripted::new(StrategyKind::Proxy, None, log.clone())),
            Box::new(Scripted::new(StrategyKind::Direct, None, log.clone())),
        ]);

        let _ = o
            .fetch_page(&FetchRequest::new("https://www.amazon.in/dp/B0TEST"))
            .await;
        assert_eq!(
            log.lock().unwrap().as_slice(),
            &[
                StrategyKind::Proxy,
                StrategyKind::Rendered,
                StrategyKind::Direct
            ]
        );
    }

    #[tokio::test]
    async fn test_never_returns_blocked_when_unblocked_exists() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = orchestrator(vec![
            Box::new(Scripted::new(
                StrategyKind::Rendered,
                Some("<html>captcha check</html>"),
                log.clone(),
            )),
            Box::new(Scripted::new(
                StrategyKind::Proxy,
                Some("<html>Real product page</html>"),
                log.clone(),
            )),
            Box::new(Scripted::new(StrategyKind::Direct, None, log.clone())),
        ]);

        let result = o.fetch_page(&FetchRequest::new("https://shop.example/p/1")).await;
        assert!(!result.blocked);
        assert_eq!(result.strategy, StrategyKind::Proxy);
        assert_eq!(
            result.html.as_deref(),
            Some("<html>Real product page</html>")
        );
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_most_recent_blocked_html() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = orchestrator(vec![
            Box::new(Scripted::new(
                StrategyKind::Rendered,
                Some("<html>captcha A</html>"),
                log.clone(),
            )),
            Box::new(Scripted::new(
                StrategyKind::Proxy,
                Some("<html>captcha B</html>"),
                log.clone(),
            )),
            Box::new(Scripted::new(StrategyKind::Direct, None, log.clone())),
        ]);

        let result = o.fetch_page(&FetchRequest::new("https://shop.example/p/1")).await;
        assert!(result.blocked);
        // Explicit precedence: the most recently attempted payload.
        assert_eq!(result.strategy, StrategyKind::Proxy);
        assert_eq!(result.html.as_deref(), Some("<html>captcha B</html>"));
    }

    #[tokio::test]
    async fn test_total_failure_yields_no_html() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = Scripted::new(StrategyKind::Rendered, None, log.clone());
        failing.fail = true;
        let o = orchestrator(vec![
            Box::new(failing),
            Box::new(Scripted::new(StrategyKind::Proxy, None, log.clone())),
            Box::new(Scripted::new(StrategyKind::Direct, None, log.clone())),
        ]);

        let result = o.fetch_page(&FetchRequest::new("https://shop.example/p/1")).await;
        assert!(result.html.is_none());
        assert!(result.blocked);
        assert_eq!(result.strategy, StrategyKind::None);
    }

    #[tokio::test]
    async fn test_unavailable_strategy_skipped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut proxy = Scripted::new(StrategyKind::Proxy, Some("<html>ok</html>"), log.clone());
        proxy.available = false;
        let o = orchestrator(vec![
            Box::new(Scripted::new(StrategyKind::Rendered, None, log.clone())),
            Box::new(proxy),
            Box::new(Scripted::new(
                StrategyKind::Direct,
                Some("<html>direct ok</html>"),
                log.clone(),
            )),
        ]);

        let result = o.fetch_page(&FetchRequest::new("https://shop.example/p/1")).await;
        assert_eq!(result.strategy, StrategyKind::Direct);
        assert!(!log.lock().unwrap().contains(&StrategyKind::Proxy));
    }
}
