//! Browser-rendered acquisition strategy.
//!
//! One isolated browser context per attempt, torn down on every exit path.
//! Navigation gets a generous timeout; after load we optionally wait for a
//! site-known marker element, let hydration settle, and scroll once to
//! trigger lazy-loaded content.

use super::{FetchRequest, FetchStrategy, StrategyKind};
use crate::renderer::{RenderContext, Renderer};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Rendered fetch backed by a `Renderer`.
pub struct RenderedFetch {
    renderer: Arc<dyn Renderer>,
    render_timeout: Duration,
    settle_delay: Duration,
    marker_timeout: Duration,
}

impl RenderedFetch {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        render_timeout: Duration,
        settle_delay: Duration,
        marker_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            render_timeout,
            settle_delay,
            marker_timeout,
        }
    }

    async fn capture(&self, ctx: &mut Box<dyn RenderContext>, req: &FetchRequest) -> Result<String> {
        ctx.navigate(&req.url, self.render_timeout.as_millis() as u64)
            .await?;

        if let Some(marker) = req.site.wait_marker() {
            let found = ctx
                .wait_for_selector(marker, self.marker_timeout.as_millis() as u64)
                .await
                .unwrap_or(false);
            if !found {
                warn!(site = %req.site, marker, "wait marker not found within timeout");
            }
        }

        tokio::time::sleep(self.settle_delay).await;

        if let Err(e) = ctx.scroll_to_bottom().await {
            debug!("scroll failed: {e}");
        }

        ctx.get_html().await
    }
}

#[async_trait]
impl FetchStrategy for RenderedFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rendered
    }

    async fn attempt(&self, req: &FetchRequest) -> Result<Option<String>> {
        let mut ctx = self.renderer.new_context().await?;

        let outcome = self.capture(&mut ctx, req).await;

        // Teardown is unconditional: the context never outlives the attempt,
        // whatever happened during navigation or capture.
        if let Err(e) = ctx.close().await {
            warn!("browser context close failed: {e}");
        }

        match outcome {
            Ok(html) if !html.trim().is_empty() => Ok(Some(html)),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!(url = %req.url, "rendered capture failed: {e:#}");
                Ok(None)
            }
        }
    }
}
