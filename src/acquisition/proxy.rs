//! Proxy-rendered acquisition strategy.
//!
//! Delegates rendering to an external proxy service (ScraperAPI-shaped API:
//! `GET {endpoint}?api_key=..&url=..&country_code=..&render=true`). Only
//! available when a credential is configured; its absence is not an error
//! anywhere in the pipeline, just an unavailable strategy.

use super::{FetchRequest, FetchStrategy, StrategyKind};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Proxy-rendered fetch via an external rendering service.
pub struct ProxyFetch {
    api_key: Option<String>,
    endpoint: String,
    country: String,
    client: reqwest::Client,
}

impl ProxyFetch {
    pub fn new(
        api_key: Option<String>,
        endpoint: String,
        country: String,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            endpoint,
            country,
            client,
        }
    }
}

#[async_trait]
impl FetchStrategy for ProxyFetch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Proxy
    }

    fn available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt(&self, req: &FetchRequest) -> Result<Option<String>> {
        let Some(key) = &self.api_key else {
            // No credential configured — silently unavailable.
            return Ok(None);
        };

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", key.as_str()),
                ("url", req.url.as_str()),
                ("country_code", self.country.as_str()),
                ("render", "true"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url = %req.url, %status, "proxy fetch returned non-2xx");
            return Ok(None);
        }

        let body = resp.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(body))
    }
}
