//! Async HTTP client wrapping reqwest.
//!
//! Not a browser — plain GETs carrying a realistic browser header set so
//! that the direct strategy is not discarded on sight by origin servers.

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/131.0.0.0 Safari/537.36";

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the acquisition pipeline.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for sites that reject HTTP/2.
    h1_client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client with browser-like headers.
    pub fn new(timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let builder = || {
            reqwest::Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::limited(5))
                .user_agent(USER_AGENT)
                .default_headers(headers.clone())
        };

        let client = builder().build().unwrap_or_default();
        let h1_client = builder().http1_only().build().unwrap_or_default();

        Self { client, h1_client }
    }

    /// Perform a single GET request.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    /// No retry loop beyond that — fallback ordering lives in the
    /// orchestrator, not here.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        match self.get_inner(&self.client, url).await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                let err_str = format!("{e:#}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    self.get_inner(&self.h1_client, url).await
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn get_inner(&self, client: &reqwest::Client, url: &str) -> Result<HttpResponse> {
        let r = client.get(url).send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let body = r.text().await.unwrap_or_default();

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }

}

/// Direct HTTP acquisition strategy: a plain GET through `HttpClient`.
///
/// Cheapest and least likely to succeed on bot-defended sites, so it always
/// sits last in the attempt order.
pub struct DirectFetch {
    client: HttpClient,
}

impl DirectFetch {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl super::FetchStrategy for DirectFetch {
    fn kind(&self) -> super::StrategyKind {
        super::StrategyKind::Direct
    }

    async fn attempt(&self, req: &super::FetchRequest) -> Result<Option<String>> {
        let resp = self.client.get(&req.url).await?;
        if !resp.is_success() {
            tracing::debug!(url = %req.url, status = resp.status, "direct fetch non-2xx");
            return Ok(None);
        }
        if resp.body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(resp.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{FetchRequest, FetchStrategy};
    use crate::site::SiteHint;
    use wiremock::matchers::{header, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_direct_fetch_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product/1"))
            .and(headers("accept-language", vec!["en-US", "en;q=0.9"]))
            .and(header("referer", "https://www.google.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let strategy = DirectFetch::new(HttpClient::new(Duration::from_secs(5)));
        let req = FetchRequest {
            url: format!("{}/product/1", server.uri()),
            site: SiteHint::Generic,
        };
        let html = strategy.attempt(&req).await.unwrap();
        assert_eq!(html.as_deref(), Some("<html>ok</html>"));
    }

    #[tokio::test]
    async fn test_direct_fetch_non_2xx_declines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let strategy = DirectFetch::new(HttpClient::new(Duration::from_secs(5)));
        let req = FetchRequest {
            url: server.uri(),
            site: SiteHint::Generic,
        };
        assert!(strategy.attempt(&req).await.unwrap().is_none());
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(Duration::from_secs(10));
        let _ = client;
    }

    #[test]
    fn test_success_range() {
        let mut resp = HttpResponse {
            url: "https://example.com".into(),
            final_url: "https://example.com".into(),
            status: 200,
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 204;
        assert!(resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
        resp.status = 503;
        assert!(!resp.is_success());
    }
}

