//! Site classification — a coarse hint derived from the target URL.
//!
//! The hint drives acquisition ordering (which strategies to try, in what
//! order) and the site-specific DOM selector tables. Everything that used
//! to be a scattered substring check hangs off this enum.

use serde::{Deserialize, Serialize};
use url::Url;

/// Coarse classification of the target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteHint {
    Amazon,
    Flipkart,
    Myntra,
    Generic,
}

impl SiteHint {
    /// Derive a hint from the URL's host. Matching the host rather than the
    /// whole URL keeps query strings mentioning a marketplace from
    /// misclassifying the page.
    pub fn from_url(url: &str) -> Self {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        if host.contains("amazon.") {
            SiteHint::Amazon
        } else if host.contains("flipkart.") {
            SiteHint::Flipkart
        } else if host.contains("myntra.") {
            SiteHint::Myntra
        } else {
            SiteHint::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteHint::Amazon => "amazon",
            SiteHint::Flipkart => "flipkart",
            SiteHint::Myntra => "myntra",
            SiteHint::Generic => "generic",
        }
    }

    /// CSS selector the renderer should wait for before capturing the
    /// document, for sites whose product data hydrates late.
    pub fn wait_marker(&self) -> Option<&'static str> {
        match self {
            SiteHint::Myntra => Some("h1.pdp-title, h1.pdp-name"),
            SiteHint::Flipkart => Some("span.B_NuCI"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SiteHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            SiteHint::from_url("https://www.amazon.in/dp/B0TEST"),
            SiteHint::Amazon
        );
        assert_eq!(
            SiteHint::from_url("https://www.flipkart.com/p/itm123"),
            SiteHint::Flipkart
        );
        assert_eq!(
            SiteHint::from_url("https://www.myntra.com/tshirts/1234"),
            SiteHint::Myntra
        );
        assert_eq!(
            SiteHint::from_url("https://demo.vercel.store/product/t-shirt"),
            SiteHint::Generic
        );
    }

    #[test]
    fn test_only_host_is_matched() {
        assert_eq!(
            SiteHint::from_url("https://shop.example/search?q=amazon.in+deals"),
            SiteHint::Generic
        );
        assert_eq!(SiteHint::from_url("not a url"), SiteHint::Generic);
    }

    #[test]
    fn test_wait_markers() {
        assert!(SiteHint::Myntra.wait_marker().is_some());
        assert!(SiteHint::Amazon.wait_marker().is_none());
        assert!(SiteHint::Generic.wait_marker().is_none());
    }
}
