//! Product extraction waterfall.
//!
//! Five strategies in priority order, each consuming the same parsed
//! document and each free to decline:
//!
//! 1. Structured data (JSON-LD `Product`)
//! 2. Meta tags (OpenGraph / product / twitter)
//! 3. Embedded application state (framework bootstrap JSON)
//! 4. Site-specific DOM selectors
//! 5. Generic title fallback (never declines)
//!
//! The waterfall commits to the first record carrying a name or a price and
//! never consults lower-priority strategies afterwards — a high-confidence
//! partial match must not be overwritten by a weaker generic one.

pub mod app_state;
pub mod dom;
pub mod meta;
pub mod price;
pub mod structured;

use crate::site::SiteHint;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Normalized product fields. Every field is independently optional;
/// absence is meaningful (it drives a recommendation), not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: Option<String>,
    /// Canonical digits+dot form, currency markers stripped.
    pub price: Option<String>,
    /// ISO-ish currency code; "INR" is inferred for site-local prices.
    pub currency: Option<String>,
    /// Free text or canonical "In stock" / "Out of stock".
    pub availability: Option<String>,
}

impl ProductRecord {
    /// A record is usable once it carries at least a name or a price.
    pub fn is_usable(&self) -> bool {
        self.name.is_some() || self.price.is_some()
    }
}

/// Run the extraction waterfall over an HTML payload.
///
/// Returns `None` only on extraction exhaustion: even the terminal generic
/// fallback found neither name nor price.
pub fn extract_product(html: &str, site: SiteHint) -> Option<ProductRecord> {
    let document = Html::parse_document(html);

    if let Some(record) = structured::try_extract(&document) {
        if record.is_usable() {
            debug!("extraction: json-ld matched");
            return Some(record);
        }
    }
    if let Some(record) = meta::try_extract(&document) {
        if record.is_usable() {
            debug!("extraction: meta tags matched");
            return Some(record);
        }
    }
    if let Some(record) = app_state::try_extract(&document) {
        if record.is_usable() {
            debug!("extraction: embedded app state matched");
            return Some(record);
        }
    }
    if let Some(record) = dom::try_extract(&document, site) {
        if record.is_usable() {
            debug!(site = %site, "extraction: dom selectors matched");
            return Some(record);
        }
    }

    let record = generic_fallback(&document);
    if record.is_usable() {
        debug!("extraction: generic title fallback");
        Some(record)
    } else {
        None
    }
}

/// Terminal strategy: document title as name, availability assumed.
fn generic_fallback(document: &Html) -> ProductRecord {
    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty());

    ProductRecord {
        name: title,
        price: None,
        currency: None,
        availability: Some("In stock".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonld_wins_over_everything() {
        // JSON-LD, meta tags, and site DOM all present; strategy 1 must win
        // and its values must come through verbatim.
        let html = r#"
        <html><head>
        <title>Ignored Title</title>
        <script type="application/ld+json">
        {"@type": "Product", "name": "LD Widget",
         "offers": {"price": "1299.00", "priceCurrency": "INR"}}
        </script>
        <meta property="og:title" content="Meta Widget" />
        <meta property="product:price:amount" content="999" />
        </head><body>
        <span id="productTitle">DOM Widget</span>
        </body></html>
        "#;

        let record = extract_product(html, SiteHint::Amazon).unwrap();
        assert_eq!(record.name.as_deref(), Some("LD Widget"));
        assert_eq!(record.price.as_deref(), Some("1299.00"));
        assert_eq!(record.currency.as_deref(), Some("INR"));
    }

    #[test]
    fn test_amazon_dom_waterfall() {
        // No JSON-LD, no meta, no app state — strategy 4 picks up the
        // split-price Amazon layout.
        let html = r#"
        <html><body>
        <span id="productTitle">Widget</span>
        <span class="a-price-whole">499</span>
        </body></html>
        "#;

        let record = extract_product(html, SiteHint::Amazon).unwrap();
        assert_eq!(record.name.as_deref(), Some("Widget"));
        assert_eq!(record.price.as_deref(), Some("499"));
        assert_eq!(record.currency.as_deref(), Some("INR"));
        assert_eq!(record.availability, None);
    }

    #[test]
    fn test_generic_title_fallback() {
        let html = "<html><head><title>My Shop Item</title></head><body></body></html>";
        let record = extract_product(html, SiteHint::Generic).unwrap();
        assert_eq!(record.name.as_deref(), Some("My Shop Item"));
        assert_eq!(record.price, None);
        assert_eq!(record.currency, None);
        assert_eq!(record.availability.as_deref(), Some("In stock"));
    }

    #[test]
    fn test_extraction_exhaustion() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert!(extract_product(html, SiteHint::Generic).is_none());
    }

    #[test]
    fn test_partial_high_confidence_not_overwritten() {
        // DOM gives only a name; the generic fallback must not replace it
        // with the page title.
        let html = r#"
        <html><head><title>Some Other Title</title></head><body>
        <span id="productTitle">Exact Widget Name</span>
        </body></html>
        "#;
        let record = extract_product(html, SiteHint::Amazon).unwrap();
        assert_eq!(record.name.as_deref(), Some("Exact Widget Name"));
    }
}
