//! Strategy 1: JSON-LD structured data.
//!
//! The highest-confidence source: a schema.org `Product` block authored by
//! the site itself. Malformed JSON in any one script block is skipped, never
//! fatal.

use super::ProductRecord;
use scraper::{Html, Selector};
use serde_json::Value;

/// Extract a product from embedded JSON-LD blocks, if any declares one.
pub fn try_extract(document: &Html) -> Option<ProductRecord> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for element in document.select(&sel) {
        let text = element.inner_html();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            continue;
        };
        if let Some(product) = find_product(&value) {
            return Some(map_product(product));
        }
    }
    None
}

/// Locate the first object declaring `@type: Product` in a JSON-LD value:
/// a bare object, the first matching array element, or a `@graph` member.
fn find_product(value: &Value) -> Option<&Value> {
    if let Some(arr) = value.as_array() {
        return arr.iter().find(|v| is_product(v));
    }
    if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
        return graph.iter().find(|v| is_product(v));
    }
    is_product(value).then_some(value)
}

fn is_product(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

fn map_product(v: &Value) -> ProductRecord {
    // Offers may be a single object or an array; take the first.
    let offer = v.get("offers").and_then(|o| {
        if o.is_array() {
            o.as_array().and_then(|arr| arr.first())
        } else {
            Some(o)
        }
    });

    let price = offer.and_then(|o| o.get("price")).and_then(json_scalar);
    let currency = offer
        .and_then(|o| o.get("priceCurrency"))
        .and_then(|c| c.as_str())
        .map(String::from);
    // Sites that bother with JSON-LD rarely mark availability; absent means
    // sellable.
    let availability = offer
        .and_then(|o| o.get("availability"))
        .and_then(|a| a.as_str())
        .map(String::from)
        .or_else(|| Some("In stock".to_string()));

    ProductRecord {
        name: v.get("name").and_then(|n| n.as_str()).map(String::from),
        price,
        currency,
        availability,
    }
}

/// JSON-LD prices appear both as numbers and as strings; keep them verbatim.
fn json_scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_plain_product_block() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type": "Product", "name": "Test Widget",
             "offers": {"@type": "Offer", "price": 29.99,
                        "priceCurrency": "USD",
                        "availability": "https://schema.org/InStock"}}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Test Widget"));
        assert_eq!(p.price.as_deref(), Some("29.99"));
        assert_eq!(p.currency.as_deref(), Some("USD"));
        assert_eq!(p.availability.as_deref(), Some("https://schema.org/InStock"));
    }

    #[test]
    fn test_array_and_offer_list() {
        let doc = parse(
            r#"<script type="application/ld+json">
            [{"@type": "WebSite", "name": "Shop"},
             {"@type": "Product", "name": "Listed Widget",
              "offers": [{"price": "999", "priceCurrency": "INR"},
                         {"price": "1099", "priceCurrency": "INR"}]}]
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Listed Widget"));
        assert_eq!(p.price.as_deref(), Some("999"));
    }

    #[test]
    fn test_graph_wrapper() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@context": "https://schema.org",
             "@graph": [{"@type": "WebSite", "name": "Example"},
                        {"@type": "Product", "name": "Graph Widget",
                         "offers": {"price": 10}}]}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Graph Widget"));
        assert_eq!(p.price.as_deref(), Some("10"));
    }

    #[test]
    fn test_availability_defaults_in_stock() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type": "Product", "name": "W", "offers": {"price": 5}}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.availability.as_deref(), Some("In stock"));
    }

    #[test]
    fn test_malformed_block_skipped() {
        let doc = parse(
            r#"<script type="application/ld+json">{not valid json}</script>
            <script type="application/ld+json">
            {"@type": "Product", "name": "Survivor"}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Survivor"));
    }

    #[test]
    fn test_no_product_declines() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type": "Article", "headline": "News"}
            </script>"#,
        );
        assert!(try_extract(&doc).is_none());
    }
}
