//! Strategy 3: embedded application state.
//!
//! Client-rendered storefronts ship the data used to hydrate the page as a
//! JSON blob — `<script id="__NEXT_DATA__">` on Next.js sites, or an inline
//! script carrying `{"props"... "pageProps"` markers. The payload is
//! untrusted and arbitrarily nested, so the search for a plausible product
//! object is an explicit queue traversal with a depth bound, not recursion.

use super::price::clean_price;
use super::ProductRecord;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// Maximum nesting depth searched for a product object.
const MAX_DEPTH: usize = 16;
/// Maximum number of JSON nodes visited per payload.
const MAX_NODES: usize = 10_000;

/// Keys that identify a product-like name.
const NAME_KEYS: &[&str] = &["name", "displayName", "productName"];
/// Price-like keys, in extraction priority order.
const PRICE_KEYS: &[&str] = &["discountedPrice", "finalPrice", "sellingPrice", "price", "mrp"];
/// Candidate sub-keys when a price value is itself a nested node.
const PRICE_NODE_KEYS: &[&str] = &["discounted", "amount", "value", "min", "mrp"];

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid regex"))
}

/// Extract a product from an embedded state payload, if one can be found.
pub fn try_extract(document: &Html) -> Option<ProductRecord> {
    let state = locate_state(document)?;
    let product = find_product_object(&state)?;

    let name = NAME_KEYS
        .iter()
        .find_map(|k| product.get(k).and_then(|v| v.as_str()))
        .map(String::from);

    let price = extract_price(product);
    let currency = product
        .get("price")
        .and_then(|p| {
            p.get("currency")
                .or_else(|| p.get("currencyCode"))
                .and_then(|c| c.as_str())
        })
        .map(String::from)
        .or_else(|| price.as_ref().map(|_| "INR".to_string()));

    let availability = extract_availability(product);

    if name.is_none() && price.is_none() {
        return None;
    }
    Some(ProductRecord {
        name,
        currency: if price.is_some() { currency } else { None },
        price,
        availability,
    })
}

/// Locate and parse the bootstrap JSON blob.
///
/// Prefers the well-known `__NEXT_DATA__` script; otherwise scans inline
/// scripts for nested-state markers, tolerating trailing non-JSON by
/// carving out the brace-delimited substring. Malformed candidates are
/// silently skipped.
fn locate_state(document: &Html) -> Option<Value> {
    if let Ok(sel) = Selector::parse(r#"script[id="__NEXT_DATA__"]"#) {
        for el in document.select(&sel) {
            let text = el.inner_html();
            if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
                return Some(value);
            }
        }
    }

    let sel = Selector::parse("script").ok()?;
    for el in document.select(&sel) {
        let text = el.inner_html();
        if !(text.contains(r#"{"props"#) && text.contains(r#""pageProps""#)) {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
            return Some(value);
        }
        // Best effort: the JSON may be wrapped in an assignment.
        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Breadth-first search for a plausible product object: a map holding a
/// string under a name-like key plus at least one price-like key. Depth and
/// node budgets guard against adversarially nested payloads.
fn find_product_object(state: &Value) -> Option<&Value> {
    // Known direct paths first; they are cheap and the most reliable.
    let page_props = state.get("props").and_then(|p| p.get("pageProps"));
    if let Some(pp) = page_props {
        for path in ["product", "pdp"] {
            if let Some(candidate) = pp.get(path) {
                if is_product_object(candidate) {
                    return Some(candidate);
                }
            }
        }
        if let Some(candidate) = pp.get("initialData").and_then(|d| d.get("product")) {
            if is_product_object(candidate) {
                return Some(candidate);
            }
        }
    }

    let mut queue: VecDeque<(&Value, usize)> = VecDeque::new();
    queue.push_back((state, 0));
    let mut visited = 0usize;

    while let Some((node, depth)) = queue.pop_front() {
        visited += 1;
        if visited > MAX_NODES {
            break;
        }
        match node {
            Value::Object(map) => {
                if is_product_object(node) {
                    return Some(node);
                }
                if depth < MAX_DEPTH {
                    for child in map.values() {
                        queue.push_back((child, depth + 1));
                    }
                }
            }
            Value::Array(items) if depth < MAX_DEPTH => {
                for child in items {
                    queue.push_back((child, depth + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn is_product_object(v: &Value) -> bool {
    let Some(map) = v.as_object() else {
        return false;
    };
    let has_name = NAME_KEYS
        .iter()
        .any(|k| map.get(*k).map(|v| v.is_string()).unwrap_or(false));
    let has_price = PRICE_KEYS.iter().any(|k| map.contains_key(*k));
    has_name && has_price
}

/// Pull a price out of a product object: candidate keys in priority order,
/// each value possibly a scalar or a nested price node, with a regex scan
/// over the serialized object as the last resort.
fn extract_price(product: &Value) -> Option<String> {
    for key in PRICE_KEYS {
        let Some(value) = product.get(*key) else {
            continue;
        };
        if let Some(price) = price_from_value(value) {
            return Some(price);
        }
    }

    // Structured lookup failed; take the first numeric token anywhere in
    // the serialized object.
    let serialized = serde_json::to_string(product).ok()?;
    let token = number_re().find(&serialized)?;
    clean_price(token.as_str())
}

fn price_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => clean_price(&n.to_string()),
        Value::String(s) => clean_price(s),
        Value::Object(_) => PRICE_NODE_KEYS
            .iter()
            .find_map(|k| value.get(*k).and_then(price_from_value)),
        _ => None,
    }
}

/// Stock flags come as a boolean or a nested availability node.
fn extract_availability(product: &Value) -> Option<String> {
    if let Some(in_stock) = product.get("inStock").and_then(|v| v.as_bool()) {
        return Some(stock_label(in_stock));
    }
    if let Some(stock) = product.get("stock").and_then(|v| v.as_object()) {
        let available = stock
            .get("available")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        return Some(stock_label(available));
    }
    None
}

fn stock_label(available: bool) -> String {
    if available {
        "In stock".to_string()
    } else {
        "Out of stock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_next_data_product() {
        let doc = parse(
            r#"<script id="__NEXT_DATA__" type="application/json">
            {"props": {"pageProps": {"product":
                {"name": "Slim Fit Tshirt",
                 "discountedPrice": 799,
                 "mrp": 1599,
                 "inStock": true}}}}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Slim Fit Tshirt"));
        assert_eq!(p.price.as_deref(), Some("799"));
        assert_eq!(p.currency.as_deref(), Some("INR"));
        assert_eq!(p.availability.as_deref(), Some("In stock"));
    }

    #[test]
    fn test_nested_price_node_and_currency() {
        let doc = parse(
            r#"<script id="__NEXT_DATA__">
            {"props": {"pageProps": {"pdp":
                {"displayName": "Sneakers",
                 "price": {"discounted": 2499, "mrp": 4999, "currency": "INR"},
                 "stock": {"available": false}}}}}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Sneakers"));
        assert_eq!(p.price.as_deref(), Some("2499"));
        assert_eq!(p.currency.as_deref(), Some("INR"));
        assert_eq!(p.availability.as_deref(), Some("Out of stock"));
    }

    #[test]
    fn test_inline_script_marker_scan() {
        let doc = parse(
            r#"<script>window.__STATE__ = {"props": {"pageProps": {"data":
            {"productName": "Deep Widget", "sellingPrice": "1,299"}}}};</script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.name.as_deref(), Some("Deep Widget"));
        assert_eq!(p.price.as_deref(), Some("1299"));
    }

    #[test]
    fn test_regex_fallback_price() {
        // Price keys exist but hold an unrecognized shape; the serialized
        // scan still finds the first numeric token.
        let doc = parse(
            r#"<script id="__NEXT_DATA__">
            {"props": {"pageProps": {"product":
                {"name": "Odd Widget", "price": [["849"]]}}}}
            </script>"#,
        );
        let p = try_extract(&doc).unwrap();
        assert_eq!(p.price.as_deref(), Some("849"));
    }

    #[test]
    fn test_depth_bound_holds() {
        // A product buried beyond MAX_DEPTH is not found, and the traversal
        // terminates instead of blowing the stack.
        let mut inner = r#"{"name": "Too Deep", "price": 1}"#.to_string();
        for _ in 0..40 {
            inner = format!(r#"{{"wrap": {inner}}}"#);
        }
        let html = format!(
            r#"<script id="__NEXT_DATA__">{{"props": {{"pageProps": {inner}}}}}</script>"#
        );
        let doc = parse(&html);
        assert!(try_extract(&doc).is_none());
    }

    #[test]
    fn test_malformed_state_declines() {
        let doc = parse(r#"<script id="__NEXT_DATA__">{broken json</script>"#);
        assert!(try_extract(&doc).is_none());
    }

    #[test]
    fn test_requires_name_or_price() {
        let doc = parse(
            r#"<script id="__NEXT_DATA__">
            {"props": {"pageProps": {"misc": {"color": "red"}}}}
            </script>"#,
        );
        assert!(try_extract(&doc).is_none());
    }
}
