//! Strategy 2: social/e-commerce meta tags.
//!
//! For each target field, probe an ordered list of known property names and
//! take the first tag with non-empty content. Tags are matched on either
//! the `property` or the `name` attribute; both conventions are in the wild.

use super::ProductRecord;
use scraper::{Html, Selector};

const NAME_PROPS: &[&str] = &["og:title", "twitter:title"];
const PRICE_PROPS: &[&str] = &["product:price:amount", "og:price:amount"];
const CURRENCY_PROPS: &[&str] = &["product:price:currency", "og:price:currency"];
const AVAILABILITY_PROPS: &[&str] = &["product:availability", "og:availability"];

/// Extract product fields from meta tags. Declines when nothing resolved.
pub fn try_extract(document: &Html) -> Option<ProductRecord> {
    let record = ProductRecord {
        name: probe(document, NAME_PROPS),
        price: probe(document, PRICE_PROPS),
        currency: probe(document, CURRENCY_PROPS),
        availability: probe(document, AVAILABILITY_PROPS),
    };

    let empty = record.name.is_none()
        && record.price.is_none()
        && record.currency.is_none()
        && record.availability.is_none();
    if empty {
        None
    } else {
        Some(record)
    }
}

fn probe(document: &Html, props: &[&str]) -> Option<String> {
    for prop in props {
        let selector = format!(r#"meta[property="{prop}"], meta[name="{prop}"]"#);
        let Ok(sel) = Selector::parse(&selector) else {
            continue;
        };
        for el in document.select(&sel) {
            if let Some(content) = el.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}
