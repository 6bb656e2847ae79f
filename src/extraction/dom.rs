//! Strategy 4: site-specific DOM selectors.
//!
//! Fixed, ordered selector candidates per known site and field. The tables
//! chase each site's historical layouts, newest first; the first matching
//! element wins. Unknown sites decline — guessing selectors on arbitrary
//! layouts is the generic fallback's job.

use super::price::clean_price;
use super::ProductRecord;
use crate::site::SiteHint;
use scraper::{Html, Selector};

struct SelectorTable {
    name: &'static [&'static str],
    price: &'static [&'static str],
    availability: &'static [&'static str],
}

const AMAZON: SelectorTable = SelectorTable {
    name: &["#productTitle", "span#title", "h1 span"],
    price: &[
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        "span.a-price span.a-offscreen",
        "span#price_inside_buybox",
    ],
    availability: &["#availability span", "#availability .a-color-success"],
};

const FLIPKART: SelectorTable = SelectorTable {
    name: &["span.B_NuCI"],
    price: &["div._30jeq3._16Jk6d", "div._30jeq3"],
    availability: &["div._16FRp0", "div._2jcMA_"],
};

const MYNTRA: SelectorTable = SelectorTable {
    name: &["h1.pdp-title", "h1.pdp-name"],
    price: &[
        "span.pdp-price strong",
        "span.pdp-discount-price",
        "span.pdp-offers-offerPrice",
        "span.pdp-price",
    ],
    availability: &[],
};

/// Extract via the site's selector table. Declines for unrecognized sites.
pub fn try_extract(document: &Html, site: SiteHint) -> Option<ProductRecord> {
    let table = match site {
        SiteHint::Amazon => &AMAZON,
        SiteHint::Flipkart => &FLIPKART,
        SiteHint::Myntra => &MYNTRA,
        SiteHint::Generic => return None,
    };

    let name = first_text(document, table.name);

    let mut raw_price = first_text(document, table.price);
    if raw_price.is_none() && site == SiteHint::Amazon {
        // Newer Amazon layouts split the price across whole/symbol spans.
        raw_price = first_text(document, &["span.a-price-whole"]);
    }
    let price = raw_price.as_deref().and_then(clean_price);
    // Price text scraped off these sites is in local currency.
    let currency = price.as_ref().map(|_| "INR".to_string());

    let availability = match site {
        SiteHint::Myntra => myntra_availability(document),
        _ => first_text(document, table.availability),
    };

    Some(ProductRecord {
        name,
        price,
        currency,
        availability,
    })
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        if let Some(el) = document.select(&sel).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Myntra has no availability element; infer from the out-of-stock marker
/// or the presence of the add-to-bag button.
fn myntra_availability(document: &Html) -> Option<String> {
    if first_text(document, &["button.pdp-out-of-stock"]).is_some() {
        return Some("Out of stock".to_string());
    }
    let page_text = document.root_element().text().collect::<String>();
    if page_text.to_lowercase().contains("out of stock") {
        return Some("Out of stock".to_string());
    }
    if has_element(document, "button.pdp-add-to-bag") {
        return Some("In stock".to_string());
    }
    None
}

fn has_element(document: &Html, selector: &str) -> bool {
    Selector::parse(selector)
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}
