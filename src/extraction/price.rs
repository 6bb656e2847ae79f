//! Price text normalization.
//!
//! Raw price strings arrive in every shape the Indian e-commerce DOM can
//! produce: "₹1,299.00", "Rs. 499", "MRP ₹2,999 /-". `clean_price` reduces
//! them all to a canonical digits-and-dot form.

/// Normalize raw price text to digits and a decimal point.
///
/// Strips currency markers ("₹", "Rs.", "MRP", trailing "/-"), then drops
/// every remaining character that is not an ASCII digit or '.'. Returns
/// `None` when nothing numeric is left. Idempotent: an already-clean string
/// comes back unchanged.
pub fn clean_price(raw: &str) -> Option<String> {
    let mut text = raw.trim().to_string();
    for marker in ["₹", "Rs.", "MRP"] {
        text = text.replace(marker, "");
    }
    let text = text.trim().trim_end_matches("/-");

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupee_symbol_and_grouping() {
        assert_eq!(clean_price("₹1,299.00").as_deref(), Some("1299.00"));
    }

    #[test]
    fn test_marker_variants() {
        assert_eq!(clean_price("Rs. 499").as_deref(), Some("499"));
        assert_eq!(clean_price("MRP ₹2,999 /-").as_deref(), Some("2999"));
        assert_eq!(clean_price("  ₹ 12,345 ").as_deref(), Some("12345"));
    }

    #[test]
    fn test_empty_and_non_numeric() {
        assert_eq!(clean_price(""), None);
        assert_eq!(clean_price("Price unavailable"), None);
    }

    #[test]
    fn test_idempotent() {
        for raw in ["₹1,299.00", "499", "2999.50", "Rs. 78 /-", "free", ""] {
            let once = clean_price(raw);
            let twice = once.as_deref().and_then(clean_price);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
