//! Agent-readiness scoring.
//!
//! Pure and deterministic: three equally-weighted checks over the extracted
//! record, each worth a third of 100. No I/O, no clock, no randomness.

use crate::extraction::ProductRecord;

pub const REC_NAME: &str = "Add structured product name in JSON-LD or HTML metadata.";
pub const REC_PRICE: &str = "Add price in machine-readable format.";
pub const REC_CURRENCY: &str = "Include product currency clearly.";
pub const REC_AVAILABILITY: &str = "Specify availability status clearly.";
pub const REC_AGENT_READY: &str = "Store is agent-ready ✅";

/// Score a product record, returning the score and recommendations.
///
/// Checks: name present; price AND currency present; availability present.
/// A failed price/currency check yields two recommendations (one for the
/// machine-readable price, one for the explicit currency). A perfect score
/// gets the single positive message.
pub fn score(product: &ProductRecord) -> (f64, Vec<String>) {
    let name_ok = product.name.is_some();
    let price_ok = product.price.is_some() && product.currency.is_some();
    let availability_ok = product.availability.is_some();

    let passed = [name_ok, price_ok, availability_ok]
        .iter()
        .filter(|ok| **ok)
        .count();
    let score = round2(passed as f64 / 3.0 * 100.0);

    let mut recommendations = Vec::new();
    if !name_ok {
        recommendations.push(REC_NAME.to_string());
    }
    if !price_ok {
        recommendations.push(REC_PRICE.to_string());
        recommendations.push(REC_CURRENCY.to_string());
    }
    if !availability_ok {
        recommendations.push(REC_AVAILABILITY.to_string());
    }
    if score == 100.0 {
        recommendations.push(REC_AGENT_READY.to_string());
    }

    (score, recommendations)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
