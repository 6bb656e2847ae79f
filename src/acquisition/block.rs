//! Bot-challenge detection.
//!
//! Runs after every acquisition attempt, so it has to stay a single linear
//! scan over a lowercased copy of the payload. No DOM parse here.

use crate::site::SiteHint;

/// Substrings that mark a response as a block/challenge page on any site.
const BLOCK_SIGNALS: &[&str] = &[
    "captcha",
    "access denied",
    "automated access",
    "bot check",
    "too many requests",
    "service unavailable",
    "site maintenance",
];

/// Extra signals seen only on specific sites.
fn site_signals(site: SiteHint) -> &'static [&'static str] {
    match site {
        // Amazon's interstitial challenge page.
        SiteHint::Amazon => &["enter the characters you see below"],
        _ => &[],
    }
}

/// Classify an HTML payload as blocked/challenged vs usable.
///
/// Empty or absent HTML always counts as blocked — it is indistinguishable
/// from a failed fetch downstream.
pub fn is_blocked(site: SiteHint, html: &str) -> bool {
    if html.trim().is_empty() {
        return true;
    }

    let lowered = html.to_lowercase();
    BLOCK_SIGNALS
        .iter()
        .chain(site_signals(site))
        .any(|signal| lowered.contains(signal))
}
