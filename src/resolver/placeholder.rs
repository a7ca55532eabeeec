//! Deterministic letter badge, the step that never fails.
//!
//! The hue comes from a 32-bit string hash (`h = h * 31 + unit` over UTF-16
//! code units, wrapping), so the same label always gets the same color in
//! every client that implements the same hash.

use std::time::Duration;

use async_trait::async_trait;

use super::strategy::{IconStrategy, StepContext, StepError};
use crate::core::IconResult;
use crate::embed::icons::{BADGE_SVG, BadgeVars};
use crate::utils::mime;

/// Label used when neither hostname nor title is available.
pub const FALLBACK_LABEL: &str = "?";

/// 32-bit wrapping string hash over UTF-16 code units.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Hue in `0..360` for `s`.
pub fn hue(s: &str) -> u32 {
    string_hash(s).rem_euclid(360).unsigned_abs()
}

/// SVG badge colored by `seed`, showing the first letter of `letter`.
pub fn badge_svg(seed: &str, letter: &str) -> String {
    BADGE_SVG.render(&BadgeVars::new(hue(seed), letter))
}

/// Badge for `label` as a base64 SVG data URI.
pub fn badge(label: &str) -> IconResult {
    IconResult::from_bytes(mime::types::SVG, badge_svg(label, label).as_bytes())
}

pub struct Placeholder;

#[async_trait]
impl IconStrategy for Placeholder {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Recomputed every time so a later resolution can still find a real icon.
    fn cacheable(&self) -> bool {
        false
    }

    async fn attempt(&self, ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
        Ok(badge(ctx.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hash_reference_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("GitHub"), 2133168099);
        assert_eq!(string_hash("github.com"), 1985010934);
        assert_eq!(string_hash("example.com"), -1944013059);
    }

    #[test]
    fn test_hue() {
        assert_eq!(hue("GitHub"), 339);
        assert_eq!(hue("github.com"), 94);
        assert_eq!(hue("nas.local"), 77);
        // negative hashes wrap into range
        assert_eq!(hue("example.com"), 261);
        assert_eq!(hue(""), 0);
    }

    #[test]
    fn test_badge_is_deterministic_svg_data_uri() {
        let a = badge("github.com");
        assert_eq!(a, badge("github.com"));

        let IconResult::DataUri { ref mime, .. } = a else {
            panic!("expected data uri");
        };
        assert_eq!(mime, "image/svg+xml");

        let svg = String::from_utf8(a.decoded_bytes().unwrap()).unwrap();
        assert!(svg.contains("hsl(94, 70%, 60%)"));
        assert!(svg.contains(">G</text>"));
    }
}
