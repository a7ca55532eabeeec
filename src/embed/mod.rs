//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `icons` - SVG icons served by the HTTP service and used as fallbacks
//!
//! # Usage
//!
//! ```ignore
//! use embed::icons::{BADGE_SVG, BadgeVars, NETWORK_ICON_SVG};
//!
//! let svg = BADGE_SVG.render(&BadgeVars::new(339, "GitHub"));
//! ```

mod template;

pub use template::{Template, TemplateVars, escape_xml};

pub mod icons {
    use super::{Template, TemplateVars, escape_xml};

    /// Generic "device on your network" icon.
    pub const NETWORK_ICON_SVG: &str = include_str!("icons/network-icon.svg");

    /// Variables for badge.svg.
    pub struct BadgeVars {
        pub fill: String,
        pub text_color: &'static str,
        /// Single display character, already uppercased.
        pub letter: String,
    }

    impl BadgeVars {
        /// Badge for `label` on an `hsl(hue, 70%, 60%)` background.
        ///
        /// The letter is the first character of `label`, uppercased; `?` when
        /// `label` is blank.
        pub fn new(hue: u32, label: &str) -> Self {
            let letter = label
                .trim()
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "?".to_string());
            Self {
                fill: format!("hsl({hue}, 70%, 60%)"),
                text_color: "#FFFFFF",
                letter,
            }
        }
    }

    impl TemplateVars for BadgeVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__FILL__", &self.fill)
                .replace("__TEXT__", self.text_color)
                .replace("__LETTER__", &escape_xml(&self.letter))
        }
    }

    /// 32x32 rounded letter badge.
    pub const BADGE_SVG: Template<BadgeVars> = Template::new(include_str!("icons/badge.svg"));
}

#[cfg(test)]
mod tests {
    use super::icons::*;

    #[test]
    fn test_badge_render() {
        let svg = BADGE_SVG.render(&BadgeVars::new(339, "github.com"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="32""#));
        assert!(svg.contains(r#"rx="6""#));
        assert!(svg.contains("hsl(339, 70%, 60%)"));
        assert!(svg.contains(">G</text>"));
        assert!(!svg.contains("__"));
    }

    #[test]
    fn test_badge_blank_and_escaped() {
        let blank = BADGE_SVG.render(&BadgeVars::new(0, "  "));
        assert!(blank.contains(">?</text>"));

        let amp = BADGE_SVG.render(&BadgeVars::new(0, "&co"));
        assert!(amp.contains(">&amp;</text>"));
    }

    #[test]
    fn test_network_icon_is_svg() {
        assert!(NETWORK_ICON_SVG.trim_start().starts_with("<svg"));
    }
}
