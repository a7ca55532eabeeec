//! `linkicon classify`: show how URLs are classified.

use crate::core::{Basis, Locality, LocalityVerdict, classify};
use crate::logger::{outcome_ok, outcome_warn};

pub fn run_classify(urls: &[String]) {
    for url in urls {
        let verdict = classify(url);
        let line = describe(url, &verdict);
        if verdict.basis == Basis::Unparseable {
            outcome_warn(&line);
        } else {
            outcome_ok(&line);
        }
    }
}

fn describe(url: &str, verdict: &LocalityVerdict) -> String {
    let locality = match verdict.locality {
        Locality::Internal => "internal",
        Locality::External => "external",
    };
    match verdict.basis {
        Basis::Unparseable => format!("{url} {locality} (unparseable)"),
        _ => format!("{url} {locality}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(
            describe("http://nas.local", &classify("http://nas.local")),
            "http://nas.local internal"
        );
        assert_eq!(
            describe("not a url", &classify("not a url")),
            "not a url external (unparseable)"
        );
    }
}
