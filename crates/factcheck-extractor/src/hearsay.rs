//! Attribution without a source ("some say", "reports indicate")

use regex::Regex;
use std::sync::LazyLock;

static HEARSAY_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:some (?:people )?say|people are saying|reports indicate|it is said that|sources say|i've heard|i have heard|rumou?r has it|many believe|word is)\b",
    )
    .unwrap()
});

// A named source: "according to Reuters", "according to the CBO"
static NAMED_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[Aa]ccording to (?:the )?[A-Z][A-Za-z]+").unwrap()
});

const FIRST_MARKER: f64 = 0.6;
const EXTRA_MARKER: f64 = 0.15;

/// Number of unsourced-attribution markers in a sentence
pub fn marker_count(sentence: &str) -> usize {
    HEARSAY_MARKERS.find_iter(sentence).count()
}

/// Likelihood the sentence is reported secondhand
///
/// 0.0 without markers, 0.6 for the first marker and 0.15 for each further
/// one, capped at 1.0. Halved when a named source is also cited.
pub fn hearsay_confidence(sentence: &str) -> f64 {
    let markers = marker_count(sentence);
    if markers == 0 {
        return 0.0;
    }

    let base = (FIRST_MARKER + EXTRA_MARKER * (markers - 1) as f64).min(1.0);
    if NAMED_SOURCE.is_match(sentence) {
        base / 2.0
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers() {
        assert_eq!(hearsay_confidence("Unemployment fell to 3.9% in May."), 0.0);
    }

    #[test]
    fn test_single_marker() {
        assert_eq!(hearsay_confidence("Some say the plant will close."), 0.6);
        assert_eq!(hearsay_confidence("It is said that taxes will rise."), 0.6);
    }

    #[test]
    fn test_markers_accumulate_and_cap() {
        let two = hearsay_confidence("Some say it, and reports indicate more.");
        assert!((two - 0.75).abs() < 1e-9);
        let many = hearsay_confidence(
            "Some say, people are saying, sources say, reports indicate, word is, many believe.",
        );
        assert_eq!(many, 1.0);
    }

    #[test]
    fn test_named_source_halves() {
        let score = hearsay_confidence("Reports indicate, according to Reuters, that it closed.");
        assert!((score - 0.3).abs() < 1e-9);
    }
}
