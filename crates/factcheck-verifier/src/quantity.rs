//! Numeric extraction from evidence text
//!
//! Picks the first plausible quantity in a snippet that sits near a keyword
//! drawn from the metric name. When no quantity is near a keyword, the first
//! quantity in the snippet is used and flagged as a fallback.

use factcheck_extractor::patterns::is_year;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<cur>\$\s?)?\b(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?:\s*(?P<pct>%|percent\b))?(?:\s+(?P<scale>thousand|million|billion|trillion)\b)?",
    )
    .unwrap()
});

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "in", "on", "for", "to", "and", "or", "by", "with", "at", "from",
    "as", "than", "against", "current", "previous", "since", "last", "year", "our", "their",
    "its", "his", "her",
];

/// What kind of figure was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// A dollar amount
    Currency,
    /// A percentage, stored as a fraction
    Percent,
    /// Any other number
    Number,
}

impl QuantityKind {
    /// Whether a figure of kind `found` can stand in for this kind
    ///
    /// Percentages only compare with percentages. Dollar amounts and plain
    /// numbers compare with each other ("3 million" vs "$3 million").
    pub fn accepts(&self, found: QuantityKind) -> bool {
        (*self == QuantityKind::Percent) == (found == QuantityKind::Percent)
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuantityKind::Currency => "currency",
            QuantityKind::Percent => "percent",
            QuantityKind::Number => "number",
        };
        f.write_str(name)
    }
}

/// A number pulled out of evidence text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedQuantity {
    /// Substring the value was parsed from
    pub matched: String,
    /// Parsed value, scaled ("$1.8 trillion" is 1.8e12, "31%" is 0.31)
    pub value: f64,
    /// Kind of figure
    pub kind: QuantityKind,
    /// Whether a metric keyword was within the search window
    pub keyword_adjacent: bool,
}

struct Candidate {
    start: usize,
    end: usize,
    quantity: ExtractedQuantity,
}

/// Extract the first plausible quantity for `metric` from `snippet`
///
/// `window` is the maximum byte gap between the number and a metric keyword.
/// Bare years are never quantities.
///
/// ```
/// use factcheck_verifier::{extract_quantity, QuantityKind};
///
/// let q = extract_quantity("In 2023 the federal deficit was $1.7 trillion.", "federal deficit", 60)
///     .unwrap();
/// assert_eq!(q.matched, "$1.7 trillion");
/// assert_eq!(q.kind, QuantityKind::Currency);
/// assert!(q.keyword_adjacent);
/// ```
pub fn extract_quantity(snippet: &str, metric: &str, window: usize) -> Option<ExtractedQuantity> {
    extract_quantity_as(snippet, metric, window, None)
}

/// Like [`extract_quantity`], considering only figures `kind` accepts
///
/// ```
/// use factcheck_verifier::{extract_quantity_as, QuantityKind};
///
/// let snippet = "The VA workforce totals 400,000 employees, 31% of them veterans.";
/// let q = extract_quantity_as(snippet, "va workforce", 60, Some(QuantityKind::Percent)).unwrap();
/// assert_eq!(q.matched, "31%");
/// ```
pub fn extract_quantity_as(
    snippet: &str,
    metric: &str,
    window: usize,
    kind: Option<QuantityKind>,
) -> Option<ExtractedQuantity> {
    let candidates: Vec<Candidate> = QUANTITY
        .captures_iter(snippet)
        .filter_map(|caps| candidate(&caps))
        .filter(|c| kind.map_or(true, |k| k.accepts(c.quantity.kind)))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let keywords = keyword_positions(snippet, &metric_keywords(metric));
    let near = candidates.iter().position(|c| {
        keywords
            .iter()
            .any(|&(start, end)| gap(c.start, c.end, start, end) <= window)
    });

    match near {
        Some(i) => {
            let mut quantity = candidates.into_iter().nth(i)?.quantity;
            quantity.keyword_adjacent = true;
            Some(quantity)
        }
        None => candidates.into_iter().next().map(|c| c.quantity),
    }
}

/// Keywords a metric name contributes, stemmed and lowercased
pub fn metric_keywords(metric: &str) -> Vec<String> {
    metric
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.len() >= 2 && !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w).to_string())
        .collect()
}

fn stem(word: &str) -> &str {
    if word.len() > 5 && word.ends_with("ing") {
        &word[..word.len() - 3]
    } else if word.len() > 4 && word.ends_with("ed") {
        &word[..word.len() - 2]
    } else if word.len() > 4 && word.ends_with("ies") {
        &word[..word.len() - 3]
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        &word[..word.len() - 1]
    } else {
        word
    }
}

fn keyword_positions(snippet: &str, keywords: &[String]) -> Vec<(usize, usize)> {
    let lower = snippet.to_ascii_lowercase();
    let mut positions = Vec::new();
    for keyword in keywords {
        for (start, _) in lower.match_indices(keyword.as_str()) {
            let at_word_start = lower[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            if at_word_start {
                positions.push((start, start + keyword.len()));
            }
        }
    }
    positions
}

fn gap(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> usize {
    if b_end <= a_start {
        a_start - b_end
    } else if a_end <= b_start {
        b_start - a_end
    } else {
        0
    }
}

fn candidate(caps: &Captures<'_>) -> Option<Candidate> {
    let whole = caps.get(0)?;
    let num = caps.name("num")?.as_str();
    let currency = caps.name("cur").is_some();
    let percent = caps.name("pct").is_some();
    let scale = caps.name("scale").map(|m| m.as_str().to_ascii_lowercase());

    if !currency && !percent && scale.is_none() && is_year(num) {
        return None;
    }

    let mut value: f64 = num.replace(',', "").parse().ok()?;
    if let Some(scale) = scale.as_deref() {
        value *= scale_factor(scale);
    }
    let kind = if percent {
        value /= 100.0;
        QuantityKind::Percent
    } else if currency {
        QuantityKind::Currency
    } else {
        QuantityKind::Number
    };

    Some(Candidate {
        start: whole.start(),
        end: whole.end(),
        quantity: ExtractedQuantity {
            matched: whole.as_str().trim().to_string(),
            value,
            kind,
            keyword_adjacent: false,
        },
    })
}

/// Multiplier for a scale word
pub(crate) fn scale_factor(scale: &str) -> f64 {
    match scale {
        "thousand" => 1e3,
        "million" => 1e6,
        "billion" => 1e9,
        "trillion" => 1e12,
        _ => 1.0,
    }
}
