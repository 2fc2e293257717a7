//! Comparative Claim Detector
//!
//! Finds the comparison a claim makes and the metrics it compares:
//!
//! - multiplier and trend language ("doubled", "increased by 20%", "has fallen")
//! - two-sided comparisons ("more funding than the state average")
//! - a past anchor next to a present-tense metric ("is higher than in 2010")
//! - single quantities against a threshold or a count ("more than 25% of ...",
//!   "12 times")
//!
//! Detection is a pure function of the text. Metrics are the few words
//! immediately before the comparison marker (or after it, when nothing usable
//! precedes it), lowercased with articles and auxiliaries stripped.

use crate::patterns::{
    is_year, AUX_TREND, COMPARATIVE_WORDS, COUNT, MULTIPLE, MULTIPLIER_WORD, NUMBER,
    PERCENT_CHANGE, PRESENT_TENSE, TEMPORAL_ANCHOR, THRESHOLD, TREND_VERB, TWO_SIDED,
};
use factcheck_domain::traits::ComparisonDetector;
use factcheck_domain::{ComparativeDetection, ComparisonType, VerificationStep};

const MAX_METRIC_WORDS: usize = 4;

// Dropped from the end of the phrase before a marker
const TRAILING_NOISE: &[&str] = &[
    "has", "have", "had", "is", "are", "was", "were", "be", "been", "being", "will", "would",
    "could", "should", "can", "to", "at", "of", "by", "in", "on", "for", "from", "with", "than",
    "now", "currently", "already", "nearly", "almost", "just", "also", "still", "even", "fell",
    "rose", "grew", "increased", "decreased", "dropped", "declined", "climbed", "jumped", "spends",
    "spend", "spent", "pays", "paid", "earns", "earned", "costs", "cost", "gets", "get", "got",
    "makes", "made", "receives", "received", "reached", "hit", "totals", "totaled",
];

// The subject before a marker ends at the first of these
const COPULAS: &[&str] = &[
    "is", "are", "was", "were", "has", "have", "had", "will", "would", "be", "been",
];

// Dropped from the start of a phrase
const LEADING_NOISE: &[&str] = &[
    "the", "a", "an", "our", "their", "its", "his", "her", "this", "that", "these", "those", "my",
    "your", "of", "in", "on", "he", "she", "they", "we", "i", "it", "some",
];

// A phrase after a marker ends at these words
const PHRASE_STOPS: &[&str] = &[
    "is", "are", "was", "were", "has", "have", "had", "will", "would", "than", "that", "which",
    "who", "since", "in", "on", "at", "by", "for", "from", "with", "when", "while", "because",
    "and", "but",
];

// A phrase before a marker starts after these words
const CLAUSE_WORDS: &[&str] = &[
    "that", "which", "who", "and", "but", "because", "while", "when", "where",
];

// Words allowed between "than" and a time anchor ("than it was in 2010")
const ANCHOR_FILLER: &[&str] = &["it", "they", "there", "was", "were", "had", "been", "did"];

/// Stateless detector backed by [`detect`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Detector;

impl ComparisonDetector for Detector {
    fn detect(&self, claim_text: &str) -> ComparativeDetection {
        detect(claim_text)
    }
}

/// A two-sided comparison found in the text
struct TwoSided<'t> {
    start: usize,
    between: &'t str,
    rhs: &'t str,
    anchor: Option<String>,
}

/// Detect the comparative structure of a claim
pub fn detect(claim_text: &str) -> ComparativeDetection {
    let text = claim_text.trim();
    if text.is_empty() {
        return ComparativeDetection::none();
    }

    let multiplier = MULTIPLIER_WORD.find(text).map(|m| (m.start(), m.end()));
    let percent_change = PERCENT_CHANGE.find(text).map(|m| (m.start(), m.end()));
    let aux_trend = AUX_TREND.find(text).map(|m| (m.start(), m.end()));
    let trend_verb = TREND_VERB.find(text).map(|m| (m.start(), m.end()));
    let multiple = MULTIPLE.find(text).map(|m| (m.start(), m.end()));
    let two_sided = find_two_sided(text);
    let threshold = THRESHOLD.find(text).map(|m| (m.start(), m.end()));
    let count = find_count(text);
    let anchor = TEMPORAL_ANCHOR.find(text).map(|m| (m.start(), m.end()));
    let bare_number = find_number_outside(text, anchor);

    let rhs_anchor = two_sided.as_ref().and_then(|t| t.anchor.clone());
    let time_reference =
        rhs_anchor.clone().or_else(|| anchor.map(|(s, e)| text[s..e].to_string()));

    let two_sided_at = two_sided.as_ref().map(|t| (t.start, t.start));
    let series_marker = multiplier
        .or(percent_change)
        .or(aux_trend)
        .or(multiple)
        .or(two_sided_at)
        .or(trend_verb)
        .or(threshold)
        .or(count)
        .or(bare_number);

    let is_temporal =
        time_reference.is_some() && series_marker.is_some() && PRESENT_TENSE.is_match(text);
    let is_trend = multiplier.is_some()
        || percent_change.is_some()
        || aux_trend.is_some()
        || (trend_verb.is_some() && anchor.is_some());
    let is_ratio = multiple.is_some() || (two_sided.is_some() && rhs_anchor.is_none());
    let is_direct = threshold.is_some() || count.is_some();

    let comparison_type = if is_temporal {
        ComparisonType::Temporal
    } else if is_trend {
        if percent_change.is_some() {
            ComparisonType::PercentageChange
        } else {
            ComparisonType::Trend
        }
    } else if is_ratio {
        ComparisonType::Ratio
    } else if is_direct {
        ComparisonType::Direct
    } else {
        return ComparativeDetection::none();
    };

    let marker = match comparison_type {
        ComparisonType::Ratio => multiple.or(two_sided_at),
        ComparisonType::Direct => threshold.or(count),
        _ => series_marker,
    };
    // Every branch above that assigns a type has a marker.
    let Some((marker_start, marker_end)) = marker else {
        return ComparativeDetection::none();
    };

    let (metrics, verification_steps) = if comparison_type == ComparisonType::Ratio {
        let left = match &two_sided {
            Some(t) if multiple.is_none() && !t.between.trim().is_empty() => {
                following_phrase(t.between)
            }
            _ => preceding_phrase(text, marker_start),
        };
        let right = two_sided
            .as_ref()
            .map(|t| following_phrase(t.rhs))
            .filter(|r| !r.is_empty());
        metric_pair(left, right)
    } else {
        let partitive = text[marker_end..]
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("of ");
        let before = preceding_phrase(text, marker_start);
        let after = following_phrase(&text[marker_end..]);
        let metric = if (partitive || before.is_empty()) && !after.is_empty() {
            after
        } else {
            before
        };
        metric_pair(metric, None)
    };

    ComparativeDetection {
        is_comparative: true,
        comparison_type: Some(comparison_type),
        is_temporal,
        is_trend,
        metrics,
        time_reference,
        verification_steps,
    }
}

fn metric_pair(left: String, right: Option<String>) -> (Vec<String>, Vec<VerificationStep>) {
    if left.is_empty() {
        return (right.into_iter().collect(), Vec::new());
    }

    let mut metrics = vec![left.clone()];
    if let Some(r) = &right {
        if *r != left {
            metrics.push(r.clone());
        }
    }
    let steps = vec![VerificationStep {
        left_metric: left,
        right_metric: right,
    }];
    (metrics, steps)
}

fn find_two_sided(text: &str) -> Option<TwoSided<'_>> {
    for caps in TWO_SIDED.captures_iter(text) {
        let (Some(whole), Some(rhs)) = (caps.get(0), caps.name("rhs")) else {
            continue;
        };
        let rhs_text = rhs.as_str().trim();
        let first = rhs_text.split_whitespace().next().unwrap_or("");
        let first_digits = first.trim_end_matches(|c: char| !c.is_ascii_digit());

        let anchor = if is_year(first_digits) {
            Some(first_digits.to_string())
        } else {
            leading_anchor(rhs_text)
        };

        // "more than 25%" is a threshold, not a second side
        if anchor.is_none() && (first.starts_with('$') || first.starts_with(|c: char| c.is_ascii_digit())) {
            continue;
        }

        return Some(TwoSided {
            start: whole.start(),
            between: caps.name("between").map_or("", |m| m.as_str()),
            rhs: rhs.as_str(),
            anchor,
        });
    }
    None
}

/// Time anchor at the start of a comparison's right-hand side
fn leading_anchor(rhs: &str) -> Option<String> {
    let m = TEMPORAL_ANCHOR.find(rhs)?;
    let filler_only = rhs[..m.start()]
        .split_whitespace()
        .all(|w| ANCHOR_FILLER.contains(&clean_word(w).as_str()));
    filler_only.then(|| m.as_str().to_string())
}

fn find_count(text: &str) -> Option<(usize, usize)> {
    COUNT
        .find_iter(text)
        .find(|m| {
            let next = text[m.end()..].split_whitespace().next().map(clean_word);
            !next.is_some_and(|w| COMPARATIVE_WORDS.contains(&w.as_str()))
        })
        .map(|m| (m.start(), m.end()))
}

fn find_number_outside(text: &str, anchor: Option<(usize, usize)>) -> Option<(usize, usize)> {
    NUMBER
        .find_iter(text)
        .find(|m| {
            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            let in_anchor = anchor.is_some_and(|(s, e)| m.start() >= s && m.end() <= e);
            !in_anchor && !is_year(&digits)
        })
        .map(|m| (m.start(), m.end()))
}

fn clean_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Metric phrase ending right before `end`
fn preceding_phrase(text: &str, end: usize) -> String {
    let head = &text[..end];
    let clause_start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| matches!(c, ',' | ';' | ':' | '(' | '"' | '\u{201C}'))
        .map_or(0, |(i, c)| i + c.len_utf8());

    let mut words: Vec<String> = head[clause_start..]
        .split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(pos) = words.iter().rposition(|w| CLAUSE_WORDS.contains(&w.as_str())) {
        words.drain(..=pos);
    }
    if let Some(pos) = words
        .iter()
        .skip(1)
        .position(|w| COPULAS.contains(&w.as_str()))
    {
        words.truncate(pos + 1);
    }
    while words
        .last()
        .is_some_and(|w| TRAILING_NOISE.contains(&w.as_str()))
    {
        words.pop();
    }

    let keep_from = words.len().saturating_sub(MAX_METRIC_WORDS);
    let mut words = words.split_off(keep_from);
    while words
        .first()
        .is_some_and(|w| LEADING_NOISE.contains(&w.as_str()))
    {
        words.remove(0);
    }
    words.join(" ")
}

/// Metric phrase starting at the beginning of `tail`
fn following_phrase(tail: &str) -> String {
    let clause_end = tail
        .find(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | '(' | ')'))
        .unwrap_or(tail.len());

    let mut out = Vec::new();
    let mut leading = true;
    for word in tail[..clause_end].split_whitespace().map(clean_word) {
        if word.is_empty() {
            continue;
        }
        if leading && LEADING_NOISE.contains(&word.as_str()) {
            continue;
        }
        leading = false;
        if PHRASE_STOPS.contains(&word.as_str()) {
            break;
        }
        out.push(word);
        if out.len() == MAX_METRIC_WORDS {
            break;
        }
    }
    out.join(" ")
}
