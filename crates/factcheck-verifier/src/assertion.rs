//! What a comparative claim asserts
//!
//! "doubled" asserts a ratio of 2 between the current and historical value,
//! "more than 25%" asserts a lower bound on a single value, "12 times"
//! asserts an exact count.

use crate::quantity::{scale_factor, QuantityKind};
use factcheck_domain::{Comparator, ComparativeDetection, ComparisonType, ExpectedOutcome};
use factcheck_extractor::patterns::{
    is_downward, number_word, COUNT, LESSER_WORDS, MULTIPLE, MULTIPLIER_WORD, PERCENT_CHANGE,
    THRESHOLD, TREND_TARGET, TREND_VERB, TWO_SIDED,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DIRECTION_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<dir>up|down)\b").unwrap());

// Words after "20%" that make it a change rather than a level
const CHANGE_WORDS: &[&str] = &[
    "higher", "more", "greater", "larger", "bigger", "lower", "less", "smaller", "fewer",
];

/// Which figure the expected outcome is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// `left / right` (or `current / historical`)
    Ratio,
    /// `left - right`
    Difference,
    /// The single extracted value (the current value for a time series)
    Value,
}

/// A parsed assertion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Expected result
    pub outcome: ExpectedOutcome,
    /// Figure the outcome applies to
    pub measure: Measure,
    /// Kind of figure the claim names, for [`Measure::Value`] assertions
    pub unit: Option<QuantityKind>,
}

impl Assertion {
    fn ratio(outcome: ExpectedOutcome) -> Self {
        Self {
            outcome,
            measure: Measure::Ratio,
            unit: None,
        }
    }

    fn value(outcome: ExpectedOutcome, unit: QuantityKind) -> Self {
        Self {
            outcome,
            measure: Measure::Value,
            unit: Some(unit),
        }
    }
}

/// Parse the assertion a comparative claim makes
///
/// Returns `None` for non-comparative detections and for claims whose
/// wording names a comparison without saying what it amounts to
/// ("compared to last year").
///
/// ```
/// use factcheck_domain::ExpectedOutcome;
/// use factcheck_extractor::detect;
/// use factcheck_verifier::{parse_expected, Measure};
///
/// let text = "The federal deficit has doubled since 2023.";
/// let assertion = parse_expected(text, &detect(text)).unwrap();
/// assert_eq!(assertion.outcome, ExpectedOutcome::Ratio { value: 2.0 });
/// assert_eq!(assertion.measure, Measure::Ratio);
/// ```
pub fn parse_expected(text: &str, detection: &ComparativeDetection) -> Option<Assertion> {
    match detection.comparison_type? {
        ComparisonType::Temporal | ComparisonType::Trend | ComparisonType::PercentageChange => {
            series_assertion(text)
        }
        ComparisonType::Ratio => ratio_assertion(text),
        ComparisonType::Direct => direct_assertion(text),
    }
}

fn series_assertion(text: &str) -> Option<Assertion> {
    if let Some(caps) = MULTIPLIER_WORD.captures(text) {
        let value = match caps["word"].to_ascii_lowercase().as_str() {
            "doubled" => 2.0,
            "tripled" => 3.0,
            "quadrupled" => 4.0,
            _ => 0.5,
        };
        return Some(Assertion::ratio(ExpectedOutcome::Ratio { value }));
    }

    // "fell to less than 4%" bounds where the series ended up
    if let Some(caps) = TREND_TARGET.captures(text) {
        let value = threshold_value(&caps)?;
        let op = caps.name("op").map(|m| m.as_str());
        return Some(Assertion::value(bounded(op, value), unit_kind(&caps)));
    }

    if let Some(caps) = PERCENT_CHANGE.captures(text) {
        let change = caps["num"].parse::<f64>().ok()? / 100.0;
        let op = caps.name("op").map(|m| m.as_str());
        return Some(Assertion::ratio(change_outcome(
            op,
            is_downward(&caps["verb"]),
            change,
        )));
    }

    if let Some(caps) = MULTIPLE.captures(text) {
        return multiple_value(&caps).map(|value| Assertion::ratio(ExpectedOutcome::Ratio { value }));
    }

    if let Some(caps) = THRESHOLD.captures(text) {
        return threshold_in_series(text, &caps);
    }

    let qualitative = TWO_SIDED
        .captures_iter(text)
        .filter(|caps| !caps.name("rhs").is_some_and(|rhs| starts_numeric(rhs.as_str())))
        .find_map(|caps| caps.name("cmp").map(|cmp| is_lesser(cmp.as_str())));
    if let Some(lesser) = qualitative {
        return Some(Assertion::ratio(above_or_below(lesser, 1.0)));
    }

    if let Some(caps) = TREND_VERB.captures(text) {
        return Some(Assertion::ratio(above_or_below(is_downward(&caps["verb"]), 1.0)));
    }

    DIRECTION_WORD.captures(text).map(|caps| {
        Assertion::ratio(above_or_below(caps["dir"].eq_ignore_ascii_case("down"), 1.0))
    })
}

/// "more than 20% higher than in 2010" bounds the change; "over $4 since
/// 2021" bounds the current level
fn threshold_in_series(text: &str, caps: &Captures<'_>) -> Option<Assertion> {
    let whole = caps.get(0)?;
    let op = caps.name("op").map(|m| m.as_str());
    let percent = unit_kind(caps) == QuantityKind::Percent;
    let next = text[whole.end()..]
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase());

    match next {
        Some(word) if percent && CHANGE_WORDS.contains(&word.as_str()) => {
            let change = threshold_value(caps)?;
            Some(Assertion::ratio(change_outcome(op, is_lesser(&word), change)))
        }
        _ => Some(Assertion::value(bounded(op, threshold_value(caps)?), unit_kind(caps))),
    }
}

fn ratio_assertion(text: &str) -> Option<Assertion> {
    if let Some(caps) = MULTIPLE.captures(text) {
        return multiple_value(&caps).map(|value| Assertion::ratio(ExpectedOutcome::Ratio { value }));
    }

    let cmp = TWO_SIDED.captures(text)?.name("cmp")?;
    Some(Assertion {
        outcome: above_or_below(is_lesser(cmp.as_str()), 0.0),
        measure: Measure::Difference,
        unit: None,
    })
}

fn direct_assertion(text: &str) -> Option<Assertion> {
    if let Some(caps) = THRESHOLD.captures(text) {
        let value = threshold_value(&caps)?;
        let op = caps.name("op").map(|m| m.as_str());
        return Some(Assertion::value(bounded(op, value), unit_kind(&caps)));
    }

    let caps = COUNT.captures(text)?;
    let value = caps["n"].parse().ok()?;
    Some(Assertion::value(
        ExpectedOutcome::Exact { value },
        QuantityKind::Number,
    ))
}

/// Operator named by a qualifier; approximations have none
fn bound_comparator(op: &str) -> Option<Comparator> {
    match op.to_ascii_lowercase().as_str() {
        "more than" | "over" | "above" => Some(Comparator::GreaterThan),
        "at least" => Some(Comparator::AtLeast),
        "less than" | "fewer than" | "under" | "below" => Some(Comparator::LessThan),
        "at most" | "no more than" => Some(Comparator::AtMost),
        _ => None,
    }
}

fn bounded(op: Option<&str>, value: f64) -> ExpectedOutcome {
    match op.and_then(bound_comparator) {
        Some(comparator) => ExpectedOutcome::Threshold { comparator, value },
        None => ExpectedOutcome::Exact { value },
    }
}

/// Outcome on `current / historical` for a change of `change` (a fraction)
///
/// A qualified change bounds the ratio; a larger fall is a smaller ratio,
/// so the operator flips for downward changes.
fn change_outcome(op: Option<&str>, downward: bool, change: f64) -> ExpectedOutcome {
    let value = if downward { 1.0 - change } else { 1.0 + change };
    match op.and_then(bound_comparator) {
        Some(comparator) if downward => ExpectedOutcome::Threshold {
            comparator: comparator.mirrored(),
            value,
        },
        Some(comparator) => ExpectedOutcome::Threshold { comparator, value },
        None => ExpectedOutcome::Ratio { value },
    }
}

/// Factor named by "three times higher", "twice as", "half as"
fn multiple_value(caps: &Captures<'_>) -> Option<f64> {
    if let Some(word) = caps.name("w") {
        return number_word(word.as_str());
    }
    let n = caps.name("n")?.as_str();
    let factor = n.parse::<f64>().ok().or_else(|| number_word(n))?;
    if factor == 0.0 {
        return None;
    }
    let lesser = caps[0].split_whitespace().any(is_lesser);
    Some(if lesser { 1.0 / factor } else { factor })
}

fn threshold_value(caps: &Captures<'_>) -> Option<f64> {
    let mut value: f64 = caps["num"]
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .ok()?;
    match caps.name("unit").map(|u| u.as_str().to_ascii_lowercase()) {
        Some(unit) if unit == "%" || unit == "percent" => value /= 100.0,
        Some(unit) => value *= scale_factor(&unit),
        None => {}
    }
    Some(value)
}

fn unit_kind(caps: &Captures<'_>) -> QuantityKind {
    let percent = caps
        .name("unit")
        .is_some_and(|u| u.as_str() == "%" || u.as_str().eq_ignore_ascii_case("percent"));
    if percent {
        QuantityKind::Percent
    } else if caps["num"].starts_with('$') {
        QuantityKind::Currency
    } else {
        QuantityKind::Number
    }
}

fn starts_numeric(text: &str) -> bool {
    text.trim_start()
        .starts_with(|c: char| c == '$' || c.is_ascii_digit())
}

fn is_lesser(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    LESSER_WORDS.contains(&word.as_str())
}

fn above_or_below(below: bool, bound: f64) -> ExpectedOutcome {
    let comparator = if below {
        Comparator::LessThan
    } else {
        Comparator::GreaterThan
    };
    ExpectedOutcome::Threshold {
        comparator,
        value: bound,
    }
}
