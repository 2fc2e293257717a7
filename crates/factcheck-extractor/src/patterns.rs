//! Comparison vocabulary shared by detection and assertion parsing
//!
//! The verifier parses what a claim asserts ("doubled" means a ratio of 2)
//! from the same expressions the detector uses to find the comparison, so
//! both sides read the vocabulary from here.

use regex::Regex;
use std::sync::LazyLock;

/// "doubled", "tripled", "quadrupled", "halved"
pub static MULTIPLIER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<word>doubled|tripled|quadrupled|halved)\b").unwrap()
});

/// "increased by 20%", "fell 3.5 percent", "up more than 50%"
///
/// `op` holds the qualifier in front of the figure, if any.
pub static PERCENT_CHANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<verb>increased|decreased|rose|risen|fell|fallen|grew|grown|dropped|declined|climbed|jumped|surged|plunged|shrank|shrunk|went up|went down|gone up|gone down|up|down)\s+(?:by\s+)?(?:(?P<op>no more than|more than|over|above|at least|less than|under|below|at most|nearly|almost|about|roughly|approximately|around)\s+)?(?P<num>\d+(?:\.\d+)?)\s*(?:%|percent\b)",
    )
    .unwrap()
});

/// "fell to less than 4%", "rose to $3.50": a bound on the new level
pub static TREND_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<verb>increased|decreased|rose|risen|fell|fallen|grew|grown|dropped|declined|climbed|jumped|surged|plunged|shrank|shrunk|went up|went down|gone up|gone down|skyrocketed|soared)\s+to\s+(?:(?P<op>no more than|more than|over|above|at least|less than|fewer than|under|below|at most|nearly|almost|about|roughly|approximately|exactly|around)\s+)?(?P<num>\$?\d[\d,]*(?:\.\d+)?)\s*(?P<unit>%|percent\b|trillion\b|billion\b|million\b|thousand\b)?",
    )
    .unwrap()
});

/// Direction verbs on their own ("rose", "has fallen")
pub static TREND_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<verb>increased|decreased|rose|risen|fell|fallen|grew|grown|dropped|declined|climbed|jumped|surged|plunged|shrank|shrunk|went up|went down|gone up|gone down|skyrocketed|soared)\b",
    )
    .unwrap()
});

/// Direction verb with a perfect auxiliary ("has risen", "have been cut")
pub static AUX_TREND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:has|have|had)\s+(?:been\s+)?(?P<verb>increased|decreased|risen|fallen|grown|dropped|declined|climbed|jumped|surged|plunged|shrunk|gone up|gone down|skyrocketed|soared)\b",
    )
    .unwrap()
});

/// "three times higher", "2.5 times as much", "twice as many"
pub static MULTIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?P<n>\d+(?:\.\d+)?|two|three|four|five|six|seven|eight|nine|ten)\s+times\s+(?:more|less|fewer|higher|lower|larger|bigger|greater|smaller|as\s+\w+)|(?P<w>twice|half)\s+as\s+\w+)\b",
    )
    .unwrap()
});

/// "more than <rhs>", "less funding than <rhs>", "compared to <rhs>"
///
/// Up to two words may sit between the comparative and "than"; the
/// right-hand side runs to the next clause break.
pub static TWO_SIDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?P<cmp>more|less|fewer|higher|lower|greater|larger|smaller|bigger|faster|slower|worse|better|cheaper|costlier)(?P<between>(?:\s+[a-z]+){0,2}?)\s+than|compared\s+(?:to|with)|versus|vs\.)\s+(?P<rhs>[^,;!?]+)",
    )
    .unwrap()
});

/// Comparatives that assert the left side is the smaller one
pub const LESSER_WORDS: &[&str] = &[
    "less", "fewer", "lower", "smaller", "slower", "cheaper",
];

/// "more than 25%", "at least $3 million", "nearly 40"
pub static THRESHOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<op>no more than|more than|over|above|at least|less than|fewer than|under|below|at most|nearly|almost|about|roughly|approximately|exactly|around)\s+(?P<num>\$?\d[\d,]*(?:\.\d+)?)\s*(?P<unit>%|percent\b|trillion\b|billion\b|million\b|thousand\b)?",
    )
    .unwrap()
});

/// "12 times" (a count, unless a comparative word follows)
pub static COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?P<n>\d+)\s+times\b").unwrap());

/// Past anchors: "since 2023", "two years ago", "in 2010", "last year"
pub static TEMPORAL_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:since\s+(?:(?:19|20)\d{2}|last\s+\w+|(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+(?:19|20)\d{2}|(?:he|she|they|i|we)\s+took\s+office|the\s+(?:start|beginning)\s+of\s+\w+)|(?:\d+|a|one|two|three|four|five|six|seven|eight|nine|ten)\s+(?:years?|months?|decades?)\s+ago|(?:back\s+)?in\s+(?:19|20)\d{2}|last\s+(?:year|month|decade))\b",
    )
    .unwrap()
});

/// Present-tense markers
pub static PRESENT_TENSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:is|are|has|have|now|today|currently|remains?|this year)\b").unwrap()
});

/// Any number, with optional currency sign and thousands separators
pub static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\d[\d,]*(?:\.\d+)?").unwrap());

/// Actor, action and quantity: "Senator Smith cut $2 billion from schools"
///
/// Groups: `actor`, `action`, `object` (words between action and quantity),
/// `quantity`, `scale` and `tail` (rest of the clause).
pub static STRUCTURED_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<actor>(?i:my opponent|the (?:senator|governor|mayor|president|incumbent|administration|congressman|congresswoman|candidate|council))|(?:[A-Z][a-z]+\s+){0,2}[A-Z][a-z]+|(?i:he|she|they|we|i))\s+(?:(?i:has|have|had)\s+)?(?P<action>(?i:voted\s+(?:for|against)|cut|raised|lowered|reduced|increased|passed|signed|sponsored|funded|spent|secured|vetoed|approved|blocked|delivered|created|added|allocated))\b(?P<object>[^.!?$\d]*?)(?P<quantity>\$?\d[\d,]*(?:\.\d+)?)\s*(?P<scale>%|(?i:percent|thousand|million|billion|trillion)\b)?(?P<tail>[^!?]*)",
    )
    .unwrap()
});

/// Words that follow "N times" when it is a multiplier rather than a count
pub const COMPARATIVE_WORDS: &[&str] = &[
    "more", "less", "fewer", "higher", "lower", "larger", "bigger", "greater", "smaller", "as",
];

/// Verbs that describe a downward movement
pub const DOWNWARD_VERBS: &[&str] = &[
    "decreased", "fell", "fallen", "dropped", "declined", "plunged", "shrank", "shrunk",
    "went down", "gone down", "halved", "down",
];

/// Value of a spelled-out small number
pub fn number_word(word: &str) -> Option<f64> {
    let value = match word.to_ascii_lowercase().as_str() {
        "a" | "one" | "once" => 1.0,
        "two" | "twice" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "half" => 0.5,
        _ => return None,
    };
    Some(value)
}

/// Whether a digit string looks like a calendar year rather than a quantity
pub fn is_year(digits: &str) -> bool {
    digits.len() == 4
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits
            .parse::<u32>()
            .is_ok_and(|y| (1800..=2100).contains(&y))
}

/// Whether `verb` names a downward movement
pub fn is_downward(verb: &str) -> bool {
    let verb = verb.to_ascii_lowercase();
    DOWNWARD_VERBS.iter().any(|d| *d == verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_variants() {
        assert!(MULTIPLE.is_match("three times higher than in 2010"));
        assert!(MULTIPLE.is_match("2.5 times as much as"));
        assert!(MULTIPLE.is_match("twice as many people"));
        assert!(!MULTIPLE.is_match("voted 12 times"));
    }

    #[test]
    fn test_percent_change_keeps_qualifier() {
        let caps = PERCENT_CHANGE
            .captures("Property taxes have increased by more than 20% since 2020.")
            .unwrap();
        assert_eq!(&caps["verb"], "increased");
        assert_eq!(&caps["op"], "more than");
        assert_eq!(&caps["num"], "20");

        let caps = PERCENT_CHANGE.captures("Gas prices are up 12 percent.").unwrap();
        assert_eq!(&caps["verb"], "up");
        assert!(caps.name("op").is_none());
        assert!(is_downward("down"));
    }

    #[test]
    fn test_trend_target() {
        let caps = TREND_TARGET
            .captures("Unemployment fell to less than 4% since 2023.")
            .unwrap();
        assert_eq!(&caps["op"], "less than");
        assert_eq!(&caps["num"], "4");
        assert_eq!(&caps["unit"], "%");
        assert!(!TREND_TARGET.is_match("Unemployment fell 4% since 2023."));
    }

    #[test]
    fn test_threshold_prefers_no_more_than() {
        let caps = THRESHOLD.captures("no more than 10 percent").unwrap();
        assert_eq!(&caps["op"], "no more than");
    }

    #[test]
    fn test_temporal_anchor_forms() {
        for text in ["since 2023", "two years ago", "in 2010", "last year", "since she took office"] {
            assert!(TEMPORAL_ANCHOR.is_match(text), "{text}");
        }
        assert!(!TEMPORAL_ANCHOR.is_match("in 25 states"));
    }

    #[test]
    fn test_structured_shape_groups() {
        let caps = STRUCTURED_SHAPE
            .captures("Senator Smith cut $2 billion from schools.")
            .unwrap();
        assert_eq!(&caps["actor"], "Senator Smith");
        assert_eq!(&caps["action"], "cut");
        assert_eq!(&caps["quantity"], "$2");
        assert_eq!(&caps["scale"], "billion");

        let caps = STRUCTURED_SHAPE
            .captures("The senator voted against the bill 12 times.")
            .unwrap();
        assert_eq!(caps["actor"].to_lowercase(), "the senator");
        assert_eq!(caps["object"].trim(), "the bill");
    }

    #[test]
    fn test_year_detection() {
        assert!(is_year("2023"));
        assert!(!is_year("1750"));
        assert!(!is_year("12"));
        assert!(!is_year("20234"));
    }

    #[test]
    fn test_number_words() {
        assert_eq!(number_word("Three"), Some(3.0));
        assert_eq!(number_word("twice"), Some(2.0));
        assert_eq!(number_word("dozen"), None);
    }
}
