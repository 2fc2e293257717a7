//! Ordered classification rule table
//!
//! Each rule pairs an identifier with the claim type it implies and a
//! predicate over the signals computed for one sentence. Rules are listed in
//! priority order: the first rule that matches sets the claim type, and every
//! matching rule is recorded in `patterns_matched`.

use crate::deniability::DeniabilityScore;
use crate::patterns::{is_year, NUMBER, STRUCTURED_SHAPE};
use factcheck_domain::{ClaimType, ComparativeDetection, ComparisonType};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Everything the rules look at for one sentence
#[derive(Debug, Clone, Copy)]
pub struct SentenceSignals<'a> {
    /// Sentence text
    pub text: &'a str,
    /// Hedging score and matched deniability patterns
    pub deniability: &'a DeniabilityScore,
    /// Number of unsourced-attribution markers
    pub hearsay_markers: usize,
    /// Comparative structure of the sentence
    pub comparison: &'a ComparativeDetection,
}

/// One entry of the rule table
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    /// Identifier recorded in `patterns_matched`
    pub id: &'static str,
    /// Type assigned when this is the first rule to match
    pub claim_type: ClaimType,
    /// Whether the rule matches a sentence
    pub predicate: fn(&SentenceSignals<'_>) -> bool,
}

impl ClassificationRule {
    /// Evaluate the rule against a sentence
    pub fn matches(&self, signals: &SentenceSignals<'_>) -> bool {
        (self.predicate)(signals)
    }
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("id", &self.id)
            .field("claim_type", &self.claim_type)
            .finish()
    }
}

/// Rules counted as quantifiable indicators for direct factual confidence
pub const QUANTIFIABLE_RULES: &[&str] = &[
    "direct_factual.number",
    "direct_factual.date",
    "direct_factual.entity_fact",
];

/// The rule table, in priority order
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        id: "private_data.ssn",
        claim_type: ClaimType::PrivateData,
        predicate: has_ssn,
    },
    ClassificationRule {
        id: "private_data.phone",
        claim_type: ClaimType::PrivateData,
        predicate: has_phone,
    },
    ClassificationRule {
        id: "private_data.email",
        claim_type: ClaimType::PrivateData,
        predicate: has_email,
    },
    ClassificationRule {
        id: "private_data.street_address",
        claim_type: ClaimType::PrivateData,
        predicate: has_street_address,
    },
    ClassificationRule {
        id: "private_data.health_record",
        claim_type: ClaimType::PrivateData,
        predicate: has_health_record,
    },
    ClassificationRule {
        id: "plausible_deniability.hedging",
        claim_type: ClaimType::PlausibleDeniability,
        predicate: is_hedged,
    },
    ClassificationRule {
        id: "plausible_deniability.rhetorical_question",
        claim_type: ClaimType::PlausibleDeniability,
        predicate: is_rhetorical,
    },
    ClassificationRule {
        id: "hearsay.unsourced_attribution",
        claim_type: ClaimType::Hearsay,
        predicate: is_hearsay,
    },
    ClassificationRule {
        id: "comparative.temporal",
        claim_type: ClaimType::Comparative,
        predicate: is_temporal_comparison,
    },
    ClassificationRule {
        id: "comparative.trend",
        claim_type: ClaimType::Comparative,
        predicate: is_trend_comparison,
    },
    ClassificationRule {
        id: "comparative.ratio",
        claim_type: ClaimType::Comparative,
        predicate: is_ratio_comparison,
    },
    ClassificationRule {
        id: "comparative.direct",
        claim_type: ClaimType::Comparative,
        predicate: is_direct_comparison,
    },
    ClassificationRule {
        id: "structured.actor_action_quantity",
        claim_type: ClaimType::Structured,
        predicate: has_structured_shape,
    },
    ClassificationRule {
        id: "direct_factual.number",
        claim_type: ClaimType::DirectFactual,
        predicate: has_number,
    },
    ClassificationRule {
        id: "direct_factual.date",
        claim_type: ClaimType::DirectFactual,
        predicate: has_date,
    },
    ClassificationRule {
        id: "direct_factual.entity_fact",
        claim_type: ClaimType::DirectFactual,
        predicate: has_entity_fact,
    },
    ClassificationRule {
        id: "direct_factual.fact_verb",
        claim_type: ClaimType::DirectFactual,
        predicate: has_fact_verb,
    },
];

/// All rules matching a sentence, in priority order
pub fn evaluate(signals: &SentenceSignals<'_>) -> Vec<&'static ClassificationRule> {
    RULES.iter().filter(|rule| rule.matches(signals)).collect()
}

static SSN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\(\d{3}\)\s*|\b\d{3}[-.\s])\d{3}[-.]\d{4}\b").unwrap()
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+(?:\.[\w-]+)+\b").unwrap());

static STREET_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{1,5}\s+(?:[A-Z][a-z]+\s+){1,3}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Place|Pl|Way|Terrace)\b",
    )
    .unwrap()
});

static HEALTH_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:medical records?|health records?|patient (?:id|number|file)|diagnos(?:is|ed) with|prescriptions? for|medical history|HIV status|psychiatric (?:history|treatment))\b",
    )
    .unwrap()
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?:January|February|March|April|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\b|May\s+\d|\d{1,2}/\d{1,2}/\d{2,4}\b|(?:19|20)\d{2}\b)",
    )
    .unwrap()
});

static ENTITY_FACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<entity>[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*)\s+(?:is|are|was|were|has|have|had|voted|passed|signed|won|lost|holds|leads|employs|owns|spent|received|reported|announced|ranks)\b",
    )
    .unwrap()
});

static FACT_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:voted|passed|signed|won|lost|reported|announced|spent|cut|raised|increased|decreased|rose|fell|created|eliminated|approved|rejected|built|closed|opened|funded|costs?|employs|ranks|leads)\b",
    )
    .unwrap()
});

// Capitalized words that start sentences without naming anything
const NOT_ENTITIES: &[&str] = &[
    "The", "This", "That", "These", "Those", "It", "There", "He", "She", "They", "We", "I", "Our",
    "Their", "His", "Her", "My", "Your", "A", "An", "What", "Who", "Why", "How", "When", "Where",
];

fn has_ssn(s: &SentenceSignals<'_>) -> bool {
    SSN.is_match(s.text)
}

fn has_phone(s: &SentenceSignals<'_>) -> bool {
    PHONE.is_match(s.text)
}

fn has_email(s: &SentenceSignals<'_>) -> bool {
    EMAIL.is_match(s.text)
}

fn has_street_address(s: &SentenceSignals<'_>) -> bool {
    STREET_ADDRESS.is_match(s.text)
}

fn has_health_record(s: &SentenceSignals<'_>) -> bool {
    HEALTH_RECORD.is_match(s.text)
}

fn is_hedged(s: &SentenceSignals<'_>) -> bool {
    !s.deniability.matched.is_empty()
}

fn is_rhetorical(s: &SentenceSignals<'_>) -> bool {
    s.deniability.rhetorical
}

fn is_hearsay(s: &SentenceSignals<'_>) -> bool {
    s.hearsay_markers > 0
}

fn comparison_is(s: &SentenceSignals<'_>, kinds: &[ComparisonType]) -> bool {
    s.comparison
        .comparison_type
        .is_some_and(|kind| kinds.contains(&kind))
}

fn is_temporal_comparison(s: &SentenceSignals<'_>) -> bool {
    comparison_is(s, &[ComparisonType::Temporal])
}

fn is_trend_comparison(s: &SentenceSignals<'_>) -> bool {
    comparison_is(s, &[ComparisonType::Trend, ComparisonType::PercentageChange])
}

fn is_ratio_comparison(s: &SentenceSignals<'_>) -> bool {
    comparison_is(s, &[ComparisonType::Ratio])
}

fn is_direct_comparison(s: &SentenceSignals<'_>) -> bool {
    comparison_is(s, &[ComparisonType::Direct])
}

fn has_structured_shape(s: &SentenceSignals<'_>) -> bool {
    STRUCTURED_SHAPE.captures_iter(s.text).any(|caps| {
        caps.name("quantity")
            .is_some_and(|q| !is_year(q.as_str().trim_start_matches('$')))
    })
}

fn has_number(s: &SentenceSignals<'_>) -> bool {
    NUMBER.find_iter(s.text).any(|m| {
        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        !is_year(&digits)
    })
}

fn has_date(s: &SentenceSignals<'_>) -> bool {
    DATE.is_match(s.text)
}

fn has_entity_fact(s: &SentenceSignals<'_>) -> bool {
    ENTITY_FACT.captures_iter(s.text).any(|caps| {
        caps.name("entity")
            .and_then(|m| m.as_str().split_whitespace().next())
            .is_some_and(|first| !NOT_ENTITIES.contains(&first))
    })
}

fn has_fact_verb(s: &SentenceSignals<'_>) -> bool {
    FACT_VERB.is_match(s.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deniability::DeniabilityScanner;
    use crate::detector::detect;
    use crate::hearsay::marker_count;

    fn matched_ids(text: &str) -> Vec<&'static str> {
        let scanner = DeniabilityScanner::default();
        let deniability = scanner.score_sentence(text);
        let comparison = detect(text);
        let signals = SentenceSignals {
            text,
            deniability: &deniability,
            hearsay_markers: marker_count(text),
            comparison: &comparison,
        };
        evaluate(&signals).into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_table_is_in_priority_order() {
        let priorities: Vec<u8> = RULES.iter().map(|r| r.claim_type.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_ids_are_prefixed_by_type() {
        for rule in RULES {
            let prefix = format!("{}.", rule.claim_type.as_str());
            assert!(rule.id.starts_with(&prefix), "{} vs {}", rule.id, prefix);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), RULES.len());
    }

    #[test]
    fn test_private_data_patterns() {
        assert!(matched_ids("His SSN is 123-45-6789 on file.").contains(&"private_data.ssn"));
        assert!(matched_ids("Call her at (555) 123-4567 tonight.").contains(&"private_data.phone"));
        assert!(matched_ids("Write to jane.doe@example.com for details.")
            .contains(&"private_data.email"));
        assert!(matched_ids("She lives at 42 Maple Grove Street now.")
            .contains(&"private_data.street_address"));
        assert!(matched_ids("He was diagnosed with cancer last spring.")
            .contains(&"private_data.health_record"));
    }

    #[test]
    fn test_hedged_and_comparative_both_recorded() {
        let ids = matched_ids("The deficit could have doubled since 2023.");
        assert_eq!(ids[0], "plausible_deniability.hedging");
        assert!(ids.contains(&"comparative.temporal") || ids.contains(&"comparative.trend"));
    }

    #[test]
    fn test_hearsay_outranks_comparative() {
        let ids = matched_ids("Some say crime has doubled since 2020.");
        assert_eq!(ids[0], "hearsay.unsourced_attribution");
        assert!(ids.iter().any(|id| id.starts_with("comparative.")));
    }

    #[test]
    fn test_structured_shape() {
        let ids = matched_ids("Senator Smith cut $2 billion from schools.");
        assert_eq!(ids[0], "structured.actor_action_quantity");
        assert!(ids.contains(&"direct_factual.number"));
    }

    #[test]
    fn test_direct_factual_indicators() {
        let ids = matched_ids("Governor Lee signed the budget in March 2021.");
        assert!(ids.contains(&"direct_factual.date"));
        assert!(ids.contains(&"direct_factual.entity_fact"));
        assert!(ids.contains(&"direct_factual.fact_verb"));
        assert!(!ids.contains(&"direct_factual.number"));
    }

    #[test]
    fn test_sentence_initial_article_is_not_an_entity() {
        let ids = matched_ids("The weather was lovely.");
        assert!(!ids.contains(&"direct_factual.entity_fact"));
    }

    #[test]
    fn test_modal_may_is_not_a_date() {
        let ids = matched_ids("You may want to vote early.");
        assert!(!ids.contains(&"direct_factual.date"));
    }

    #[test]
    fn test_plain_opinion_matches_nothing() {
        assert!(matched_ids("I love this beautiful town.").is_empty());
    }
}
