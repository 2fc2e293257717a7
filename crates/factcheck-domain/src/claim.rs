//! Claim module - one classified assertion extracted from a sentence

use crate::verification::VerificationMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a claim as seen by the persistence layer
///
/// The sentence index is assigned by the extractor. The fact-check identity
/// belongs to whoever stores the results, so it is optional here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClaimKey {
    /// Identifier of the fact-check document owned by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check_id: Option<String>,

    /// Position of the source sentence in the extraction run
    pub sentence_index: usize,
}

impl ClaimKey {
    /// Key for a claim that has not been attached to a fact-check yet
    pub fn for_sentence(sentence_index: usize) -> Self {
        Self {
            fact_check_id: None,
            sentence_index,
        }
    }

    /// Attach the caller's fact-check identity
    pub fn with_fact_check(mut self, fact_check_id: impl Into<String>) -> Self {
        self.fact_check_id = Some(fact_check_id.into());
        self
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fact_check_id {
            Some(id) => write!(f, "{}#{}", id, self.sentence_index),
            None => write!(f, "#{}", self.sentence_index),
        }
    }
}

/// Category a claim was classified into
///
/// Variants are listed in classification priority order: when a sentence
/// matches several categories, the earliest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Sentence exposes personally identifying information
    PrivateData,
    /// Hedged so the speaker can later disclaim it
    PlausibleDeniability,
    /// Reported secondhand without a named source
    Hearsay,
    /// Quantitative relationship between two values, or a threshold/count
    Comparative,
    /// Actor + action + object + quantity shape
    Structured,
    /// Plain factual assertion
    DirectFactual,
}

impl ClaimType {
    /// Classification priority (0 = highest)
    pub fn priority(&self) -> u8 {
        match self {
            ClaimType::PrivateData => 0,
            ClaimType::PlausibleDeniability => 1,
            ClaimType::Hearsay => 2,
            ClaimType::Comparative => 3,
            ClaimType::Structured => 4,
            ClaimType::DirectFactual => 5,
        }
    }

    /// Stable snake_case name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::PrivateData => "private_data",
            ClaimType::PlausibleDeniability => "plausible_deniability",
            ClaimType::Hearsay => "hearsay",
            ClaimType::Comparative => "comparative",
            ClaimType::Structured => "structured",
            ClaimType::DirectFactual => "direct_factual",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Not reviewed yet (every freshly extracted claim)
    #[default]
    Pending,
    /// Signed off by a reviewer
    Verified,
    /// Contested by a reviewer
    Disputed,
}

/// Byte range of a sentence inside the original input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

/// A claim extracted from one sentence
///
/// Claims are immutable once produced; verification results are attached by
/// [`ClaimKey`], never by editing the claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Sentence text, trimmed
    pub text: String,

    /// 0-based sentence position, strictly increasing within one run
    pub sentence_index: usize,

    /// Where the sentence sits in the input
    pub span: Span,

    /// Winning category
    pub claim_type: ClaimType,

    /// Whether automated verification is worth attempting
    pub verifiable: bool,

    /// Path the router is expected to take
    pub verification_type: VerificationMethod,

    /// Extraction confidence [0.0, 1.0]
    pub confidence_score: f64,

    /// Every classification rule that matched, in rule-table order
    pub patterns_matched: Vec<String>,

    /// Strength of hedging language [0.0, 1.0]
    pub deniability_score: f64,

    /// Likelihood the claim is reported secondhand [0.0, 1.0]
    pub hearsay_confidence: f64,

    /// Set whenever a PII pattern matched, whatever the claim type
    pub private_data_detected: bool,

    /// Review status
    pub status: ClaimStatus,
}

impl Claim {
    /// Key for this claim without a fact-check identity
    pub fn key(&self) -> ClaimKey {
        ClaimKey::for_sentence(self.sentence_index)
    }

    /// Whether a rule with the given identifier matched
    pub fn matched(&self, rule_id: &str) -> bool {
        self.patterns_matched.iter().any(|p| p == rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let ordered = [
            ClaimType::PrivateData,
            ClaimType::PlausibleDeniability,
            ClaimType::Hearsay,
            ClaimType::Comparative,
            ClaimType::Structured,
            ClaimType::DirectFactual,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
    }

    #[test]
    fn test_claim_type_serializes_snake_case() {
        let json = serde_json::to_string(&ClaimType::PlausibleDeniability).unwrap();
        assert_eq!(json, "\"plausible_deniability\"");
        assert_eq!(ClaimType::DirectFactual.to_string(), "direct_factual");
    }

    #[test]
    fn test_claim_key_display() {
        assert_eq!(ClaimKey::for_sentence(3).to_string(), "#3");
        let key = ClaimKey::for_sentence(3).with_fact_check("fc-42");
        assert_eq!(key.to_string(), "fc-42#3");
    }

    #[test]
    fn test_claim_key_ordering_by_sentence() {
        assert!(ClaimKey::for_sentence(1) < ClaimKey::for_sentence(2));
    }

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(ClaimStatus::default(), ClaimStatus::Pending);
    }
}
