//! Plausible-deniability scoring
//!
//! A weighted, configurable pattern table for hedging language ("could",
//! "allegedly", "I'm not saying"). The same scorer feeds a claim's
//! `deniability_score` and the standalone document scan that flags hedged
//! sentences above a threshold.

use crate::error::ExtractorError;
use crate::sentences::split_sentences;
use factcheck_domain::Span;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern table as stored on disk (JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSet {
    /// Table metadata
    #[serde(default)]
    pub meta: PatternMeta,
    /// Hedging patterns
    pub patterns: Vec<PatternDef>,
    /// Regex fragments that make a hedged sentence more claim-like
    #[serde(default)]
    pub claimy_words: Vec<String>,
    /// Openers of rhetorical questions ("why would", "isn't it")
    #[serde(default)]
    pub rhet_question_stems: Vec<String>,
    /// Score adjustments
    #[serde(default)]
    pub boosts: Boosts,
}

/// Pattern table metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMeta {
    /// Threshold used by the scan when the caller gives none
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
}

impl Default for PatternMeta {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// One hedging pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDef {
    /// Stable identifier
    pub id: String,
    /// Category shown to reviewers
    pub label: String,
    /// Regular expression, matched case-insensitively
    pub rx: String,
    /// Contribution per occurrence
    pub weight: f64,
}

/// Score adjustments applied once at least one pattern matched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boosts {
    /// Added when a claimy word is present
    #[serde(default)]
    pub claiminess: f64,
    /// Added for a rhetorical question
    #[serde(default)]
    pub rhetorical_question: f64,
    /// Upper bound of the score
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl Default for Boosts {
    fn default() -> Self {
        Self {
            claiminess: 0.0,
            rhetorical_question: 0.0,
            max_score: default_max_score(),
        }
    }
}

fn default_max_score() -> f64 {
    1.0
}

impl PatternSet {
    /// Parse a pattern table from JSON
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in table
    pub fn builtin() -> Self {
        let pattern = |id: &str, label: &str, rx: &str, weight: f64| PatternDef {
            id: id.to_string(),
            label: label.to_string(),
            rx: rx.to_string(),
            weight,
        };

        Self {
            meta: PatternMeta::default(),
            patterns: vec![
                pattern("could", "hedge", r"\bcould\b", 0.2),
                pattern("may_have", "hedge", r"\bmay have\b", 0.3),
                pattern("might_have", "hedge", r"\bmight have\b", 0.3),
                pattern("allegedly", "distancing", r"\ballegedly\b", 0.35),
                pattern("reportedly_suggests", "distancing", r"\breportedly suggests?\b", 0.35),
                pattern("not_saying", "disclaimer", r"\bi(?:'m| am) not saying\b", 0.4),
                pattern("just_asking", "disclaimer", r"\bjust asking(?: questions)?\b", 0.4),
                pattern("who_knows", "insinuation", r"\bwho knows\b", 0.3),
                pattern("questions_raised", "insinuation", r"\bquestions have been raised\b", 0.35),
                pattern("people_wondering", "insinuation", r"\b(?:people|many) are wondering\b", 0.3),
            ],
            claimy_words: vec![
                r"\d".to_string(),
                r"\bpercent\b".to_string(),
                r"\b(?:million|billion|trillion)\b".to_string(),
                r"\bvoted\b".to_string(),
                r"\bfunding\b".to_string(),
                r"\btaxpayer".to_string(),
                r"\bcorrupt".to_string(),
                r"\bbribe".to_string(),
            ],
            rhet_question_stems: vec![
                "isn't it".to_string(),
                "doesn't it".to_string(),
                "why would".to_string(),
                "how come".to_string(),
                "what if".to_string(),
                "who".to_string(),
            ],
            boosts: Boosts {
                claiminess: 0.15,
                rhetorical_question: 0.2,
                max_score: 1.0,
            },
        }
    }
}

/// A matched pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternHit {
    /// Pattern identifier
    pub id: String,
    /// Pattern category
    pub label: String,
}

/// Deniability score of a single sentence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeniabilityScore {
    /// Score in [0.0, max_score]
    pub score: f64,
    /// Patterns that matched, in table order
    pub matched: Vec<PatternHit>,
    /// Sentence is a rhetorical question
    pub rhetorical: bool,
}

impl DeniabilityScore {
    /// Sorted, de-duplicated labels of the matched patterns
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.matched.iter().map(|m| m.label.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// A sentence flagged by [`DeniabilityScanner::scan`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeniabilityFlag {
    /// Zero-based position of the sentence in the scanned text
    pub sentence_index: usize,
    /// Location in the scanned text
    pub span: Span,
    /// Sentence text
    pub sentence: String,
    /// Score rounded to two decimals
    pub score: f64,
    /// Sorted unique labels
    pub labels: Vec<String>,
    /// Matched patterns, in table order
    pub matched_patterns: Vec<PatternHit>,
}

struct CompiledPattern {
    id: String,
    label: String,
    regex: Regex,
    weight: f64,
}

/// Compiled pattern table
pub struct DeniabilityScanner {
    patterns: Vec<CompiledPattern>,
    claimy: Option<Regex>,
    rhetorical: Option<Regex>,
    boosts: Boosts,
    default_threshold: f64,
}

impl std::fmt::Debug for DeniabilityScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeniabilityScanner")
            .field("patterns", &self.patterns.len())
            .field("default_threshold", &self.default_threshold)
            .finish()
    }
}

impl DeniabilityScanner {
    /// Compile a pattern table
    pub fn new(set: PatternSet) -> Result<Self, ExtractorError> {
        let mut patterns = Vec::with_capacity(set.patterns.len());
        for def in set.patterns {
            if def.weight < 0.0 {
                return Err(ExtractorError::InvalidPattern(format!(
                    "pattern '{}' has negative weight {}",
                    def.id, def.weight
                )));
            }
            let regex = compile(&def.id, &format!("(?i){}", def.rx))?;
            patterns.push(CompiledPattern {
                id: def.id,
                label: def.label,
                regex,
                weight: def.weight,
            });
        }

        let claimy = if set.claimy_words.is_empty() {
            None
        } else {
            Some(compile("claimy_words", &format!("(?i){}", set.claimy_words.join("|")))?)
        };

        let rhetorical = if set.rhet_question_stems.is_empty() {
            None
        } else {
            let stems: Vec<String> = set
                .rhet_question_stems
                .iter()
                .map(|s| regex::escape(s))
                .collect();
            Some(compile(
                "rhet_question_stems",
                &format!(r"(?i)^(?:{})\b", stems.join("|")),
            )?)
        };

        Ok(Self {
            patterns,
            claimy,
            rhetorical,
            boosts: set.boosts,
            default_threshold: set.meta.default_threshold,
        })
    }

    /// Threshold declared by the pattern table
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    /// Whether a sentence is a question opening with a rhetorical stem
    pub fn is_rhetorical_question(&self, sentence: &str) -> bool {
        let trimmed = sentence.trim();
        trimmed.trim_end_matches(['"', '\'', ')', '\u{201D}']).ends_with('?')
            && self
                .rhetorical
                .as_ref()
                .is_some_and(|rx| rx.is_match(trimmed.trim_start_matches(['"', '\'', '('])))
    }

    /// Score one sentence
    ///
    /// Every occurrence of every pattern adds its weight, so the score never
    /// decreases as hedges are added. Boosts only apply once a pattern matched.
    pub fn score_sentence(&self, sentence: &str) -> DeniabilityScore {
        let mut score = 0.0;
        let mut matched = Vec::new();

        for pattern in &self.patterns {
            let occurrences = pattern.regex.find_iter(sentence).count();
            if occurrences > 0 {
                score += pattern.weight * occurrences as f64;
                matched.push(PatternHit {
                    id: pattern.id.clone(),
                    label: pattern.label.clone(),
                });
            }
        }

        let rhetorical = self.is_rhetorical_question(sentence);

        if !matched.is_empty() {
            if self.claimy.as_ref().is_some_and(|rx| rx.is_match(sentence)) {
                score += self.boosts.claiminess;
            }
            if rhetorical {
                score += self.boosts.rhetorical_question;
            }
        }

        DeniabilityScore {
            score: score.min(self.boosts.max_score).min(1.0),
            matched,
            rhetorical,
        }
    }

    /// Flag every sentence of `text` with a match and a score at or above `threshold`
    pub fn scan(&self, text: &str, threshold: f64) -> Vec<DeniabilityFlag> {
        split_sentences(text)
            .into_iter()
            .filter_map(|sentence| {
                let scored = self.score_sentence(sentence.text);
                if scored.matched.is_empty() || scored.score < threshold {
                    return None;
                }
                Some(DeniabilityFlag {
                    sentence_index: sentence.index,
                    span: sentence.span,
                    sentence: sentence.text.to_string(),
                    score: (scored.score * 100.0).round() / 100.0,
                    labels: scored.labels(),
                    matched_patterns: scored.matched,
                })
            })
            .collect()
    }
}

impl Default for DeniabilityScanner {
    fn default() -> Self {
        match Self::new(PatternSet::builtin()) {
            Ok(scanner) => scanner,
            Err(e) => unreachable!("built-in deniability patterns must compile: {}", e),
        }
    }
}

fn compile(id: &str, rx: &str) -> Result<Regex, ExtractorError> {
    Regex::new(rx).map_err(|e| ExtractorError::InvalidPattern(format!("{}: {}", id, e)))
}
