//! Structured claims: actor, action, object and quantity
//!
//! Structured claims can be checked against a table of known facts rather
//! than free-text evidence. The result always asks for human confirmation.

use crate::comparative::determine_verdict;
use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::query::generate_query;
use crate::quantity::scale_factor;
use factcheck_domain::verification::now_secs;
use factcheck_domain::{ClaimKey, ExpectedOutcome, Verdict, VerificationId};
use factcheck_extractor::patterns::{is_year, STRUCTURED_SHAPE, TEMPORAL_ANCHOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LOOKUP_CONFIDENCE: f64 = 0.9;
const UNVERIFIED_CONFIDENCE: f64 = 0.2;

const PRONOUNS: &[&str] = &["he", "she", "they", "we", "i"];
const OBJECT_NOISE: &[&str] = &[
    "from", "to", "on", "for", "in", "of", "into", "the", "a", "an", "his", "her", "their", "our",
];

/// Direction of the change an action describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Added, raised or created something
    Increase,
    /// Cut, lowered or blocked something
    Decrease,
}

/// The quantity a structured claim states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Stated value with scale words applied; percentages stay as stated
    pub value: f64,
    /// Unit ("usd", "percent", or the word following the number)
    pub unit: Option<String>,
    /// Direction implied by the action
    pub direction: Option<Direction>,
}

/// A claim reduced to predicate form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredClaim {
    /// Snake-case action, e.g. `voted_against`
    pub predicate: String,
    /// Who acted
    pub actor: String,
    /// Action as written, lowercased
    pub action: String,
    /// What was acted on
    pub object: String,
    /// Stated quantity
    pub quantity: Quantity,
    /// Past anchor, if the claim names one
    pub time_reference: Option<String>,
    /// How firmly the claim is stated, `1 - deniability_score`
    pub assertiveness: f64,
}

/// Extract the structured form of a claim
///
/// Returns `None` when the text has no actor-action-quantity shape or its
/// only quantity is a year. Pronoun actors are replaced by `fallback_actor`
/// when one is given.
///
/// ```
/// use factcheck_verifier::{extract_structured, Direction};
///
/// let claim = extract_structured("Senator Smith cut $2 billion from schools.", None, 0.0).unwrap();
/// assert_eq!(claim.actor, "Senator Smith");
/// assert_eq!(claim.predicate, "cut");
/// assert_eq!(claim.object, "schools");
/// assert_eq!(claim.quantity.value, 2e9);
/// assert_eq!(claim.quantity.unit.as_deref(), Some("usd"));
/// assert_eq!(claim.quantity.direction, Some(Direction::Decrease));
/// ```
pub fn extract_structured(
    text: &str,
    fallback_actor: Option<&str>,
    deniability: f64,
) -> Option<StructuredClaim> {
    let caps = STRUCTURED_SHAPE.captures_iter(text).find(|caps| {
        let quantity = caps["quantity"].trim_start_matches('$');
        caps.name("scale").is_some() || !is_year(quantity)
    })?;

    let actor = caps["actor"].trim();
    let actor = match fallback_actor {
        Some(fallback) if PRONOUNS.contains(&actor.to_ascii_lowercase().as_str()) => {
            fallback.to_string()
        }
        _ => actor.to_string(),
    };

    let action = caps["action"]
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    let predicate = action.replace(' ', "_");

    let tail = caps.name("tail").map_or("", |m| m.as_str());
    let object = clean_object(&caps["object"]);
    let object = if object.is_empty() {
        clean_object(tail)
    } else {
        object
    };

    let raw = &caps["quantity"];
    let mut value: f64 = raw.trim_start_matches('$').replace(',', "").parse().ok()?;
    let scale = caps.name("scale").map(|m| m.as_str().to_ascii_lowercase());
    let unit = match scale.as_deref() {
        Some("%") | Some("percent") => Some("percent".to_string()),
        Some(scale) => {
            value *= scale_factor(scale);
            unit_from(raw, tail)
        }
        None => unit_from(raw, tail),
    };

    let direction = direction_of(&action);
    Some(StructuredClaim {
        predicate,
        actor,
        action,
        object,
        quantity: Quantity {
            value,
            unit,
            direction,
        },
        time_reference: TEMPORAL_ANCHOR.find(text).map(|m| m.as_str().to_string()),
        assertiveness: (1.0 - deniability).clamp(0.0, 1.0),
    })
}

fn unit_from(raw_quantity: &str, tail: &str) -> Option<String> {
    if raw_quantity.starts_with('$') {
        return Some("usd".to_string());
    }
    let word = tail.split_whitespace().next()?;
    let word: String = word
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if word.is_empty() || OBJECT_NOISE.contains(&word.as_str()) {
        None
    } else {
        Some(word)
    }
}

fn clean_object(raw: &str) -> String {
    let clause = raw
        .split(|c: char| matches!(c, ',' | ';' | '.' | ':'))
        .next()
        .unwrap_or("");
    let clause = match TEMPORAL_ANCHOR.find(clause) {
        Some(anchor) => &clause[..anchor.start()],
        None => clause,
    };
    let words: Vec<&str> = clause.split_whitespace().collect();
    let start = words
        .iter()
        .position(|w| !OBJECT_NOISE.contains(&w.to_ascii_lowercase().as_str()))
        .unwrap_or(words.len());
    words[start..].join(" ").to_lowercase()
}

fn direction_of(action: &str) -> Option<Direction> {
    match action {
        "cut" | "lowered" | "reduced" | "blocked" | "vetoed" | "voted against" => {
            Some(Direction::Decrease)
        }
        "raised" | "increased" | "added" | "created" | "funded" | "spent" | "secured"
        | "allocated" | "delivered" => Some(Direction::Increase),
        _ => None,
    }
}

/// Deterministic source of known figures for structured claims
pub trait FactLookup: Send + Sync {
    /// Known value for the claim's actor, predicate and object
    fn lookup(&self, claim: &StructuredClaim) -> Option<f64>;
}

/// In-memory fact table keyed by actor, predicate and object
#[derive(Debug, Clone, Default)]
pub struct StaticFactTable {
    facts: HashMap<(String, String, String), f64>,
}

impl StaticFactTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a known figure; keys are case-insensitive
    pub fn with_fact(
        mut self,
        actor: &str,
        predicate: &str,
        object: &str,
        value: f64,
    ) -> Self {
        self.facts.insert(key(actor, predicate, object), value);
        self
    }

    /// Load a fact table from a JSON array of
    /// `{"actor", "predicate", "object", "value"}` objects
    pub fn from_json(json: &str) -> Result<Self, VerifierError> {
        let rows: Vec<FactRow> = serde_json::from_str(json)?;
        Ok(rows.into_iter().fold(Self::new(), |table, row| {
            table.with_fact(&row.actor, &row.predicate, &row.object, row.value)
        }))
    }

    /// Number of known figures
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FactLookup for StaticFactTable {
    fn lookup(&self, claim: &StructuredClaim) -> Option<f64> {
        self.facts
            .get(&key(&claim.actor, &claim.predicate, &claim.object))
            .copied()
    }
}

#[derive(Debug, Deserialize)]
struct FactRow {
    actor: String,
    predicate: String,
    object: String,
    value: f64,
}

fn key(actor: &str, predicate: &str, object: &str) -> (String, String, String) {
    (
        actor.trim().to_lowercase(),
        predicate.trim().to_lowercase(),
        object.trim().to_lowercase(),
    )
}

/// Outcome of the structured path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    /// Record identity
    pub id: VerificationId,
    /// Claim this result belongs to
    pub claim_id: ClaimKey,
    /// Extracted structured form
    pub claim: StructuredClaim,
    /// UNSUPPORTED unless a fact lookup supplied a figure
    pub verdict: Verdict,
    /// Confidence in the verdict
    pub confidence: f64,
    /// Figure supplied by the fact lookup
    pub actual_value: Option<f64>,
    /// Always true: structured verdicts are confirmed by a person
    pub requires_review: bool,
    /// Deniability labels supplied by the caller
    pub deniability_labels: Vec<String>,
    /// Queries a reviewer could run
    pub queries: Vec<String>,
    /// Reviewer notes
    pub notes: String,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

/// Lookup query for a structured claim
pub fn structured_query(claim: &StructuredClaim) -> String {
    let metric = format!("{} {} {}", claim.actor, claim.action, claim.object);
    generate_query(&metric, claim.time_reference.as_deref())
}

/// Verify a structured claim against an optional fact lookup
pub fn verify_structured(
    claim_id: ClaimKey,
    claim: StructuredClaim,
    lookup: Option<&dyn FactLookup>,
    deniability_labels: Vec<String>,
    config: &VerifierConfig,
) -> StructuredResult {
    let queries = vec![structured_query(&claim)];
    let actual_value = lookup.and_then(|lookup| lookup.lookup(&claim));

    let (verdict, confidence, notes) = match actual_value {
        Some(actual) => {
            let expected = ExpectedOutcome::Exact {
                value: claim.quantity.value,
            };
            let verdict = determine_verdict(&expected, actual, config);
            (
                verdict,
                LOOKUP_CONFIDENCE * claim.assertiveness.max(0.5),
                format!(
                    "Fact table records {} against the claimed {}; confirm before publishing",
                    actual, claim.quantity.value
                ),
            )
        }
        None => (
            Verdict::Unsupported,
            UNVERIFIED_CONFIDENCE,
            "No deterministic lookup for this claim; manual review required".to_string(),
        ),
    };

    StructuredResult {
        id: VerificationId::new(),
        claim_id,
        claim,
        verdict,
        confidence,
        actual_value,
        requires_review: true,
        deniability_labels,
        queries,
        notes,
        created_at: now_secs(),
    }
}
