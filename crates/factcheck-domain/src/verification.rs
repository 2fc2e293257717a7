//! Verification records - verdicts with their audit trail

use crate::claim::ClaimKey;
use crate::detection::ComparisonType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a verification record, based on UUIDv7
///
/// Re-verifying a claim creates a new record, so ids sort in the order the
/// attempts were made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerificationId(u128);

impl VerificationId {
    /// Generate a new UUIDv7-based id
    ///
    /// # Examples
    ///
    /// ```
    /// use factcheck_domain::VerificationId;
    ///
    /// let id = VerificationId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse an id from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use factcheck_domain::VerificationId;
    ///
    /// let id = VerificationId::new();
    /// let parsed = VerificationId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Millisecond timestamp embedded in the UUIDv7
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for VerificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for VerificationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VerificationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VerificationId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// The pipeline's conclusion about a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Evidence matches the assertion
    True,
    /// Evidence contradicts the assertion
    False,
    /// Right direction, wrong magnitude
    Misleading,
    /// Automation could not reach a conclusion
    Unsupported,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::True => "TRUE",
            Verdict::False => "FALSE",
            Verdict::Misleading => "MISLEADING",
            Verdict::Unsupported => "UNSUPPORTED",
        };
        f.write_str(name)
    }
}

/// Which router path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Evidence lookup plus arithmetic
    Comparative,
    /// Predicate extraction, optionally checked against a fact table
    Structured,
    /// Manual review required
    #[default]
    Standard,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationMethod::Comparative => "comparative",
            VerificationMethod::Structured => "structured",
            VerificationMethod::Standard => "standard",
        };
        f.write_str(name)
    }
}

/// Operator of a threshold assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// "more than", "over"
    GreaterThan,
    /// "at least"
    AtLeast,
    /// "less than", "fewer than", "under"
    LessThan,
    /// "at most", "no more than"
    AtMost,
}

impl Comparator {
    /// Whether `actual <op> bound` holds
    pub fn holds(&self, actual: f64, bound: f64) -> bool {
        match self {
            Comparator::GreaterThan => actual > bound,
            Comparator::AtLeast => actual >= bound,
            Comparator::LessThan => actual < bound,
            Comparator::AtMost => actual <= bound,
        }
    }

    /// The same bound seen from the other side ("more than" becomes "less than")
    pub fn mirrored(&self) -> Comparator {
        match self {
            Comparator::GreaterThan => Comparator::LessThan,
            Comparator::AtLeast => Comparator::AtMost,
            Comparator::LessThan => Comparator::GreaterThan,
            Comparator::AtMost => Comparator::AtLeast,
        }
    }

    /// Mathematical symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::GreaterThan => ">",
            Comparator::AtLeast => ">=",
            Comparator::LessThan => "<",
            Comparator::AtMost => "<=",
        }
    }
}

/// What the claim asserts about the calculated result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// Calculated ratio should be close to `value` ("doubled" is 2.0)
    Ratio {
        /// Claimed multiplier
        value: f64,
    },
    /// Calculated result should satisfy `comparator value`
    Threshold {
        /// Operator asserted by the claim
        comparator: Comparator,
        /// Bound asserted by the claim
        value: f64,
    },
    /// Calculated result should be close to `value`
    Exact {
        /// Claimed quantity
        value: f64,
    },
}

impl ExpectedOutcome {
    /// Numeric part of the assertion, recorded as `expected_result`
    pub fn value(&self) -> f64 {
        match self {
            ExpectedOutcome::Ratio { value }
            | ExpectedOutcome::Threshold { value, .. }
            | ExpectedOutcome::Exact { value } => *value,
        }
    }
}

impl fmt::Display for ExpectedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedOutcome::Ratio { value } => write!(f, "ratio {}", value),
            ExpectedOutcome::Threshold { comparator, value } => {
                write!(f, "{} {}", comparator.symbol(), value)
            }
            ExpectedOutcome::Exact { value } => write!(f, "= {}", value),
        }
    }
}

/// One evidence query and what was pulled out of its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionLogEntry {
    /// Query sent to the evidence resolver
    pub query: String,
    /// Evidence text returned, absent when resolution failed
    pub raw_snippet: Option<String>,
    /// Substring the number was parsed from
    pub matched_text: Option<String>,
    /// Parsed value, absent when nothing usable was found
    pub extracted_value: Option<f64>,
    /// Why the value is missing, when it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionLogEntry {
    /// Entry for a query whose evidence could not be obtained
    pub fn missing(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            raw_snippet: None,
            matched_text: None,
            extracted_value: None,
            error: Some(error.into()),
        }
    }
}

/// Where a piece of evidence came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Query that produced the evidence
    pub query: String,
    /// Label supplied by the resolver, e.g. a publication name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Link supplied by the resolver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A verification attempt
///
/// Created once and never edited. Re-verification produces a new record so
/// the audit history is preserved. `calculation_steps` can be reproduced from
/// `data_extraction_log` plus the calculated and expected results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    /// Record identity
    pub id: VerificationId,
    /// Claim this record belongs to
    pub claim_id: ClaimKey,
    /// Router path that produced the record
    pub method: VerificationMethod,
    /// Conclusion
    pub verdict: Verdict,
    /// Certainty of the evidence extraction [0.0, 1.0]
    pub confidence: f64,
    /// Kind of comparison checked, when comparative
    pub comparison_type: Option<ComparisonType>,
    /// Current (or left-hand) value
    pub left_value: Option<f64>,
    /// Historical (or right-hand) value
    pub right_value: Option<f64>,
    /// Result of the arithmetic
    pub calculated_result: Option<f64>,
    /// Numeric part of the claim's assertion
    pub expected_result: Option<f64>,
    /// Full assertion, including the operator
    pub expected_outcome: Option<ExpectedOutcome>,
    /// Queries issued, in order
    pub search_queries_used: Vec<String>,
    /// Per-query extraction record, in query order
    pub data_extraction_log: Vec<ExtractionLogEntry>,
    /// Human-readable arithmetic steps
    pub calculation_steps: Vec<String>,
    /// One entry per resolved query
    pub sources: Vec<SourceRef>,
    /// False when a human must decide
    pub automated: bool,
    /// Free-form reviewer notes
    pub notes: String,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

impl Verification {
    /// Empty record for a claim, to be filled by the producing path
    pub fn new(claim_id: ClaimKey, method: VerificationMethod) -> Self {
        Self {
            id: VerificationId::new(),
            claim_id,
            method,
            verdict: Verdict::Unsupported,
            confidence: 0.0,
            comparison_type: None,
            left_value: None,
            right_value: None,
            calculated_result: None,
            expected_result: None,
            expected_outcome: None,
            search_queries_used: Vec::new(),
            data_extraction_log: Vec::new(),
            calculation_steps: Vec::new(),
            sources: Vec::new(),
            automated: true,
            notes: String::new(),
            created_at: now_secs(),
        }
    }

    /// Record signalling that a reviewer has to decide
    pub fn manual_review(claim_id: ClaimKey, notes: impl Into<String>) -> Self {
        Self {
            automated: false,
            notes: notes.into(),
            ..Self::new(claim_id, VerificationMethod::Standard)
        }
    }
}

/// Current time in seconds since the Unix epoch
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_id_chronological() {
        let id1 = VerificationId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = VerificationId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_verification_id_invalid_string() {
        assert!(VerificationId::from_string("not-a-valid-uuid").is_err());
        assert!(VerificationId::from_string("").is_err());
    }

    #[test]
    fn test_verdict_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::Misleading).unwrap(), "\"MISLEADING\"");
        assert_eq!(Verdict::Unsupported.to_string(), "UNSUPPORTED");
    }

    #[test]
    fn test_comparator_holds() {
        assert!(Comparator::GreaterThan.holds(0.31, 0.25));
        assert!(!Comparator::GreaterThan.holds(0.25, 0.25));
        assert!(Comparator::AtLeast.holds(0.25, 0.25));
        assert!(Comparator::LessThan.holds(3.0, 4.0));
        assert!(Comparator::AtMost.holds(4.0, 4.0));
    }

    #[test]
    fn test_comparator_mirrored() {
        assert_eq!(Comparator::GreaterThan.mirrored(), Comparator::LessThan);
        assert_eq!(Comparator::AtMost.mirrored(), Comparator::AtLeast);
        assert_eq!(Comparator::AtLeast.mirrored().mirrored(), Comparator::AtLeast);
    }

    #[test]
    fn test_expected_outcome_value() {
        let outcome = ExpectedOutcome::Threshold {
            comparator: Comparator::GreaterThan,
            value: 0.25,
        };
        assert_eq!(outcome.value(), 0.25);
        assert_eq!(outcome.to_string(), "> 0.25");
        assert_eq!(ExpectedOutcome::Ratio { value: 2.0 }.value(), 2.0);
    }

    #[test]
    fn test_manual_review_record() {
        let v = Verification::manual_review(ClaimKey::for_sentence(0), "needs a human");
        assert_eq!(v.verdict, Verdict::Unsupported);
        assert!(!v.automated);
        assert_eq!(v.method, VerificationMethod::Standard);
        assert_eq!(v.notes, "needs a human");
    }

    #[test]
    fn test_verification_json_round_trip_keeps_id() {
        let v = Verification::new(ClaimKey::for_sentence(2), VerificationMethod::Comparative);
        let json = serde_json::to_string(&v).unwrap();
        let back: Verification = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, v.id);
        assert_eq!(back.claim_id, v.claim_id);
    }
}
