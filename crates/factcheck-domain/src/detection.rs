//! Comparative structure detected in a claim's text

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of comparison a claim makes
///
/// Exactly one kind is assigned per detection, by priority
/// temporal > trend (including percentage change) > ratio > direct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    /// Two explicit sides, or an "N times" multiplier between them
    Ratio,
    /// Trend stated as a percentage ("increased by 20%")
    PercentageChange,
    /// Multiplier or direction words ("doubled", "has fallen")
    Trend,
    /// Present value against an explicit past anchor ("since 2023")
    Temporal,
    /// One quantity checked against a threshold or count
    Direct,
}

impl ComparisonType {
    /// Whether verification compares a current value with a historical one
    pub fn is_time_series(&self) -> bool {
        matches!(
            self,
            ComparisonType::Temporal | ComparisonType::Trend | ComparisonType::PercentageChange
        )
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonType::Ratio => "ratio",
            ComparisonType::PercentageChange => "percentage_change",
            ComparisonType::Trend => "trend",
            ComparisonType::Temporal => "temporal",
            ComparisonType::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// One pair of metrics that must be looked up and compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStep {
    /// Metric on the left of the comparison (or the only metric)
    pub left_metric: String,
    /// Metric on the right, absent for single-quantity claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_metric: Option<String>,
}

/// Result of comparative detection
///
/// Derived purely from text. A non-comparative detection is the
/// `Default` value: every flag false, every list empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparativeDetection {
    /// Whether any comparative structure was found
    pub is_comparative: bool,
    /// Assigned kind, `None` when not comparative
    pub comparison_type: Option<ComparisonType>,
    /// Past anchor alongside a present-tense metric
    pub is_temporal: bool,
    /// Multiplier or trend language present
    pub is_trend: bool,
    /// Metric phrases, lowercase, articles stripped, in order of appearance
    pub metrics: Vec<String>,
    /// Extracted past anchor, e.g. "since 2023"
    pub time_reference: Option<String>,
    /// Metric pairs to look up
    pub verification_steps: Vec<VerificationStep>,
}

impl ComparativeDetection {
    /// The non-comparative result
    pub fn none() -> Self {
        Self::default()
    }

    /// First metric, if any
    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}
