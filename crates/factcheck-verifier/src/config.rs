//! Configuration for verification

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the comparative verifier and the router
///
/// # Examples
///
/// ```
/// use factcheck_verifier::VerifierConfig;
///
/// let config = VerifierConfig::default();
/// assert_eq!(config.ratio_tolerance, 0.05);
///
/// let config = VerifierConfig::strict();
/// assert_eq!(config.ratio_tolerance, 0.02);
///
/// let config = VerifierConfig::lenient();
/// assert_eq!(config.resolver_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Timeout for a single evidence lookup (milliseconds)
    /// Default: 10 seconds
    pub resolver_timeout_ms: u64,

    /// Relative tolerance within which a claimed figure counts as accurate
    /// Default: 0.05 (5%)
    pub ratio_tolerance: f64,

    /// Share of a claimed change or count below which the claim is false
    /// rather than misleading
    /// Default: 0.5
    pub far_short_fraction: f64,

    /// Maximum byte distance between a number and a metric keyword in evidence
    /// Default: 60
    pub keyword_window: usize,

    /// Claims verified at the same time in batch mode
    /// Default: 8
    pub max_concurrency: usize,

    /// Confidence multiplier per value taken from a number not next to a
    /// metric keyword
    /// Default: 0.8
    pub fallback_penalty: f64,
}

impl VerifierConfig {
    /// Get the resolver timeout as a Duration
    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.resolver_timeout_ms == 0 {
            return Err("resolver_timeout_ms must be greater than 0".to_string());
        }
        if !(0.0..1.0).contains(&self.ratio_tolerance) {
            return Err(format!(
                "ratio_tolerance must be in [0.0, 1.0), got {}",
                self.ratio_tolerance
            ));
        }
        if !(0.0..=1.0).contains(&self.far_short_fraction) {
            return Err(format!(
                "far_short_fraction must be between 0.0 and 1.0, got {}",
                self.far_short_fraction
            ));
        }
        if !(0.0..=1.0).contains(&self.fallback_penalty) {
            return Err(format!(
                "fallback_penalty must be between 0.0 and 1.0, got {}",
                self.fallback_penalty
            ));
        }
        if self.keyword_window == 0 {
            return Err("keyword_window must be greater than 0".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Strict preset: claimed figures must be within 2%
    pub fn strict() -> Self {
        Self {
            ratio_tolerance: 0.02,
            ..Self::default()
        }
    }

    /// Lenient preset: 10% tolerance and a slower resolver allowance
    pub fn lenient() -> Self {
        Self {
            ratio_tolerance: 0.10,
            resolver_timeout_ms: 30_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            resolver_timeout_ms: 10_000,
            ratio_tolerance: 0.05,
            far_short_fraction: 0.5,
            keyword_window: 60,
            max_concurrency: 8,
            fallback_penalty: 0.8,
        }
    }
}
