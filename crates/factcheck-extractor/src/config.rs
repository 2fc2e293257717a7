//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (bytes); extraction stops at this point
    pub max_text_length: usize,

    /// Maximum sentence length (bytes); extraction stops at a longer sentence
    pub max_sentence_length: usize,

    /// Sentences with fewer words are skipped
    pub min_sentence_words: usize,

    /// Skip questions unless they read as rhetorical insinuation
    pub skip_questions: bool,

    /// Minimum score for the standalone deniability scanner to flag a sentence
    pub deniability_threshold: f64,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_sentence_length == 0 {
            return Err("max_sentence_length must be greater than 0".to_string());
        }
        if self.max_sentence_length > self.max_text_length {
            return Err("max_sentence_length cannot exceed max_text_length".to_string());
        }
        if !(0.0..=1.0).contains(&self.deniability_threshold) {
            return Err(format!(
                "deniability_threshold must be between 0.0 and 1.0, got {}",
                self.deniability_threshold
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            max_sentence_length: 2_000,
            min_sentence_words: 3,
            skip_questions: true,
            deniability_threshold: 0.5,
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: longer sentences only, fewer incidental claims
    pub fn strict() -> Self {
        Self {
            min_sentence_words: 5,
            ..Self::default()
        }
    }

    /// Lenient preset: short sentences and questions are considered too
    pub fn lenient() -> Self {
        Self {
            min_sentence_words: 2,
            skip_questions: false,
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
