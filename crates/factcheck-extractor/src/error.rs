//! Error types for the Extractor

use thiserror::Error;

/// Errors raised while building an extractor or scanner
///
/// `Extractor::extract` itself never fails: problems found while walking the
/// text are logged and shorten the returned list instead.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Text exceeds maximum length
    #[error("Text too long: {0} bytes (max: {1})")]
    TextTooLong(usize, usize),

    /// A single sentence exceeds maximum length
    #[error("Sentence {index} too long: {len} bytes (max: {max})")]
    SentenceTooLong {
        /// Position of the sentence in the input
        index: usize,
        /// Sentence length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Deniability pattern failed to compile or carries a bad weight
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
