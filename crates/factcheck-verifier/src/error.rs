//! Error types for verification

use factcheck_extractor::ExtractorError;
use thiserror::Error;

/// Why a single evidence lookup produced nothing
///
/// Never fatal: the comparative verifier records it against the query and
/// degrades the verdict instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The resolver did not answer within the configured timeout
    #[error("Evidence lookup timed out after {0} ms")]
    Timeout(u64),

    /// The resolver refused or failed the lookup
    #[error("Evidence lookup rejected: {0}")]
    Rejected(String),

    /// The resolver answered with no text
    #[error("Evidence lookup returned no text")]
    Empty,

    /// No evidence is known for the query
    #[error("No evidence for query '{0}'")]
    NotFound(String),
}

/// Errors raised while setting up verification
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Claim is malformed or missing required fields
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    /// Evidence file could not be read
    #[error("Invalid evidence: {0}")]
    InvalidEvidence(String),

    /// Evidence lookup error
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Extraction layer error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}

impl From<serde_json::Error> for VerifierError {
    fn from(e: serde_json::Error) -> Self {
        VerifierError::InvalidEvidence(e.to_string())
    }
}
