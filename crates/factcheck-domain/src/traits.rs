//! Trait definitions for the synchronous seams of the pipeline
//!
//! Implementations live in other crates. The asynchronous evidence-resolver
//! seam is defined in `factcheck-verifier`, next to the code that awaits it.

use crate::{Claim, ComparativeDetection};

/// Turns raw text into ordered claims
///
/// Implemented by the extraction layer (factcheck-extractor). Extraction is
/// infallible by contract: failures shorten the returned list instead.
pub trait ClaimExtractor {
    /// Extract claims from unstructured text, ordered by `sentence_index`
    fn extract(&self, text: &str) -> Vec<Claim>;
}

/// Finds the comparative structure of a claim
///
/// Implemented by the extraction layer (factcheck-extractor). Must be pure:
/// the same text always yields the same detection.
pub trait ComparisonDetector {
    /// Detect comparison, trend and temporal structure in a claim's text
    fn detect(&self, claim_text: &str) -> ComparativeDetection;
}
