//! Factcheck Domain Layer
//!
//! This crate holds the data model shared by the extraction and verification
//! pipeline. It performs no I/O and depends only on `uuid` (record identity)
//! and `serde` (records are persisted by the caller, not by us).
//!
//! ## Key Concepts
//!
//! - **Claim**: one classified assertion taken from one sentence of campaign text
//! - **ComparativeDetection**: the comparison/trend/temporal structure of a claim
//! - **Verification**: an immutable verdict record with its full audit trail
//! - **Aggregate**: collapsing several partial scores into one figure
//!
//! ## Architecture
//!
//! - Pure data and pure functions only
//! - Extraction lives in `factcheck-extractor`
//! - Evidence lookup and verdicts live in `factcheck-verifier`
//! - Trait definitions for the synchronous seams live in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod claim;
pub mod detection;
pub mod traits;
pub mod verification;

// Re-exports for convenience
pub use aggregate::aggregate;
pub use claim::{Claim, ClaimKey, ClaimStatus, ClaimType, Span};
pub use detection::{ComparativeDetection, ComparisonType, VerificationStep};
pub use verification::{
    Comparator, ExpectedOutcome, ExtractionLogEntry, SourceRef, Verdict, Verification,
    VerificationId, VerificationMethod,
};
