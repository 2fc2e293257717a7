//! Factcheck Extractor
//!
//! Turns unstructured campaign text into ordered, classified claims.
//!
//! # Overview
//!
//! The text is split into sentences (with byte spans back into the input)
//! and every sentence is evaluated against an ordered rule table. The first
//! matching rule sets the claim type; all matching rule ids are kept for
//! audit. Scoring signals computed per sentence:
//!
//! - **Deniability**: weighted hedging patterns ([`DeniabilityScanner`])
//! - **Hearsay**: attribution without a source ("some say")
//! - **Comparison**: trend, ratio, temporal and threshold structure ([`detect`])
//!
//! # Architecture
//!
//! ```text
//! Text → sentences → signals → rule table → Claims → factcheck-verifier
//! ```
//!
//! # Example Usage
//!
//! ```
//! use factcheck_extractor::{Extractor, ExtractorConfig};
//! use factcheck_domain::ClaimType;
//!
//! let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
//! let claims = extractor.extract("The federal deficit has doubled since 2023. I love this town.");
//!
//! assert_eq!(claims.len(), 1);
//! assert_eq!(claims[0].claim_type, ClaimType::Comparative);
//! ```

#![warn(missing_docs)]

mod config;
mod deniability;
mod detector;
mod error;
mod extractor;
mod hearsay;
pub mod patterns;
pub mod rules;
mod sentences;


pub use config::ExtractorConfig;
pub use deniability::{
    Boosts, DeniabilityFlag, DeniabilityScanner, DeniabilityScore, PatternDef, PatternHit,
    PatternMeta, PatternSet,
};
pub use detector::{detect, Detector};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use hearsay::{hearsay_confidence, marker_count};
pub use sentences::{split_sentences, Sentence};
