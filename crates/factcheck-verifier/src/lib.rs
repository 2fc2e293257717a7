//! Factcheck Verifier
//!
//! Turns extracted claims into verdicts with a full audit trail.
//!
//! # Overview
//!
//! The [`VerificationRouter`] picks a path per claim:
//!
//! - **Comparative**: plan a current/historical (or left/right) query pair,
//!   resolve evidence through the injected [`EvidenceResolver`], extract the
//!   numbers, do the arithmetic and compare it with what the claim asserts
//! - **Structured**: reduce the claim to actor, action, object and quantity
//!   and check it against an optional [`FactLookup`]
//! - **Standard**: hand the claim to a person
//!
//! Without a resolver the router answers with the queries it would have
//! issued, so a caller can fetch evidence out-of-band and run again.
//!
//! # Architecture
//!
//! ```text
//! Claim → Router ─┬─ Comparative → queries → Resolver → quantities → verdict
//!                 ├─ Structured  → FactLookup → verdict (review required)
//!                 └─ Standard    → manual review
//! ```
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use factcheck_domain::Verdict;
//! use factcheck_extractor::Extractor;
//! use factcheck_verifier::{RouterOptions, StaticResolver, VerificationRouter, VerifierConfig};
//!
//! let resolver = StaticResolver::new().with_response(
//!     "current va workforce",
//!     "According to OPM, 31% of its workforce are veterans.",
//! );
//! let router = VerificationRouter::new(VerifierConfig::default())
//!     .unwrap()
//!     .with_resolver(Arc::new(resolver));
//!
//! let claims = Extractor::default().extract("More than 25% of the VA workforce are veterans.");
//! let result = tokio_test::block_on(router.verify_claim(&claims[0], &RouterOptions::default()));
//! assert_eq!(result.verdict(), Some(Verdict::True));
//! ```

#![warn(missing_docs)]

mod assertion;
mod comparative;
mod config;
mod error;
mod pipeline;
mod quantity;
mod query;
mod resolver;
mod router;
mod structured;

pub use assertion::{parse_expected, Assertion, Measure};
pub use comparative::{
    determine_verdict, plan_queries, ComparativeVerifier, PlannedQuery, QueryRole,
};
pub use config::VerifierConfig;
pub use error::{ResolverError, VerifierError};
pub use pipeline::{DocumentReport, FactCheckPipeline};
pub use quantity::{
    extract_quantity, extract_quantity_as, metric_keywords, ExtractedQuantity, QuantityKind,
};
pub use query::{generate_query, PREVIOUS_PERIOD};
pub use resolver::{
    resolve_with_timeout, Evidence, EvidenceResolver, FailingResolver, SharedResolver,
    StaticResolver,
};
pub use router::{RouteOutcome, RouteResult, RouterOptions, VerificationRouter};
pub use structured::{
    extract_structured, structured_query, verify_structured, Direction, FactLookup, Quantity,
    StaticFactTable, StructuredClaim, StructuredResult,
};
