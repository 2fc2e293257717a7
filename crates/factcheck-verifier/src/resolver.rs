//! Evidence Resolver seam
//!
//! The verifier never searches anything itself. Callers inject an
//! [`EvidenceResolver`] that turns a query string into evidence text; the
//! in-memory resolvers here serve tests and callers that already hold the
//! evidence (for example an evidence file on the command line).

use crate::error::{ResolverError, VerifierError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Evidence returned for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Raw evidence text
    pub text: String,
    /// Originating source label, e.g. a publication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Originating link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Evidence {
    /// Evidence with no source information
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_name: None,
            url: None,
        }
    }

    /// Attach a source label
    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    /// Attach a link
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<&str> for Evidence {
    fn from(text: &str) -> Self {
        Evidence::new(text)
    }
}

impl From<String> for Evidence {
    fn from(text: String) -> Self {
        Evidence::new(text)
    }
}

/// Turns a search query into evidence text
///
/// Implementations may do any I/O they like; the verifier applies its own
/// timeout around every call and treats any error as missing evidence.
#[async_trait]
pub trait EvidenceResolver: Send + Sync {
    /// Look up evidence for one query
    ///
    /// # Errors
    ///
    /// Returns an error when no evidence can be produced. The error is
    /// recorded against the query and never aborts sibling lookups.
    async fn resolve(&self, query: &str) -> Result<Evidence, ResolverError>;
}

/// Resolver shared across concurrent verifications
pub type SharedResolver = Arc<dyn EvidenceResolver>;

/// Resolve one query, bounded by `timeout`
///
/// Blank evidence text counts as [`ResolverError::Empty`].
pub async fn resolve_with_timeout(
    resolver: &dyn EvidenceResolver,
    query: &str,
    timeout: Duration,
) -> Result<Evidence, ResolverError> {
    match tokio::time::timeout(timeout, resolver.resolve(query)).await {
        Ok(Ok(evidence)) if evidence.text.trim().is_empty() => Err(ResolverError::Empty),
        Ok(result) => result,
        Err(_) => Err(ResolverError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Deterministic in-memory resolver
///
/// Answers from a fixed query → evidence table, with an optional default
/// answer and optional queries that always fail.
///
/// # Examples
///
/// ```
/// use factcheck_verifier::{EvidenceResolver, StaticResolver};
///
/// let resolver = StaticResolver::new()
///     .with_response("current federal deficit", "The federal deficit is $1.8 trillion.")
///     .with_failure("federal deficit since 2023");
///
/// let evidence = tokio_test::block_on(resolver.resolve("current federal deficit")).unwrap();
/// assert!(evidence.text.contains("$1.8 trillion"));
/// assert!(tokio_test::block_on(resolver.resolve("federal deficit since 2023")).is_err());
/// assert_eq!(resolver.call_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    responses: HashMap<String, Evidence>,
    failures: HashSet<String>,
    default_response: Option<Evidence>,
    call_count: Arc<AtomicUsize>,
}

impl StaticResolver {
    /// Resolver that knows nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `evidence`
    pub fn with_response(mut self, query: impl Into<String>, evidence: impl Into<Evidence>) -> Self {
        self.responses.insert(query.into(), evidence.into());
        self
    }

    /// Answer every unknown query with `evidence`
    pub fn with_default(mut self, evidence: impl Into<Evidence>) -> Self {
        self.default_response = Some(evidence.into());
        self
    }

    /// Reject `query`
    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failures.insert(query.into());
        self
    }

    /// Load an evidence table from JSON
    ///
    /// The document is an object mapping each query to either a string or
    /// an object `{"text": ..., "source": ..., "url": ...}`.
    pub fn from_json(json: &str) -> Result<Self, VerifierError> {
        let entries: HashMap<String, EvidenceEntry> = serde_json::from_str(json)?;
        let responses = entries
            .into_iter()
            .map(|(query, entry)| (query, entry.into()))
            .collect();
        Ok(Self {
            responses,
            ..Self::default()
        })
    }

    /// Number of queries answered or rejected so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of queries with a configured answer
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether no query has a configured answer
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[async_trait]
impl EvidenceResolver for StaticResolver {
    async fn resolve(&self, query: &str) -> Result<Evidence, ResolverError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.failures.contains(query) {
            return Err(ResolverError::Rejected(format!("lookup for '{}' failed", query)));
        }
        if let Some(evidence) = self.responses.get(query) {
            return Ok(evidence.clone());
        }
        self.default_response
            .clone()
            .ok_or_else(|| ResolverError::NotFound(query.to_string()))
    }
}

/// Resolver that rejects every query
#[derive(Debug, Clone)]
pub struct FailingResolver {
    reason: String,
}

impl FailingResolver {
    /// Reject every query with `reason`
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingResolver {
    fn default() -> Self {
        Self::new("evidence source unavailable")
    }
}

#[async_trait]
impl EvidenceResolver for FailingResolver {
    async fn resolve(&self, _query: &str) -> Result<Evidence, ResolverError> {
        Err(ResolverError::Rejected(self.reason.clone()))
    }
}

/// One value of an evidence file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EvidenceEntry {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl From<EvidenceEntry> for Evidence {
    fn from(entry: EvidenceEntry) -> Self {
        match entry {
            EvidenceEntry::Text(text) => Evidence::new(text),
            EvidenceEntry::Full { text, source, url } => Evidence {
                text,
                source_name: source,
                url,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    struct SlowResolver;

    #[async_trait]
    impl EvidenceResolver for SlowResolver {
        async fn resolve(&self, _query: &str) -> Result<Evidence, ResolverError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Evidence::new("too late"))
        }
    }

    #[test]
    fn test_static_resolver_responses() {
        let resolver = StaticResolver::new()
            .with_response("a", "alpha")
            .with_response("b", Evidence::new("beta").with_source("Census"));

        assert_eq!(block_on(resolver.resolve("a")).unwrap().text, "alpha");
        let b = block_on(resolver.resolve("b")).unwrap();
        assert_eq!(b.source_name.as_deref(), Some("Census"));
        assert_eq!(
            block_on(resolver.resolve("c")),
            Err(ResolverError::NotFound("c".to_string()))
        );
        assert_eq!(resolver.call_count(), 3);
    }

    #[test]
    fn test_static_resolver_default_and_failure() {
        let resolver = StaticResolver::new()
            .with_default("fallback")
            .with_failure("broken");
        assert_eq!(block_on(resolver.resolve("anything")).unwrap().text, "fallback");
        assert!(matches!(
            block_on(resolver.resolve("broken")),
            Err(ResolverError::Rejected(_))
        ));
    }

    #[test]
    fn test_clones_share_call_count() {
        let resolver = StaticResolver::new().with_default("x");
        let clone = resolver.clone();
        block_on(clone.resolve("q")).unwrap();
        assert_eq!(resolver.call_count(), 1);
    }

    #[test]
    fn test_failing_resolver() {
        let resolver = FailingResolver::new("offline");
        assert_eq!(
            block_on(resolver.resolve("q")),
            Err(ResolverError::Rejected("offline".to_string()))
        );
    }

    #[test]
    fn test_from_json_accepts_both_shapes() {
        let json = r#"{
            "current federal deficit": "The federal deficit is $1.8 trillion.",
            "federal deficit since 2023": {"text": "It was $1.7 trillion.", "source": "CBO", "url": "https://cbo.gov"}
        }"#;
        let resolver = StaticResolver::from_json(json).unwrap();
        assert_eq!(resolver.len(), 2);
        let historical = block_on(resolver.resolve("federal deficit since 2023")).unwrap();
        assert_eq!(historical.source_name.as_deref(), Some("CBO"));
        assert_eq!(historical.url.as_deref(), Some("https://cbo.gov"));
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        assert!(matches!(
            StaticResolver::from_json("[1, 2]"),
            Err(VerifierError::InvalidEvidence(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let result =
            resolve_with_timeout(&SlowResolver, "q", Duration::from_millis(20)).await;
        assert_eq!(result, Err(ResolverError::Timeout(20)));
    }

    #[tokio::test]
    async fn test_blank_evidence_is_empty() {
        let resolver = StaticResolver::new().with_default("   ");
        let result = resolve_with_timeout(&resolver, "q", Duration::from_secs(1)).await;
        assert_eq!(result, Err(ResolverError::Empty));
    }
}
