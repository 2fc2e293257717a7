//! Verification Router
//!
//! Chooses the verification path for a claim: comparative, structured or
//! standard (manual review). Failures never escape: every call returns a
//! [`RouteResult`].

use crate::comparative::{plan_queries, ComparativeVerifier};
use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::resolver::SharedResolver;
use crate::structured::{
    extract_structured, structured_query, verify_structured, FactLookup, StructuredResult,
};
use factcheck_domain::traits::ComparisonDetector;
use factcheck_domain::{Claim, ClaimKey, Verdict, Verification, VerificationMethod};
use factcheck_extractor::Detector;
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

const STRUCTURED_RULE: &str = "structured.actor_action_quantity";

/// Per-call routing options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterOptions {
    /// Actor substituted for pronouns in structured claims
    pub fallback_actor: Option<String>,
    /// Overrides the claim's own deniability score
    pub deniability_score: Option<f64>,
    /// Labels copied onto structured results
    pub deniability_labels: Vec<String>,
    /// Caller's fact-check identity, attached to every claim key
    pub fact_check_id: Option<String>,
}

/// What a routed claim produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// A verification record (comparative or standard)
    Verification(Verification),
    /// A structured-claim result
    Structured(StructuredResult),
    /// No resolver is configured: these queries would have been issued
    QueriesNeeded(Vec<String>),
}

/// Result of routing one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Whether routing completed
    pub success: bool,
    /// Claim the result belongs to
    pub claim_id: ClaimKey,
    /// Path taken, absent when routing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethod>,
    /// What the path produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RouteOutcome>,
    /// Why routing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouteResult {
    fn completed(claim_id: ClaimKey, method: VerificationMethod, outcome: RouteOutcome) -> Self {
        Self {
            success: true,
            claim_id,
            verification_method: Some(method),
            outcome: Some(outcome),
            error: None,
        }
    }

    /// A failed routing attempt
    pub fn failed(claim_id: ClaimKey, error: impl Into<String>) -> Self {
        Self {
            success: false,
            claim_id,
            verification_method: None,
            outcome: None,
            error: Some(error.into()),
        }
    }

    /// The verification record, if one was produced
    pub fn verification(&self) -> Option<&Verification> {
        match &self.outcome {
            Some(RouteOutcome::Verification(v)) => Some(v),
            _ => None,
        }
    }

    /// The structured result, if one was produced
    pub fn structured(&self) -> Option<&StructuredResult> {
        match &self.outcome {
            Some(RouteOutcome::Structured(s)) => Some(s),
            _ => None,
        }
    }

    /// Queries the caller must answer, in degenerate mode
    pub fn queries_needed(&self) -> Option<&[String]> {
        match &self.outcome {
            Some(RouteOutcome::QueriesNeeded(queries)) => Some(queries),
            _ => None,
        }
    }

    /// Verdict reached, if any
    pub fn verdict(&self) -> Option<Verdict> {
        match &self.outcome {
            Some(RouteOutcome::Verification(v)) => Some(v.verdict),
            Some(RouteOutcome::Structured(s)) => Some(s.verdict),
            _ => None,
        }
    }

    /// Confidence in the verdict, if any
    pub fn confidence(&self) -> Option<f64> {
        match &self.outcome {
            Some(RouteOutcome::Verification(v)) => Some(v.confidence),
            Some(RouteOutcome::Structured(s)) => Some(s.confidence),
            _ => None,
        }
    }
}

/// Routes claims to the right verification path
#[derive(Clone)]
pub struct VerificationRouter {
    config: Arc<VerifierConfig>,
    resolver: Option<SharedResolver>,
    fact_lookup: Option<Arc<dyn FactLookup>>,
    detector: Detector,
}

impl VerificationRouter {
    /// Create a router with no resolver and no fact lookup
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        config.validate().map_err(VerifierError::Config)?;
        Ok(Self {
            config: Arc::new(config),
            resolver: None,
            fact_lookup: None,
            detector: Detector,
        })
    }

    /// Resolve comparative evidence through `resolver`
    pub fn with_resolver(mut self, resolver: SharedResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Check structured claims against `lookup`
    pub fn with_fact_lookup(mut self, lookup: Arc<dyn FactLookup>) -> Self {
        self.fact_lookup = Some(lookup);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Whether an evidence resolver is configured
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Verify one claim
    ///
    /// Malformed claims and internal failures come back as
    /// `success == false` with the reason in `error`.
    pub async fn verify_claim(&self, claim: &Claim, options: &RouterOptions) -> RouteResult {
        let key = claim_key(claim, options);
        match AssertUnwindSafe(self.route(claim, options, key.clone()))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                debug!("Rejected claim {}: {}", key, e);
                RouteResult::failed(key, e.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown failure".to_string());
                error!("Verification of claim {} failed: {}", key, message);
                RouteResult::failed(key, format!("internal error: {}", message))
            }
        }
    }

    /// Verify many claims concurrently
    ///
    /// Spawns one task per claim, at most `max_concurrency` running at a
    /// time. Results come back ordered by sentence index, whatever order the
    /// tasks finish in. Must be called inside a tokio runtime.
    pub async fn verify_batch(
        &self,
        claims: Vec<Claim>,
        options: &RouterOptions,
    ) -> Vec<RouteResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let options = Arc::new(options.clone());
        let count = claims.len();

        let (keys, handles): (Vec<_>, Vec<_>) = claims
            .into_iter()
            .map(|claim| {
                let router = self.clone();
                let options = Arc::clone(&options);
                let semaphore = Arc::clone(&semaphore);
                let key = claim_key(&claim, &options);
                let handle = tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    router.verify_claim(&claim, &options).await
                });
                (key, handle)
            })
            .unzip();

        let mut results: Vec<RouteResult> = keys
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(key, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Verification task for claim {} failed: {}", key, e);
                    RouteResult::failed(key, format!("verification task failed: {}", e))
                }
            })
            .collect();
        results.sort_by_key(|r| r.claim_id.sentence_index);

        info!(
            "Verified {} claims ({} succeeded)",
            count,
            results.iter().filter(|r| r.success).count()
        );
        results
    }

    async fn route(
        &self,
        claim: &Claim,
        options: &RouterOptions,
        key: ClaimKey,
    ) -> Result<RouteResult, VerifierError> {
        validate_claim(claim, options)?;

        if claim.private_data_detected {
            debug!("Claim {} holds private data; manual review only", key);
            let verification = Verification::manual_review(
                key.clone(),
                "Contains private data; not sent for evidence lookup",
            );
            return Ok(RouteResult::completed(
                key,
                VerificationMethod::Standard,
                RouteOutcome::Verification(verification),
            ));
        }

        let detection = self.detector.detect(&claim.text);
        if detection.is_comparative {
            let outcome = match &self.resolver {
                None => RouteOutcome::QueriesNeeded(
                    plan_queries(&detection).into_iter().map(|q| q.query).collect(),
                ),
                Some(resolver) => {
                    let verifier =
                        ComparativeVerifier::new(Arc::clone(resolver), Arc::clone(&self.config));
                    RouteOutcome::Verification(
                        verifier.verify(key.clone(), &detection, &claim.text).await,
                    )
                }
            };
            return Ok(RouteResult::completed(key, VerificationMethod::Comparative, outcome));
        }

        if claim.matched(STRUCTURED_RULE) {
            let deniability = options.deniability_score.unwrap_or(claim.deniability_score);
            let structured = extract_structured(
                &claim.text,
                options.fallback_actor.as_deref(),
                deniability,
            );
            if let Some(structured) = structured {
                let outcome = if self.fact_lookup.is_none() && self.resolver.is_none() {
                    RouteOutcome::QueriesNeeded(vec![structured_query(&structured)])
                } else {
                    RouteOutcome::Structured(verify_structured(
                        key.clone(),
                        structured,
                        self.fact_lookup.as_deref(),
                        options.deniability_labels.clone(),
                        &self.config,
                    ))
                };
                return Ok(RouteResult::completed(key, VerificationMethod::Structured, outcome));
            }
        }

        let verification = Verification::manual_review(
            key.clone(),
            "No automated check applies; manual review required",
        );
        Ok(RouteResult::completed(
            key,
            VerificationMethod::Standard,
            RouteOutcome::Verification(verification),
        ))
    }
}

impl Default for VerificationRouter {
    fn default() -> Self {
        Self {
            config: Arc::new(VerifierConfig::default()),
            resolver: None,
            fact_lookup: None,
            detector: Detector,
        }
    }
}

impl std::fmt::Debug for VerificationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationRouter")
            .field("config", &self.config)
            .field("has_resolver", &self.resolver.is_some())
            .field("has_fact_lookup", &self.fact_lookup.is_some())
            .finish()
    }
}

fn claim_key(claim: &Claim, options: &RouterOptions) -> ClaimKey {
    match &options.fact_check_id {
        Some(id) => claim.key().with_fact_check(id.clone()),
        None => claim.key(),
    }
}

fn validate_claim(claim: &Claim, options: &RouterOptions) -> Result<(), VerifierError> {
    if claim.text.trim().is_empty() {
        return Err(VerifierError::InvalidClaim("claim text is empty".to_string()));
    }
    let scores = [
        ("confidence_score", claim.confidence_score),
        ("deniability_score", claim.deniability_score),
        ("hearsay_confidence", claim.hearsay_confidence),
    ];
    for (name, score) in scores {
        if !(0.0..=1.0).contains(&score) {
            return Err(VerifierError::InvalidClaim(format!(
                "{} must be between 0.0 and 1.0, got {}",
                name, score
            )));
        }
    }
    if let Some(score) = options.deniability_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(VerifierError::InvalidClaim(format!(
                "deniability_score option must be between 0.0 and 1.0, got {}",
                score
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolverError;
    use crate::resolver::{Evidence, EvidenceResolver, StaticResolver};
    use crate::structured::StaticFactTable;
    use async_trait::async_trait;
    use factcheck_extractor::Extractor;

    fn claim(text: &str) -> Claim {
        Extractor::default()
            .extract(text)
            .into_iter()
            .next()
            .expect("text should yield a claim")
    }

    struct PanickingResolver;

    #[async_trait]
    impl EvidenceResolver for PanickingResolver {
        async fn resolve(&self, _query: &str) -> Result<Evidence, ResolverError> {
            panic!("resolver exploded")
        }
    }

    #[tokio::test]
    async fn test_comparative_without_resolver_lists_queries() {
        let router = VerificationRouter::default();
        let result = router
            .verify_claim(&claim("The federal deficit has doubled since 2023."), &RouterOptions::default())
            .await;

        assert!(result.success);
        assert_eq!(result.verification_method, Some(VerificationMethod::Comparative));
        assert_eq!(
            result.queries_needed().unwrap(),
            ["current federal deficit", "federal deficit since 2023"]
        );
        assert!(result.verdict().is_none());
    }

    #[tokio::test]
    async fn test_private_data_never_resolved() {
        let resolver = StaticResolver::new().with_default("31%");
        let router = VerificationRouter::default().with_resolver(Arc::new(resolver.clone()));
        let result = router
            .verify_claim(&claim("His SSN is 123-45-6789 on record."), &RouterOptions::default())
            .await;

        assert_eq!(result.verification_method, Some(VerificationMethod::Standard));
        let verification = result.verification().unwrap();
        assert!(!verification.automated);
        assert_eq!(verification.verdict, Verdict::Unsupported);
        assert_eq!(resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_standard_path_is_manual_review() {
        let result = VerificationRouter::default()
            .verify_claim(&claim("Some say the plant will close."), &RouterOptions::default())
            .await;
        let verification = result.verification().unwrap();
        assert_eq!(result.verification_method, Some(VerificationMethod::Standard));
        assert!(!verification.automated);
        assert_eq!(verification.verdict, Verdict::Unsupported);
    }

    #[tokio::test]
    async fn test_structured_path() {
        let options = RouterOptions {
            fallback_actor: Some("Senator Smith".to_string()),
            deniability_labels: vec!["none".to_string()],
            ..RouterOptions::default()
        };
        let text = "Senator Smith cut $2 billion from schools.";

        let result = VerificationRouter::default().verify_claim(&claim(text), &options).await;
        assert_eq!(result.verification_method, Some(VerificationMethod::Structured));
        assert_eq!(
            result.queries_needed().unwrap(),
            ["current senator smith cut schools"]
        );

        let table = StaticFactTable::new().with_fact("Senator Smith", "cut", "schools", 2e9);
        let router = VerificationRouter::default().with_fact_lookup(Arc::new(table));
        let result = router.verify_claim(&claim(text), &options).await;
        let structured = result.structured().unwrap();
        assert_eq!(structured.verdict, Verdict::True);
        assert!(structured.requires_review);
        assert_eq!(structured.deniability_labels, vec!["none".to_string()]);
    }

    #[tokio::test]
    async fn test_structured_with_resolver_only_is_unsupported() {
        let router = VerificationRouter::default()
            .with_resolver(Arc::new(StaticResolver::new()));
        let result = router
            .verify_claim(&claim("Senator Smith cut $2 billion from schools."), &RouterOptions::default())
            .await;
        let structured = result.structured().unwrap();
        assert_eq!(structured.verdict, Verdict::Unsupported);
    }

    #[tokio::test]
    async fn test_malformed_claim_reported() {
        let mut bad = claim("The federal deficit has doubled since 2023.");
        bad.deniability_score = f64::NAN;
        let result = VerificationRouter::default()
            .verify_claim(&bad, &RouterOptions::default())
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("deniability_score"));

        let mut empty = claim("The federal deficit has doubled since 2023.");
        empty.text = "  ".to_string();
        let result = VerificationRouter::default()
            .verify_claim(&empty, &RouterOptions::default())
            .await;
        assert!(!result.success);

        let options = RouterOptions {
            deniability_score: Some(1.5),
            ..RouterOptions::default()
        };
        let result = VerificationRouter::default()
            .verify_claim(&claim("The federal deficit has doubled since 2023."), &options)
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let router = VerificationRouter::default().with_resolver(Arc::new(PanickingResolver));
        let result = router
            .verify_claim(&claim("The federal deficit has doubled since 2023."), &RouterOptions::default())
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("resolver exploded"));
    }

    #[tokio::test]
    async fn test_fact_check_id_attached() {
        let options = RouterOptions {
            fact_check_id: Some("fc-7".to_string()),
            ..RouterOptions::default()
        };
        let result = VerificationRouter::default()
            .verify_claim(&claim("Some say the plant will close."), &options)
            .await;
        assert_eq!(result.claim_id.fact_check_id.as_deref(), Some("fc-7"));
        assert_eq!(result.claim_id.to_string(), "fc-7#0");
    }

    #[tokio::test]
    async fn test_batch_restores_sentence_order() {
        let text = "The federal deficit has doubled since 2023. \
            Some say the plant will close. \
            More than 25% of the VA workforce are veterans.";
        let claims = Extractor::default().extract(text);
        let router = VerificationRouter::new(VerifierConfig {
            max_concurrency: 1,
            ..VerifierConfig::default()
        })
        .unwrap()
        .with_resolver(Arc::new(StaticResolver::new().with_default("Coverage was 31% last month.")));

        let results = router.verify_batch(claims, &RouterOptions::default()).await;
        let indices: Vec<usize> = results.iter().map(|r| r.claim_id.sentence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(results.iter().all(|r| r.success));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VerifierConfig {
            max_concurrency: 0,
            ..VerifierConfig::default()
        };
        assert!(matches!(
            VerificationRouter::new(config),
            Err(VerifierError::Config(_))
        ));
    }

    #[test]
    fn test_route_outcome_serialization() {
        let result = RouteResult::completed(
            ClaimKey::for_sentence(2),
            VerificationMethod::Comparative,
            RouteOutcome::QueriesNeeded(vec!["current crime".to_string()]),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verification_method"], "comparative");
        assert_eq!(json["outcome"]["kind"], "queries_needed");
        assert_eq!(json["outcome"]["data"][0], "current crime");
        assert!(json.get("error").is_none());
    }
}
