//! End-to-end verification scenarios: extraction, routing and verdicts

use factcheck_domain::{Claim, ExpectedOutcome, Verdict, VerificationMethod};
use factcheck_extractor::Extractor;
use factcheck_verifier::{
    FailingResolver, RouteResult, RouterOptions, StaticResolver, VerificationRouter,
    VerifierConfig,
};
use std::sync::Arc;

fn only_claim(text: &str) -> Claim {
    let claims = Extractor::default().extract(text);
    assert_eq!(claims.len(), 1, "expected one claim from {text:?}");
    claims.into_iter().next().unwrap()
}

async fn route(text: &str, resolver: StaticResolver) -> RouteResult {
    let router = VerificationRouter::new(VerifierConfig::default())
        .unwrap()
        .with_resolver(Arc::new(resolver));
    router
        .verify_claim(&only_claim(text), &RouterOptions::default())
        .await
}

#[tokio::test]
async fn test_confirmed_overstatement() {
    let resolver = StaticResolver::new()
        .with_response(
            "current federal deficit",
            "The federal deficit is $1.8 trillion.",
        )
        .with_response(
            "federal deficit since 2023",
            "In 2023 the federal deficit was $1.7 trillion.",
        );
    let result = route("The federal deficit has doubled since 2023.", resolver).await;

    assert!(result.success);
    assert_eq!(result.verification_method, Some(VerificationMethod::Comparative));
    let verification = result.verification().unwrap();
    assert_eq!(verification.verdict, Verdict::False);
    assert_eq!(verification.expected_result, Some(2.0));
    let calculated = verification.calculated_result.unwrap();
    assert!((calculated - 1.8 / 1.7).abs() < 1e-9, "got {calculated}");
    assert!((calculated - 1.06).abs() < 0.01);

    assert_eq!(
        verification.search_queries_used,
        vec!["current federal deficit", "federal deficit since 2023"]
    );
    assert_eq!(verification.data_extraction_log.len(), 2);
    assert_eq!(
        verification.data_extraction_log[1].matched_text.as_deref(),
        Some("$1.7 trillion")
    );
    assert_eq!(verification.sources.len(), 2);
    assert!(!verification.calculation_steps.is_empty());
    assert!(verification.automated);
}

#[tokio::test]
async fn test_confirmed_threshold_claim() {
    let resolver =
        StaticResolver::new().with_default("According to OPM, 31% of its workforce are veterans.");
    let result = route("More than 25% of the VA workforce are veterans.", resolver).await;

    let verification = result.verification().unwrap();
    assert_eq!(verification.verdict, Verdict::True);
    assert!(verification.confidence >= 0.9);
    assert_eq!(verification.left_value, Some(0.31));
    assert!(matches!(
        verification.expected_outcome,
        Some(ExpectedOutcome::Threshold { value, .. }) if value == 0.25
    ));
}

#[tokio::test]
async fn test_count_overstatement() {
    let resolver = StaticResolver::new()
        .with_default("Records show the senator voted against infrastructure funding 8 times.");
    let result = route("Voted against infrastructure 12 times.", resolver).await;

    let verification = result.verification().unwrap();
    assert_eq!(verification.verdict, Verdict::Misleading);
    assert_eq!(verification.calculated_result, Some(8.0));
    assert_eq!(verification.expected_result, Some(12.0));
}

#[tokio::test]
async fn test_missing_evidence() {
    let router = VerificationRouter::default().with_resolver(Arc::new(FailingResolver::default()));
    let claim = only_claim("The federal deficit has doubled since 2023.");
    let result = router.verify_claim(&claim, &RouterOptions::default()).await;

    assert!(result.success);
    let verification = result.verification().unwrap();
    assert_eq!(verification.verdict, Verdict::Unsupported);
    assert!(verification.confidence <= 0.5);
    assert!(!verification.data_extraction_log.is_empty());
    assert!(verification
        .data_extraction_log
        .iter()
        .all(|entry| entry.extracted_value.is_none() && entry.error.is_some()));
}

#[tokio::test]
async fn test_resolver_timeout_degrades_verdict() {
    use async_trait::async_trait;
    use factcheck_verifier::{Evidence, EvidenceResolver, ResolverError};
    use std::time::Duration;

    struct Stalled;

    #[async_trait]
    impl EvidenceResolver for Stalled {
        async fn resolve(&self, _query: &str) -> Result<Evidence, ResolverError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Evidence::new("The federal deficit is $1.8 trillion."))
        }
    }

    let router = VerificationRouter::new(VerifierConfig {
        resolver_timeout_ms: 25,
        ..VerifierConfig::default()
    })
    .unwrap()
    .with_resolver(Arc::new(Stalled));
    let claim = only_claim("The federal deficit has doubled since 2023.");
    let result = router.verify_claim(&claim, &RouterOptions::default()).await;

    let verification = result.verification().unwrap();
    assert_eq!(verification.verdict, Verdict::Unsupported);
    assert!(verification.data_extraction_log[0]
        .error
        .as_deref()
        .unwrap()
        .contains("timed out"));
}

#[tokio::test]
async fn test_batch_of_scenarios() {
    let text = "The federal deficit has doubled since 2023. \
        More than 25% of the VA workforce are veterans. \
        His SSN is 123-45-6789 on record.";
    let resolver = StaticResolver::new()
        .with_response("current federal deficit", "The federal deficit is $1.8 trillion.")
        .with_response(
            "federal deficit since 2023",
            "In 2023 the federal deficit was $1.7 trillion.",
        )
        .with_response(
            "current va workforce",
            "According to OPM, 31% of its workforce are veterans.",
        );
    let router = VerificationRouter::default().with_resolver(Arc::new(resolver.clone()));

    let results = router
        .verify_batch(Extractor::default().extract(text), &RouterOptions::default())
        .await;

    let verdicts: Vec<Option<Verdict>> = results.iter().map(RouteResult::verdict).collect();
    assert_eq!(
        verdicts,
        vec![
            Some(Verdict::False),
            Some(Verdict::True),
            Some(Verdict::Unsupported)
        ]
    );
    // the private-data claim is never looked up
    assert_eq!(resolver.call_count(), 3);
    assert!(!results[2].verification().unwrap().automated);
}
