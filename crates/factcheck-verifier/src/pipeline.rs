//! Document pipeline: extraction, routing and document-level scores

use crate::router::{RouteResult, RouterOptions, VerificationRouter};
use factcheck_domain::{aggregate, Claim, Verdict};
use factcheck_extractor::Extractor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

const SCORE_CEILING: f64 = 100.0;

/// Everything learned about one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Extracted claims in sentence order
    pub claims: Vec<Claim>,
    /// One routing result per claim, in sentence order
    pub results: Vec<RouteResult>,
    /// Aggregated confidence of automated verifications, 0 to 100
    pub document_confidence: f64,
    /// Aggregated hedging across all claims, 0 to 100
    pub deniability_risk: f64,
}

impl DocumentReport {
    /// Every query still waiting for evidence, without duplicates
    pub fn queries_needed(&self) -> Vec<String> {
        let mut queries: Vec<String> = Vec::new();
        for query in self.results.iter().filter_map(RouteResult::queries_needed).flatten() {
            if !queries.contains(query) {
                queries.push(query.clone());
            }
        }
        queries
    }

    /// Number of results per verdict
    pub fn verdict_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for verdict in self.results.iter().filter_map(RouteResult::verdict) {
            *counts.entry(verdict.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Results with the given verdict
    pub fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &RouteResult> {
        self.results
            .iter()
            .filter(move |r| r.verdict() == Some(verdict))
    }
}

/// Extraction followed by routing
#[derive(Debug, Clone, Default)]
pub struct FactCheckPipeline {
    extractor: Extractor,
    router: VerificationRouter,
}

impl FactCheckPipeline {
    /// Combine an extractor and a router
    pub fn new(extractor: Extractor, router: VerificationRouter) -> Self {
        Self { extractor, router }
    }

    /// Extractor in use
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Router in use
    pub fn router(&self) -> &VerificationRouter {
        &self.router
    }

    /// Extract, verify and score a document
    ///
    /// Must be called inside a tokio runtime.
    pub async fn check_document(&self, text: &str, options: &RouterOptions) -> DocumentReport {
        let claims = self.extractor.extract(text);
        let results = self.router.verify_batch(claims.clone(), options).await;

        let confidences: Vec<f64> = results
            .iter()
            .filter_map(RouteResult::verification)
            .filter(|v| v.automated)
            .map(|v| v.confidence * 100.0)
            .collect();
        let deniability: Vec<f64> = claims.iter().map(|c| c.deniability_score * 100.0).collect();

        let report = DocumentReport {
            document_confidence: aggregate(&confidences).min(SCORE_CEILING),
            deniability_risk: aggregate(&deniability).min(SCORE_CEILING),
            claims,
            results,
        };
        info!(
            claims = report.claims.len(),
            document_confidence = report.document_confidence,
            deniability_risk = report.deniability_risk,
            "Document checked"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;
    use std::sync::Arc;

    const DOCUMENT: &str = "The federal deficit has doubled since 2023. \
        More than 25% of the VA workforce are veterans. \
        Some say the plant will close.";

    #[tokio::test]
    async fn test_without_resolver_lists_queries() {
        let report = FactCheckPipeline::default()
            .check_document(DOCUMENT, &RouterOptions::default())
            .await;

        assert_eq!(report.claims.len(), 3);
        assert_eq!(report.results.len(), 3);
        assert_eq!(
            report.queries_needed(),
            vec![
                "current federal deficit".to_string(),
                "federal deficit since 2023".to_string(),
                "current va workforce".to_string(),
            ]
        );
        // only the manual review verdict exists, and it is not automated
        assert_eq!(report.document_confidence, 0.0);
        assert_eq!(report.verdict_counts().get("UNSUPPORTED"), Some(&1));
    }

    #[tokio::test]
    async fn test_verified_document() {
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
        let pipeline = FactCheckPipeline::new(
            Extractor::default(),
            VerificationRouter::default().with_resolver(Arc::new(resolver)),
        );
        let report = pipeline.check_document(DOCUMENT, &RouterOptions::default()).await;

        // two automated verdicts tied at 95 add no corroboration
        assert_eq!(report.document_confidence, 95.0);
        assert_eq!(report.with_verdict(Verdict::False).count(), 1);
        assert_eq!(report.with_verdict(Verdict::True).count(), 1);
        assert!(report.queries_needed().is_empty());
    }

    #[tokio::test]
    async fn test_deniability_risk() {
        let text = "The senator may have taken bribes from 3 donors. I love this town.";
        let report = FactCheckPipeline::default()
            .check_document(text, &RouterOptions::default())
            .await;
        assert_eq!(report.claims.len(), 1);
        assert!((report.deniability_risk - 45.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let report = FactCheckPipeline::default()
            .check_document("", &RouterOptions::default())
            .await;
        assert!(report.claims.is_empty());
        assert_eq!(report.document_confidence, 0.0);
        assert_eq!(report.deniability_risk, 0.0);
    }
}
