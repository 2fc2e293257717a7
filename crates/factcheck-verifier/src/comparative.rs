//! Comparative Verifier
//!
//! Resolves evidence for both sides of a comparison, extracts the numbers,
//! performs the arithmetic and compares it with what the claim asserts.
//! Every step is recorded on the returned [`Verification`].

use crate::assertion::{parse_expected, Measure};
use crate::config::VerifierConfig;
use crate::quantity::{extract_quantity, extract_quantity_as, ExtractedQuantity, QuantityKind};
use crate::query::{generate_query, PREVIOUS_PERIOD};
use crate::resolver::{resolve_with_timeout, SharedResolver};
use factcheck_domain::{
    ClaimKey, ComparativeDetection, ExpectedOutcome, ExtractionLogEntry, SourceRef, Verdict,
    Verification, VerificationMethod,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const FULL_CONFIDENCE: f64 = 0.95;
const PARTIAL_EVIDENCE_CONFIDENCE: f64 = 0.3;
const NO_EVIDENCE_CONFIDENCE: f64 = 0.1;
const UNPARSED_CONFIDENCE: f64 = 0.3;

/// Which side of the comparison a query looks up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRole {
    /// Present value of a time series
    Current,
    /// Past value of a time series
    Historical,
    /// Left-hand metric of a ratio or direct claim
    Left,
    /// Right-hand metric of a ratio claim
    Right,
}

/// A query the verifier will issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedQuery {
    /// Metric the query looks up
    pub metric: String,
    /// Query string handed to the resolver
    pub query: String,
    /// Side of the comparison
    pub role: QueryRole,
}

/// Queries needed to verify a detection
///
/// Time series claims get a current and a historical query for the primary
/// metric. Ratio and direct claims get a left query (and a right query when
/// there is a right metric) per verification step.
pub fn plan_queries(detection: &ComparativeDetection) -> Vec<PlannedQuery> {
    let Some(comparison_type) = detection.comparison_type else {
        return Vec::new();
    };

    if comparison_type.is_time_series() {
        let Some(metric) = detection.primary_metric() else {
            return Vec::new();
        };
        let anchor = detection
            .time_reference
            .as_deref()
            .unwrap_or(PREVIOUS_PERIOD);
        return vec![
            PlannedQuery {
                metric: metric.to_string(),
                query: generate_query(metric, None),
                role: QueryRole::Current,
            },
            PlannedQuery {
                metric: metric.to_string(),
                query: generate_query(metric, Some(anchor)),
                role: QueryRole::Historical,
            },
        ];
    }

    let time_reference = detection.time_reference.as_deref();
    let mut planned = Vec::new();
    for step in &detection.verification_steps {
        planned.push(PlannedQuery {
            metric: step.left_metric.clone(),
            query: generate_query(&step.left_metric, time_reference),
            role: QueryRole::Left,
        });
        if let Some(right) = &step.right_metric {
            planned.push(PlannedQuery {
                metric: right.clone(),
                query: generate_query(right, time_reference),
                role: QueryRole::Right,
            });
        }
    }
    planned
}

/// Verifies comparative claims against resolved evidence
#[derive(Clone)]
pub struct ComparativeVerifier {
    resolver: SharedResolver,
    config: Arc<VerifierConfig>,
}

impl ComparativeVerifier {
    /// Create a verifier around an evidence resolver
    pub fn new(resolver: SharedResolver, config: Arc<VerifierConfig>) -> Self {
        Self { resolver, config }
    }

    /// Verify one comparative claim
    ///
    /// Never fails: missing evidence, unparsable numbers and impossible
    /// arithmetic all produce an UNSUPPORTED verdict with the reason noted.
    pub async fn verify(
        &self,
        claim_id: ClaimKey,
        detection: &ComparativeDetection,
        claim_text: &str,
    ) -> Verification {
        let mut verification = Verification::new(claim_id, VerificationMethod::Comparative);
        verification.comparison_type = detection.comparison_type;

        let planned = plan_queries(detection);
        verification.search_queries_used = planned.iter().map(|q| q.query.clone()).collect();
        if planned.is_empty() {
            verification.confidence = NO_EVIDENCE_CONFIDENCE;
            verification.notes = "No metric to look up".to_string();
            return verification;
        }

        let assertion = parse_expected(claim_text, detection);
        if let Some(assertion) = &assertion {
            verification.expected_outcome = Some(assertion.outcome);
            verification.expected_result = Some(assertion.outcome.value());
        }
        // A bound on a single figure only needs that figure, of the named kind
        let single = assertion.filter(|a| a.measure == Measure::Value);
        let expected_kind = single.and_then(|a| a.unit);

        let extracted = self.gather(&planned, expected_kind, &mut verification).await;
        let value_for = |role: QueryRole| {
            planned
                .iter()
                .zip(&extracted)
                .find(|(q, _)| q.role == role)
                .and_then(|(_, value)| value.as_ref())
        };
        let (left, right) = if planned[0].role == QueryRole::Current {
            (value_for(QueryRole::Current), value_for(QueryRole::Historical))
        } else {
            (value_for(QueryRole::Left), value_for(QueryRole::Right))
        };
        let right_required = single.is_none()
            && planned
                .iter()
                .any(|q| matches!(q.role, QueryRole::Historical | QueryRole::Right));

        verification.left_value = left.map(|q| q.value);
        verification.right_value = right.map(|q| q.value);

        let Some(left) = left.filter(|_| !right_required || right.is_some()) else {
            let found_any = extracted.iter().any(Option::is_some);
            verification.confidence = if found_any {
                PARTIAL_EVIDENCE_CONFIDENCE
            } else {
                NO_EVIDENCE_CONFIDENCE
            };
            verification.notes = format!(
                "Missing evidence for: {}",
                planned
                    .iter()
                    .zip(&extracted)
                    .filter(|(_, value)| value.is_none())
                    .map(|(q, _)| q.query.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return self.finish(verification);
        };

        let Some(assertion) = assertion else {
            verification.confidence = UNPARSED_CONFIDENCE;
            verification.notes = "Could not determine what the claim asserts".to_string();
            return self.finish(verification);
        };

        let calculated = match (assertion.measure, right) {
            (Measure::Value, _) => {
                verification
                    .calculation_steps
                    .push(format!("value = {}", left.value));
                left.value
            }
            (Measure::Ratio, Some(right)) if right.value == 0.0 => {
                verification.confidence = PARTIAL_EVIDENCE_CONFIDENCE;
                verification.notes = "Cannot divide by a zero comparison value".to_string();
                return self.finish(verification);
            }
            (Measure::Ratio, Some(right)) => {
                let ratio = left.value / right.value;
                verification
                    .calculation_steps
                    .push(format!("ratio = {} / {} = {:.4}", left.value, right.value, ratio));
                ratio
            }
            (Measure::Difference, Some(right)) => {
                let difference = left.value - right.value;
                verification.calculation_steps.push(format!(
                    "difference = {} - {} = {}",
                    left.value, right.value, difference
                ));
                difference
            }
            (_, None) => {
                verification.confidence = PARTIAL_EVIDENCE_CONFIDENCE;
                verification.notes = "The claim needs a second value to compare".to_string();
                return self.finish(verification);
            }
        };

        let verdict = determine_verdict(&assertion.outcome, calculated, &self.config);
        verification
            .calculation_steps
            .push(format!("expected {} -> {}", assertion.outcome, verdict));

        let used = if single.is_some() { None } else { right };
        let fallbacks = [Some(left), used]
            .into_iter()
            .flatten()
            .filter(|q| !q.keyword_adjacent)
            .count();
        verification.verdict = verdict;
        verification.calculated_result = Some(calculated);
        verification.confidence =
            FULL_CONFIDENCE * self.config.fallback_penalty.powi(fallbacks as i32);
        if fallbacks > 0 {
            verification.notes = format!(
                "{} value(s) taken from numbers not next to a metric keyword",
                fallbacks
            );
        }
        self.finish(verification)
    }

    /// Resolve every planned query and log what each one yielded
    async fn gather(
        &self,
        planned: &[PlannedQuery],
        expected_kind: Option<QuantityKind>,
        verification: &mut Verification,
    ) -> Vec<Option<ExtractedQuantity>> {
        let timeout = self.config.resolver_timeout();
        let results = join_all(
            planned
                .iter()
                .map(|q| resolve_with_timeout(self.resolver.as_ref(), &q.query, timeout)),
        )
        .await;

        let mut extracted = Vec::with_capacity(planned.len());
        for (query, result) in planned.iter().zip(results) {
            match result {
                Ok(evidence) => {
                    let window = self.config.keyword_window;
                    let quantity =
                        extract_quantity_as(&evidence.text, &query.metric, window, expected_kind);
                    let error = match (&quantity, expected_kind) {
                        (Some(_), _) => None,
                        (None, Some(kind))
                            if extract_quantity(&evidence.text, &query.metric, window).is_some() =>
                        {
                            Some(format!("no {kind} figure found in evidence"))
                        }
                        (None, _) => Some("no number found in evidence".to_string()),
                    };
                    debug!(
                        query = %query.query,
                        found = quantity.is_some(),
                        "Resolved evidence"
                    );
                    verification.data_extraction_log.push(ExtractionLogEntry {
                        query: query.query.clone(),
                        raw_snippet: Some(evidence.text.clone()),
                        matched_text: quantity.as_ref().map(|q| q.matched.clone()),
                        extracted_value: quantity.as_ref().map(|q| q.value),
                        error,
                    });
                    verification.sources.push(SourceRef {
                        query: query.query.clone(),
                        source_name: evidence.source_name,
                        url: evidence.url,
                    });
                    extracted.push(quantity);
                }
                Err(e) => {
                    warn!("Evidence lookup failed for '{}': {}", query.query, e);
                    verification
                        .data_extraction_log
                        .push(ExtractionLogEntry::missing(query.query.clone(), e.to_string()));
                    extracted.push(None);
                }
            }
        }
        extracted
    }

    fn finish(&self, verification: Verification) -> Verification {
        info!(
            claim_id = %verification.claim_id,
            verdict = %verification.verdict,
            confidence = verification.confidence,
            queries = verification.search_queries_used.len(),
            "Comparative verification complete"
        );
        verification
    }
}

impl std::fmt::Debug for ComparativeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparativeVerifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Compare a calculated figure with what the claim asserted
///
/// ```
/// use factcheck_domain::{ExpectedOutcome, Verdict};
/// use factcheck_verifier::{determine_verdict, VerifierConfig};
///
/// let config = VerifierConfig::default();
/// let doubled = ExpectedOutcome::Ratio { value: 2.0 };
/// assert_eq!(determine_verdict(&doubled, 2.04, &config), Verdict::True);
/// assert_eq!(determine_verdict(&doubled, 1.7, &config), Verdict::Misleading);
/// assert_eq!(determine_verdict(&doubled, 1.06, &config), Verdict::False);
/// ```
pub fn determine_verdict(
    outcome: &ExpectedOutcome,
    calculated: f64,
    config: &VerifierConfig,
) -> Verdict {
    let tolerance = config.ratio_tolerance;
    if !calculated.is_finite() {
        return Verdict::Unsupported;
    }

    match *outcome {
        ExpectedOutcome::Ratio { value } => {
            if relative_gap(calculated, value) <= tolerance {
                Verdict::True
            } else if (calculated - 1.0) * (value - 1.0) <= 0.0 {
                // claimed no change, or the change went the other way
                Verdict::False
            } else if (calculated - 1.0) / (value - 1.0) < config.far_short_fraction {
                Verdict::False
            } else {
                Verdict::Misleading
            }
        }
        ExpectedOutcome::Threshold { comparator, value } => {
            let band = if value == 0.0 {
                tolerance
            } else {
                tolerance * value.abs()
            };
            if comparator.holds(calculated, value) {
                Verdict::True
            } else if (calculated - value).abs() <= band {
                Verdict::Misleading
            } else {
                Verdict::False
            }
        }
        ExpectedOutcome::Exact { value } => {
            if relative_gap(calculated, value) <= tolerance {
                Verdict::True
            } else if calculated * value > 0.0
                && calculated.abs().min(value.abs()) / calculated.abs().max(value.abs())
                    >= config.far_short_fraction
            {
                Verdict::Misleading
            } else {
                Verdict::False
            }
        }
    }
}

fn relative_gap(actual: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        actual.abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Evidence, FailingResolver, StaticResolver};
    use factcheck_domain::{Comparator, ComparisonType, VerificationStep};
    use factcheck_extractor::detect;

    fn verifier(resolver: StaticResolver) -> ComparativeVerifier {
        ComparativeVerifier::new(Arc::new(resolver), Arc::new(VerifierConfig::default()))
    }

    #[test]
    fn test_plan_time_series() {
        let detection = detect("The federal deficit has doubled since 2023.");
        let planned = plan_queries(&detection);
        let queries: Vec<&str> = planned.iter().map(|q| q.query.as_str()).collect();
        assert_eq!(
            queries,
            vec!["current federal deficit", "federal deficit since 2023"]
        );
        assert_eq!(planned[0].role, QueryRole::Current);
        assert_eq!(planned[1].role, QueryRole::Historical);
    }

    #[test]
    fn test_plan_trend_without_anchor() {
        let detection = ComparativeDetection {
            is_comparative: true,
            comparison_type: Some(ComparisonType::Trend),
            is_trend: true,
            metrics: vec!["wages".to_string()],
            ..ComparativeDetection::default()
        };
        let planned = plan_queries(&detection);
        assert_eq!(planned[1].query, "wages previous year");
        assert_ne!(planned[0].query, planned[1].query);
    }

    #[test]
    fn test_plan_ratio_and_direct() {
        let detection = ComparativeDetection {
            is_comparative: true,
            comparison_type: Some(ComparisonType::Ratio),
            metrics: vec!["rent".to_string(), "national average".to_string()],
            verification_steps: vec![VerificationStep {
                left_metric: "rent".to_string(),
                right_metric: Some("national average".to_string()),
            }],
            ..ComparativeDetection::default()
        };
        let roles: Vec<QueryRole> = plan_queries(&detection).iter().map(|q| q.role).collect();
        assert_eq!(roles, vec![QueryRole::Left, QueryRole::Right]);

        let detection = detect("More than 25% of the VA workforce are veterans.");
        let planned = plan_queries(&detection);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].query, "current va workforce");
    }

    #[test]
    fn test_plan_not_comparative() {
        assert!(plan_queries(&ComparativeDetection::none()).is_empty());
    }

    #[tokio::test]
    async fn test_ratio_claim_true() {
        let text = "Rent is 2 times higher than the national average.";
        let resolver = StaticResolver::new()
            .with_response("current rent", "Median rent here is $2,400 a month.")
            .with_response(
                "current national average",
                Evidence::new("The national average is $1,200 a month.").with_source("HUD"),
            );
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::True);
        assert_eq!(verification.calculated_result, Some(2.0));
        assert_eq!(verification.sources.len(), 2);
        assert_eq!(verification.sources[1].source_name.as_deref(), Some("HUD"));
        assert!(verification.confidence >= 0.9);
    }

    #[tokio::test]
    async fn test_qualitative_difference() {
        let text = "Our deficit is larger than the GDP of France.";
        let resolver = StaticResolver::new()
            .with_response("current deficit", "The deficit is $1.8 trillion.")
            .with_response("current gdp of france", "France's GDP is $3.0 trillion.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::False);
        assert!(verification.calculated_result.unwrap() < 0.0);
        assert!(verification.calculation_steps[0].starts_with("difference = "));
    }

    #[tokio::test]
    async fn test_partial_evidence_is_unsupported() {
        let text = "The federal deficit has doubled since 2023.";
        let resolver = StaticResolver::new()
            .with_response("current federal deficit", "The federal deficit is $1.8 trillion.")
            .with_failure("federal deficit since 2023");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::Unsupported);
        assert_eq!(verification.confidence, PARTIAL_EVIDENCE_CONFIDENCE);
        assert!((verification.left_value.unwrap() - 1.8e12).abs() < 1.0);
        assert!(verification.data_extraction_log[1].error.is_some());
        assert!(verification.notes.contains("federal deficit since 2023"));
        assert_eq!(verification.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_no_number_in_evidence() {
        let text = "More than 25% of the VA workforce are veterans.";
        let resolver = StaticResolver::new().with_default("Many veterans work at the VA.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::Unsupported);
        assert_eq!(
            verification.data_extraction_log[0].error.as_deref(),
            Some("no number found in evidence")
        );
        assert!(verification.data_extraction_log[0].raw_snippet.is_some());
    }

    #[tokio::test]
    async fn test_zero_historical_value() {
        let text = "The federal deficit has doubled since 2023.";
        let resolver = StaticResolver::new()
            .with_response("current federal deficit", "The federal deficit is $1.8 trillion.")
            .with_response("federal deficit since 2023", "The federal deficit was 0 then.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::Unsupported);
        assert!(verification.calculated_result.is_none());
        assert!(verification.confidence <= 0.5);
    }

    #[tokio::test]
    async fn test_fallback_number_lowers_confidence() {
        let text = "More than 25% of the VA workforce are veterans.";
        let resolver = StaticResolver::new().with_default("The latest figure: 31%.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::True);
        assert!((verification.confidence - 0.95 * 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_percent_claim_ignores_headcount() {
        let text = "More than 25% of the VA workforce are veterans.";
        let resolver =
            StaticResolver::new().with_default("The VA workforce totals 400,000 employees.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::Unsupported);
        assert!(verification.confidence <= 0.5);
        assert!(verification.left_value.is_none());
        assert_eq!(
            verification.data_extraction_log[0].error.as_deref(),
            Some("no percent figure found in evidence")
        );

        let resolver = StaticResolver::new()
            .with_default("The VA workforce totals 400,000 employees, 31% of them veterans.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;
        assert_eq!(verification.verdict, Verdict::True);
        assert_eq!(verification.left_value, Some(0.31));
    }

    #[tokio::test]
    async fn test_qualified_increase_exceeded() {
        let text = "Property taxes have increased by more than 20% since 2020.";
        let resolver = StaticResolver::new()
            .with_response("current property taxes", "Property taxes now average $1,500 per home.")
            .with_response(
                "property taxes since 2020",
                "Back then property taxes averaged $1,000 per home.",
            );
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::True);
        assert_eq!(verification.calculated_result, Some(1.5));
    }

    #[tokio::test]
    async fn test_qualified_increase_not_reached() {
        let text = "Gas prices are up more than 50% since 2021.";
        let resolver = StaticResolver::new()
            .with_response("current gas prices", "Gas prices average $3.30 a gallon.")
            .with_response("gas prices since 2021", "Gas prices averaged $3.00 a gallon.");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::False);
        assert!((verification.calculated_result.unwrap() - 1.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fell_to_bound_checks_current_level() {
        let text = "Unemployment fell to less than 4% since 2023.";
        let resolver = StaticResolver::new()
            .with_response("current unemployment", "The unemployment rate is 5%.")
            .with_failure("unemployment since 2023");
        let verification = verifier(resolver)
            .verify(ClaimKey::for_sentence(0), &detect(text), text)
            .await;

        assert_eq!(verification.verdict, Verdict::False);
        assert_eq!(verification.calculated_result, Some(0.05));
        assert_eq!(verification.calculation_steps[0], "value = 0.05");
    }

    #[tokio::test]
    async fn test_failing_resolver_logs_every_query() {
        let text = "The federal deficit has doubled since 2023.";
        let verification = ComparativeVerifier::new(
            Arc::new(FailingResolver::default()),
            Arc::new(VerifierConfig::default()),
        )
        .verify(ClaimKey::for_sentence(0), &detect(text), text)
        .await;

        assert_eq!(verification.data_extraction_log.len(), 2);
        assert!(verification.sources.is_empty());
        assert_eq!(verification.confidence, NO_EVIDENCE_CONFIDENCE);
        assert_eq!(verification.expected_result, Some(2.0));
    }

    #[test]
    fn test_ratio_verdicts() {
        let config = VerifierConfig::default();
        let halved = ExpectedOutcome::Ratio { value: 0.5 };
        assert_eq!(determine_verdict(&halved, 0.51, &config), Verdict::True);
        assert_eq!(determine_verdict(&halved, 1.2, &config), Verdict::False);
        assert_eq!(determine_verdict(&halved, 0.6, &config), Verdict::Misleading);
        assert_eq!(determine_verdict(&halved, 0.9, &config), Verdict::False);
    }

    #[test]
    fn test_threshold_verdicts() {
        let config = VerifierConfig::default();
        let over = ExpectedOutcome::Threshold {
            comparator: Comparator::GreaterThan,
            value: 0.25,
        };
        assert_eq!(determine_verdict(&over, 0.31, &config), Verdict::True);
        assert_eq!(determine_verdict(&over, 0.245, &config), Verdict::Misleading);
        assert_eq!(determine_verdict(&over, 0.2, &config), Verdict::False);
    }

    #[test]
    fn test_exact_verdicts() {
        let config = VerifierConfig::default();
        let twelve = ExpectedOutcome::Exact { value: 12.0 };
        assert_eq!(determine_verdict(&twelve, 12.0, &config), Verdict::True);
        assert_eq!(determine_verdict(&twelve, 8.0, &config), Verdict::Misleading);
        assert_eq!(determine_verdict(&twelve, 3.0, &config), Verdict::False);
        assert_eq!(determine_verdict(&twelve, 0.0, &config), Verdict::False);
    }

    #[test]
    fn test_strict_tolerance() {
        let doubled = ExpectedOutcome::Ratio { value: 2.0 };
        assert_eq!(
            determine_verdict(&doubled, 2.06, &VerifierConfig::default()),
            Verdict::True
        );
        assert_eq!(
            determine_verdict(&doubled, 2.06, &VerifierConfig::strict()),
            Verdict::Misleading
        );
    }

    #[test]
    fn test_non_finite_is_unsupported() {
        let doubled = ExpectedOutcome::Ratio { value: 2.0 };
        assert_eq!(
            determine_verdict(&doubled, f64::NAN, &VerifierConfig::default()),
            Verdict::Unsupported
        );
    }
}
