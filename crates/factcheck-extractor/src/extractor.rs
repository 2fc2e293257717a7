//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::deniability::DeniabilityScanner;
use crate::detector::detect;
use crate::error::ExtractorError;
use crate::hearsay::{hearsay_confidence, marker_count};
use crate::rules::{self, SentenceSignals, QUANTIFIABLE_RULES};
use crate::sentences::{split_sentences, Sentence};
use factcheck_domain::traits::ClaimExtractor;
use factcheck_domain::{Claim, ClaimStatus, ClaimType, VerificationMethod};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DENIABILITY_PENALTY: f64 = 0.2;
const UNQUANTIFIED_CONFIDENCE: f64 = 0.45;
const QUANTIFIED_BASE: f64 = 0.7;
const PER_EXTRA_INDICATOR: f64 = 0.1;
const QUANTIFIED_CAP: f64 = 0.9;

/// The Extractor turns unstructured text into ordered, classified claims
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    scanner: Arc<DeniabilityScanner>,
}

impl Extractor {
    /// Create a new Extractor with the built-in deniability patterns
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            config,
            scanner: Arc::new(DeniabilityScanner::default()),
        })
    }

    /// Use a custom deniability pattern table
    pub fn with_scanner(mut self, scanner: DeniabilityScanner) -> Self {
        self.scanner = Arc::new(scanner);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Deniability scanner used for scoring
    pub fn scanner(&self) -> &DeniabilityScanner {
        &self.scanner
    }

    /// Extract claims from text
    ///
    /// Never fails. Sentences that are too short, non-rhetorical questions,
    /// or match no rule produce no claim. Hitting a length limit stops the
    /// walk and returns what was collected so far.
    pub fn extract(&self, text: &str) -> Vec<Claim> {
        let mut claims = Vec::new();

        for sentence in split_sentences(text) {
            if let Err(e) = self.check_limits(&sentence) {
                warn!(
                    "Stopping extraction at sentence {} with {} claims: {}",
                    sentence.index,
                    claims.len(),
                    e
                );
                break;
            }

            if let Some(claim) = self.classify(&sentence) {
                debug!(
                    sentence_index = claim.sentence_index,
                    claim_type = %claim.claim_type,
                    confidence = claim.confidence_score,
                    "Classified sentence"
                );
                claims.push(claim);
            }
        }

        info!("Extracted {} claims from {} bytes", claims.len(), text.len());
        claims
    }

    fn check_limits(&self, sentence: &Sentence<'_>) -> Result<(), ExtractorError> {
        if sentence.span.end > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                sentence.span.end,
                self.config.max_text_length,
            ));
        }
        if sentence.text.len() > self.config.max_sentence_length {
            return Err(ExtractorError::SentenceTooLong {
                index: sentence.index,
                len: sentence.text.len(),
                max: self.config.max_sentence_length,
            });
        }
        Ok(())
    }

    fn classify(&self, sentence: &Sentence<'_>) -> Option<Claim> {
        if sentence.word_count() < self.config.min_sentence_words {
            debug!("Skipping short sentence {}", sentence.index);
            return None;
        }

        let deniability = self.scanner.score_sentence(sentence.text);
        if self.config.skip_questions && sentence.is_question() && !deniability.rhetorical {
            debug!("Skipping question {}", sentence.index);
            return None;
        }

        let comparison = detect(sentence.text);
        let signals = SentenceSignals {
            text: sentence.text,
            deniability: &deniability,
            hearsay_markers: marker_count(sentence.text),
            comparison: &comparison,
        };

        let matched = rules::evaluate(&signals);
        let claim_type = matched.first()?.claim_type;

        let private_data_detected = matched
            .iter()
            .any(|rule| rule.claim_type == ClaimType::PrivateData);
        let structured = matched
            .iter()
            .any(|rule| rule.claim_type == ClaimType::Structured);
        let quantifiable = matched
            .iter()
            .filter(|rule| QUANTIFIABLE_RULES.contains(&rule.id))
            .count();

        let verification_type = if private_data_detected {
            VerificationMethod::Standard
        } else if comparison.is_comparative {
            VerificationMethod::Comparative
        } else if structured {
            VerificationMethod::Structured
        } else {
            VerificationMethod::Standard
        };

        Some(Claim {
            text: sentence.text.to_string(),
            sentence_index: sentence.index,
            span: sentence.span,
            claim_type,
            verifiable: !private_data_detected && (quantifiable > 0 || comparison.is_comparative),
            verification_type,
            confidence_score: confidence_for(claim_type, quantifiable, deniability.score),
            patterns_matched: matched.iter().map(|rule| rule.id.to_string()).collect(),
            deniability_score: deniability.score,
            hearsay_confidence: hearsay_confidence(sentence.text),
            private_data_detected,
            status: ClaimStatus::Pending,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            config: ExtractorConfig::default(),
            scanner: Arc::new(DeniabilityScanner::default()),
        }
    }
}

impl ClaimExtractor for Extractor {
    fn extract(&self, text: &str) -> Vec<Claim> {
        Extractor::extract(self, text)
    }
}

/// Classification confidence for a claim
///
/// Direct factual claims start at 0.7 with one quantifiable indicator and
/// gain 0.1 per further indicator up to 0.9; 0.45 without any. Other types
/// use a fixed base. Hedging lowers every type.
pub(crate) fn confidence_for(claim_type: ClaimType, quantifiable: usize, deniability: f64) -> f64 {
    let base = match claim_type {
        ClaimType::DirectFactual if quantifiable == 0 => UNQUANTIFIED_CONFIDENCE,
        ClaimType::DirectFactual => {
            (QUANTIFIED_BASE + PER_EXTRA_INDICATOR * (quantifiable - 1) as f64).min(QUANTIFIED_CAP)
        }
        ClaimType::Comparative => 0.8,
        ClaimType::Structured => 0.85,
        ClaimType::Hearsay => 0.5,
        ClaimType::PlausibleDeniability => 0.4,
        ClaimType::PrivateData => 0.3,
    };
    (base - DENIABILITY_PENALTY * deniability).clamp(0.0, 1.0)
}
