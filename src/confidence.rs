//! Confidence scoring stage.
//!
//! Combines the proximity, ML, and validation factors into a weighted base,
//! then applies the PI-type regulatory weight, the environment factor, and
//! the co-occurrence factor. The result is a clamped confidence in [0,1],
//! the risk level derived from it, and an audit entry per stage.

use crate::constants;
use crate::context::ContextClassification;
use crate::cooccurrence::CoOccurrence;
use crate::error::{ScanError, ScanResult};
use crate::policy::{AggregationMethod, Policy};
use crate::types::{
    AuditEntry, Candidate, ContextType, RiskLevel, ScoreBreakdown, ValidationOutcome,
};
use crate::validators;
use chrono::Utc;
use std::collections::BTreeMap;

/// Per-file environment sweep result, computed once and applied to every
/// candidate in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentAssessment {
    pub factor: f64,
    pub tags: Vec<String>,
}

impl EnvironmentAssessment {
    pub fn neutral() -> Self {
        Self {
            factor: 1.0,
            tags: Vec::new(),
        }
    }
}

/// Scan filename and content for environment indicator tags. Each tag fires
/// at most once; the multipliers of distinct tags compound, clamped to the
/// configured range.
pub fn assess_environment(path: &str, text: &str, policy: &Policy) -> EnvironmentAssessment {
    let path_lower = path.to_lowercase();
    let text_lower = text.to_lowercase();

    let mut factor = 1.0;
    let mut tags = Vec::new();
    for (tag, multiplier) in policy.environment_tags() {
        if contains_word(&path_lower, tag) || contains_word(&text_lower, tag) {
            factor *= multiplier;
            tags.push(tag.to_string());
        }
    }
    tags.sort();

    EnvironmentAssessment {
        factor: factor.clamp(
            constants::ENVIRONMENT_FACTOR_MIN,
            constants::ENVIRONMENT_FACTOR_MAX,
        ),
        tags,
    }
}

/// Whole-word containment: the tag must not be embedded in a longer
/// alphanumeric run ("prod" does not fire inside "production").
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut search_from = 0;
    while let Some(rel) = haystack[search_from..].find(needle) {
        let idx = search_from + rel;
        let end = idx + needle.len();
        let before_ok = idx == 0
            || !haystack[..idx]
                .chars()
                .next_back()
                .map(|c| c.is_ascii_alphanumeric())
                .unwrap_or(false);
        let after_ok = end >= haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .map(|c| c.is_ascii_alphanumeric())
                .unwrap_or(false);
        if before_ok && after_ok {
            return true;
        }
        search_from = end;
    }
    false
}

/// Output of the confidence stage for one candidate.
#[derive(Debug, Clone)]
pub struct ConfidenceScore {
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    pub audit_trail: Vec<AuditEntry>,
}

pub struct ConfidenceEngine<'p> {
    policy: &'p Policy,
}

impl<'p> ConfidenceEngine<'p> {
    pub fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }

    /// Score one candidate. Missing proximity/ML/validation inputs never
    /// fail; neutral defaults substitute. An empty literal is the one
    /// invalid input a typed candidate can still carry.
    pub fn score(
        &self,
        candidate: &Candidate,
        context: &ContextClassification,
        validation: &ValidationOutcome,
        co_occurrences: &[CoOccurrence],
        environment: &EnvironmentAssessment,
    ) -> ScanResult<ConfidenceScore> {
        if candidate.literal.is_empty() {
            return Err(ScanError::InvalidInput(format!(
                "empty literal for {} candidate at {}:{}",
                candidate.pi_type, candidate.file_path, candidate.line
            )));
        }

        let mut audit_trail = Vec::new();

        // Factor 1: proximity, straight from context analysis.
        let proximity = context.modifier;
        audit_trail.push(entry(
            "context_analyzer",
            proximity,
            format!("context classified as {}", context.context_type.as_str()),
            [(
                "keywords".to_string(),
                serde_json::json!(context.keywords),
            )]
            .into(),
        ));

        // Factor 2: ML, neutral when no scorer is wired in.
        let (ml, ml_desc) = match self.policy.ml_scorer().and_then(|s| s.score(candidate)) {
            Some(pred) if pred.is_pi => (pred.confidence, "ml prediction accepted"),
            Some(pred) => (
                pred.confidence * constants::ML_INVALID_PENALTY,
                "ml prediction penalised as invalid",
            ),
            None => (constants::NEUTRAL_ML_FACTOR, "no ml scorer, neutral factor"),
        };
        audit_trail.push(entry("ml_validator", ml, ml_desc.to_string(), BTreeMap::new()));

        // Factor 3: algorithmic validation. A failed check against an
        // existing algorithm is evidence against; a missing algorithm is not.
        let validation_factor = if validation.is_valid {
            validation.confidence
        } else if validators::has_validator(candidate.pi_type) {
            0.0
        } else {
            constants::NEUTRAL_VALIDATION_FACTOR
        };
        audit_trail.push(entry(
            "validator",
            validation_factor,
            if validation.has_algorithm() {
                format!("{} -> valid={}", validation.algorithm, validation.is_valid)
            } else {
                "no validator registered for type".to_string()
            },
            BTreeMap::new(),
        ));

        // Factor 4: environment indicators from filename and content.
        audit_trail.push(entry(
            "environment",
            environment.factor,
            format!("{} environment indicator(s) fired", environment.tags.len()),
            [("tags".to_string(), serde_json::json!(environment.tags))].into(),
        ));

        // Factor 5: co-occurrence boosts with line-distance decay.
        let co_occurrence = self.co_occurrence_factor(candidate, co_occurrences);
        audit_trail.push(entry(
            "co_occurrence",
            co_occurrence,
            format!(
                "{} co-occurring candidate(s) within {} lines",
                co_occurrences.len(),
                self.policy.proximity_distance
            ),
            BTreeMap::new(),
        ));

        // Factor 6 and aggregation.
        let pi_type_weight = candidate.pi_type.regulatory_weight();
        let weights = self.policy.weights;
        let base = match self.policy.aggregation {
            AggregationMethod::WeightedLinear => {
                proximity * weights.proximity + ml * weights.ml + validation_factor * weights.validation
            }
            AggregationMethod::SimpleAverage => (proximity + ml + validation_factor) / 3.0,
        };

        let mut confidence =
            (base * pi_type_weight * environment.factor * co_occurrence).clamp(0.0, 1.0);

        // Test context is terminal: it must never out-score LOW.
        if context.context_type == ContextType::Test {
            let cap = 0.2f64.min(self.policy.confidence_thresholds.medium - 1e-9);
            confidence = confidence.min(cap);
        }

        let risk_level = self.risk_level_for(confidence);
        audit_trail.push(entry(
            "confidence_engine",
            confidence,
            format!(
                "aggregated via {} -> {}",
                self.policy.aggregation.as_str(),
                risk_level
            ),
            [
                ("base".to_string(), serde_json::json!(base)),
                ("pi_type_weight".to_string(), serde_json::json!(pi_type_weight)),
            ]
            .into(),
        ));

        let breakdown = ScoreBreakdown {
            proximity,
            ml,
            validation: validation_factor,
            environment: environment.factor,
            co_occurrence,
            pi_type_weight,
            weight_proximity: weights.proximity,
            weight_ml: weights.ml,
            weight_validation: weights.validation,
            base,
            final_score: confidence,
            aggregation_method: self.policy.aggregation.as_str().to_string(),
        };

        Ok(ConfidenceScore {
            confidence,
            risk_level,
            breakdown,
            audit_trail,
        })
    }

    /// Deterministic threshold map from confidence to risk level.
    pub fn risk_level_for(&self, confidence: f64) -> RiskLevel {
        let t = self.policy.confidence_thresholds;
        if confidence >= t.critical {
            RiskLevel::Critical
        } else if confidence >= t.high {
            RiskLevel::High
        } else if confidence >= t.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn co_occurrence_factor(
        &self,
        candidate: &Candidate,
        co_occurrences: &[CoOccurrence],
    ) -> f64 {
        let mut factor = 1.0;
        for co in co_occurrences {
            if let Some(boost) = self.policy.cooccurrence_boost(candidate.pi_type, co.pi_type) {
                let decayed =
                    1.0 + (boost - 1.0) * constants::COOCCURRENCE_DECAY.powi(co.distance as i32);
                factor *= decayed;
            }
            if factor >= constants::COOCCURRENCE_CAP {
                return constants::COOCCURRENCE_CAP;
            }
        }
        factor.min(constants::COOCCURRENCE_CAP)
    }
}

fn entry(
    component: &str,
    score: f64,
    description: String,
    details: BTreeMap<String, serde_json::Value>,
) -> AuditEntry {
    AuditEntry {
        component: component.to_string(),
        timestamp: Utc::now(),
        score,
        description,
        details,
    }
}
