//! Risk matrix stage: impact x likelihood x exposure.
//!
//! This level answers "how bad if it leaks?", which is a different question
//! from the confidence engine's "how sure are we this is PI?". Both levels
//! are recorded on the finding; reporting presents the maximum.

pub mod compliance;
pub mod mitigations;

pub use compliance::assess_compliance;
pub use mitigations::mitigations_for;

use crate::constants;
use crate::cooccurrence::CoOccurrence;
use crate::policy::{Policy, RiskMode};
use crate::types::{
    Candidate, ContextType, RiskAssessment, RiskCategory, RiskLevel,
};

/// Path fragments that make a file easy to find for an attacker sweeping
/// leaked repositories.
const KNOWN_NAME_PATH_FRAGMENTS: &[&str] = &[
    "config",
    "settings",
    "secrets",
    "credentials",
    ".env",
    "production",
];

pub struct RiskInputs<'a> {
    pub candidate: &'a Candidate,
    pub context_type: ContextType,
    pub validated: bool,
    pub co_occurrences: &'a [CoOccurrence],
}

pub struct RiskMatrix<'p> {
    policy: &'p Policy,
}

impl<'p> RiskMatrix<'p> {
    pub fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }

    pub fn assess(&self, inputs: &RiskInputs<'_>) -> RiskAssessment {
        let impact = self.impact(inputs);
        let likelihood = self.likelihood(inputs);
        let exposure = self.exposure();
        let overall = self.aggregate(impact, likelihood, exposure);
        let risk_level = self.level_for(overall);
        let category = self.categorise(inputs);
        let mitigations = mitigations_for(risk_level, category);

        tracing::debug!(
            pi_type = %inputs.candidate.pi_type,
            impact,
            likelihood,
            exposure,
            overall,
            level = %risk_level,
            "risk matrix assessed"
        );

        RiskAssessment {
            impact,
            likelihood,
            exposure,
            overall,
            risk_level,
            category,
            mitigations,
        }
    }

    /// Weighted blend of sensitivity, scale, financial, regulatory, and
    /// reputational impact.
    fn impact(&self, inputs: &RiskInputs<'_>) -> f64 {
        let repo = &self.policy.repo;
        let pi_type = inputs.candidate.pi_type;

        let sensitivity = pi_type.regulatory_weight();
        let record_scale = match repo.estimated_affected_records {
            0..=9 => 0.3,
            10..=99 => 0.6,
            100..=999 => 0.8,
            _ => 1.0,
        };
        let financial = pi_type.financial_impact();
        let mut regulatory: f64 = if pi_type.is_apra_relevant() || pi_type.is_personal_information() {
            0.6
        } else {
            0.3
        };
        if repo.industry.is_regulated() && pi_type.is_apra_relevant() {
            regulatory += 0.3;
        }
        let reputational = (0.5 * repo.reputational_multiplier()).min(1.0);

        let components = [
            sensitivity,
            record_scale,
            financial,
            regulatory.min(1.0),
            reputational,
        ];
        components
            .iter()
            .zip(constants::IMPACT_WEIGHTS.iter())
            .map(|(c, w)| c * w)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Exploit complexity inverted into ease, then scaled by access vector,
    /// authentication, incident history, and threat-actor capability.
    fn likelihood(&self, inputs: &RiskInputs<'_>) -> f64 {
        let repo = &self.policy.repo;

        let mut complexity: f64 = 0.5;
        if repo.visibility.is_public() {
            complexity -= 0.3;
        }
        if inputs.context_type == ContextType::Test {
            complexity += 0.3;
        }
        if self.is_known_name_path(&inputs.candidate.file_path) {
            complexity -= 0.1;
        }
        if inputs.validated {
            complexity -= 0.2;
        }
        let complexity = complexity.clamp(0.05, 0.95);

        let incident_history = (1.0
            + repo.historical_incidents as f64 * constants::INCIDENT_LIKELIHOOD_STEP)
            .min(constants::INCIDENT_LIKELIHOOD_CAP);

        ((1.0 - complexity)
            * repo.access_vector.likelihood_multiplier()
            * repo.authentication.likelihood_multiplier()
            * incident_history
            * repo.threat_capability.likelihood_multiplier())
        .clamp(0.0, 1.0)
    }

    /// Visibility, data lifetime, encryption, and access-control strength.
    fn exposure(&self) -> f64 {
        let repo = &self.policy.repo;
        (0.5 * repo.visibility.exposure_multiplier()
            * repo.data_lifetime_multiplier()
            * repo.encryption.exposure_multiplier()
            * repo.access_control.exposure_multiplier())
        .clamp(0.0, 1.0)
    }

    fn aggregate(&self, impact: f64, likelihood: f64, exposure: f64) -> f64 {
        let w = self.policy.dimension_weights;
        match self.policy.risk_mode {
            RiskMode::Multiplicative => {
                (impact * likelihood * exposure * w.sum()).clamp(0.0, 1.0)
            }
            RiskMode::WeightedAverage => {
                (impact * w.impact + likelihood * w.likelihood + exposure * w.exposure)
                    .clamp(0.0, 1.0)
            }
        }
    }

    pub fn level_for(&self, overall: f64) -> RiskLevel {
        let t = self.policy.matrix_thresholds;
        if overall >= t.critical {
            RiskLevel::Critical
        } else if overall >= t.high {
            RiskLevel::High
        } else if overall >= t.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn categorise(&self, inputs: &RiskInputs<'_>) -> RiskCategory {
        let repo = &self.policy.repo;
        let pi_type = inputs.candidate.pi_type;

        let co_occurs_with_financial = inputs
            .co_occurrences
            .iter()
            .any(|co| co.pi_type.is_financial());

        if pi_type.is_financial()
            && (co_occurs_with_financial || pi_type.financial_impact() > 0.7)
        {
            return RiskCategory::FinancialFraud;
        }
        if pi_type.is_identity_document()
            && (!inputs.co_occurrences.is_empty() || repo.visibility.is_public())
        {
            return RiskCategory::IdentityTheft;
        }
        let regulatory_impact = if repo.industry.is_regulated() && pi_type.is_apra_relevant() {
            0.9
        } else {
            0.3
        };
        if repo.industry.is_regulated() && regulatory_impact > 0.6 {
            return RiskCategory::RegulatoryBreach;
        }
        if repo.estimated_affected_records > constants::PRIVACY_BREACH_RECORD_THRESHOLD {
            return RiskCategory::PrivacyBreach;
        }
        RiskCategory::Operational
    }

    fn is_known_name_path(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        KNOWN_NAME_PATH_FRAGMENTS
            .iter()
            .any(|fragment| lower.contains(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::types::{
        AccessVector, AuthRequirement, EncryptionStatus, Industry, PiType, RepoContext,
        RepoVisibility,
    };

    fn candidate(pi_type: PiType, path: &str) -> Candidate {
        Candidate {
            pi_type,
            literal: "x".to_string(),
            file_path: path.to_string(),
            byte_span: (0, 1),
            line: 1,
            column: 1,
            detector_name: "pattern.test".to_string(),
        }
    }

    fn banking_public_repo() -> RepoContext {
        RepoContext {
            visibility: RepoVisibility::Public,
            industry: Industry::Banking,
            access_vector: AccessVector::PublicNetwork,
            authentication: AuthRequirement::None,
            encryption: EncryptionStatus::PlainText,
            estimated_affected_records: 500,
            ..RepoContext::default()
        }
    }

    fn inputs<'a>(
        candidate: &'a Candidate,
        co_occurrences: &'a [CoOccurrence],
    ) -> RiskInputs<'a> {
        RiskInputs {
            candidate,
            context_type: ContextType::Production,
            validated: true,
            co_occurrences,
        }
    }

    #[test]
    fn dimensions_stay_in_unit_range() {
        let policy = Policy::default_policy().with_repo_context(banking_public_repo());
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Tfn, "config/prod.yaml");
        let assessment = matrix.assess(&inputs(&cand, &[]));
        for value in [
            assessment.impact,
            assessment.likelihood,
            assessment.exposure,
            assessment.overall,
        ] {
            assert!((0.0..=1.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn public_banking_repo_outranks_private_default() {
        let cand = candidate(PiType::Tfn, "src/customer.go");

        let private = Policy::default_policy();
        let public = Policy::default_policy().with_repo_context(banking_public_repo());

        let low = RiskMatrix::new(&private).assess(&inputs(&cand, &[]));
        let high = RiskMatrix::new(&public).assess(&inputs(&cand, &[]));
        assert!(high.overall > low.overall);
        assert!(high.likelihood > low.likelihood);
        assert!(high.exposure > low.exposure);
    }

    #[test]
    fn weighted_average_mode_scores_higher_than_multiplicative() {
        let mut config = ScanConfig::default();
        config.risk.mode = "weighted_average".to_string();
        let weighted = Policy::compile(config)
            .unwrap()
            .with_repo_context(banking_public_repo());
        let multiplicative = Policy::default_policy().with_repo_context(banking_public_repo());

        let cand = candidate(PiType::Tfn, "src/customer.go");
        let wa = RiskMatrix::new(&weighted).assess(&inputs(&cand, &[]));
        let mu = RiskMatrix::new(&multiplicative).assess(&inputs(&cand, &[]));
        assert!(wa.overall > mu.overall);
    }

    #[test]
    fn bsb_with_account_nearby_is_financial_fraud() {
        let policy = Policy::default_policy();
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Bsb, "config/prod.yaml");
        let cos = vec![CoOccurrence {
            pi_type: PiType::Account,
            line: 2,
            distance: 1,
        }];
        let assessment = matrix.assess(&inputs(&cand, &cos));
        assert_eq!(assessment.category, RiskCategory::FinancialFraud);
    }

    #[test]
    fn identity_document_with_cooccurrence_is_identity_theft() {
        let policy = Policy::default_policy();
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Tfn, "src/patient.go");
        let cos = vec![CoOccurrence {
            pi_type: PiType::Medicare,
            line: 3,
            distance: 2,
        }];
        let assessment = matrix.assess(&inputs(&cand, &cos));
        assert_eq!(assessment.category, RiskCategory::IdentityTheft);
    }

    #[test]
    fn lone_tfn_in_private_repo_is_not_identity_theft() {
        let policy = Policy::default_policy();
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Tfn, "src/service.go");
        let assessment = matrix.assess(&inputs(&cand, &[]));
        assert_ne!(assessment.category, RiskCategory::IdentityTheft);
    }

    #[test]
    fn regulated_industry_apra_type_is_regulatory_breach() {
        let policy = Policy::default_policy().with_repo_context(RepoContext {
            industry: Industry::Banking,
            ..RepoContext::default()
        });
        let matrix = RiskMatrix::new(&policy);
        // ABN is APRA-relevant but neither high-financial nor identity.
        let cand = candidate(PiType::Abn, "src/entity.go");
        let assessment = matrix.assess(&inputs(&cand, &[]));
        assert_eq!(assessment.category, RiskCategory::RegulatoryBreach);
    }

    #[test]
    fn large_record_count_is_privacy_breach() {
        let policy = Policy::default_policy().with_repo_context(RepoContext {
            estimated_affected_records: 5000,
            ..RepoContext::default()
        });
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Email, "src/users.go");
        let assessment = matrix.assess(&inputs(&cand, &[]));
        assert_eq!(assessment.category, RiskCategory::PrivacyBreach);
    }

    #[test]
    fn test_context_lowers_likelihood() {
        let policy = Policy::default_policy();
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::Tfn, "src/thing.go");

        let production = matrix.assess(&inputs(&cand, &[]));
        let test = matrix.assess(&RiskInputs {
            candidate: &cand,
            context_type: ContextType::Test,
            validated: true,
            co_occurrences: &[],
        });
        assert!(test.likelihood < production.likelihood);
        assert_eq!(test.category, RiskCategory::Operational);
    }

    #[test]
    fn mitigations_accompany_every_assessment() {
        let policy = Policy::default_policy().with_repo_context(banking_public_repo());
        let matrix = RiskMatrix::new(&policy);
        let cand = candidate(PiType::CreditCard, "src/payments.go");
        let assessment = matrix.assess(&inputs(&cand, &[]));
        assert!(!assessment.mitigations.is_empty());
    }
}
