//! Regulatory compliance flags.
//!
//! Flags are evaluated against the effective risk level — the worse of the
//! confidence-derived and matrix-derived levels — because obligations follow
//! the level a report would present, and both levels stay recorded on the
//! finding either way.

use crate::config::ComplianceConfig;
use crate::types::{PiType, RegulatoryCompliance, RiskLevel};

pub fn assess_compliance(
    pi_type: PiType,
    effective_level: RiskLevel,
    international: bool,
    config: &ComplianceConfig,
) -> RegulatoryCompliance {
    let severe = matches!(effective_level, RiskLevel::Critical | RiskLevel::High);

    let notifiable_data_breach =
        config.privacy_act_aligned && severe && pi_type.is_personal_information();
    let privacy_act_breach = notifiable_data_breach;
    let apra_reporting =
        config.apra_aligned && pi_type.is_apra_relevant() && effective_level != RiskLevel::Low;

    let mut required_notifications = Vec::new();
    if notifiable_data_breach {
        required_notifications.push("OAIC".to_string());
    }
    if apra_reporting {
        required_notifications.push("APRA".to_string());
    }
    if international && (notifiable_data_breach || privacy_act_breach) {
        required_notifications.push("EU DPA".to_string());
    }

    RegulatoryCompliance {
        notifiable_data_breach,
        apra_reporting,
        privacy_act_breach,
        required_notifications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned() -> ComplianceConfig {
        ComplianceConfig::default()
    }

    #[test]
    fn critical_tfn_triggers_everything() {
        let compliance = assess_compliance(PiType::Tfn, RiskLevel::Critical, false, &aligned());
        assert!(compliance.notifiable_data_breach);
        assert!(compliance.apra_reporting);
        assert!(compliance.privacy_act_breach);
        assert_eq!(compliance.required_notifications, vec!["OAIC", "APRA"]);
    }

    #[test]
    fn medium_bsb_is_apra_only() {
        let compliance = assess_compliance(PiType::Bsb, RiskLevel::Medium, false, &aligned());
        assert!(!compliance.notifiable_data_breach);
        assert!(compliance.apra_reporting);
        assert_eq!(compliance.required_notifications, vec!["APRA"]);
    }

    #[test]
    fn low_risk_triggers_nothing() {
        let compliance = assess_compliance(PiType::Tfn, RiskLevel::Low, false, &aligned());
        assert!(!compliance.notifiable_data_breach);
        assert!(!compliance.apra_reporting);
        assert!(compliance.required_notifications.is_empty());
    }

    #[test]
    fn email_is_not_notifiable_even_at_critical() {
        let compliance = assess_compliance(PiType::Email, RiskLevel::Critical, false, &aligned());
        assert!(!compliance.notifiable_data_breach);
        assert!(!compliance.apra_reporting);
    }

    #[test]
    fn international_orgs_notify_eu_dpa() {
        let compliance = assess_compliance(PiType::Medicare, RiskLevel::High, true, &aligned());
        assert!(compliance
            .required_notifications
            .contains(&"EU DPA".to_string()));
    }

    #[test]
    fn unaligned_config_suppresses_flags() {
        let config = ComplianceConfig {
            apra_aligned: false,
            privacy_act_aligned: false,
        };
        let compliance = assess_compliance(PiType::Tfn, RiskLevel::Critical, false, &config);
        assert!(!compliance.notifiable_data_breach);
        assert!(!compliance.apra_reporting);
        assert!(compliance.required_notifications.is_empty());
    }
}
