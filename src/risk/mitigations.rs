//! Fixed mitigation catalogue.
//!
//! Recommendations are keyed by (risk level, risk category). Critical and
//! high findings always receive at least one critical-priority mitigation.

use crate::types::{Mitigation, MitigationPriority, RiskCategory, RiskLevel};

fn mitigation(
    id: &str,
    title: &str,
    description: &str,
    priority: MitigationPriority,
    effort: &str,
    timeline: &str,
    compliance_tags: &[&str],
) -> Mitigation {
    Mitigation {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        priority,
        effort: effort.to_string(),
        timeline: timeline.to_string(),
        compliance_tags: compliance_tags.iter().map(|s| s.to_string()).collect(),
    }
}

fn purge_from_history() -> Mitigation {
    mitigation(
        "M-001",
        "Purge the value from the repository and its history",
        "Remove the matched value from the working tree and rewrite repository history so the value is unrecoverable from any clone.",
        MitigationPriority::Critical,
        "medium",
        "24 hours",
        &["APRA CPS 234", "Privacy Act 1988"],
    )
}

fn category_mitigations(category: RiskCategory) -> Vec<Mitigation> {
    match category {
        RiskCategory::FinancialFraud => vec![
            mitigation(
                "M-101",
                "Notify the issuing institution",
                "Treat the exposed account details as compromised and ask the institution to monitor or reissue them.",
                MitigationPriority::Critical,
                "low",
                "24 hours",
                &["APRA CPS 234"],
            ),
            mitigation(
                "M-102",
                "Add payment-data scanning to CI",
                "Block commits containing BSB, account, or card patterns before they reach a shared branch.",
                MitigationPriority::High,
                "medium",
                "2 weeks",
                &["APRA CPS 234"],
            ),
        ],
        RiskCategory::IdentityTheft => vec![
            mitigation(
                "M-201",
                "Assess notification obligations for affected individuals",
                "Combined identity attributes enable impersonation; run the notifiable-data-breach assessment and notify affected individuals where required.",
                MitigationPriority::Critical,
                "medium",
                "72 hours",
                &["Privacy Act 1988", "NDB scheme"],
            ),
            mitigation(
                "M-202",
                "Tokenise identity attributes in source and fixtures",
                "Replace real identifiers with generated, checksum-valid synthetic values.",
                MitigationPriority::High,
                "medium",
                "2 weeks",
                &["Privacy Act 1988"],
            ),
        ],
        RiskCategory::RegulatoryBreach => vec![
            mitigation(
                "M-301",
                "Engage compliance for a reportable-incident review",
                "A regulated entity holding exposed PI may have APRA and OAIC reporting duties with fixed clocks; start the review now.",
                MitigationPriority::Critical,
                "low",
                "24 hours",
                &["APRA CPS 234", "Privacy Act 1988"],
            ),
        ],
        RiskCategory::PrivacyBreach => vec![
            mitigation(
                "M-401",
                "Run an OAIC notifiable-breach assessment",
                "The affected-individual count is above the internal threshold; document the assessment even if notification is not ultimately required.",
                MitigationPriority::Critical,
                "medium",
                "72 hours",
                &["Privacy Act 1988", "NDB scheme"],
            ),
        ],
        RiskCategory::Operational => vec![
            mitigation(
                "M-501",
                "Replace with synthetic fixture data",
                "Swap the value for an obviously fake, checksum-valid generated one so future scans stay quiet.",
                MitigationPriority::Medium,
                "low",
                "next sprint",
                &[],
            ),
        ],
    }
}

/// Mitigations for a finding. Ordered by priority, highest first.
pub fn mitigations_for(level: RiskLevel, category: RiskCategory) -> Vec<Mitigation> {
    let mut recommendations = Vec::new();

    if matches!(level, RiskLevel::Critical | RiskLevel::High) {
        recommendations.push(purge_from_history());
    }
    recommendations.extend(category_mitigations(category));

    if level <= RiskLevel::Medium {
        // Low-stakes findings do not warrant the critical-tier items.
        for item in &mut recommendations {
            if item.priority == MitigationPriority::Critical {
                item.priority = MitigationPriority::High;
            }
        }
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations
}
