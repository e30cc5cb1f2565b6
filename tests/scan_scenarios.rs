// End-to-end scan scenarios
//
// Each test drives the full pipeline through scan_file: pattern detection,
// context analysis, validation, confidence scoring, risk matrix, compliance.

use piscan::{scan_file, ContextType, PiType, Policy, RiskCategory, RiskLevel};
use std::sync::atomic::AtomicBool;

fn scan(path: &str, text: &str) -> piscan::FileScan {
    let policy = Policy::default_policy();
    scan_file(path, text.as_bytes(), &policy, &AtomicBool::new(false)).unwrap()
}

fn finding_of<'a>(scan: &'a piscan::FileScan, pi_type: PiType) -> &'a piscan::Finding {
    scan.findings
        .iter()
        .find(|f| f.pi_type == pi_type)
        .unwrap_or_else(|| panic!("expected a {pi_type} finding"))
}

#[test]
fn valid_tfn_in_production_code() {
    let scan = scan("src/customer.go", r#"customerTFN := "876 543 210""#);
    let tfn = finding_of(&scan, PiType::Tfn);

    assert!(tfn.validated);
    assert_eq!(tfn.validation_algorithm.as_deref(), Some("tfn_weighted_checksum"));
    assert_eq!(tfn.context_type, ContextType::Variable);
    assert!((tfn.confidence - 0.85).abs() < 1e-9);
    assert_eq!(tfn.risk_level, RiskLevel::High);
    assert!(tfn.compliance.apra_reporting);
    assert!(tfn.compliance.notifiable_data_breach);
    assert!(tfn
        .compliance
        .required_notifications
        .contains(&"OAIC".to_string()));
}

#[test]
fn same_tfn_in_a_test_file_is_suppressed() {
    let scan = scan("src/customer_test.go", r#"testTFN := "876 543 210""#);
    let tfn = finding_of(&scan, PiType::Tfn);

    assert_eq!(tfn.context_type, ContextType::Test);
    assert!(tfn.context_modifier <= 0.2);
    assert!(tfn.confidence <= 0.20);
    assert_eq!(tfn.risk_level, RiskLevel::Low);
    assert!(!tfn.compliance.apra_reporting);
    assert!(!tfn.compliance.notifiable_data_breach);
}

#[test]
fn invalid_tfn_is_still_reported_with_low_confidence() {
    let scan = scan("src/service.go", r#"x := "123 456 789""#);
    let tfn = finding_of(&scan, PiType::Tfn);

    assert!(!tfn.validated);
    assert!(matches!(
        tfn.risk_level,
        RiskLevel::Low | RiskLevel::Medium
    ));
    assert!(tfn.confidence < 0.7);
}

#[test]
fn commented_tfn_is_documentation() {
    let scan = scan("src/service.go", "// Customer TFN: 876 543 210\n");
    let tfn = finding_of(&scan, PiType::Tfn);

    assert_eq!(tfn.context_type, ContextType::Documentation);
    assert!((tfn.context_modifier - 0.4).abs() < 1e-9);
    assert!(tfn.confidence < 0.7);
    assert!(tfn.risk_level <= RiskLevel::Medium);
}

#[test]
fn cooccurring_tfn_and_medicare_escalate_to_critical() {
    let text = "Tax File Number 876 543 210\n\nMedicare 2428 77813 2\n";
    let scan = scan("src/patient.go", text);

    let tfn = finding_of(&scan, PiType::Tfn);
    let medicare = finding_of(&scan, PiType::Medicare);

    for finding in [tfn, medicare] {
        assert!(finding.validated, "{} should validate", finding.pi_type);
        assert_eq!(finding.context_type, ContextType::Label);
        assert!(finding.score_breakdown.co_occurrence >= 1.3);
        assert_eq!(finding.risk_level, RiskLevel::Critical);
        assert_eq!(finding.risk.category, RiskCategory::IdentityTheft);
    }
}

#[test]
fn bsb_and_account_in_banking_config() {
    let text = "bsb: 062-000\naccount: 12345678\n";
    let scan = scan("config/prod.yaml", text);

    let bsb = finding_of(&scan, PiType::Bsb);
    assert!(bsb.validated);
    assert_eq!(bsb.validation_algorithm.as_deref(), Some("bsb_bank_prefix"));
    assert_eq!(bsb.context_type, ContextType::Configuration);
    assert!(bsb.effective_risk_level() >= RiskLevel::High);
    assert!(bsb.compliance.apra_reporting);
    assert_eq!(bsb.risk.category, RiskCategory::FinancialFraud);

    let account = finding_of(&scan, PiType::Account);
    assert_eq!(account.literal, "12345678");
}

#[test]
fn empty_file_yields_no_findings() {
    let scan = scan("src/empty.go", "");
    assert!(scan.findings.is_empty());
    assert_eq!(scan.stats.candidates, 0);
}

#[test]
fn zero_padded_runs_are_suppressed() {
    let scan = scan("src/zeros.go", "bsb := \"000-000\"\ntfn := \"000 000 000\"\n");
    assert!(scan.findings.is_empty());
}

#[test]
fn literal_at_start_and_end_of_file() {
    let text = "876 543 210 padding then another at the end 062-000";
    let scan = scan("src/bounds.go", text);

    let tfn = finding_of(&scan, PiType::Tfn);
    assert_eq!(tfn.byte_span.0, 0);
    assert_eq!((tfn.line, tfn.column), (1, 1));

    let bsb = finding_of(&scan, PiType::Bsb);
    assert_eq!(bsb.byte_span.1, text.len());
    assert_eq!(bsb.context_after, "");
}

#[test]
fn risk_level_always_matches_confidence_thresholds() {
    let text = concat!(
        "customerTFN := \"876 543 210\"\n",
        "// Customer TFN: 123 456 782\n",
        "contact := \"a@b.com\"\n",
        "bsb: 062-000\n",
        "INFO: sent to 0412 345 678\n",
    );
    let scan = scan("src/mixed.go", text);
    assert!(!scan.findings.is_empty());

    for finding in &scan.findings {
        assert!((0.0..=1.0).contains(&finding.confidence));
        let expected = if finding.confidence >= 0.90 {
            RiskLevel::Critical
        } else if finding.confidence >= 0.70 {
            RiskLevel::High
        } else if finding.confidence >= 0.40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        assert_eq!(
            finding.risk_level, expected,
            "level/confidence mismatch for {} at {}",
            finding.pi_type, finding.line
        );
    }
}

#[test]
fn test_context_invariant_holds_for_every_finding() {
    let text = concat!(
        "mockTFN := \"876 543 210\"\n",
        "dummyBsb := \"062-000\"\n",
        "fixtureCard := \"4111 1111 1111 1111\"\n",
    );
    let scan = scan("src/values.go", text);
    for finding in &scan.findings {
        if finding.context_type == ContextType::Test {
            assert_eq!(finding.risk_level, RiskLevel::Low);
            assert!(finding.context_modifier <= 0.2);
        }
    }
    assert!(scan
        .findings
        .iter()
        .any(|f| f.context_type == ContextType::Test));
}

#[test]
fn validated_findings_always_carry_their_algorithm() {
    let text = "tfn := \"876 543 210\"\nabn := \"51 824 753 556\"\ncard := \"4111 1111 1111 1111\"\n";
    let scan = scan("src/ids.go", text);
    for finding in scan.findings.iter().filter(|f| f.validated) {
        let algorithm = finding
            .validation_algorithm
            .as_deref()
            .expect("validated finding must name its algorithm");
        assert!(!algorithm.is_empty());
    }
    assert!(scan.findings.iter().any(|f| f.validated));
}

#[test]
fn audit_trail_is_ordered_and_complete() {
    let scan = scan("src/customer.go", r#"customerTFN := "876 543 210""#);
    let tfn = finding_of(&scan, PiType::Tfn);

    for pair in tfn.audit_trail.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    let last = tfn.audit_trail.last().unwrap();
    assert_eq!(last.component, "finding");
    assert!(last.details.contains_key("final_score"));
    assert!(last.details.contains_key("risk_level"));
    assert!(last.details.contains_key("aggregation_method"));
    assert!(last.details.contains_key("regulatory_compliance"));
}

#[test]
fn overlapping_interpretations_are_scored_independently() {
    // An ungrouped 11-digit run is both an ABN candidate (valid here) and a
    // Medicare-shaped candidate (checksum fails); both are retained.
    let scan = scan("src/entity.go", "entity := \"51824753556\"\n");
    let abn = finding_of(&scan, PiType::Abn);
    assert!(abn.validated);

    let medicare = finding_of(&scan, PiType::Medicare);
    assert_eq!(medicare.byte_span, abn.byte_span);
    assert!(!medicare.validated);
    assert!(medicare.confidence < abn.confidence);
}
