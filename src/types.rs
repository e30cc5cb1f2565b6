use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Australian PI categories recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiType {
    Tfn,
    Abn,
    Acn,
    Medicare,
    Bsb,
    Account,
    CreditCard,
    DriverLicense,
    Passport,
    Name,
    Address,
    Phone,
    Email,
    Ip,
}

impl PiType {
    pub fn all() -> &'static [PiType] {
        &[
            PiType::Tfn,
            PiType::Abn,
            PiType::Acn,
            PiType::Medicare,
            PiType::Bsb,
            PiType::Account,
            PiType::CreditCard,
            PiType::DriverLicense,
            PiType::Passport,
            PiType::Name,
            PiType::Address,
            PiType::Phone,
            PiType::Email,
            PiType::Ip,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PiType::Tfn => "TFN",
            PiType::Abn => "ABN",
            PiType::Acn => "ACN",
            PiType::Medicare => "MEDICARE",
            PiType::Bsb => "BSB",
            PiType::Account => "ACCOUNT",
            PiType::CreditCard => "CREDIT_CARD",
            PiType::DriverLicense => "DRIVER_LICENSE",
            PiType::Passport => "PASSPORT",
            PiType::Name => "NAME",
            PiType::Address => "ADDRESS",
            PiType::Phone => "PHONE",
            PiType::Email => "EMAIL",
            PiType::Ip => "IP",
        }
    }

    pub fn parse(s: &str) -> Option<PiType> {
        PiType::all().iter().copied().find(|t| t.as_str() == s)
    }

    /// Fixed weight reflecting Australian regulatory priority.
    pub fn regulatory_weight(&self) -> f64 {
        match self {
            PiType::Tfn => 1.00,
            PiType::Medicare => 0.95,
            PiType::CreditCard => 0.90,
            PiType::Passport => 0.90,
            PiType::Abn => 0.80,
            PiType::DriverLicense => 0.80,
            PiType::Bsb => 0.70,
            PiType::Acn => 0.50,
            PiType::Account => 0.70,
            PiType::Name => 0.60,
            PiType::Address => 0.60,
            PiType::Phone => 0.50,
            PiType::Email => 0.40,
            PiType::Ip => 0.20,
        }
    }

    /// Personal information under the notifiable-data-breach scheme.
    pub fn is_personal_information(&self) -> bool {
        matches!(
            self,
            PiType::Tfn
                | PiType::Medicare
                | PiType::DriverLicense
                | PiType::Passport
                | PiType::CreditCard
        )
    }

    /// Types reportable to APRA under CPS 234 when risk is above LOW.
    pub fn is_apra_relevant(&self) -> bool {
        matches!(
            self,
            PiType::Tfn
                | PiType::Bsb
                | PiType::Account
                | PiType::CreditCard
                | PiType::Medicare
                | PiType::Abn
        )
    }

    pub fn is_financial(&self) -> bool {
        matches!(
            self,
            PiType::Bsb | PiType::Account | PiType::CreditCard | PiType::Abn | PiType::Acn
        )
    }

    pub fn is_identity_document(&self) -> bool {
        matches!(
            self,
            PiType::Tfn | PiType::Medicare | PiType::DriverLicense | PiType::Passport
        )
    }

    /// Per-type financial impact factor used by the risk matrix.
    pub fn financial_impact(&self) -> f64 {
        match self {
            PiType::CreditCard => 0.95,
            PiType::Account | PiType::Bsb => 0.85,
            PiType::Tfn => 0.80,
            PiType::Abn | PiType::Acn => 0.55,
            PiType::Medicare => 0.50,
            PiType::DriverLicense | PiType::Passport => 0.45,
            PiType::Name | PiType::Address => 0.30,
            PiType::Phone | PiType::Email => 0.20,
            PiType::Ip => 0.10,
        }
    }
}

impl std::fmt::Display for PiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw pattern match, pre-validation and pre-scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub pi_type: PiType,
    /// The matched substring, owned.
    pub literal: String,
    pub file_path: String,
    /// Byte offsets of the literal within the scanned text.
    pub byte_span: (usize, usize),
    /// 1-based line and column of the literal's first byte.
    pub line: u32,
    pub column: u32,
    pub detector_name: String,
}

/// Classification of the code surrounding a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Label,
    Form,
    Database,
    Log,
    Configuration,
    Variable,
    Documentation,
    Production,
    Test,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Label => "label",
            ContextType::Form => "form",
            ContextType::Database => "database",
            ContextType::Log => "log",
            ContextType::Configuration => "configuration",
            ContextType::Variable => "variable",
            ContextType::Documentation => "documentation",
            ContextType::Production => "production",
            ContextType::Test => "test",
        }
    }
}

/// Confidence-derived severity tier. Ordered so reporting can take maxima.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of algorithmic validation for a single literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Name of the algorithm that ran; empty when no validator exists.
    pub algorithm: String,
    pub confidence: f64,
}

impl ValidationOutcome {
    pub fn none() -> Self {
        Self {
            is_valid: false,
            algorithm: String::new(),
            confidence: 0.0,
        }
    }

    pub fn has_algorithm(&self) -> bool {
        !self.algorithm.is_empty()
    }
}

/// Per-factor decomposition of a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub proximity: f64,
    pub ml: f64,
    pub validation: f64,
    pub environment: f64,
    pub co_occurrence: f64,
    pub pi_type_weight: f64,
    pub weight_proximity: f64,
    pub weight_ml: f64,
    pub weight_validation: f64,
    /// Weighted linear base before multiplicative adjustments.
    pub base: f64,
    pub final_score: f64,
    pub aggregation_method: String,
}

/// One step of the scoring pipeline, recorded for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub component: String,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// Regulatory obligations triggered by a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RegulatoryCompliance {
    pub notifiable_data_breach: bool,
    pub apra_reporting: bool,
    pub privacy_act_breach: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_notifications: Vec<String>,
}

/// Category inferred from the candidate and its co-occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    FinancialFraud,
    IdentityTheft,
    RegulatoryBreach,
    PrivacyBreach,
    Operational,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::FinancialFraud => "FINANCIAL_FRAUD",
            RiskCategory::IdentityTheft => "IDENTITY_THEFT",
            RiskCategory::RegulatoryBreach => "REGULATORY_BREACH",
            RiskCategory::PrivacyBreach => "PRIVACY_BREACH",
            RiskCategory::Operational => "OPERATIONAL",
        }
    }
}

/// Recommended mitigation drawn from the fixed catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: MitigationPriority,
    pub effort: String,
    pub timeline: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MitigationPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Impact x likelihood x exposure assessment for one finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub impact: f64,
    pub likelihood: f64,
    pub exposure: f64,
    pub overall: f64,
    /// Matrix-derived level; distinct from the confidence-derived level.
    pub risk_level: RiskLevel,
    pub category: RiskCategory,
    pub mitigations: Vec<Mitigation>,
}

/// Fully enriched, scored, risk-classified candidate ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub pi_type: PiType,
    #[serde(rename = "match")]
    pub literal: String,
    #[serde(rename = "file")]
    pub file_path: String,
    pub byte_span: (usize, usize),
    pub line: u32,
    pub column: u32,
    pub detector_name: String,
    pub context_before: String,
    pub context_after: String,
    pub context_type: ContextType,
    /// Tokens that triggered the context classification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_algorithm: Option<String>,
    pub confidence: f64,
    pub context_modifier: f64,
    /// Confidence-derived level; always consistent with `confidence`.
    pub risk_level: RiskLevel,
    pub score_breakdown: ScoreBreakdown,
    pub audit_trail: Vec<AuditEntry>,
    pub compliance: RegulatoryCompliance,
    pub risk: RiskAssessment,
    pub detected_at: DateTime<Utc>,
}

impl Finding {
    /// Level presented by reporting: the worse of the two recorded levels.
    pub fn effective_risk_level(&self) -> RiskLevel {
        self.risk_level.max(self.risk.risk_level)
    }

    /// Literal with all but the last three characters masked, for summaries.
    pub fn masked_literal(&self) -> String {
        let chars: Vec<char> = self.literal.chars().collect();
        if chars.len() <= 3 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 3..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 3), visible)
    }
}

/// Per-file counters returned alongside findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub bytes_read: u64,
    pub candidates: u64,
    pub retained: u64,
    pub skipped: u64,
    pub binary_skipped: u64,
    pub timed_out: u64,
    /// Transient per-candidate failures swallowed during scoring.
    pub errors: u64,
    pub duration_ns: u64,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.bytes_read += other.bytes_read;
        self.candidates += other.candidates;
        self.retained += other.retained;
        self.skipped += other.skipped;
        self.binary_skipped += other.binary_skipped;
        self.timed_out += other.timed_out;
        self.errors += other.errors;
        self.duration_ns += other.duration_ns;
    }
}

/// Result of scanning a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileScan {
    pub findings: Vec<Finding>,
    pub stats: ScanStats,
}

// ============================================================================
// Repository posture (risk-matrix inputs)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepoVisibility {
    PublicHighVisibility,
    Public,
    Internal,
    PrivateLargeOrg,
    PrivateSmallOrg,
}

impl RepoVisibility {
    pub fn exposure_multiplier(&self) -> f64 {
        match self {
            RepoVisibility::PublicHighVisibility => 1.5,
            RepoVisibility::Public => 1.2,
            RepoVisibility::Internal => 0.8,
            RepoVisibility::PrivateLargeOrg => 0.6,
            RepoVisibility::PrivateSmallOrg => 0.4,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            RepoVisibility::PublicHighVisibility | RepoVisibility::Public
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessVector {
    PublicNetwork,
    Internal,
    InternalRestricted,
}

impl AccessVector {
    pub fn likelihood_multiplier(&self) -> f64 {
        match self {
            AccessVector::PublicNetwork => 1.5,
            AccessVector::Internal => 1.0,
            AccessVector::InternalRestricted => 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthRequirement {
    None,
    SingleFactor,
    MultiFactor,
}

impl AuthRequirement {
    pub fn likelihood_multiplier(&self) -> f64 {
        match self {
            AuthRequirement::None => 1.3,
            AuthRequirement::SingleFactor => 1.0,
            AuthRequirement::MultiFactor => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionStatus {
    Encrypted,
    Unknown,
    PlainText,
}

impl EncryptionStatus {
    pub fn exposure_multiplier(&self) -> f64 {
        match self {
            EncryptionStatus::Encrypted => 0.3,
            EncryptionStatus::Unknown => 1.0,
            EncryptionStatus::PlainText => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessControlStrength {
    Strong,
    Moderate,
    Weak,
}

impl AccessControlStrength {
    pub fn exposure_multiplier(&self) -> f64 {
        match self {
            AccessControlStrength::Strong => 0.6,
            AccessControlStrength::Moderate => 1.0,
            AccessControlStrength::Weak => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatCapability {
    Commodity,
    Capable,
    Advanced,
}

impl ThreatCapability {
    pub fn likelihood_multiplier(&self) -> f64 {
        match self {
            ThreatCapability::Commodity => 0.8,
            ThreatCapability::Capable => 1.0,
            ThreatCapability::Advanced => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Banking,
    Healthcare,
    Government,
    Other,
}

impl Industry {
    pub fn is_regulated(&self) -> bool {
        matches!(
            self,
            Industry::Banking | Industry::Healthcare | Industry::Government
        )
    }
}

/// Repository posture supplied by the harness, consumed by the risk matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoContext {
    pub visibility: RepoVisibility,
    pub stars: u32,
    pub industry: Industry,
    pub access_vector: AccessVector,
    pub authentication: AuthRequirement,
    pub encryption: EncryptionStatus,
    pub access_control: AccessControlStrength,
    pub threat_capability: ThreatCapability,
    pub data_age_days: u32,
    pub historical_incidents: u32,
    /// Rough estimate of individuals affected if the repository leaks.
    pub estimated_affected_records: u64,
    /// True when the owning organisation operates internationally (adds EU DPA
    /// to the notification list).
    pub international: bool,
}

impl Default for RepoContext {
    fn default() -> Self {
        Self {
            visibility: RepoVisibility::PrivateSmallOrg,
            stars: 0,
            industry: Industry::Other,
            access_vector: AccessVector::Internal,
            authentication: AuthRequirement::SingleFactor,
            encryption: EncryptionStatus::Unknown,
            access_control: AccessControlStrength::Moderate,
            threat_capability: ThreatCapability::Capable,
            data_age_days: 0,
            historical_incidents: 0,
            estimated_affected_records: 1,
            international: false,
        }
    }
}

impl RepoContext {
    /// Reputational multiplier from visibility and popularity.
    pub fn reputational_multiplier(&self) -> f64 {
        let mut factor = 1.0;
        if self.visibility.is_public() {
            factor *= 1.3;
        }
        if self.stars > 1000 {
            factor *= 1.5;
        } else if self.stars > 100 {
            factor *= 1.2;
        }
        factor
    }

    /// Data-lifetime multiplier rising with age.
    pub fn data_lifetime_multiplier(&self) -> f64 {
        match self.data_age_days {
            0..=30 => 1.0,
            31..=90 => 1.1,
            91..=180 => 1.2,
            181..=365 => 1.3,
            _ => 1.5,
        }
    }
}
