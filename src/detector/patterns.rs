use crate::types::PiType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Compiled once at process start; a malformed pattern is a fatal
    // configuration error, hence the expects.
    static ref TFN_REGEX: Regex = Regex::new(r"\b\d{3}[ -]?\d{3}[ -]?\d{2,3}\b")
        .expect("CRITICAL: TFN regex pattern is invalid - this should never fail");
    static ref ABN_REGEX: Regex = Regex::new(r"\b\d{2} ?\d{3} ?\d{3} ?\d{3}\b")
        .expect("CRITICAL: ABN regex pattern is invalid - this should never fail");
    static ref ACN_REGEX: Regex = Regex::new(r"\b\d{3} ?\d{3} ?\d{3}\b")
        .expect("CRITICAL: ACN regex pattern is invalid - this should never fail");
    static ref MEDICARE_REGEX: Regex = Regex::new(r"\b\d{4} ?\d{5} ?\d{1,2}(?:/\d)?\b")
        .expect("CRITICAL: Medicare regex pattern is invalid - this should never fail");
    static ref BSB_REGEX: Regex = Regex::new(r"\b\d{3}-?\d{3}\b")
        .expect("CRITICAL: BSB regex pattern is invalid - this should never fail");
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("CRITICAL: Email regex pattern is invalid - this should never fail");
    static ref PHONE_MOBILE_REGEX: Regex =
        Regex::new(r"(?:\+61[ -]?4|\b04)\d{2}[ -]?\d{3}[ -]?\d{3}\b")
            .expect("CRITICAL: Mobile phone regex pattern is invalid - this should never fail");
    static ref PHONE_LANDLINE_REGEX: Regex =
        Regex::new(r"(?:\(0[2378]\)|\b0[2378])[ -]?\d{4}[ -]?\d{4}\b")
            .expect("CRITICAL: Landline phone regex pattern is invalid - this should never fail");
    static ref CREDIT_CARD_REGEX: Regex =
        Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{1,7}\b")
            .expect("CRITICAL: Credit card regex pattern is invalid - this should never fail");
    static ref ACCOUNT_REGEX: Regex = Regex::new(
        r"(?i)\bacc(?:oun)?t?(?:[ _-]?(?:no|num(?:ber)?))?\s*[:=#]?\s*(\d{6,10})\b"
    )
    .expect("CRITICAL: Account regex pattern is invalid - this should never fail");
    static ref PASSPORT_REGEX: Regex = Regex::new(r"\b[A-Z]{1,2}\d{7}\b")
        .expect("CRITICAL: Passport regex pattern is invalid - this should never fail");
    static ref DRIVER_LICENSE_REGEX: Regex = Regex::new(r"\b[A-Z]\d{5,8}\b")
        .expect("CRITICAL: Driver license regex pattern is invalid - this should never fail");
    static ref NAME_REGEX: Regex = Regex::new(r"\b[A-Z][a-z]+ (?:[A-Z]\. )?[A-Z][a-z]+\b")
        .expect("CRITICAL: Name regex pattern is invalid - this should never fail");
    static ref ADDRESS_REGEX: Regex = Regex::new(
        r"\b\d+\s+(?:[A-Z][a-z]+\s){1,3}(?:Street|St|Road|Rd|Avenue|Ave|Parade|Pde|Crescent|Cres|Court|Ct|Drive|Dr|Place|Pl|Highway|Hwy|Terrace|Tce|Lane|Ln|Way|Esplanade|Circuit|Cct)\b"
    )
    .expect("CRITICAL: Address regex pattern is invalid - this should never fail");
    static ref IP_REGEX: Regex = Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b"
    )
    .expect("CRITICAL: IP address regex pattern is invalid - this should never fail");
}

/// One named entry of the detection catalogue.
pub struct PatternDef {
    /// Detector name recorded on every candidate, e.g. `pattern.tfn`.
    pub name: &'static str,
    pub pi_type: PiType,
    pub regex: &'static Regex,
    /// Capture group holding the literal; 0 when the whole match is the literal.
    pub literal_group: usize,
}

lazy_static! {
    static ref CATALOGUE: Vec<PatternDef> = vec![
        PatternDef {
            name: "pattern.tfn",
            pi_type: PiType::Tfn,
            regex: &TFN_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.abn",
            pi_type: PiType::Abn,
            regex: &ABN_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.acn",
            pi_type: PiType::Acn,
            regex: &ACN_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.medicare",
            pi_type: PiType::Medicare,
            regex: &MEDICARE_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.bsb",
            pi_type: PiType::Bsb,
            regex: &BSB_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.email",
            pi_type: PiType::Email,
            regex: &EMAIL_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.phone.mobile",
            pi_type: PiType::Phone,
            regex: &PHONE_MOBILE_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.phone.landline",
            pi_type: PiType::Phone,
            regex: &PHONE_LANDLINE_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.credit_card",
            pi_type: PiType::CreditCard,
            regex: &CREDIT_CARD_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.account",
            pi_type: PiType::Account,
            regex: &ACCOUNT_REGEX,
            literal_group: 1,
        },
        PatternDef {
            name: "pattern.passport",
            pi_type: PiType::Passport,
            regex: &PASSPORT_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.driver_license",
            pi_type: PiType::DriverLicense,
            regex: &DRIVER_LICENSE_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.name",
            pi_type: PiType::Name,
            regex: &NAME_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.address",
            pi_type: PiType::Address,
            regex: &ADDRESS_REGEX,
            literal_group: 0,
        },
        PatternDef {
            name: "pattern.ip",
            pi_type: PiType::Ip,
            regex: &IP_REGEX,
            literal_group: 0,
        },
    ];
}

/// The fixed pattern catalogue, in emission order.
///
/// Overlapping matches of different types at the same span are all retained
/// (an 11-digit run can be both an ABN and a Medicare number); later stages
/// resolve the ambiguity through validation and scoring.
pub fn catalogue() -> &'static [PatternDef] {
    CATALOGUE.as_slice()
}

/// Capitalised pairs that look like names but are places or institutions.
pub const NAME_FALSE_POSITIVES: &[&str] = &[
    "New South",
    "South Wales",
    "Western Australia",
    "South Australia",
    "Northern Territory",
    "Australian Capital",
    "Capital Territory",
    "High Court",
    "Federal Court",
    "Family Court",
    "Supreme Court",
    "Reserve Bank",
    "Commonwealth Bank",
    "National Australia",
    "Tax Office",
    "Privacy Act",
];
