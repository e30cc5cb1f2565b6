//! Algorithmic validation of candidate literals.
//!
//! Validators are pure, total functions in a dispatch table keyed by
//! [`PiType`]. Types without a published algorithm return a no-op outcome;
//! the confidence engine treats that as neutral rather than as evidence
//! against the candidate.

mod bank_codes;

pub use bank_codes::{institution_for_prefix, BSB_BANK_CODES};

use crate::types::{PiType, ValidationOutcome};

/// Weights for 9-digit Tax File Numbers (ATO-published).
const TFN_WEIGHTS_9: [u32; 9] = [1, 4, 3, 7, 5, 8, 6, 9, 10];

/// Weights for legacy 8-digit Tax File Numbers.
const TFN_WEIGHTS_8: [u32; 8] = [10, 7, 8, 4, 6, 3, 5, 2];

/// ABN weights; applied after subtracting 1 from the leading digit.
const ABN_WEIGHTS: [u32; 11] = [10, 1, 3, 5, 7, 9, 11, 13, 15, 17, 19];

/// Medicare weights over the first eight digits.
const MEDICARE_WEIGHTS: [u32; 8] = [1, 3, 7, 9, 1, 3, 7, 9];

/// ACN weights over the first eight digits.
const ACN_WEIGHTS: [u32; 8] = [8, 7, 6, 5, 4, 3, 2, 1];

/// Run the registered validator for a PI type against a literal.
///
/// Returns `(false, "", 0.0)` for types without an algorithm. Never panics;
/// any parse failure is simply an invalid outcome.
pub fn validate(pi_type: PiType, literal: &str) -> ValidationOutcome {
    match pi_type {
        PiType::Tfn => validate_tfn(literal),
        PiType::Abn => validate_abn(literal),
        PiType::Acn => validate_acn(literal),
        PiType::Medicare => validate_medicare(literal),
        PiType::Bsb => validate_bsb(literal),
        PiType::CreditCard => validate_credit_card(literal),
        _ => ValidationOutcome::none(),
    }
}

/// Whether a PI type has a registered validation algorithm.
pub fn has_validator(pi_type: PiType) -> bool {
    matches!(
        pi_type,
        PiType::Tfn
            | PiType::Abn
            | PiType::Acn
            | PiType::Medicare
            | PiType::Bsb
            | PiType::CreditCard
    )
}

fn digits_of(literal: &str) -> Vec<u32> {
    literal
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect()
}

fn all_same_digit(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn outcome(is_valid: bool, algorithm: &str, confidence: f64) -> ValidationOutcome {
    ValidationOutcome {
        is_valid,
        algorithm: algorithm.to_string(),
        confidence: if is_valid { confidence } else { 0.0 },
    }
}

/// TFN weighted checksum: the digit-weight dot product must divide by 11.
fn validate_tfn(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "tfn_weighted_checksum";
    let digits = digits_of(literal);
    if all_same_digit(&digits) {
        return outcome(false, ALGO, 1.0);
    }
    let sum: u32 = match digits.len() {
        9 => digits.iter().zip(TFN_WEIGHTS_9.iter()).map(|(d, w)| d * w).sum(),
        8 => digits.iter().zip(TFN_WEIGHTS_8.iter()).map(|(d, w)| d * w).sum(),
        _ => return outcome(false, ALGO, 1.0),
    };
    outcome(sum % 11 == 0, ALGO, 1.0)
}

/// ABN modulus-89 check with the leading digit reduced by one.
fn validate_abn(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "abn_modulus_89";
    let digits = digits_of(literal);
    if digits.len() != 11 || digits[0] == 0 {
        return outcome(false, ALGO, 1.0);
    }
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let d = if i == 0 { d - 1 } else { d };
            d * ABN_WEIGHTS[i]
        })
        .sum();
    outcome(sum % 89 == 0, ALGO, 1.0)
}

/// ACN complement check digit over the first eight digits.
fn validate_acn(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "acn_complement_check";
    let digits = digits_of(literal);
    if digits.len() != 9 {
        return outcome(false, ALGO, 1.0);
    }
    let sum: u32 = digits[..8]
        .iter()
        .zip(ACN_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    let check = (10 - (sum % 10)) % 10;
    outcome(check == digits[8], ALGO, 1.0)
}

/// Medicare checksum: 9th digit checks the first eight, 10th is the issue
/// number (1-9), an optional 11th digit is the card's IRN (1-9).
fn validate_medicare(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "medicare_checksum";
    let digits = digits_of(literal);
    if !(digits.len() == 10 || digits.len() == 11) {
        return outcome(false, ALGO, 1.0);
    }
    let sum: u32 = digits[..8]
        .iter()
        .zip(MEDICARE_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    if sum % 10 != digits[8] {
        return outcome(false, ALGO, 1.0);
    }
    let issue = digits[9];
    if !(1..=9).contains(&issue) {
        return outcome(false, ALGO, 1.0);
    }
    if digits.len() == 11 && !(1..=9).contains(&digits[10]) {
        return outcome(false, ALGO, 1.0);
    }
    outcome(true, ALGO, 1.0)
}

/// BSB format plus a leading-pair lookup against the bank-code table.
/// Format-only validation, so confidence stays below the checksum types.
fn validate_bsb(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "bsb_bank_prefix";
    let digits = digits_of(literal);
    if digits.len() != 6 {
        return outcome(false, ALGO, 0.9);
    }
    let prefix = format!("{}{}", digits[0], digits[1]);
    outcome(institution_for_prefix(&prefix).is_some(), ALGO, 0.9)
}

/// Luhn checksum over 13-19 digits.
fn validate_credit_card(literal: &str) -> ValidationOutcome {
    const ALGO: &str = "luhn";
    let digits = digits_of(literal);
    if digits.len() < 13 || digits.len() > 19 {
        return outcome(false, ALGO, 0.95);
    }

    let mut sum = 0u32;
    let mut alternate = false;
    for digit in digits.iter().rev() {
        let mut d = *digit;
        if alternate {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        alternate = !alternate;
    }

    outcome(sum % 10 == 0, ALGO, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tfn_nine_digit_valid() {
        for literal in ["123456782", "123 456 782", "876 543 210", "876-543-210"] {
            let result = validate(PiType::Tfn, literal);
            assert!(result.is_valid, "{literal} should pass the TFN checksum");
            assert_eq!(result.algorithm, "tfn_weighted_checksum");
            assert_eq!(result.confidence, 1.0);
        }
    }

    #[test]
    fn tfn_nine_digit_invalid() {
        for literal in ["123456789", "876 543 217", "000000001"] {
            assert!(!validate(PiType::Tfn, literal).is_valid, "{literal}");
        }
    }

    #[test]
    fn tfn_eight_digit_legacy_weights() {
        // 8*10+7*7+6*8+5*4+4*6+3*3+2*5+1*2 = 242 = 11*22
        assert!(validate(PiType::Tfn, "87654321").is_valid);
        // 1*10+2*7+3*8+4*4+5*6+6*3+7*5+9*2 = 165 = 11*15
        assert!(validate(PiType::Tfn, "12345679").is_valid);
        // Same digits with the last flipped: 256 and 163, neither divides by 11.
        assert!(!validate(PiType::Tfn, "87654328").is_valid);
        assert!(!validate(PiType::Tfn, "12345678").is_valid);
    }

    #[test]
    fn tfn_rejects_repeated_digits() {
        assert!(!validate(PiType::Tfn, "111111111").is_valid);
        assert!(!validate(PiType::Tfn, "999999999").is_valid);
    }

    #[test]
    fn abn_known_valid() {
        // Published ABN of the Australian Taxation Office's own ABN lookup demo.
        assert!(validate(PiType::Abn, "51 824 753 556").is_valid);
        assert!(validate(PiType::Abn, "51824753556").is_valid);
    }

    #[test]
    fn abn_invalid_checksum_or_length() {
        assert!(!validate(PiType::Abn, "51 824 753 557").is_valid);
        assert!(!validate(PiType::Abn, "1234567890").is_valid);
        assert!(!validate(PiType::Abn, "01824753556").is_valid);
    }

    #[test]
    fn acn_known_valid() {
        assert!(validate(PiType::Acn, "004 085 616").is_valid);
        assert!(validate(PiType::Acn, "000 000 019").is_valid);
    }

    #[test]
    fn acn_invalid() {
        assert!(!validate(PiType::Acn, "004 085 617").is_valid);
        assert!(!validate(PiType::Acn, "12345678").is_valid);
    }

    #[test]
    fn medicare_valid_with_and_without_irn() {
        assert!(validate(PiType::Medicare, "2428 77813 2").is_valid);
        assert!(validate(PiType::Medicare, "2428778132").is_valid);
        assert!(validate(PiType::Medicare, "2428 77813 2/1").is_valid);
        assert!(validate(PiType::Medicare, "2123 45670 1").is_valid);
    }

    #[test]
    fn medicare_invalid() {
        // Wrong check digit.
        assert!(!validate(PiType::Medicare, "2428 77814 2").is_valid);
        // Issue number of zero is out of range.
        assert!(!validate(PiType::Medicare, "2428 77813 0").is_valid);
        // Too short.
        assert!(!validate(PiType::Medicare, "242877813").is_valid);
    }

    #[test]
    fn bsb_known_bank_prefixes() {
        let result = validate(PiType::Bsb, "062-000");
        assert!(result.is_valid);
        assert_eq!(result.confidence, 0.9);
        assert!(validate(PiType::Bsb, "012345").is_valid);
        assert!(validate(PiType::Bsb, "732-001").is_valid);
    }

    #[test]
    fn bsb_unknown_prefix_or_bad_format() {
        assert!(!validate(PiType::Bsb, "992-000").is_valid);
        assert!(!validate(PiType::Bsb, "06-2000").is_valid);
        assert!(!validate(PiType::Bsb, "0620001").is_valid);
    }

    #[test]
    fn credit_card_luhn() {
        assert!(validate(PiType::CreditCard, "4111 1111 1111 1111").is_valid);
        assert!(validate(PiType::CreditCard, "5500-0000-0000-0004").is_valid);
        assert!(validate(PiType::CreditCard, "378282246310005").is_valid);
        assert!(!validate(PiType::CreditCard, "4111 1111 1111 1112").is_valid);
        assert!(!validate(PiType::CreditCard, "1234 5678").is_valid);
    }

    #[test]
    fn unvalidated_types_return_noop() {
        for ty in [PiType::Email, PiType::Phone, PiType::Name, PiType::Ip] {
            let result = validate(ty, "whatever");
            assert!(!result.is_valid);
            assert!(result.algorithm.is_empty());
            assert_eq!(result.confidence, 0.0);
            assert!(!has_validator(ty));
        }
    }

    #[test]
    fn validators_never_panic_on_garbage() {
        for ty in PiType::all() {
            validate(*ty, "");
            validate(*ty, "not a number");
            validate(*ty, "💳💳💳");
            validate(*ty, &"9".repeat(400));
        }
    }
}
