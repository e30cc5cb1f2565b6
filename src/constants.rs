/// Application-wide constants
///
/// This module centralizes all magic numbers, thresholds, and configuration values
/// for easier maintenance and tuning.
// ============================================================================
// File Intake Limits
// ============================================================================
/// Maximum file size scanned before the file is skipped (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of leading bytes sniffed for NUL when deciding a file is binary
pub const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Soft per-file processing timeout (seconds)
pub const DEFAULT_FILE_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Worker Pool
// ============================================================================
/// Default number of concurrent file workers
pub const DEFAULT_WORKER_COUNT: usize = 8;

// ============================================================================
// Context Analysis Windows
// ============================================================================
/// Characters captured either side of a match for the Finding's context snippet
pub const CONTEXT_SNIPPET_CHARS: usize = 50;

/// Window used when scanning for test-data keywords around a match
pub const TEST_KEYWORD_WINDOW_CHARS: usize = 30;

/// Window used when scanning for SQL / form / label indicators around a match
pub const CONTEXT_RULE_WINDOW_CHARS: usize = 50;

/// Label-rule distance decay per word beyond two, down to the floor
pub const LABEL_DISTANCE_DECAY: f64 = 0.05;

/// Floor for the label-rule context modifier after distance decay
pub const LABEL_MODIFIER_FLOOR: f64 = 0.7;

// ============================================================================
// Confidence Scoring Defaults
// ============================================================================
/// Default factor weights (proximity, ml, validation); must sum to 1.0
pub const DEFAULT_WEIGHT_PROXIMITY: f64 = 0.4;
pub const DEFAULT_WEIGHT_ML: f64 = 0.3;
pub const DEFAULT_WEIGHT_VALIDATION: f64 = 0.3;

/// Neutral factor substituted when no ML scorer is wired in
pub const NEUTRAL_ML_FACTOR: f64 = 0.5;

/// Neutral factor substituted when a PI type has no registered validator
pub const NEUTRAL_VALIDATION_FACTOR: f64 = 0.5;

/// Penalty applied to an ML prediction flagged invalid
pub const ML_INVALID_PENALTY: f64 = 0.2;

/// Confidence thresholds mapping score to risk level
pub const RISK_THRESHOLD_CRITICAL: f64 = 0.90;
pub const RISK_THRESHOLD_HIGH: f64 = 0.70;
pub const RISK_THRESHOLD_MEDIUM: f64 = 0.40;

// ============================================================================
// Co-occurrence
// ============================================================================
/// Default line window for co-occurrence lookups
pub const DEFAULT_COOCCURRENCE_WINDOW_LINES: u32 = 5;

/// Per-line decay applied to co-occurrence matrix boosts
pub const COOCCURRENCE_DECAY: f64 = 0.9;

/// Cap on the compounded co-occurrence multiplier
pub const COOCCURRENCE_CAP: f64 = 1.6;

// ============================================================================
// Environment Factor
// ============================================================================
/// Clamp bounds for the compounded environment multiplier
pub const ENVIRONMENT_FACTOR_MIN: f64 = 0.0;
pub const ENVIRONMENT_FACTOR_MAX: f64 = 2.0;

// ============================================================================
// Risk Matrix
// ============================================================================
/// Risk-matrix thresholds (distinct from the confidence thresholds above)
pub const MATRIX_THRESHOLD_CRITICAL: f64 = 0.8;
pub const MATRIX_THRESHOLD_HIGH: f64 = 0.6;
pub const MATRIX_THRESHOLD_MEDIUM: f64 = 0.4;
pub const MATRIX_THRESHOLD_LOW: f64 = 0.2;

/// Impact blend weights: sensitivity, record count, financial, regulatory, reputational
pub const IMPACT_WEIGHTS: [f64; 5] = [0.25, 0.10, 0.25, 0.25, 0.15];

/// Affected individuals above which a finding is a privacy breach category
pub const PRIVACY_BREACH_RECORD_THRESHOLD: u64 = 100;

/// Each historical incident adds this much to likelihood, capped at x2.0
pub const INCIDENT_LIKELIHOOD_STEP: f64 = 0.15;
pub const INCIDENT_LIKELIHOOD_CAP: f64 = 2.0;
