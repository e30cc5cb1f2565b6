use crate::constants;
use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Scanner configuration surface.
///
/// Every key is optional in the file form; embedded defaults fill the rest.
/// A `ScanConfig` is inert data — it becomes operational only once compiled
/// into a [`crate::policy::Policy`], which is where validation happens.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub confidence: ConfidenceConfig,
    pub risk: RiskConfig,
    pub compliance: ComplianceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub patterns: PatternsConfig,
    pub context: ContextConfig,
    pub max_file_size_bytes: u64,
    /// Glob-style fragments that mark a path as test data.
    pub test_path_patterns: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            patterns: PatternsConfig::default(),
            context: ContextConfig::default(),
            max_file_size_bytes: constants::DEFAULT_MAX_FILE_SIZE_BYTES,
            test_path_patterns: default_test_path_patterns(),
        }
    }
}

pub(crate) fn default_test_path_patterns() -> Vec<String> {
    [
        "*_test.*",
        "test_*",
        "/test/",
        "/tests/",
        "/spec/",
        "/fixtures/",
        "/mocks/",
        "/examples/",
        "*.md",
        "*.rst",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub enabled: bool,
    /// Findings below this confidence are dropped before reporting.
    pub confidence_threshold: f64,
    /// PI types to detect; empty means all.
    pub enabled_types: Vec<String>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: 0.0,
            enabled_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub enabled: bool,
    /// Line window for co-occurrence lookups.
    pub proximity_distance: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proximity_distance: constants::DEFAULT_COOCCURRENCE_WINDOW_LINES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub weights: WeightsConfig,
    pub risk_thresholds: ConfidenceThresholds,
    /// Environment indicator -> multiplier. Merged over the built-in table.
    pub environment_penalties: HashMap<String, f64>,
    /// "weighted_linear" (default) or "simple_average" for ablation runs.
    pub aggregation: String,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            risk_thresholds: ConfidenceThresholds::default(),
            environment_penalties: HashMap::new(),
            aggregation: "weighted_linear".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub proximity: f64,
    pub ml: f64,
    pub validation: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            proximity: constants::DEFAULT_WEIGHT_PROXIMITY,
            ml: constants::DEFAULT_WEIGHT_ML,
            validation: constants::DEFAULT_WEIGHT_VALIDATION,
        }
    }
}

impl WeightsConfig {
    pub fn sum(&self) -> f64 {
        self.proximity + self.ml + self.validation
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            critical: constants::RISK_THRESHOLD_CRITICAL,
            high: constants::RISK_THRESHOLD_HIGH,
            medium: constants::RISK_THRESHOLD_MEDIUM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// "multiplicative" (default) or "weighted_average".
    pub mode: String,
    pub risk_thresholds: MatrixThresholds,
    pub dimension_weights: DimensionWeights,
    pub production_multiplier: f64,
    pub public_repo_multiplier: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            mode: "multiplicative".to_string(),
            risk_thresholds: MatrixThresholds::default(),
            dimension_weights: DimensionWeights::default(),
            production_multiplier: 1.2,
            public_repo_multiplier: 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for MatrixThresholds {
    fn default() -> Self {
        Self {
            critical: constants::MATRIX_THRESHOLD_CRITICAL,
            high: constants::MATRIX_THRESHOLD_HIGH,
            medium: constants::MATRIX_THRESHOLD_MEDIUM,
            low: constants::MATRIX_THRESHOLD_LOW,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub impact: f64,
    pub likelihood: f64,
    pub exposure: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            impact: 0.4,
            likelihood: 0.3,
            exposure: 0.3,
        }
    }
}

impl DimensionWeights {
    pub fn sum(&self) -> f64 {
        self.impact + self.likelihood + self.exposure
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub apra_aligned: bool,
    pub privacy_act_aligned: bool,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            apra_aligned: true,
            privacy_act_aligned: true,
        }
    }
}

impl ScanConfig {
    /// Load a config from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> ScanResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> ScanResult<Self> {
        toml::from_str(raw).map_err(|e| ScanError::InvalidConfig(e.to_string()))
    }
}
