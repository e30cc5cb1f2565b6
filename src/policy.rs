//! The frozen policy bundle.
//!
//! A [`Policy`] is compiled once at startup from a [`ScanConfig`], validated,
//! and then shared read-only across workers. There is no dynamic
//! reconfiguration: every knob the pipeline consults lives here.

use crate::config::{ComplianceConfig, ConfidenceThresholds, DimensionWeights, MatrixThresholds, ScanConfig, WeightsConfig};
use crate::constants;
use crate::error::{ScanError, ScanResult};
use crate::types::{Candidate, PiType, RepoContext};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Confidence aggregation modes; `SimpleAverage` exists for ablation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMethod {
    WeightedLinear,
    SimpleAverage,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::WeightedLinear => "weighted_linear",
            AggregationMethod::SimpleAverage => "simple_average",
        }
    }
}

/// Risk-matrix aggregation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskMode {
    Multiplicative,
    WeightedAverage,
}

impl RiskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskMode::Multiplicative => "multiplicative",
            RiskMode::WeightedAverage => "weighted_average",
        }
    }
}

/// Prediction from an optional ML validation stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MlPrediction {
    pub confidence: f64,
    /// False marks the prediction itself as invalid for this candidate,
    /// which the engine penalises rather than ignores.
    pub is_pi: bool,
}

/// Optional ML validator seam. The pipeline works without one; a missing
/// scorer contributes a neutral factor.
pub trait MlScorer: Send + Sync {
    fn score(&self, candidate: &Candidate) -> Option<MlPrediction>;
}

/// Built-in environment indicator multipliers, overridable per config.
const ENVIRONMENT_MULTIPLIERS: &[(&str, f64)] = &[
    ("test", 0.2),
    ("mock", 0.1),
    ("sample", 0.2),
    ("demo", 0.2),
    ("fixture", 0.1),
    ("example", 0.3),
    ("documentation", 0.5),
    ("debug", 0.7),
    ("production", 1.2),
    ("prod", 1.2),
    ("live", 1.2),
    ("release", 1.1),
];

/// PI-type pairs that compound privacy risk when found together.
const COOCCURRENCE_PAIRS: &[(PiType, PiType, f64)] = &[
    (PiType::Tfn, PiType::Medicare, 1.4),
    (PiType::Tfn, PiType::Name, 1.3),
    (PiType::Tfn, PiType::Address, 1.3),
    (PiType::Tfn, PiType::Abn, 1.2),
    (PiType::Medicare, PiType::Name, 1.2),
    (PiType::Medicare, PiType::Address, 1.2),
    (PiType::Bsb, PiType::Account, 1.3),
    (PiType::Bsb, PiType::Name, 1.2),
    (PiType::CreditCard, PiType::Name, 1.3),
    (PiType::CreditCard, PiType::Address, 1.3),
    (PiType::Account, PiType::Name, 1.2),
    (PiType::DriverLicense, PiType::Name, 1.2),
    (PiType::Passport, PiType::Name, 1.2),
    (PiType::Address, PiType::Name, 1.2),
];

pub struct Policy {
    pub patterns_enabled: bool,
    pub enabled_types: BTreeSet<PiType>,
    pub max_file_size_bytes: u64,
    pub test_path_patterns: Vec<String>,
    pub confidence_threshold: f64,
    pub proximity_distance: u32,
    pub context_enabled: bool,
    pub weights: WeightsConfig,
    pub confidence_thresholds: ConfidenceThresholds,
    pub aggregation: AggregationMethod,
    pub risk_mode: RiskMode,
    pub matrix_thresholds: MatrixThresholds,
    pub dimension_weights: DimensionWeights,
    pub compliance: ComplianceConfig,
    /// Repository posture for the risk matrix; scan-wide, not per-file.
    pub repo: RepoContext,
    pub file_timeout: Duration,
    pub workers: usize,
    // BTreeMap so the environment sweep iterates in a stable order.
    environment_multipliers: BTreeMap<String, f64>,
    cooccurrence_matrix: HashMap<(PiType, PiType), f64>,
    ml_scorer: Option<Arc<dyn MlScorer>>,
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("patterns_enabled", &self.patterns_enabled)
            .field("enabled_types", &self.enabled_types)
            .field("max_file_size_bytes", &self.max_file_size_bytes)
            .field("test_path_patterns", &self.test_path_patterns)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("proximity_distance", &self.proximity_distance)
            .field("context_enabled", &self.context_enabled)
            .field("weights", &self.weights)
            .field("confidence_thresholds", &self.confidence_thresholds)
            .field("aggregation", &self.aggregation)
            .field("risk_mode", &self.risk_mode)
            .field("matrix_thresholds", &self.matrix_thresholds)
            .field("dimension_weights", &self.dimension_weights)
            .field("compliance", &self.compliance)
            .field("repo", &self.repo)
            .field("file_timeout", &self.file_timeout)
            .field("workers", &self.workers)
            .field("environment_multipliers", &self.environment_multipliers)
            .field("cooccurrence_matrix", &self.cooccurrence_matrix)
            .field("ml_scorer", &self.ml_scorer.is_some())
            .finish()
    }
}

impl Policy {
    /// Validate and freeze a configuration. This is the only fallible
    /// construction point; errors here are fatal by contract.
    pub fn compile(config: ScanConfig) -> ScanResult<Self> {
        let weights = config.confidence.weights;
        if (weights.sum() - 1.0).abs() > 1e-9 {
            return Err(ScanError::InvalidConfig(format!(
                "confidence weights must sum to 1.0, got {:.6}",
                weights.sum()
            )));
        }

        let ct = config.confidence.risk_thresholds;
        if !(ct.critical > ct.high && ct.high > ct.medium && ct.medium > 0.0) {
            return Err(ScanError::InvalidConfig(format!(
                "confidence risk thresholds are inverted: critical={} high={} medium={}",
                ct.critical, ct.high, ct.medium
            )));
        }

        let mt = config.risk.risk_thresholds;
        if !(mt.critical > mt.high && mt.high > mt.medium && mt.medium > mt.low && mt.low > 0.0) {
            return Err(ScanError::InvalidConfig(format!(
                "risk matrix thresholds are inverted: critical={} high={} medium={} low={}",
                mt.critical, mt.high, mt.medium, mt.low
            )));
        }

        let dw = config.risk.dimension_weights;
        if (dw.sum() - 1.0).abs() > 1e-9 {
            return Err(ScanError::InvalidConfig(format!(
                "risk dimension weights must sum to 1.0, got {:.6}",
                dw.sum()
            )));
        }

        let aggregation = match config.confidence.aggregation.as_str() {
            "weighted_linear" => AggregationMethod::WeightedLinear,
            "simple_average" => AggregationMethod::SimpleAverage,
            other => {
                return Err(ScanError::InvalidConfig(format!(
                    "unknown aggregation method: {other}"
                )))
            }
        };

        let risk_mode = match config.risk.mode.as_str() {
            "multiplicative" => RiskMode::Multiplicative,
            "weighted_average" => RiskMode::WeightedAverage,
            other => {
                return Err(ScanError::InvalidConfig(format!(
                    "unknown risk aggregation mode: {other}"
                )))
            }
        };

        let enabled_types = if config.detection.patterns.enabled_types.is_empty() {
            PiType::all().iter().copied().collect()
        } else {
            let mut set = BTreeSet::new();
            for name in &config.detection.patterns.enabled_types {
                let ty = PiType::parse(name).ok_or_else(|| {
                    ScanError::InvalidConfig(format!("unknown PI type: {name}"))
                })?;
                set.insert(ty);
            }
            set
        };

        let mut environment_multipliers: BTreeMap<String, f64> = ENVIRONMENT_MULTIPLIERS
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        for (tag, multiplier) in &config.confidence.environment_penalties {
            if *multiplier < 0.0 {
                return Err(ScanError::InvalidConfig(format!(
                    "environment multiplier for '{tag}' is negative"
                )));
            }
            environment_multipliers.insert(tag.to_lowercase(), *multiplier);
        }

        let mut cooccurrence_matrix = HashMap::new();
        for (a, b, boost) in COOCCURRENCE_PAIRS {
            cooccurrence_matrix.insert(pair_key(*a, *b), *boost);
        }

        Ok(Self {
            patterns_enabled: config.detection.patterns.enabled,
            enabled_types,
            max_file_size_bytes: config.detection.max_file_size_bytes,
            test_path_patterns: config.detection.test_path_patterns.clone(),
            confidence_threshold: config.detection.patterns.confidence_threshold,
            proximity_distance: config.detection.context.proximity_distance.max(1),
            context_enabled: config.detection.context.enabled,
            weights,
            confidence_thresholds: ct,
            aggregation,
            risk_mode,
            matrix_thresholds: mt,
            dimension_weights: dw,
            compliance: config.compliance,
            repo: RepoContext::default(),
            file_timeout: Duration::from_secs(constants::DEFAULT_FILE_TIMEOUT_SECS),
            workers: constants::DEFAULT_WORKER_COUNT,
            environment_multipliers,
            cooccurrence_matrix,
            ml_scorer: None,
        })
    }

    /// The embedded defaults, which are valid by construction.
    pub fn default_policy() -> Self {
        Self::compile(ScanConfig::default())
            .expect("CRITICAL: embedded default configuration must compile")
    }

    pub fn with_repo_context(mut self, repo: RepoContext) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_ml_scorer(mut self, scorer: Arc<dyn MlScorer>) -> Self {
        self.ml_scorer = Some(scorer);
        self
    }

    pub fn ml_scorer(&self) -> Option<&dyn MlScorer> {
        self.ml_scorer.as_deref()
    }

    /// Multiplier for a lower-cased environment indicator tag.
    pub fn environment_multiplier(&self, tag: &str) -> Option<f64> {
        self.environment_multipliers.get(tag).copied()
    }

    /// Every configured environment tag, for the environment sweep.
    pub fn environment_tags(&self) -> impl Iterator<Item = (&str, f64)> {
        self.environment_multipliers
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Matrix boost for a PI-type pair, if the pair is privacy-significant.
    pub fn cooccurrence_boost(&self, a: PiType, b: PiType) -> Option<f64> {
        self.cooccurrence_matrix.get(&pair_key(a, b)).copied()
    }
}

fn pair_key(a: PiType, b: PiType) -> (PiType, PiType) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
