// Library exports for the piscan PI scanner
// The detection/scoring core plus the scan orchestrator; the binary in
// main.rs is a thin harness over these modules.

pub mod config;
pub mod confidence;
pub mod constants;
pub mod context;
pub mod cooccurrence;
pub mod detector;
pub mod error;
pub mod policy;
pub mod report;
pub mod risk;
pub mod scanner;
pub mod types;
pub mod validators;

// Re-export commonly used types
pub use config::ScanConfig;
pub use confidence::{assess_environment, ConfidenceEngine, EnvironmentAssessment};
pub use context::{ContextAnalyzer, ContextClassification};
pub use cooccurrence::{CoOccurrence, CoOccurrenceIndex};
pub use detector::PatternDetector;
pub use error::{ScanError, ScanResult};
pub use policy::{AggregationMethod, MlPrediction, MlScorer, Policy, RiskMode};
pub use report::ReportDocument;
pub use risk::{RiskInputs, RiskMatrix};
pub use scanner::{scan_file, ScanReport, Scanner};
pub use types::{
    Candidate, ContextType, FileScan, Finding, PiType, RegulatoryCompliance, RepoContext,
    RiskAssessment, RiskCategory, RiskLevel, ScanStats,
};
