//! Report shapes.
//!
//! The JSON record for a finding is stable: the harness persists it and
//! downstream tooling parses it back. The CSV summary masks the matched
//! literal; the JSON record carries it in full for remediation.

use crate::error::{ScanError, ScanResult};
use crate::types::{Finding, RiskLevel, ScanStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level document the CLI writes for a scan.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub root: String,
    pub files_scanned: u64,
    pub stats: ScanStats,
    /// Finding counts keyed by effective risk level.
    pub summary: BTreeMap<String, u64>,
    pub findings: Vec<Finding>,
}

impl ReportDocument {
    pub fn new(root: String, files_scanned: u64, stats: ScanStats, findings: Vec<Finding>) -> Self {
        let mut summary: BTreeMap<String, u64> = BTreeMap::new();
        for finding in &findings {
            *summary
                .entry(finding.effective_risk_level().as_str().to_string())
                .or_insert(0) += 1;
        }
        Self {
            generated_at: Utc::now(),
            root,
            files_scanned,
            stats,
            summary,
            findings,
        }
    }

    pub fn to_json(&self) -> ScanResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScanError::Transient(e.to_string()))
    }

    /// Highest effective risk level in the report, for exit-code mapping.
    pub fn worst_level(&self) -> Option<RiskLevel> {
        self.findings
            .iter()
            .map(|f| f.effective_risk_level())
            .max()
    }
}

/// Serialise one finding to its persisted JSON form.
pub fn finding_to_json(finding: &Finding) -> ScanResult<String> {
    serde_json::to_string(finding).map_err(|e| ScanError::Transient(e.to_string()))
}

/// Parse a finding back from its persisted JSON form.
pub fn finding_from_json(raw: &str) -> ScanResult<Finding> {
    serde_json::from_str(raw).map_err(|e| ScanError::Transient(e.to_string()))
}

pub fn csv_header() -> &'static str {
    "file,line,column,type,risk_level,confidence,validated,context,match"
}

/// One CSV summary line per finding, with the literal masked.
pub fn csv_line(finding: &Finding) -> String {
    format!(
        "{},{},{},{},{},{:.3},{},{},{}",
        finding.file_path,
        finding.line,
        finding.column,
        finding.pi_type,
        finding.effective_risk_level(),
        finding.confidence,
        finding.validated,
        finding.context_type.as_str(),
        finding.masked_literal(),
    )
}
