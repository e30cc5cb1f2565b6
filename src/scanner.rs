//! Scan orchestration.
//!
//! [`scan_file`] is the per-file pipeline entry point: pure with respect to
//! caller state, synchronous, and safe to run from any number of workers
//! against one shared [`Policy`]. [`Scanner`] is the directory harness that
//! feeds it through a bounded tokio worker pool.

use crate::confidence::{assess_environment, ConfidenceEngine};
use crate::context::ContextAnalyzer;
use crate::cooccurrence::CoOccurrenceIndex;
use crate::detector::PatternDetector;
use crate::error::{ScanError, ScanResult};
use crate::policy::Policy;
use crate::risk::{assess_compliance, RiskInputs, RiskMatrix};
use crate::types::{AuditEntry, FileScan, Finding, ScanStats};
use crate::validators;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;
use walkdir::WalkDir;

/// Directories never worth scanning.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules", "target", ".idea"];

/// Scan one file's bytes against a policy.
///
/// Cancellation is honoured before the scan starts and before each
/// candidate is scored; a cancelled scan yields no partial findings.
/// Intake gates (binary, oversize) resolve to an empty result with the
/// corresponding stats counter set, per the error taxonomy.
pub fn scan_file(
    path: &str,
    bytes: &[u8],
    policy: &Policy,
    cancel: &AtomicBool,
) -> ScanResult<FileScan> {
    let started = Instant::now();
    let mut stats = ScanStats::default();

    if cancel.load(Ordering::Relaxed) {
        return Ok(FileScan::default());
    }

    let detector = PatternDetector::new(policy.enabled_types.clone(), policy.max_file_size_bytes);
    let text = match detector.intake(bytes, path) {
        Ok(text) => text,
        Err(ScanError::BinarySkip { .. }) => {
            stats.binary_skipped = 1;
            stats.duration_ns = started.elapsed().as_nanos() as u64;
            return Ok(FileScan {
                findings: Vec::new(),
                stats,
            });
        }
        Err(ScanError::TooLarge { .. }) => {
            stats.skipped = 1;
            stats.duration_ns = started.elapsed().as_nanos() as u64;
            return Ok(FileScan {
                findings: Vec::new(),
                stats,
            });
        }
        Err(other) => return Err(other),
    };
    stats.bytes_read = bytes.len() as u64;

    let candidates = if policy.patterns_enabled {
        detector.detect(&text, path)
    } else {
        Vec::new()
    };
    stats.candidates = candidates.len() as u64;

    let analyzer = ContextAnalyzer::new(policy.test_path_patterns.clone());
    let engine = ConfidenceEngine::new(policy);
    let matrix = RiskMatrix::new(policy);
    let environment = assess_environment(path, &text, policy);
    let index = CoOccurrenceIndex::build(&candidates);

    let mut findings = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        if cancel.load(Ordering::Relaxed) {
            // Discard in-progress state: no partial findings for the file.
            return Ok(FileScan::default());
        }

        let context = if policy.context_enabled {
            analyzer.analyze(candidate, &text)
        } else {
            crate::context::ContextClassification {
                context_type: crate::types::ContextType::Production,
                modifier: 1.0,
                keywords: Vec::new(),
                context_before: String::new(),
                context_after: String::new(),
            }
        };
        let validation = validators::validate(candidate.pi_type, &candidate.literal);
        let co_occurrences = index.within(candidate, policy.proximity_distance);

        let score = match engine.score(candidate, &context, &validation, &co_occurrences, &environment)
        {
            Ok(score) => score,
            Err(err) => {
                // Per-candidate failures degrade, never abort the file.
                tracing::warn!(
                    path = %path,
                    line = candidate.line,
                    error = %err,
                    "candidate dropped during scoring"
                );
                stats.errors += 1;
                continue;
            }
        };

        if score.confidence < policy.confidence_threshold {
            stats.skipped += 1;
            continue;
        }

        let risk = matrix.assess(&RiskInputs {
            candidate,
            context_type: context.context_type,
            validated: validation.is_valid,
            co_occurrences: &co_occurrences,
        });
        let effective_level = score.risk_level.max(risk.risk_level);
        let compliance = assess_compliance(
            candidate.pi_type,
            effective_level,
            policy.repo.international,
            &policy.compliance,
        );

        let mut audit_trail = score.audit_trail;
        audit_trail.push(AuditEntry {
            component: "risk_matrix".to_string(),
            timestamp: Utc::now(),
            score: risk.overall,
            description: format!(
                "impact x likelihood x exposure -> {} ({})",
                risk.risk_level,
                risk.category.as_str()
            ),
            details: Default::default(),
        });
        audit_trail.push(AuditEntry {
            component: "finding".to_string(),
            timestamp: Utc::now(),
            score: score.confidence,
            description: "finding finalised".to_string(),
            details: [
                ("final_score".to_string(), serde_json::json!(score.confidence)),
                (
                    "risk_level".to_string(),
                    serde_json::json!(score.risk_level.as_str()),
                ),
                (
                    "aggregation_method".to_string(),
                    serde_json::json!(score.breakdown.aggregation_method),
                ),
                (
                    "regulatory_compliance".to_string(),
                    serde_json::json!(compliance),
                ),
            ]
            .into(),
        });

        findings.push(Finding {
            id: Uuid::new_v4(),
            pi_type: candidate.pi_type,
            literal: candidate.literal.clone(),
            file_path: candidate.file_path.clone(),
            byte_span: candidate.byte_span,
            line: candidate.line,
            column: candidate.column,
            detector_name: candidate.detector_name.clone(),
            context_before: context.context_before,
            context_after: context.context_after,
            context_type: context.context_type,
            keywords: context.keywords,
            validated: validation.is_valid,
            validation_algorithm: if validation.has_algorithm() {
                Some(validation.algorithm.clone())
            } else {
                None
            },
            confidence: score.confidence,
            context_modifier: context.modifier,
            risk_level: score.risk_level,
            score_breakdown: score.breakdown,
            audit_trail,
            compliance,
            risk,
            detected_at: Utc::now(),
        });
    }

    stats.retained = findings.len() as u64;
    stats.duration_ns = started.elapsed().as_nanos() as u64;

    // Candidates are emitted span-ordered and processed in order, so the
    // per-file ordering guarantee holds by construction.
    debug_assert!(findings.windows(2).all(|w| w[0].byte_span.0 <= w[1].byte_span.0));

    Ok(FileScan { findings, stats })
}

/// Aggregate result of a directory scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub stats: ScanStats,
    pub files_scanned: u64,
}

/// Directory harness: walks a tree and runs the per-file pipeline on a
/// bounded worker pool with a per-file soft timeout.
pub struct Scanner {
    policy: Arc<Policy>,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self {
            policy,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked by every worker; set it to stop the scan.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub async fn scan_directory(&self, root: &Path) -> ScanResult<ScanReport> {
        let files = enumerate_files(root);
        tracing::info!(root = %root.display(), files = files.len(), "starting scan");

        let semaphore = Arc::new(Semaphore::new(self.policy.workers));
        let mut join_set: JoinSet<(PathBuf, ScanResult<FileScan>)> = JoinSet::new();

        for file in files {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ScanError::Transient(e.to_string()))?;
            let policy = self.policy.clone();
            let cancel = self.cancel.clone();
            let timeout = policy.file_timeout;

            join_set.spawn(async move {
                let _permit = permit;
                // Cancellation checkpoint before the file is even opened.
                if cancel.load(Ordering::Relaxed) {
                    return (file, Ok(FileScan::default()));
                }
                let bytes = match tokio::fs::read(&file).await {
                    Ok(bytes) => bytes,
                    Err(err) => return (file, Err(ScanError::Io(err))),
                };
                let display_path = file.to_string_lossy().into_owned();
                let worker = tokio::task::spawn_blocking({
                    let cancel = cancel.clone();
                    move || scan_file(&display_path, &bytes, &policy, &cancel)
                });
                match tokio::time::timeout(timeout, worker).await {
                    Ok(Ok(result)) => (file, result),
                    Ok(Err(join_err)) => (file, Err(ScanError::Transient(join_err.to_string()))),
                    Err(_elapsed) => {
                        let timed_out = ScanError::TimedOut {
                            path: file.clone(),
                            timeout_secs: timeout.as_secs(),
                        };
                        (file, Err(timed_out))
                    }
                }
            });
        }

        let mut report = ScanReport::default();
        while let Some(joined) = join_set.join_next().await {
            let (file, result) = joined.map_err(|e| ScanError::Transient(e.to_string()))?;
            report.files_scanned += 1;
            match result {
                Ok(file_scan) => {
                    report.stats.merge(&file_scan.stats);
                    report.findings.extend(file_scan.findings);
                }
                Err(ScanError::TimedOut { timeout_secs, .. }) => {
                    // File-level atomicity: the whole file's findings are gone.
                    tracing::warn!(path = %file.display(), timeout_secs, "file scan timed out");
                    report.stats.timed_out += 1;
                }
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "file scan failed");
                    report.stats.errors += 1;
                }
            }
        }

        report
            .findings
            .sort_by(|a, b| (a.file_path.as_str(), a.byte_span.0).cmp(&(b.file_path.as_str(), b.byte_span.0)));
        tracing::info!(
            findings = report.findings.len(),
            files = report.files_scanned,
            "scan complete"
        );
        Ok(report)
    }
}

fn enumerate_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !SKIPPED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
