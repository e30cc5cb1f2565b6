use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the scan pipeline.
///
/// Per-candidate errors never abort a file scan and per-file errors never
/// abort the overall scan; only configuration errors raised while compiling
/// a policy are fatal.
#[derive(Debug, Error)]
pub enum ScanError {
    /// File is binary (NUL byte in the sniff window); counted, not reported.
    #[error("binary file skipped: {path:?}")]
    BinarySkip { path: PathBuf },

    /// File exceeds the configured size limit; counted, not reported.
    #[error("file too large ({size} bytes, limit {limit}): {path:?}")]
    TooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// Per-file soft timeout expired; the file's findings are discarded.
    #[error("scan timed out after {timeout_secs}s: {path:?}")]
    TimedOut { path: PathBuf, timeout_secs: u64 },

    /// Scoring was asked about a candidate with a missing or unknown PI type.
    #[error("invalid scoring input: {0}")]
    InvalidInput(String),

    /// Policy failed validation (weight sums, threshold ordering).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Regex catalogue failed to compile at startup.
    #[error("pattern catalogue failed to compile: {0}")]
    PatternCompile(String),

    /// Unexpected internal failure while classifying or scoring one candidate.
    #[error("transient scan error: {0}")]
    Transient(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Errors that are counted in stats rather than surfaced per finding.
    pub fn is_silent(&self) -> bool {
        matches!(self, ScanError::BinarySkip { .. } | ScanError::TooLarge { .. })
    }

    /// Errors that are fatal at policy compile time.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidConfig(_) | ScanError::PatternCompile(_)
        )
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
