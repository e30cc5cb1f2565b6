//! Pattern detection stage: raw file bytes in, candidates out.
//!
//! The detector owns the intake gates (binary sniff, size limit), text
//! decoding, and the regex catalogue sweep. It knows nothing about context
//! or scoring; every match that survives the zero-padding filter is emitted
//! for the later stages to judge.

pub mod patterns;

use crate::constants;
use crate::error::{ScanError, ScanResult};
use crate::types::{Candidate, PiType};
use self::patterns::{catalogue, NAME_FALSE_POSITIVES};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub struct PatternDetector {
    enabled_types: BTreeSet<PiType>,
    max_file_size: u64,
}

impl PatternDetector {
    pub fn new(enabled_types: BTreeSet<PiType>, max_file_size: u64) -> Self {
        Self {
            enabled_types,
            max_file_size,
        }
    }

    /// Detector with every PI type enabled and the default size limit.
    pub fn with_defaults() -> Self {
        Self::new(
            PiType::all().iter().copied().collect(),
            constants::DEFAULT_MAX_FILE_SIZE_BYTES,
        )
    }

    /// Intake gates plus decoding. Binary files (NUL byte in the sniff
    /// window) and oversized files are refused before any decoding work.
    pub fn intake<'a>(&self, bytes: &'a [u8], path: &str) -> ScanResult<Cow<'a, str>> {
        if bytes.len() as u64 > self.max_file_size {
            return Err(ScanError::TooLarge {
                path: PathBuf::from(path),
                size: bytes.len() as u64,
                limit: self.max_file_size,
            });
        }
        let sniff = &bytes[..bytes.len().min(constants::BINARY_SNIFF_BYTES)];
        if sniff.contains(&0u8) {
            return Err(ScanError::BinarySkip {
                path: PathBuf::from(path),
            });
        }
        Ok(decode_text(bytes))
    }

    /// Run the catalogue over already-decoded text.
    ///
    /// Candidates come back ordered by byte-span start. Overlaps between
    /// different PI types are retained; purely zero-padded literals are
    /// suppressed here.
    pub fn detect(&self, text: &str, path: &str) -> Vec<Candidate> {
        let line_starts = line_start_offsets(text);
        let mut candidates = Vec::new();

        for pattern in catalogue() {
            if !self.enabled_types.contains(&pattern.pi_type) {
                continue;
            }
            for caps in pattern.regex.captures_iter(text) {
                let m = match caps.get(pattern.literal_group) {
                    Some(m) => m,
                    None => continue,
                };
                let literal = m.as_str();
                if is_zero_padded(literal) {
                    continue;
                }
                if pattern.pi_type == PiType::Name && is_name_false_positive(literal) {
                    continue;
                }
                let (line, column) = locate(&line_starts, m.start());
                candidates.push(Candidate {
                    pi_type: pattern.pi_type,
                    literal: literal.to_string(),
                    file_path: path.to_string(),
                    byte_span: (m.start(), m.end()),
                    line,
                    column,
                    detector_name: pattern.name.to_string(),
                });
            }
        }

        candidates.sort_by_key(|c| (c.byte_span.0, c.byte_span.1, c.pi_type));
        tracing::debug!(
            path = %path,
            candidates = candidates.len(),
            "pattern sweep complete"
        );
        candidates
    }

    /// Convenience entry point matching the stage contract: bytes in,
    /// candidates out, intake failures surfaced as errors.
    pub fn detect_bytes(&self, bytes: &[u8], path: &str) -> ScanResult<Vec<Candidate>> {
        let text = self.intake(bytes, path)?;
        Ok(self.detect(&text, path))
    }
}

/// Decode file bytes: UTF-8 where possible, Windows-1252 as the legacy
/// fallback so byte-valued source files still get scanned.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

/// Byte offsets at which each line begins, for span -> line/column mapping.
fn line_start_offsets(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(idx + 1);
        }
    }
    starts
}

/// Map a byte offset to 1-based line and column.
fn locate(line_starts: &[usize], offset: usize) -> (u32, u32) {
    let line_idx = match line_starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    let line = (line_idx + 1) as u32;
    let column = (offset - line_starts[line_idx] + 1) as u32;
    (line, column)
}

/// A literal whose digits are all zero is placeholder data, not PI.
fn is_zero_padded(literal: &str) -> bool {
    let mut saw_digit = false;
    for c in literal.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
            if c != '0' {
                return false;
            }
        }
    }
    saw_digit
}

fn is_name_false_positive(literal: &str) -> bool {
    NAME_FALSE_POSITIVES
        .iter()
        .any(|phrase| literal.eq_ignore_ascii_case(phrase))
}
