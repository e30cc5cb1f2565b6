//! Per-file spatial index of candidates.
//!
//! Built once per file after pattern detection and queried by the
//! confidence engine and risk matrix. The index is owned by the worker
//! scanning the file; nothing here is shared across files.

use crate::types::{Candidate, PiType};
use std::collections::BTreeMap;

/// Another candidate found near the one being scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoOccurrence {
    pub pi_type: PiType,
    pub line: u32,
    /// Absolute line distance from the queried candidate.
    pub distance: u32,
}

#[derive(Debug, Default)]
pub struct CoOccurrenceIndex {
    by_line: BTreeMap<u32, Vec<Entry>>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    pi_type: PiType,
    byte_span: (usize, usize),
}

impl CoOccurrenceIndex {
    /// Index every candidate of a file by line.
    pub fn build(candidates: &[Candidate]) -> Self {
        let mut by_line: BTreeMap<u32, Vec<Entry>> = BTreeMap::new();
        for candidate in candidates {
            by_line.entry(candidate.line).or_default().push(Entry {
                pi_type: candidate.pi_type,
                byte_span: candidate.byte_span,
            });
        }
        Self {
            by_line,
            len: candidates.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All candidates within `window` lines of `candidate`, excluding
    /// entries at the candidate's own span (overlapping interpretations of
    /// the same digits must not boost themselves).
    pub fn within(&self, candidate: &Candidate, window: u32) -> Vec<CoOccurrence> {
        let low = candidate.line.saturating_sub(window);
        let high = candidate.line.saturating_add(window);
        let mut found = Vec::new();
        for (&line, entries) in self.by_line.range(low..=high) {
            for entry in entries {
                if entry.byte_span == candidate.byte_span {
                    continue;
                }
                found.push(CoOccurrence {
                    pi_type: entry.pi_type,
                    line,
                    distance: line.abs_diff(candidate.line),
                });
            }
        }
        found
    }
}
