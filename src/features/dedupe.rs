//! Consecutive duplicate row removal
//!
//! OCR models occasionally loop and emit the same table row over and over.
//! Real tables do repeat rows (e.g. a blank "-" line per section), so only
//! long runs are collapsed: the first `repeat_limit - 1` occurrences of a
//! run survive, the rest are dropped. Blank rows are dropped everywhere.

use crate::data::constants::REPEAT_LIMIT;
use crate::features::sanitize::clean;

/// Result of [`dedupe`]
#[derive(Debug, Clone, PartialEq)]
pub struct DedupeReport {
    /// Surviving rows with their original, uncleaned text
    pub rows: Vec<Vec<String>>,
    /// Blank rows plus dropped repeats
    pub dropped: usize,
    /// `dropped / original row count` (0 for no input)
    pub warn_ratio: f64,
}

impl DedupeReport {
    /// Whether the caller should surface a duplicate warning
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.warn_ratio > threshold
    }
}

/// Remove blank rows and long runs of identical rows
pub fn dedupe(rows: Vec<Vec<String>>) -> DedupeReport {
    dedupe_with_limit(rows, REPEAT_LIMIT)
}

/// Like [`dedupe`], dropping a run's occurrences from the `repeat_limit`-th on.
///
/// A limit of 0 or 1 is treated as 2 so the first occurrence always survives.
pub fn dedupe_with_limit(rows: Vec<Vec<String>>, repeat_limit: usize) -> DedupeReport {
    let repeat_limit = repeat_limit.max(2);
    let original = rows.len();

    let mut kept = Vec::with_capacity(original);
    let mut previous: Option<Vec<String>> = None;
    let mut run = 0usize;

    for row in rows {
        let key: Vec<String> = row.iter().map(|cell| clean(cell)).collect();

        if key.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        if previous.as_ref() == Some(&key) {
            run += 1;
            if run >= repeat_limit {
                continue;
            }
        } else {
            previous = Some(key);
            run = 1;
        }

        kept.push(row);
    }

    let dropped = original - kept.len();
    let warn_ratio = if original == 0 {
        0.0
    } else {
        dropped as f64 / original as f64
    };

    DedupeReport {
        rows: kept,
        dropped,
        warn_ratio,
    }
}
