//! Table title heuristics
//!
//! OCR markdown has no caption syntax; a table's title is usually the short
//! line (or two) right above its first row, e.g. `JADUAL 1.2: Keluasan padi`.

use crate::data::constants::{
    TITLE_FALLBACK_MAX_LEN, TITLE_KEYWORDS, TITLE_LOOKBACK_LINES, TITLE_MAX_LEN,
};
use crate::features::sanitize::clean;

/// Limits used by [`extract_title_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleLimits {
    /// Lines above the table considered
    pub lookback: usize,
    /// Candidates at least this long are dropped
    pub max_len: usize,
    /// Upper bound (exclusive) for the fallback candidate
    pub fallback_max_len: usize,
}

impl Default for TitleLimits {
    fn default() -> Self {
        Self {
            lookback: TITLE_LOOKBACK_LINES,
            max_len: TITLE_MAX_LEN,
            fallback_max_len: TITLE_FALLBACK_MAX_LEN,
        }
    }
}

/// Extract the title of the first table in `markdown`
pub fn extract_title(markdown: &str) -> Option<String> {
    extract_title_with(markdown, &TitleLimits::default())
}

pub fn extract_title_with(markdown: &str, limits: &TitleLimits) -> Option<String> {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let table_start = lines.iter().position(|line| line.trim().starts_with('|'))?;

    let window_start = table_start.saturating_sub(limits.lookback);
    let candidates: Vec<&str> = lines[window_start..table_start]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter(|line| !(line.starts_with("![") || line.starts_with("img-")))
        .filter(|line| !line.starts_with('#'))
        .collect();

    let mut kept: Vec<String> = candidates
        .iter()
        .filter_map(|line| keep_candidate(line, limits.max_len))
        .collect();

    if kept.is_empty() {
        // Everything looked like paragraph text; fall back to the line closest
        // to the table when it is still reasonably short
        if let Some(last) = candidates.last() {
            if char_len(last) < limits.fallback_max_len {
                kept.push(last.to_string());
            }
        }
    }

    if kept.is_empty() {
        None
    } else {
        Some(clean(&kept.join(" ")))
    }
}

fn keep_candidate(line: &str, max_len: usize) -> Option<String> {
    let len = char_len(line);
    if len > max_len {
        return None;
    }

    let lower = line.to_lowercase();
    if TITLE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        if lower.starts_with("figure") {
            // "Figure 3: Pengeluaran" keeps only the description
            return Some(match line.split_once(':') {
                Some((_, description)) => description.trim().to_string(),
                None => line.to_string(),
            });
        }
        return Some(line.to_string());
    }

    (len < max_len).then(|| line.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
