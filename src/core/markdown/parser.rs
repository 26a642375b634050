//! Line-oriented pipe table state machine

use serde::Deserialize;

/// Raw cells of one logical markdown row; rows may differ in length
pub type MarkdownRow = Vec<String>;

/// How continuation lines are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserVariant {
    /// A continuation line ending in `|` closes the row
    #[default]
    Permissive,
    /// Continuation lines never close a row; only the next `|` line or a
    /// separator does
    Legacy,
}

/// Parser state between lines
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParserState {
    #[default]
    Idle,
    /// Trimmed fragments of the row being assembled
    Accumulating(Vec<String>),
}

/// Stateful pipe table parser
///
/// Feeds one line at a time, collecting completed rows. Rows may span
/// several physical lines when a cell contains a line break.
#[derive(Debug, Default)]
pub struct MarkdownTableParser {
    variant: ParserVariant,
    state: ParserState,
    /// Completed rows
    pub rows: Vec<MarkdownRow>,
}

impl MarkdownTableParser {
    pub fn new(variant: ParserVariant) -> Self {
        MarkdownTableParser {
            variant,
            state: ParserState::Idle,
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Process a single physical line
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();

        if line.starts_with('|') {
            if is_separator_line(line) {
                self.flush();
                return;
            }

            // A new row start terminates the previous one
            self.flush();
            self.state = ParserState::Accumulating(vec![line.to_string()]);
            if line.ends_with('|') {
                self.flush();
            }
            return;
        }

        if let ParserState::Accumulating(fragments) = &mut self.state {
            fragments.push(line.to_string());
            if self.variant == ParserVariant::Permissive && line.ends_with('|') {
                self.flush();
            }
        }
    }

    /// Flush any pending row and return everything parsed
    pub fn finish(mut self) -> Vec<MarkdownRow> {
        self.flush();
        self.rows
    }

    /// Close the row being assembled, if any
    fn flush(&mut self) {
        if let ParserState::Accumulating(fragments) = std::mem::take(&mut self.state) {
            if let Some(cells) = split_row(&fragments.join(" ")) {
                self.rows.push(cells);
            }
        }
    }
}

/// Parse every pipe table row in `text`
pub fn parse(text: &str) -> Vec<MarkdownRow> {
    parse_with_variant(text, ParserVariant::default())
}

/// Parse with an explicit continuation-line behavior
pub fn parse_with_variant(text: &str, variant: ParserVariant) -> Vec<MarkdownRow> {
    let mut parser = MarkdownTableParser::new(variant);
    for line in text.split('\n') {
        parser.push_line(line);
    }
    parser.finish()
}

/// `| --- | :-: |` style line between header and body
pub fn is_separator_line(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| *c != ' ').collect();
    compact.starts_with('|')
        && compact.ends_with('|')
        && compact.chars().all(|c| matches!(c, '|' | '-' | ':'))
}

/// Split a joined row into trimmed cells.
///
/// Text not framed by pipes on both ends yields `None`, as does a row with no
/// cells left after dropping the empty boundary pieces.
fn split_row(joined: &str) -> Option<MarkdownRow> {
    let text = joined.trim();
    if !(text.starts_with('|') && text.ends_with('|')) {
        return None;
    }

    // Both boundary pipes are single-byte
    let inner = if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    };

    let mut cells: Vec<String> = inner.split('|').map(|cell| cell.trim().to_string()).collect();
    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }

    if cells.is_empty() {
        None
    } else {
        Some(cells)
    }
}
