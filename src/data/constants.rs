//! Thresholds, keywords and labels shared across extraction

/// Keywords that mark a line preceding a table as its caption
/// (Malay "jadual" is "table").
pub const TITLE_KEYWORDS: &[&str] = &["jadual", "table", "figure"];

/// Number of lines above the first table row inspected for a title
pub const TITLE_LOOKBACK_LINES: usize = 3;

/// Lines at least this long are treated as paragraph text, not titles
pub const TITLE_MAX_LEN: usize = 200;

/// Upper bound for the fallback title line
pub const TITLE_FALLBACK_MAX_LEN: usize = 300;

/// Consecutive occurrence of an identical row at which it starts being dropped
pub const REPEAT_LIMIT: usize = 3;

/// Dropped-row ratio above which a duplicate warning is raised
pub const DUPLICATE_WARN_RATIO: f64 = 0.30;

/// Markdown tables with fewer surviving rows are discarded
pub const MIN_TABLE_ROWS: usize = 2;

/// Table type reported when the TABLE block carries no entity type
pub const UNKNOWN_TABLE_TYPE: &str = "UNKNOWN";

/// Table type reported for tables parsed from markdown text
pub const MARKDOWN_TABLE_TYPE: &str = "MARKDOWN";

/// Label of the title row in single-table export
pub const TITLE_ROW_LABEL: &str = "[TABLE_TITLE]";

/// Label of the footer row in single-table export
pub const FOOTER_ROW_LABEL: &str = "[TABLE_FOOTER]";

/// First cell of the combined export header row
pub const GENERATED_ON_LABEL: &str = "Generated on";

/// Timestamp format of the combined export header
pub const GENERATED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format embedded in output file names
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
