//! Markdown Pipe Table Parsing
//!
//! OCR services that answer in markdown render tables as GitHub-style pipe
//! tables, but cells may contain hard line breaks, so a logical row can span
//! several physical lines:
//!
//! ```text
//! | Komoditi | Nilai |
//! | --- | --- |
//! | Kelapa        <- row continues on the next line
//! sawit | 12.5 |
//! ```
//!
//! # Example
//!
//! ```rust
//! use tablift::core::markdown::parse;
//!
//! let rows = parse("| a | b |\n| --- | --- |\n| 1 | 2 |");
//! assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
//! ```

mod parser;
mod title;


// Re-export public API
pub use parser::{
    is_separator_line, parse, parse_with_variant, MarkdownRow, MarkdownTableParser, ParserState,
    ParserVariant,
};
pub use title::{extract_title, extract_title_with, TitleLimits};
