//! # tablift
//!
//! Table extraction from OCR service output, written in Rust.
//!
//! ## Features
//!
//! - **Block Graphs**: Rebuilds dense grids from Textract-style TABLE/CELL graphs,
//!   including merged cells, titles and footers
//! - **Markdown Tables**: Parses pipe tables whose cells span several lines
//! - **Cleanup**: Strips markup residue and collapses runaway duplicate rows
//! - **CSV Export**: Per-table, combined, summary and page-sectioned outputs
//!
//! ## Usage Examples
//!
//! ### Markdown Page
//!
//! ```rust
//! use tablift::{extract_markdown, ExtractOptions};
//!
//! let md = "Jadual 1: Keluasan\n| Negeri | Hektar |\n|---|---|\n| Kedah | 12.5 |";
//! let output = extract_markdown(md, 1, &ExtractOptions::default());
//!
//! let table = &output.content[0];
//! assert_eq!(table.title.as_deref(), Some("Jadual 1: Keluasan"));
//! assert_eq!(table.rows[1], vec!["Kedah", "12.5"]);
//! ```
//!
//! ### OCR Response
//!
//! ```rust
//! use tablift::{extract_json, ExtractOptions};
//!
//! let json = r#"{"pages": [{"index": 0, "markdown": "| a |\n| b |"}]}"#;
//! let output = extract_json(json, 1, &ExtractOptions::default()).unwrap();
//! assert_eq!(output.content.len(), 1);
//! ```

/// Core parsing modules
pub mod core;

/// Data layer - constants
pub mod data;

/// Feature modules - pipeline and export
pub mod features;

/// Utility modules
pub mod utils;

// Re-export core types
pub use core::blocks::{build_table, Block, BlockGraph, BlockType, RelationshipKind, TableInfo};
pub use core::markdown::{extract_title, ParserVariant};

// Re-export data modules
pub use data::constants;

// Re-export feature modules
pub use features::dedupe;
pub use features::export;
pub use features::extract::{
    extract_block_tables, extract_document, extract_markdown_table, ExtractOptions,
    ExtractedTable, TableSource, TableSummary,
};
pub use features::response::{MarkdownPage, OcrDocument};
pub use features::sanitize;

// Re-export utilities
pub use utils::error::{
    ExtractionError, ExtractionOutput, ExtractionResult, ExtractionWarning, WarningKind,
};

/// Extract all tables from an OCR JSON response
///
/// # Arguments
/// * `json` - Textract `Blocks` or Mistral `pages` response
/// * `first_page` - page number assigned to the first page
/// * `options` - Extraction options
pub fn extract_json(
    json: &str,
    first_page: u32,
    options: &ExtractOptions,
) -> ExtractionResult<ExtractionOutput<Vec<ExtractedTable>>> {
    let document = OcrDocument::from_json(json)?;
    Ok(extract_document(&document, first_page, options))
}

/// Extract the table of a single markdown page
pub fn extract_markdown(
    markdown: &str,
    page: u32,
    options: &ExtractOptions,
) -> ExtractionOutput<Vec<ExtractedTable>> {
    let output = extract_markdown_table(markdown, page, 1, options);
    ExtractionOutput::with_warnings(output.content.into_iter().collect(), output.warnings)
}

/// Detect input format
///
/// Returns "json", "markdown", or "unknown" based on content analysis.
pub fn detect_format(input: &str) -> &'static str {
    let trimmed = input.trim_start();

    if trimmed.starts_with('{')
        && (trimmed.contains("\"Blocks\"") || trimmed.contains("\"pages\""))
    {
        "json"
    } else if trimmed.lines().any(|line| line.trim_start().starts_with('|')) {
        "markdown"
    } else {
        "unknown"
    }
}
