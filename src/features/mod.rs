//! Feature modules - the extraction pipeline around the core parsers
//!
//! - Cell sanitizing
//! - Duplicate row removal
//! - OCR response normalization
//! - Table extraction
//! - Delimited-text export

pub mod dedupe;
pub mod export;
pub mod extract;
pub mod response;
pub mod sanitize;

// Re-export commonly used types
pub use dedupe::DedupeReport;
pub use extract::{ExtractOptions, ExtractedTable, TableSource, TableSummary};
pub use response::{MarkdownPage, OcrDocument};
