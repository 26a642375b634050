//! Error handling for Tablift extraction
//!
//! This module provides the unified error type, the advisory warning type and
//! the output wrapper shared by every extraction operation.

use std::fmt;

/// Extraction error type
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// A CHILD relationship chain leads back to a block already on the path
    CycleDetected { block_id: String },
    /// OCR response could not be normalized into a document
    InvalidResponse { message: String },
    /// Delimited-text writer failed
    Export { message: String },
    /// Options file could not be parsed
    Config { message: String },
    /// IO error (for file operations)
    Io { message: String },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::CycleDetected { block_id } => {
                write!(f, "Cycle detected at block '{}'", block_id)
            }
            ExtractionError::InvalidResponse { message } => {
                write!(f, "Invalid OCR response: {}", message)
            }
            ExtractionError::Export { message } => write!(f, "Export error: {}", message),
            ExtractionError::Config { message } => write!(f, "Config error: {}", message),
            ExtractionError::Io { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ExtractionError {}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ExtractionError {
    fn from(err: csv::Error) -> Self {
        ExtractionError::Export {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::InvalidResponse {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ExtractionError {
    fn from(err: toml::de::Error) -> Self {
        ExtractionError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// What an advisory warning is about
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// Too many consecutive duplicate or blank rows were removed
    HighDuplicateRatio {
        dropped: usize,
        total: usize,
        ratio: f64,
    },
    /// The table kept fewer rows than the configured minimum and was skipped
    TooFewRows { remaining: usize },
    /// A TABLE block produced no cells
    EmptyTable { block_id: String },
    /// No rows could be parsed from the markdown text
    NoRows,
}

/// Extraction warnings (non-fatal issues)
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionWarning {
    pub page: u32,
    pub table_index: usize,
    pub kind: WarningKind,
}

impl ExtractionWarning {
    pub fn new(page: u32, table_index: usize, kind: WarningKind) -> Self {
        Self {
            page,
            table_index,
            kind,
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Warning on page {}, table {}: ",
            self.page, self.table_index
        )?;
        match &self.kind {
            WarningKind::HighDuplicateRatio {
                dropped,
                total,
                ratio,
            } => write!(
                f,
                "{:.1}% of rows were consecutive duplicates ({}/{})",
                ratio * 100.0,
                dropped,
                total
            ),
            WarningKind::TooFewRows { remaining } => write!(
                f,
                "only {} row(s) remaining after filtering, table skipped",
                remaining
            ),
            WarningKind::EmptyTable { block_id } => {
                write!(f, "could not extract table data from block {}", block_id)
            }
            WarningKind::NoRows => write!(f, "no rows parsed from markdown"),
        }
    }
}

/// Extraction output with optional warnings
#[derive(Debug, Clone)]
pub struct ExtractionOutput<T> {
    /// The extracted content
    pub content: T,
    /// Any warnings generated during extraction
    pub warnings: Vec<ExtractionWarning>,
}

impl<T> ExtractionOutput<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(content: T, warnings: Vec<ExtractionWarning>) -> Self {
        Self { content, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// Convenience constructors for errors
impl ExtractionError {
    pub fn cycle(block_id: impl Into<String>) -> Self {
        ExtractionError::CycleDetected {
            block_id: block_id.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ExtractionError::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        ExtractionError::Export {
            message: message.into(),
        }
    }
}
