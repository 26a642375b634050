//! Utility modules

pub mod error;

// Re-export commonly used items
pub use error::{
    ExtractionError, ExtractionOutput, ExtractionResult, ExtractionWarning, WarningKind,
};
