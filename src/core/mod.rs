//! Core parsing modules
//!
//! - `blocks`: table reconstruction from a block graph
//! - `markdown`: pipe table rows and titles from markdown text

pub mod blocks;
pub mod markdown;

pub use blocks::{build_table, Block, BlockGraph, BlockType, TableInfo};
pub use markdown::{extract_title, parse, ParserVariant};
