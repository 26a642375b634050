//! Dense grid construction from a TABLE block

use std::collections::BTreeMap;

use super::resolver::resolve_text;
use super::{BlockGraph, BlockType, RelationshipKind};
use crate::data::constants::UNKNOWN_TABLE_TYPE;

/// Layout metadata of one recorded cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetadata {
    pub row: u32,
    pub column: u32,
    pub row_span: u32,
    pub column_span: u32,
    pub entity_types: Vec<String>,
}

/// A table reconstructed from the block graph
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    /// Id of the TABLE block this was built from
    pub block_id: String,
    pub title: Option<String>,
    pub footer: Option<String>,
    pub table_type: String,
    /// `row_count` rows of exactly `column_count` cells
    pub grid: Vec<Vec<String>>,
    pub row_count: usize,
    pub column_count: usize,
    pub merged_cell_count: usize,
    /// Recorded cells in row-major order
    pub cell_metadata: Vec<CellMetadata>,
}

impl TableInfo {
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Cell text at a 1-based coordinate
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.grid
            .get(row.checked_sub(1)?)?
            .get(column.checked_sub(1)?)
            .map(String::as_str)
    }
}

/// Region covered by a merged cell
#[derive(Debug)]
struct MergedRegion {
    row: u64,
    column: u64,
    row_span: u64,
    column_span: u64,
    text: String,
}

impl MergedRegion {
    fn contains(&self, row: u32, column: u32) -> bool {
        let (row, column) = (u64::from(row), u64::from(column));
        self.row <= row
            && row < self.row + self.row_span
            && self.column <= column
            && column < self.column + self.column_span
    }
}

/// Build a dense table grid from the TABLE block `table_id`.
///
/// A cell inside a merged region takes the region's text. When regions
/// overlap, the first one in merged-id declaration order wins. Never fails:
/// an unknown id or a table without cells yields an empty grid.
pub fn build_table(graph: &BlockGraph, table_id: &str) -> TableInfo {
    let Some(table) = graph.get(table_id) else {
        return empty_table(table_id, None, None, UNKNOWN_TABLE_TYPE.to_string(), 0);
    };

    let table_type = table
        .entity_types
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_TABLE_TYPE.to_string());

    let title = first_text(graph, table.related_ids(RelationshipKind::TableTitle));
    let footer = first_text(graph, table.related_ids(RelationshipKind::TableFooter));

    let merged: Vec<MergedRegion> = table
        .related_ids(RelationshipKind::MergedCell)
        .filter_map(|id| graph.get(id))
        .map(|block| MergedRegion {
            row: u64::from(block.row_index),
            column: u64::from(block.column_index),
            row_span: u64::from(block.row_span),
            column_span: u64::from(block.column_span),
            text: resolve_text(graph, &block.id),
        })
        .collect();

    let mut cells: BTreeMap<(u32, u32), String> = BTreeMap::new();
    let mut metadata: BTreeMap<(u32, u32), CellMetadata> = BTreeMap::new();

    for block in table
        .related_ids(RelationshipKind::Child)
        .filter_map(|id| graph.get(id))
        .filter(|block| block.block_type == BlockType::Cell)
    {
        let (row, column) = (block.row_index, block.column_index);

        let text = match merged.iter().find(|region| region.contains(row, column)) {
            Some(region) => region.text.clone(),
            None => resolve_text(graph, &block.id),
        };

        cells.insert((row, column), text);
        metadata.insert(
            (row, column),
            CellMetadata {
                row,
                column,
                row_span: block.row_span,
                column_span: block.column_span,
                entity_types: block.entity_types.clone(),
            },
        );
    }

    if cells.is_empty() {
        return empty_table(table_id, title, footer, table_type, merged.len());
    }

    let row_count = cells.keys().map(|&(row, _)| row).max().unwrap_or(0) as usize;
    let column_count = cells.keys().map(|&(_, column)| column).max().unwrap_or(0) as usize;

    let grid: Vec<Vec<String>> = (1..=row_count)
        .map(|row| {
            (1..=column_count)
                .map(|column| {
                    cells
                        .get(&(row as u32, column as u32))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    TableInfo {
        block_id: table_id.to_string(),
        title,
        footer,
        table_type,
        grid,
        row_count,
        column_count,
        merged_cell_count: merged.len(),
        cell_metadata: metadata.into_values().collect(),
    }
}

/// First non-empty resolved text among `ids`
fn first_text<'a>(graph: &BlockGraph, ids: impl Iterator<Item = &'a str>) -> Option<String> {
    ids.map(|id| resolve_text(graph, id))
        .find(|text| !text.is_empty())
}

fn empty_table(
    table_id: &str,
    title: Option<String>,
    footer: Option<String>,
    table_type: String,
    merged_cell_count: usize,
) -> TableInfo {
    TableInfo {
        block_id: table_id.to_string(),
        title,
        footer,
        table_type,
        grid: Vec::new(),
        row_count: 0,
        column_count: 0,
        merged_cell_count,
        cell_metadata: Vec::new(),
    }
}
