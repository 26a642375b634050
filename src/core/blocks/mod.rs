//! Block Graph Table Reconstruction
//!
//! Document-analysis services describe a page as a graph of labeled blocks:
//! WORD and LINE blocks carry text, CELL blocks carry grid coordinates, and a
//! TABLE block links everything together through typed relationships.
//!
//! # Architecture
//!
//! ```text
//! Block graph -> Text resolution (cycle-guarded) -> Merged rectangles -> Dense grid
//! ```
//!
//! # Example
//!
//! ```rust
//! use tablift::core::blocks::{build_table, Block, BlockGraph, BlockType, RelationshipKind};
//!
//! let graph = BlockGraph::from_blocks(vec![
//!     Block::new("t", BlockType::Table).with_relationship(RelationshipKind::Child, ["c"]),
//!     Block::cell("c", 1, 1).with_relationship(RelationshipKind::Child, ["w"]),
//!     Block::word("w", "Padi"),
//! ]);
//!
//! let table = build_table(&graph, "t");
//! assert_eq!(table.grid, vec![vec!["Padi".to_string()]]);
//! ```

mod grid;
mod resolver;


use fxhash::FxHashMap;
use indexmap::IndexMap;

use crate::utils::error::{ExtractionError, ExtractionResult};

// Re-export public API
pub use grid::{build_table, CellMetadata, TableInfo};
pub use resolver::{resolve_text, try_resolve_text};

/// Kind of block in the document-analysis graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Word,
    Line,
    Cell,
    Table,
    MergedCell,
    Other,
}

impl BlockType {
    /// Parse from the service's upper-case block type name
    pub fn from_name(name: &str) -> Self {
        match name {
            "WORD" => BlockType::Word,
            "LINE" => BlockType::Line,
            "CELL" => BlockType::Cell,
            "TABLE" => BlockType::Table,
            "MERGED_CELL" => BlockType::MergedCell,
            _ => BlockType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Word => "WORD",
            BlockType::Line => "LINE",
            BlockType::Cell => "CELL",
            BlockType::Table => "TABLE",
            BlockType::MergedCell => "MERGED_CELL",
            BlockType::Other => "OTHER",
        }
    }
}

/// Kind of edge between blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Child,
    MergedCell,
    TableTitle,
    TableFooter,
    /// Any relationship the reconstruction does not follow
    Other,
}

impl RelationshipKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "CHILD" => RelationshipKind::Child,
            "MERGED_CELL" => RelationshipKind::MergedCell,
            "TABLE_TITLE" => RelationshipKind::TableTitle,
            "TABLE_FOOTER" => RelationshipKind::TableFooter,
            _ => RelationshipKind::Other,
        }
    }
}

/// Ordered edge list of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub target_ids: Vec<String>,
}

/// Smallest structural unit of the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub block_type: BlockType,
    pub text: Option<String>,
    /// 1-based row coordinate (0 when absent)
    pub row_index: u32,
    /// 1-based column coordinate (0 when absent)
    pub column_index: u32,
    pub row_span: u32,
    pub column_span: u32,
    pub entity_types: Vec<String>,
    pub relationships: Vec<Relationship>,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Block {
            id: id.into(),
            block_type,
            text: None,
            row_index: 0,
            column_index: 0,
            row_span: 1,
            column_span: 1,
            entity_types: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// A WORD block with literal text
    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Block {
            text: Some(text.into()),
            ..Block::new(id, BlockType::Word)
        }
    }

    /// A CELL block at the given 1-based coordinate
    pub fn cell(id: impl Into<String>, row: u32, column: u32) -> Self {
        Block {
            row_index: row,
            column_index: column,
            ..Block::new(id, BlockType::Cell)
        }
    }

    /// A MERGED_CELL block anchored at `(row, column)` spanning `row_span x column_span`
    pub fn merged(
        id: impl Into<String>,
        row: u32,
        column: u32,
        row_span: u32,
        column_span: u32,
    ) -> Self {
        Block {
            row_index: row,
            column_index: column,
            row_span,
            column_span,
            ..Block::new(id, BlockType::MergedCell)
        }
    }

    pub fn with_relationship<I, S>(mut self, kind: RelationshipKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships.push(Relationship {
            kind,
            target_ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_types.push(entity_type.into());
        self
    }

    /// Target ids of every relationship of `kind`, in declaration order
    pub fn related_ids(&self, kind: RelationshipKind) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(move |rel| rel.kind == kind)
            .flat_map(|rel| rel.target_ids.iter().map(String::as_str))
    }
}

/// Id-keyed block map preserving document order
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: IndexMap<String, Block>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a block list; a repeated id keeps the later block
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut graph = BlockGraph::new();
        for block in blocks {
            graph.insert(block);
        }
        graph
    }

    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.id.clone(), block);
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Ids of all TABLE blocks in document order
    pub fn table_ids(&self) -> Vec<&str> {
        self.blocks
            .values()
            .filter(|block| block.block_type == BlockType::Table)
            .map(|block| block.id.as_str())
            .collect()
    }

    /// Number of blocks per type, in order of first appearance
    pub fn block_type_counts(&self) -> Vec<(BlockType, usize)> {
        let mut counts: IndexMap<BlockType, usize> = IndexMap::new();
        for block in self.blocks.values() {
            *counts.entry(block.block_type).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    /// Verify that no CHILD relationship chain loops back on itself.
    ///
    /// Returns the first block found on a cycle as `CycleDetected`.
    pub fn check_acyclic(&self) -> ExtractionResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            OnPath,
            Done,
        }

        let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();

        for root in self.blocks.keys() {
            if marks.contains_key(root.as_str()) {
                continue;
            }

            // Iterative DFS frames: (block id, its children, next child position)
            let mut stack: Vec<(&str, Vec<&str>, usize)> =
                vec![(root.as_str(), self.child_ids(root), 0)];
            marks.insert(root.as_str(), Mark::OnPath);

            while let Some(frame) = stack.last_mut() {
                let id = frame.0;
                let next_child = frame.1.get(frame.2).copied();
                match next_child {
                    Some(child) => {
                        frame.2 += 1;
                        match marks.get(child) {
                            Some(Mark::OnPath) => return Err(ExtractionError::cycle(child)),
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(child, Mark::OnPath);
                                stack.push((child, self.child_ids(child), 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(id, Mark::Done);
                        stack.pop();
                    }
                }
            }
        }

        Ok(())
    }

    /// CHILD targets of `id` that exist in the graph
    fn child_ids(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|block| {
                block
                    .related_ids(RelationshipKind::Child)
                    .filter(|child| self.blocks.contains_key(*child))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromIterator<Block> for BlockGraph {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        BlockGraph::from_blocks(iter)
    }
}
