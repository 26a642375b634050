//! OCR response normalization
//!
//! Two services feed the extractor. Block-graph responses follow the AWS
//! Textract `AnalyzeDocument` shape (`Blocks[]` with PascalCase fields);
//! markdown responses follow the Mistral OCR shape (`pages[]` with a
//! `markdown` string per page). Both are normalized once into
//! [`OcrDocument`] so nothing downstream probes for optional fields.

use serde::Deserialize;

use crate::core::blocks::{Block, BlockGraph, BlockType, Relationship, RelationshipKind};
use crate::utils::error::{ExtractionError, ExtractionResult};

/// One page of markdown text
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownPage {
    /// 0-based page position within the response
    pub index: u32,
    pub markdown: String,
}

/// Normalized OCR input
#[derive(Debug, Clone)]
pub enum OcrDocument {
    /// Block graph of a single page
    Blocks(BlockGraph),
    /// Markdown text, one entry per page
    Markdown(Vec<MarkdownPage>),
}

impl OcrDocument {
    /// Normalize a JSON response of either service
    pub fn from_json(json: &str) -> ExtractionResult<Self> {
        let raw: RawResponse = serde_json::from_str(json).map_err(|err| {
            ExtractionError::invalid_response(format!(
                "expected a Textract `Blocks` or Mistral `pages` response ({})",
                err
            ))
        })?;
        Ok(raw.into())
    }

    /// Wrap plain markdown text as a single page
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        OcrDocument::Markdown(vec![MarkdownPage {
            index: 0,
            markdown: markdown.into(),
        }])
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, OcrDocument::Markdown(_))
    }

    /// Pages spanned by the document: 1 for a block graph, one past the
    /// highest page index for markdown
    pub fn page_count(&self) -> u32 {
        match self {
            OcrDocument::Blocks(_) => 1,
            OcrDocument::Markdown(pages) => {
                pages.iter().map(|page| page.index + 1).max().unwrap_or(0)
            }
        }
    }
}

impl From<BlockGraph> for OcrDocument {
    fn from(graph: BlockGraph) -> Self {
        OcrDocument::Blocks(graph)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Textract(TextractResponse),
    Mistral(MistralResponse),
}

#[derive(Deserialize)]
struct TextractResponse {
    #[serde(rename = "Blocks")]
    blocks: Vec<RawBlock>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBlock {
    id: String,
    block_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    row_index: Option<u32>,
    #[serde(default)]
    column_index: Option<u32>,
    #[serde(default)]
    row_span: Option<u32>,
    #[serde(default)]
    column_span: Option<u32>,
    #[serde(default)]
    entity_types: Vec<String>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRelationship {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct MistralResponse {
    pages: Vec<RawPage>,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    markdown: Option<String>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Block {
            id: raw.id,
            block_type: BlockType::from_name(&raw.block_type),
            text: raw.text,
            row_index: raw.row_index.unwrap_or(0),
            column_index: raw.column_index.unwrap_or(0),
            row_span: raw.row_span.unwrap_or(1),
            column_span: raw.column_span.unwrap_or(1),
            entity_types: raw.entity_types,
            relationships: raw
                .relationships
                .into_iter()
                .map(|rel| Relationship {
                    kind: RelationshipKind::from_name(&rel.kind),
                    target_ids: rel.ids,
                })
                .collect(),
        }
    }
}

impl From<RawResponse> for OcrDocument {
    fn from(raw: RawResponse) -> Self {
        match raw {
            RawResponse::Textract(response) => {
                OcrDocument::Blocks(response.blocks.into_iter().map(Block::from).collect())
            }
            RawResponse::Mistral(response) => OcrDocument::Markdown(
                response
                    .pages
                    .into_iter()
                    .enumerate()
                    .filter_map(|(position, page)| {
                        let markdown = page.markdown.filter(|md| !md.is_empty())?;
                        Some(MarkdownPage {
                            index: page.index.unwrap_or(position as u32),
                            markdown,
                        })
                    })
                    .collect(),
            ),
        }
    }
}
