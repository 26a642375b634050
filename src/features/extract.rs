//! Extraction pipeline
//!
//! Ties the core together: block graphs go through grid reconstruction,
//! markdown pages go through title extraction, row parsing, de-duplication and
//! cell sanitizing. Everything advisory comes back as [`ExtractionWarning`]s
//! next to the tables; nothing here logs or touches the filesystem.

use serde::{Deserialize, Serialize};

use crate::core::blocks::{build_table, BlockGraph, TableInfo};
use crate::core::markdown::{extract_title_with, parse_with_variant, ParserVariant, TitleLimits};
use crate::data::constants::{
    DUPLICATE_WARN_RATIO, MARKDOWN_TABLE_TYPE, MIN_TABLE_ROWS, REPEAT_LIMIT,
    TITLE_FALLBACK_MAX_LEN, TITLE_LOOKBACK_LINES, TITLE_MAX_LEN,
};
use crate::features::dedupe::dedupe_with_limit;
use crate::features::response::OcrDocument;
use crate::features::sanitize::clean_row;
use crate::utils::error::{ExtractionOutput, ExtractionResult, ExtractionWarning, WarningKind};

/// Extraction options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Continuation-line behavior of the markdown parser
    pub parser_variant: ParserVariant,
    /// Occurrence within a run of identical rows from which rows are dropped
    pub repeat_limit: usize,
    /// Dropped-row ratio above which a warning is emitted
    pub duplicate_warn_ratio: f64,
    /// Markdown tables with fewer surviving rows are skipped
    pub min_rows: usize,
    /// Emit labeled title/footer rows in single-table export
    pub include_metadata: bool,
    /// Sanitize markdown cells in the output rows
    pub clean_cells: bool,
    pub title_lookback: usize,
    pub title_max_len: usize,
    pub title_fallback_max_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            parser_variant: ParserVariant::Permissive,
            repeat_limit: REPEAT_LIMIT,
            duplicate_warn_ratio: DUPLICATE_WARN_RATIO,
            min_rows: MIN_TABLE_ROWS,
            include_metadata: true,
            clean_cells: true,
            title_lookback: TITLE_LOOKBACK_LINES,
            title_max_len: TITLE_MAX_LEN,
            title_fallback_max_len: TITLE_FALLBACK_MAX_LEN,
        }
    }
}

impl ExtractOptions {
    /// Reproduce output of the older parser, where continuation lines never
    /// close a row
    pub fn legacy() -> Self {
        Self {
            parser_variant: ParserVariant::Legacy,
            ..Default::default()
        }
    }

    /// Keep single-row tables and only warn on heavy duplication
    pub fn lenient() -> Self {
        Self {
            min_rows: 1,
            duplicate_warn_ratio: 0.5,
            ..Default::default()
        }
    }

    /// Load options from TOML; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> ExtractionResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn title_limits(&self) -> TitleLimits {
        TitleLimits {
            lookback: self.title_lookback,
            max_len: self.title_max_len,
            fallback_max_len: self.title_fallback_max_len,
        }
    }
}

/// Which input shape a table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Blocks,
    Markdown,
}

impl TableSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableSource::Blocks => "blocks",
            TableSource::Markdown => "markdown",
        }
    }
}

/// A table ready for export
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    /// 1-based page number
    pub page: u32,
    /// 1-based position of the table on its page
    pub table_index: usize,
    pub source: TableSource,
    pub title: Option<String>,
    pub footer: Option<String>,
    pub table_type: String,
    /// Dense for block tables, possibly ragged for markdown tables
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub column_count: usize,
    pub merged_cell_count: usize,
}

impl ExtractedTable {
    pub fn from_table_info(page: u32, table_index: usize, info: TableInfo) -> Self {
        ExtractedTable {
            page,
            table_index,
            source: TableSource::Blocks,
            title: info.title,
            footer: info.footer,
            table_type: info.table_type,
            rows: info.grid,
            row_count: info.row_count,
            column_count: info.column_count,
            merged_cell_count: info.merged_cell_count,
        }
    }

    /// Title, or a positional name for untitled tables
    pub fn name(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("Table {} (Page {})", self.table_index, self.page),
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            page: self.page,
            table_index: self.table_index,
            table_name: self.name(),
            table_type: self.table_type.clone(),
            rows: self.row_count,
            columns: self.column_count,
            merged_cells: self.merged_cell_count,
        }
    }
}

/// One line of the table listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub page: u32,
    pub table_index: usize,
    pub table_name: String,
    #[serde(rename = "type")]
    pub table_type: String,
    pub rows: usize,
    pub columns: usize,
    pub merged_cells: usize,
}

/// Reconstruct every TABLE block of a page's graph.
///
/// Table indices count all TABLE blocks, so a skipped empty table leaves a
/// gap in the numbering.
pub fn extract_block_tables(graph: &BlockGraph, page: u32) -> ExtractionOutput<Vec<ExtractedTable>> {
    let mut tables = Vec::new();
    let mut warnings = Vec::new();

    for (position, table_id) in graph.table_ids().into_iter().enumerate() {
        let table_index = position + 1;
        let info = build_table(graph, table_id);

        if info.is_empty() {
            warnings.push(ExtractionWarning::new(
                page,
                table_index,
                WarningKind::EmptyTable {
                    block_id: table_id.to_string(),
                },
            ));
            continue;
        }

        tables.push(ExtractedTable::from_table_info(page, table_index, info));
    }

    ExtractionOutput::with_warnings(tables, warnings)
}

/// Extract the table rows of one markdown page.
///
/// All pipe rows on the page form a single table titled by the text above
/// its first row.
pub fn extract_markdown_table(
    markdown: &str,
    page: u32,
    table_index: usize,
    options: &ExtractOptions,
) -> ExtractionOutput<Option<ExtractedTable>> {
    let mut warnings = Vec::new();

    let title = extract_title_with(markdown, &options.title_limits());
    let parsed = parse_with_variant(markdown, options.parser_variant);

    if parsed.is_empty() {
        warnings.push(ExtractionWarning::new(page, table_index, WarningKind::NoRows));
        return ExtractionOutput::with_warnings(None, warnings);
    }

    let total = parsed.len();
    let report = dedupe_with_limit(parsed, options.repeat_limit);

    if report.exceeds(options.duplicate_warn_ratio) {
        warnings.push(ExtractionWarning::new(
            page,
            table_index,
            WarningKind::HighDuplicateRatio {
                dropped: report.dropped,
                total,
                ratio: report.warn_ratio,
            },
        ));
    }

    if report.rows.is_empty() || report.rows.len() < options.min_rows {
        warnings.push(ExtractionWarning::new(
            page,
            table_index,
            WarningKind::TooFewRows {
                remaining: report.rows.len(),
            },
        ));
        return ExtractionOutput::with_warnings(None, warnings);
    }

    let rows: Vec<Vec<String>> = if options.clean_cells {
        report.rows.iter().map(|row| clean_row(row)).collect()
    } else {
        report.rows
    };

    let table = ExtractedTable {
        page,
        table_index,
        source: TableSource::Markdown,
        title,
        footer: None,
        table_type: MARKDOWN_TABLE_TYPE.to_string(),
        row_count: rows.len(),
        column_count: rows.iter().map(Vec::len).max().unwrap_or(0),
        merged_cell_count: 0,
        rows,
    };

    ExtractionOutput::with_warnings(Some(table), warnings)
}

/// Extract every table of a normalized document.
///
/// A block graph is a single page numbered `first_page`; a markdown page is
/// numbered `first_page + index`, so pages dropped from the response for
/// being empty leave a gap.
pub fn extract_document(
    document: &OcrDocument,
    first_page: u32,
    options: &ExtractOptions,
) -> ExtractionOutput<Vec<ExtractedTable>> {
    match document {
        OcrDocument::Blocks(graph) => extract_block_tables(graph, first_page),
        OcrDocument::Markdown(pages) => {
            let mut tables = Vec::new();
            let mut warnings = Vec::new();

            for page in pages {
                let page_number = first_page + page.index;
                let output = extract_markdown_table(&page.markdown, page_number, 1, options);
                warnings.extend(output.warnings);
                tables.extend(output.content);
            }

            ExtractionOutput::with_warnings(tables, warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blocks::{Block, BlockType, RelationshipKind};

    #[test]
    fn test_markdown_pipeline() {
        let md = "JADUAL 1: Keluasan\n\n| Negeri | 2 0 2 3 |\n|---|---|\n| Kedah | $12.5$ |\n| Perlis | 3<br>ton |";
        let output = extract_markdown_table(md, 17, 1, &ExtractOptions::default());

        assert!(!output.has_warnings());
        let table = output.content.unwrap();
        assert_eq!(table.title.as_deref(), Some("JADUAL 1: Keluasan"));
        assert_eq!(
            table.rows,
            vec![
                vec!["Negeri", "2023"],
                vec!["Kedah", "12.5"],
                vec!["Perlis", "3 ton"],
            ]
        );
        assert_eq!((table.row_count, table.column_count), (3, 2));
        assert_eq!(table.table_type, "MARKDOWN");
    }

    #[test]
    fn test_markdown_duplicate_warning_and_min_rows() {
        let md = "| a |\n| a |\n| a |\n| a |\n| a |";
        let output = extract_markdown_table(md, 2, 1, &ExtractOptions::default());

        // Two rows survive, which meets the minimum
        assert!(output.content.is_some());
        assert!(matches!(
            output.warnings[0].kind,
            WarningKind::HighDuplicateRatio {
                dropped: 3,
                total: 5,
                ..
            }
        ));

        let output = extract_markdown_table("| only |", 2, 1, &ExtractOptions::default());
        assert!(output.content.is_none());
        assert_eq!(
            output.warnings[0].kind,
            WarningKind::TooFewRows { remaining: 1 }
        );

        let output = extract_markdown_table("| only |", 2, 1, &ExtractOptions::lenient());
        assert!(output.content.is_some());
    }

    #[test]
    fn test_markdown_without_rows() {
        let output = extract_markdown_table("no table here", 5, 1, &ExtractOptions::default());
        assert!(output.content.is_none());
        assert_eq!(output.warnings[0].kind, WarningKind::NoRows);
    }

    #[test]
    fn test_raw_cells_kept_when_cleaning_disabled() {
        let options = ExtractOptions {
            clean_cells: false,
            ..Default::default()
        };
        let output = extract_markdown_table("| $x$ |\n| y |", 1, 1, &options);
        assert_eq!(output.content.unwrap().rows[0], vec!["$x$"]);
    }

    #[test]
    fn test_block_tables_skip_empty() {
        let graph = BlockGraph::from_blocks(vec![
            Block::new("empty", BlockType::Table),
            Block::new("t", BlockType::Table)
                .with_entity_type("SEMI_STRUCTURED_TABLE")
                .with_relationship(RelationshipKind::Child, ["c"]),
            Block::cell("c", 1, 1).with_relationship(RelationshipKind::Child, ["w"]),
            Block::word("w", "Padi"),
        ]);
        let output = extract_block_tables(&graph, 3);

        assert_eq!(output.content.len(), 1);
        let table = &output.content[0];
        assert_eq!(table.table_index, 2);
        assert_eq!(table.name(), "Table 2 (Page 3)");
        assert_eq!(
            output.warnings,
            vec![ExtractionWarning::new(
                3,
                1,
                WarningKind::EmptyTable {
                    block_id: "empty".to_string()
                }
            )]
        );

        assert_eq!(table.source, TableSource::Blocks);
        assert_eq!(table.source.as_str(), "blocks");

        let summary = table.summary();
        assert_eq!(summary.table_type, "SEMI_STRUCTURED_TABLE");
        assert_eq!((summary.rows, summary.columns), (1, 1));
    }

    #[test]
    fn test_document_page_numbering() {
        let doc = OcrDocument::Markdown(vec![
            crate::features::response::MarkdownPage {
                index: 0,
                markdown: "| a |\n| b |".to_string(),
            },
            crate::features::response::MarkdownPage {
                index: 1,
                markdown: "| c |\n| d |".to_string(),
            },
        ]);
        let output = extract_document(&doc, 10, &ExtractOptions::default());
        let pages: Vec<u32> = output.content.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![10, 11]);
        assert!(output
            .content
            .iter()
            .all(|t| t.source == TableSource::Markdown));
    }

    #[test]
    fn test_document_pages_follow_response_index() {
        let doc = OcrDocument::from_json(
            r#"{"pages": [
                {"index": 0, "markdown": "| a |\n| b |"},
                {"index": 1, "markdown": ""},
                {"index": 2, "markdown": "| c |\n| d |"}
            ]}"#,
        )
        .unwrap();
        let output = extract_document(&doc, 1, &ExtractOptions::default());
        let pages: Vec<u32> = output.content.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn test_options_from_toml() {
        let options = ExtractOptions::from_toml_str(
            "parser_variant = \"legacy\"\nmin_rows = 1\nduplicate_warn_ratio = 0.5\n",
        )
        .unwrap();
        assert_eq!(options.parser_variant, ParserVariant::Legacy);
        assert_eq!(options.min_rows, 1);
        assert_eq!(options.repeat_limit, REPEAT_LIMIT);

        assert!(ExtractOptions::from_toml_str("min_rows = \"two\"").is_err());
    }

    #[test]
    fn test_option_presets() {
        assert_eq!(ExtractOptions::legacy().parser_variant, ParserVariant::Legacy);
        assert_eq!(ExtractOptions::lenient().min_rows, 1);
    }
}
