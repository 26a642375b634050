//! Delimited-text export
//!
//! Renders tables as CSV text in memory; writing the files is left to the
//! caller. Quoting follows the usual rules: a field containing the
//! delimiter, a quote or a line break is quoted with embedded quotes doubled.
//! Rows may be ragged and blank spacer rows are written as empty lines.

use chrono::NaiveDateTime;
use csv::{QuoteStyle, Writer, WriterBuilder};

use crate::core::blocks::TableInfo;
use crate::data::constants::{
    FILE_STAMP_FORMAT, FOOTER_ROW_LABEL, GENERATED_ON_FORMAT, GENERATED_ON_LABEL, TITLE_ROW_LABEL,
};
use crate::features::extract::{ExtractedTable, TableSummary};
use crate::utils::error::{ExtractionError, ExtractionResult};

/// In-memory CSV sink.
///
/// `csv` writes an empty record as `""`, so a blank row is produced by
/// retiring the current writer into `buffer` and appending a bare newline.
struct CsvSink {
    buffer: Vec<u8>,
    writer: Writer<Vec<u8>>,
}

fn new_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

impl CsvSink {
    fn new() -> Self {
        CsvSink {
            buffer: Vec::new(),
            writer: new_writer(),
        }
    }

    fn row<S: AsRef<str>>(&mut self, cells: &[S]) -> ExtractionResult<()> {
        if cells.is_empty() {
            return self.blank();
        }
        self.writer
            .write_record(cells.iter().map(|cell| cell.as_ref()))?;
        Ok(())
    }

    fn blank(&mut self) -> ExtractionResult<()> {
        self.drain()?;
        self.buffer.push(b'\n');
        Ok(())
    }

    fn drain(&mut self) -> ExtractionResult<()> {
        let writer = std::mem::replace(&mut self.writer, new_writer());
        let bytes = writer
            .into_inner()
            .map_err(|err| ExtractionError::export(err.to_string()))?;
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }

    fn finish(mut self) -> ExtractionResult<String> {
        self.drain()?;
        String::from_utf8(self.buffer).map_err(|err| ExtractionError::export(err.to_string()))
    }
}

/// Render plain rows
pub fn rows_to_csv<S: AsRef<str>>(rows: &[Vec<S>]) -> ExtractionResult<String> {
    let mut sink = CsvSink::new();
    for row in rows {
        sink.row(row)?;
    }
    sink.finish()
}

/// Render one reconstructed table, optionally framed by labeled title and
/// footer rows
pub fn table_to_csv(table: &TableInfo, include_metadata: bool) -> ExtractionResult<String> {
    labeled_to_csv(
        table.title.as_deref(),
        &table.grid,
        table.footer.as_deref(),
        include_metadata,
    )
}

/// [`table_to_csv`] for an extracted table of either source
pub fn extracted_table_to_csv(
    table: &ExtractedTable,
    include_metadata: bool,
) -> ExtractionResult<String> {
    labeled_to_csv(
        table.title.as_deref(),
        &table.rows,
        table.footer.as_deref(),
        include_metadata,
    )
}

fn labeled_to_csv(
    title: Option<&str>,
    rows: &[Vec<String>],
    footer: Option<&str>,
    include_metadata: bool,
) -> ExtractionResult<String> {
    let mut sink = CsvSink::new();

    if include_metadata {
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            sink.row(&[TITLE_ROW_LABEL, title])?;
        }
    }

    for row in rows {
        sink.row(row)?;
    }

    if include_metadata {
        if let Some(footer) = footer.filter(|f| !f.is_empty()) {
            sink.row(&[FOOTER_ROW_LABEL, footer])?;
        }
    }

    sink.finish()
}

/// Render all tables into one export: a timestamp header, a blank row, then
/// per table its title row (unlabeled), its rows and a blank separator
pub fn combine_tables_to_csv(
    tables: &[ExtractedTable],
    generated_at: &NaiveDateTime,
) -> ExtractionResult<String> {
    let mut sink = CsvSink::new();

    let stamp = generated_at.format(GENERATED_ON_FORMAT).to_string();
    sink.row(&[GENERATED_ON_LABEL, stamp.as_str()])?;
    sink.blank()?;

    for table in tables {
        if let Some(title) = table.title.as_deref().filter(|t| !t.is_empty()) {
            sink.row(&[title])?;
        }
        for row in &table.rows {
            sink.row(row)?;
        }
        sink.blank()?;
    }

    sink.finish()
}

/// Render the table listing with a header row
pub fn summary_to_csv(summaries: &[TableSummary]) -> ExtractionResult<String> {
    let mut sink = CsvSink::new();
    for summary in summaries {
        sink.writer.serialize(summary)?;
    }
    sink.finish()
}

/// Render a page-by-page report: each page opens with a `Page N` row framed
/// by blank rows, each table with its title and a blank row; tables on the
/// same page are separated by two blank rows
pub fn page_sections_to_csv(tables: &[ExtractedTable]) -> ExtractionResult<String> {
    let mut sink = CsvSink::new();

    let mut start = 0;
    while start < tables.len() {
        let page = tables[start].page;
        let end = tables[start..]
            .iter()
            .position(|table| table.page != page)
            .map_or(tables.len(), |offset| start + offset);

        sink.blank()?;
        sink.row(&[format!("Page {}", page)])?;
        sink.blank()?;

        for (position, table) in tables[start..end].iter().enumerate() {
            if let Some(title) = table.title.as_deref().filter(|t| !t.is_empty()) {
                sink.row(&[title])?;
                sink.blank()?;
            }
            for row in &table.rows {
                sink.row(row)?;
            }
            if start + position + 1 < end {
                sink.blank()?;
                sink.blank()?;
            }
        }

        start = end;
    }

    sink.finish()
}

/// `{stem}-ocr-page-{page}-table-{index}.csv`
pub fn table_file_name(stem: &str, page: u32, table_index: usize) -> String {
    format!("{}-ocr-page-{}-table-{}.csv", stem, page, table_index)
}

/// `{stem}_{YYYYmmdd_HHMMSS}.csv`
pub fn combined_file_name(stem: &str, stamp: &NaiveDateTime) -> String {
    format!("{}_{}.csv", stem, stamp.format(FILE_STAMP_FORMAT))
}

/// `{stem}_summary_{YYYYmmdd_HHMMSS}.csv`
pub fn summary_file_name(stem: &str, stamp: &NaiveDateTime) -> String {
    format!("{}_summary_{}.csv", stem, stamp.format(FILE_STAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract::TableSource;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn extracted(page: u32, index: usize, title: Option<&str>, rows: &[&[&str]]) -> ExtractedTable {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        ExtractedTable {
            page,
            table_index: index,
            source: TableSource::Markdown,
            title: title.map(str::to_string),
            footer: None,
            table_type: "MARKDOWN".to_string(),
            row_count: rows.len(),
            column_count: rows.iter().map(Vec::len).max().unwrap_or(0),
            merged_cell_count: 0,
            rows,
        }
    }

    #[test]
    fn test_quoting() {
        let rows = vec![vec!["a,b", "say \"hi\"", "line\nbreak", "plain"]];
        assert_eq!(
            rows_to_csv(&rows).unwrap(),
            "\"a,b\",\"say \"\"hi\"\"\",\"line\nbreak\",plain\n"
        );
    }

    #[test]
    fn test_consecutive_blank_rows() {
        let rows: Vec<Vec<&str>> = vec![vec!["a", "b"], vec![], vec![], vec!["c"]];
        assert_eq!(rows_to_csv(&rows).unwrap(), "a,b\n\n\nc\n");
        assert_eq!(rows_to_csv::<&str>(&[vec![]]).unwrap(), "\n");
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![vec!["a", "b", "c"], vec!["1"]];
        assert_eq!(rows_to_csv(&rows).unwrap(), "a,b,c\n1\n");
    }

    #[test]
    fn test_table_with_metadata() {
        let table = TableInfo {
            block_id: "t".to_string(),
            title: Some("Jadual 1".to_string()),
            footer: Some("Sumber: DOSM".to_string()),
            table_type: "STRUCTURED_TABLE".to_string(),
            grid: vec![vec!["a".to_string(), "".to_string()]],
            row_count: 1,
            column_count: 2,
            merged_cell_count: 0,
            cell_metadata: Vec::new(),
        };

        assert_eq!(
            table_to_csv(&table, true).unwrap(),
            "[TABLE_TITLE],Jadual 1\na,\n[TABLE_FOOTER],Sumber: DOSM\n"
        );
        assert_eq!(table_to_csv(&table, false).unwrap(), "a,\n");
    }

    #[test]
    fn test_combined_export() {
        let tables = vec![
            extracted(1, 1, Some("Jadual 1"), &[&["a", "b"]]),
            extracted(2, 1, None, &[&["c"]]),
        ];
        assert_eq!(
            combine_tables_to_csv(&tables, &stamp()).unwrap(),
            "Generated on,2024-05-17 09:30:05\n\nJadual 1\na,b\n\nc\n\n"
        );
    }

    #[test]
    fn test_summary_export() {
        let summaries = vec![extracted(4, 2, None, &[&["a", "b"], &["c", "d"]]).summary()];
        assert_eq!(
            summary_to_csv(&summaries).unwrap(),
            "page,table_index,table_name,type,rows,columns,merged_cells\n\
             4,2,Table 2 (Page 4),MARKDOWN,2,2,0\n"
        );
    }

    #[test]
    fn test_page_sections() {
        let tables = vec![
            extracted(17, 1, Some("Jadual 1"), &[&["a"]]),
            extracted(17, 2, None, &[&["b"]]),
            extracted(18, 1, None, &[&["c"]]),
        ];
        assert_eq!(
            page_sections_to_csv(&tables).unwrap(),
            "\nPage 17\n\nJadual 1\n\na\n\n\nb\n\nPage 18\n\nc\n"
        );
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            table_file_name("Perangkaan-2024", 17, 1),
            "Perangkaan-2024-ocr-page-17-table-1.csv"
        );
        assert_eq!(
            combined_file_name("Perangkaan-2024", &stamp()),
            "Perangkaan-2024_20240517_093005.csv"
        );
        assert_eq!(
            summary_file_name("Perangkaan-2024", &stamp()),
            "Perangkaan-2024_summary_20240517_093005.csv"
        );
    }
}
