//! Integration tests for Tablift end-to-end extraction

use chrono::NaiveDate;
use tablift::{
    export::{combine_tables_to_csv, extracted_table_to_csv, page_sections_to_csv, summary_to_csv},
    extract_json, extract_markdown, ExtractOptions, ExtractedTable, OcrDocument, WarningKind,
};

// ============================================================================
// Block Graph Responses
// ============================================================================

mod block_graphs {
    use super::*;

    const RESPONSE: &str = r#"{
        "DocumentMetadata": {"Pages": 1},
        "Blocks": [
            {"Id": "page", "BlockType": "PAGE", "Relationships": [{"Type": "CHILD", "Ids": ["t1"]}]},
            {"Id": "t1", "BlockType": "TABLE", "EntityTypes": ["STRUCTURED_TABLE"],
             "Relationships": [
                {"Type": "CHILD", "Ids": ["c11", "c12", "c21", "c22"]},
                {"Type": "MERGED_CELL", "Ids": ["m1"]},
                {"Type": "TABLE_TITLE", "Ids": ["title"]},
                {"Type": "TABLE_FOOTER", "Ids": ["foot"]}
             ]},
            {"Id": "c11", "BlockType": "CELL", "RowIndex": 1, "ColumnIndex": 1,
             "Relationships": [{"Type": "CHILD", "Ids": ["w1"]}]},
            {"Id": "c12", "BlockType": "CELL", "RowIndex": 1, "ColumnIndex": 2},
            {"Id": "c21", "BlockType": "CELL", "RowIndex": 2, "ColumnIndex": 1,
             "Relationships": [{"Type": "CHILD", "Ids": ["w2"]}]},
            {"Id": "c22", "BlockType": "CELL", "RowIndex": 2, "ColumnIndex": 2,
             "Relationships": [{"Type": "CHILD", "Ids": ["w3"]}]},
            {"Id": "m1", "BlockType": "MERGED_CELL", "RowIndex": 1, "ColumnIndex": 1,
             "RowSpan": 1, "ColumnSpan": 2, "Relationships": [{"Type": "CHILD", "Ids": ["c11", "c12"]}]},
            {"Id": "title", "BlockType": "TABLE_TITLE", "Relationships": [{"Type": "CHILD", "Ids": ["w4", "w5"]}]},
            {"Id": "foot", "BlockType": "TABLE_FOOTER", "Relationships": [{"Type": "CHILD", "Ids": ["w6"]}]},
            {"Id": "w1", "BlockType": "WORD", "Text": "Keluasan"},
            {"Id": "w2", "BlockType": "WORD", "Text": "Kedah"},
            {"Id": "w3", "BlockType": "WORD", "Text": "12.5"},
            {"Id": "w4", "BlockType": "WORD", "Text": "Jadual"},
            {"Id": "w5", "BlockType": "WORD", "Text": "3"},
            {"Id": "w6", "BlockType": "WORD", "Text": "Sumber"}
        ]
    }"#;

    #[test]
    fn test_full_response() {
        let output = extract_json(RESPONSE, 17, &ExtractOptions::default()).unwrap();
        assert!(!output.has_warnings());
        assert_eq!(output.content.len(), 1);

        let table = &output.content[0];
        assert_eq!(table.page, 17);
        assert_eq!(table.title.as_deref(), Some("Jadual 3"));
        assert_eq!(table.footer.as_deref(), Some("Sumber"));
        assert_eq!(table.table_type, "STRUCTURED_TABLE");
        assert_eq!(
            table.rows,
            vec![vec!["Keluasan", "Keluasan"], vec!["Kedah", "12.5"]]
        );
        assert_eq!(table.merged_cell_count, 1);
    }

    #[test]
    fn test_csv_with_metadata() {
        let output = extract_json(RESPONSE, 1, &ExtractOptions::default()).unwrap();
        let csv = extracted_table_to_csv(&output.content[0], true).unwrap();
        assert_eq!(
            csv,
            "[TABLE_TITLE],Jadual 3\nKeluasan,Keluasan\nKedah,12.5\n[TABLE_FOOTER],Sumber\n"
        );
    }

    #[test]
    fn test_cyclic_response_completes() {
        let json = r#"{"Blocks": [
            {"Id": "t", "BlockType": "TABLE", "Relationships": [{"Type": "CHILD", "Ids": ["c"]}]},
            {"Id": "c", "BlockType": "CELL", "RowIndex": 1, "ColumnIndex": 1,
             "Relationships": [{"Type": "CHILD", "Ids": ["w", "c"]}]},
            {"Id": "w", "BlockType": "WORD", "Text": "Padi"}
        ]}"#;

        let document = OcrDocument::from_json(json).unwrap();
        let OcrDocument::Blocks(graph) = &document else {
            panic!("expected a block graph");
        };
        assert!(graph.check_acyclic().is_err());

        let output = extract_json(json, 1, &ExtractOptions::default()).unwrap();
        assert_eq!(output.content[0].rows, vec![vec!["Padi"]]);
    }
}

// ============================================================================
// Markdown Responses
// ============================================================================

mod markdown_pages {
    use super::*;

    #[test]
    fn test_mistral_response() {
        let json = r#"{"pages": [
            {"index": 0, "markdown": "JADUAL 1: Padi\n\n| Negeri | Tan |\n|---|---|\n| Kedah | 1 2 3 |"},
            {"index": 1, "markdown": "Tiada jadual di sini"},
            {"index": 2, "markdown": "| a |\n| a |\n| a |\n| a |\n| b |"}
        ]}"#;

        let output = extract_json(json, 5, &ExtractOptions::default()).unwrap();
        let pages: Vec<u32> = output.content.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![5, 7]);

        assert_eq!(output.content[0].title.as_deref(), Some("JADUAL 1: Padi"));
        assert_eq!(output.content[0].rows[1], vec!["Kedah", "123"]);
        assert_eq!(output.content[1].rows, vec![vec!["a"], vec!["a"], vec!["b"]]);

        let kinds: Vec<&WarningKind> = output.warnings.iter().map(|w| &w.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(*kinds[0], WarningKind::NoRows);
        assert!(matches!(
            kinds[1],
            WarningKind::HighDuplicateRatio {
                dropped: 2,
                total: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_multiline_cells() {
        let md = "Jadual 4\n| Komoditi | Nilai |\n| --- | --- |\n| Kelapa\n  sawit | $1,200$ |\n| Getah | 300 |";
        let output = extract_markdown(md, 1, &ExtractOptions::default());
        assert_eq!(
            output.content[0].rows,
            vec![
                vec!["Komoditi", "Nilai"],
                vec!["Kelapa sawit", "1,200"],
                vec!["Getah", "300"],
            ]
        );
    }

    #[test]
    fn test_legacy_options_from_toml() {
        let options = ExtractOptions::from_toml_str("parser_variant = \"legacy\"").unwrap();
        let md = "| a |\n| Kelapa\nsawit |\nnota kaki";
        assert!(extract_markdown(md, 1, &options).content.is_empty());
        assert_eq!(
            extract_markdown(md, 1, &ExtractOptions::default()).content[0].rows,
            vec![vec!["a"], vec!["Kelapa sawit"]]
        );
    }
}

// ============================================================================
// Export
// ============================================================================

mod export {
    use super::*;

    fn tables() -> Vec<ExtractedTable> {
        let md = "Jadual 1\n| a | b |\n| c, d | e |";
        let mut tables = extract_markdown(md, 2, &ExtractOptions::default()).content;
        tables.extend(extract_markdown("| x |\n| y |", 3, &ExtractOptions::default()).content);
        tables
    }

    #[test]
    fn test_combined_csv() {
        let stamp = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            combine_tables_to_csv(&tables(), &stamp).unwrap(),
            "Generated on,2024-01-02 03:04:05\n\nJadual 1\na,b\n\"c, d\",e\n\nx\ny\n\n"
        );
    }

    #[test]
    fn test_summary_csv() {
        let summaries: Vec<_> = tables().iter().map(ExtractedTable::summary).collect();
        assert_eq!(
            summary_to_csv(&summaries).unwrap(),
            "page,table_index,table_name,type,rows,columns,merged_cells\n\
             2,1,Jadual 1,MARKDOWN,2,2,0\n\
             3,1,Table 1 (Page 3),MARKDOWN,2,1,0\n"
        );
    }

    #[test]
    fn test_page_sections_csv() {
        assert_eq!(
            page_sections_to_csv(&tables()).unwrap(),
            "\nPage 2\n\nJadual 1\n\na,b\n\"c, d\",e\n\nPage 3\n\nx\ny\n"
        );
    }
}
