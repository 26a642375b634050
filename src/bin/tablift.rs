//! Tablift CLI - Reconstruct clean tables from OCR output

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tablift::{
    detect_format, extract_document,
    export::{
        combine_tables_to_csv, combined_file_name, extracted_table_to_csv, page_sections_to_csv,
        summary_file_name, summary_to_csv, table_file_name,
    },
    ExtractOptions, ExtractedTable, ExtractionError, ExtractionResult, OcrDocument, ParserVariant,
};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "tablift")]
#[command(version)]
#[command(about = "Tablift - Reconstruct clean tables from OCR block graphs and markdown", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: ExtractArgs,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tables from a Textract block graph response
    Blocks {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// Extract tables from markdown text or a Mistral OCR response
    Markdown {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// Show version and feature info
    Info,
}

#[derive(Args, Clone)]
struct ExtractArgs {
    /// Input files, one OCR response per file (reads stdin if none given)
    inputs: Vec<PathBuf>,

    /// Output directory (prints the combined CSV to stdout if not provided)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Page number of the first page; later inputs continue the numbering
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// TOML file with extraction options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which files to write into the output directory
    #[arg(long, value_enum)]
    write: Vec<OutputKind>,

    /// Use the legacy markdown row parser
    #[arg(long)]
    legacy_parser: bool,

    /// Drop the labeled title/footer rows from per-table files
    #[arg(long)]
    no_metadata: bool,

    /// Strict mode: exit with error if any extraction warnings occur
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// One file per table
    PerTable,
    /// All tables in one file
    Combined,
    /// One line per table
    Summary,
    /// Tables grouped under page headings
    Sections,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Auto,
    Blocks,
    Markdown,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Blocks { args }) => run(&args, InputKind::Blocks),
        Some(Commands::Markdown { args }) => run(&args, InputKind::Markdown),
        Some(Commands::Info) => {
            print_info();
            Ok(true)
        }
        None => run(&cli.args, InputKind::Auto),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run one extraction over all inputs; `Ok(false)` means strict mode
/// rejected the output
fn run(args: &ExtractArgs, kind: InputKind) -> ExtractionResult<bool> {
    let options = load_options(args)?;

    let sources: Vec<Option<&Path>> = if args.inputs.is_empty() {
        vec![None]
    } else {
        args.inputs.iter().map(|path| Some(path.as_path())).collect()
    };

    let mut stem = None;
    let mut page = args.page;
    let mut tables = Vec::new();
    let mut warnings = Vec::new();

    for source in sources {
        let (input, source_stem) = read_input(source)?;
        stem.get_or_insert(source_stem);

        let document = load_document(&input, kind)?;
        if let OcrDocument::Blocks(graph) = &document {
            for (block_type, count) in graph.block_type_counts() {
                debug!(page, block_type = block_type.as_str(), count, "block statistics");
            }
            if let Err(err) = graph.check_acyclic() {
                warn!(page, "{}; cyclic links resolve to empty text", err);
            }
        }
        let pages = document.page_count();

        let label = source.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
        info!(page, pages, "processing {}", label);
        let output = extract_document(&document, page, &options);

        for table in &output.content {
            info!(
                page = table.page,
                table = table.table_index,
                source = table.source.as_str(),
                table_type = table.table_type.as_str(),
                rows = table.row_count,
                columns = table.column_count,
                merged = table.merged_cell_count,
                footer = table.footer.as_deref().unwrap_or(""),
                "extracted {}",
                table.name()
            );
        }
        for warning in &output.warnings {
            warn!("{}", warning);
        }

        tables.extend(output.content);
        warnings.extend(output.warnings);
        page += pages;
    }

    info!("{} table(s) extracted", tables.len());

    let stem = stem.unwrap_or_else(|| "output".to_string());
    match &args.output_dir {
        Some(dir) => write_outputs(dir, &stem, &tables, args, &options)?,
        None => {
            let now = chrono::Local::now().naive_local();
            print!("{}", combine_tables_to_csv(&tables, &now)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        eprintln!(
            "Error: {} extraction warning(s) in strict mode",
            warnings.len()
        );
        return Ok(false);
    }

    Ok(true)
}

fn load_options(args: &ExtractArgs) -> ExtractionResult<ExtractOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            ExtractOptions::from_toml_str(&text)?
        }
        None => ExtractOptions::default(),
    };

    if args.legacy_parser {
        options.parser_variant = ParserVariant::Legacy;
    }
    if args.no_metadata {
        options.include_metadata = false;
    }

    Ok(options)
}

fn read_input(path: Option<&Path>) -> ExtractionResult<(String, String)> {
    match path {
        Some(path) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output")
                .to_string();
            Ok((fs::read_to_string(path)?, stem))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok((buffer, "stdin".to_string()))
        }
    }
}

fn load_document(input: &str, kind: InputKind) -> ExtractionResult<OcrDocument> {
    let is_json = detect_format(input) == "json";

    let document = if is_json {
        OcrDocument::from_json(input)?
    } else if kind == InputKind::Blocks {
        return Err(ExtractionError::invalid_response(
            "block graph input must be a JSON response",
        ));
    } else {
        OcrDocument::from_markdown(input)
    };

    match (kind, document.is_markdown()) {
        (InputKind::Blocks, true) => Err(ExtractionError::invalid_response(
            "expected a block graph response, found markdown pages",
        )),
        (InputKind::Markdown, false) => Err(ExtractionError::invalid_response(
            "expected markdown pages, found a block graph response",
        )),
        _ => Ok(document),
    }
}

fn write_outputs(
    dir: &Path,
    stem: &str,
    tables: &[ExtractedTable],
    args: &ExtractArgs,
    options: &ExtractOptions,
) -> ExtractionResult<()> {
    fs::create_dir_all(dir)?;

    let kinds: &[OutputKind] = if args.write.is_empty() {
        &[OutputKind::PerTable, OutputKind::Combined, OutputKind::Summary]
    } else {
        &args.write
    };
    let now = chrono::Local::now().naive_local();

    for kind in kinds {
        match kind {
            OutputKind::PerTable => {
                for table in tables {
                    let path = dir.join(table_file_name(stem, table.page, table.table_index));
                    fs::write(&path, extracted_table_to_csv(table, options.include_metadata)?)?;
                    eprintln!("✓ {}", path.display());
                }
            }
            OutputKind::Combined => {
                let path = dir.join(combined_file_name(stem, &now));
                fs::write(&path, combine_tables_to_csv(tables, &now)?)?;
                eprintln!("✓ {}", path.display());
            }
            OutputKind::Summary => {
                let summaries: Vec<_> = tables.iter().map(ExtractedTable::summary).collect();
                let path = dir.join(summary_file_name(stem, &now));
                fs::write(&path, summary_to_csv(&summaries)?)?;
                eprintln!("✓ {}", path.display());
            }
            OutputKind::Sections => {
                let path = dir.join(format!("{}_pages.csv", stem));
                fs::write(&path, page_sections_to_csv(tables)?)?;
                eprintln!("✓ {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_info() {
    println!("Tablift - Reconstruct clean tables from OCR output");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Inputs:");
    println!("  ✓ Textract-style block graphs (TABLE / CELL / MERGED_CELL)");
    println!("  ✓ Mistral-style markdown pages");
    println!("  ✓ Plain markdown text with pipe tables");
    println!();
    println!("Outputs:");
    println!("  - per-table CSV with title/footer rows");
    println!("  - combined CSV, summary CSV, page-sectioned CSV");
    println!();
}
