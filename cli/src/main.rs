//! pdfoutline CLI - PDF outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{self, BatchOptions, DocumentStatus};
use pdfoutline::{
    render, DecodeOptions, JsonFormat, OutlineConfig, OutlineExtractor, OutputFormat,
    PageSelection, ScriptAwareSegmenter,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Infer a title and H1-H3 outline from PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Extract outlines for every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory for the JSON outlines
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Output format (json or compact)
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Process one document at a time
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by `extract` and `batch`.
#[derive(Args)]
struct CommonArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// JSON file overriding pipeline thresholds
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip pages that fail to decode
    #[arg(long)]
    lenient: bool,

    /// Fall back to the document-info title when no title line is found
    #[arg(long)]
    metadata_title: bool,

    /// Split CJK runs into single-character tokens
    #[arg(long)]
    cjk: bool,

    /// Print pipeline notices to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    Compact,
    /// Indented heading list
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
            Format::Text => OutputFormat::Text,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            common,
        } => cmd_extract(&input, output.as_deref(), format, &common),
        Commands::Batch {
            input,
            output,
            format,
            sequential,
            common,
        } => cmd_batch(&input, &output, format, sequential, &common),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_extractor(common: &CommonArgs) -> Result<OutlineExtractor, Box<dyn std::error::Error>> {
    let mut config = match &common.config {
        Some(path) => OutlineConfig::from_json_file(path)?,
        None => OutlineConfig::default(),
    };
    if common.metadata_title {
        config = config.with_metadata_title_fallback(true);
    }

    let mut decode = DecodeOptions::new();
    if let Some(pages) = &common.pages {
        decode = decode.with_pages(PageSelection::parse(pages)?);
    }
    if common.lenient {
        decode = decode.lenient();
    }

    let mut extractor = OutlineExtractor::new()
        .with_config(config)
        .with_decode_options(decode);
    if common.cjk {
        extractor = extractor.with_segmenter(Arc::new(ScriptAwareSegmenter));
    }
    Ok(extractor)
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(common)?;
    let report = extractor.extract_file(input)?;

    if common.verbose {
        for notice in &report.notices {
            eprintln!("{} {}", "note:".yellow(), notice);
        }
    }

    let rendered = render::render(&report.outline, format.into())?;

    if let Some(path) = output {
        fs::write(path, format!("{}\n", rendered.trim_end()))?;
        println!(
            "{} {} ({} headings)",
            "Saved to".green(),
            path.display(),
            report.outline.len()
        );
    } else {
        println!("{}", rendered.trim_end());
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    format: Format,
    sequential: bool,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_format = match format {
        Format::Json => JsonFormat::Pretty,
        Format::Compact => JsonFormat::Compact,
        Format::Text => return Err("batch output is always JSON; use --format json|compact".into()),
    };

    let options = BatchOptions::new()
        .with_extractor(build_extractor(common)?)
        .with_format(json_format)
        .with_parallel(!sequential);

    let total = batch::collect_inputs(input)?.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch::process_directory(input, output, &options, |doc| {
        if let Some(name) = doc.input.file_name() {
            pb.set_message(name.to_string_lossy().to_string());
        }
        pb.inc(1);
    })?;
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} written, {} failed",
        "Batch complete:".green().bold(),
        report.succeeded(),
        report.failed()
    );
    for doc in &report.documents {
        match &doc.status {
            DocumentStatus::Written { output, entries } => {
                println!("  {} {} ({} headings)", "├─".dimmed(), output.display(), entries);
                if common.verbose {
                    for notice in &doc.notices {
                        println!("  {}   {} {}", "│".dimmed(), "note:".yellow(), notice);
                    }
                }
            }
            DocumentStatus::Failed { error } => {
                println!("  {} {}: {}", "├─".dimmed(), doc.input.display(), error.red());
            }
        }
    }

    if report.failed() > 0 {
        return Err(format!("{} document(s) failed", report.failed()).into());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction tool");
}
