//! PDF Master CLI tool
//!
//! Merges PDFs in the order given, adds page numbers and watermarks, and
//! writes the merged document together with its page index.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdf_master::acquire::acquire;
use pdf_master::export::DirectorySink;
use pdf_master::pdf::{extract_metadata, LopdfCodec};
use pdf_master::{AnnotationConfig, Session};

/// PDF Master - Merge PDFs with page numbers, watermarks and a page index
#[derive(Parser)]
#[command(name = "pdf-master")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge numbered PDFs in order, with page numbers
    pdf-master merge \"[0-9]*.pdf\" -o out

    # Merge two files and watermark every page
    pdf-master merge cover.pdf body.pdf --watermark --watermark-text DRAFT

    # Show information about a PDF
    pdf-master info report.pdf")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDF files into Merged_Document.pdf and PDF_Index.csv
    ///
    /// The merge fails without writing anything if any input cannot be
    /// read, needs a password, or has no pages.
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Directory the artifacts are written to
        #[arg(short, long, env = "PDF_MASTER_OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,

        /// Do not stamp "Page n of total" on each page
        #[arg(long)]
        no_page_numbers: bool,

        /// Stamp a diagonal watermark on each page
        #[arg(long)]
        watermark: bool,

        /// Watermark text (default: CONFIDENTIAL)
        #[arg(long, env = "PDF_MASTER_WATERMARK_TEXT", default_value = "")]
        watermark_text: String,

        /// Skip writing PDF_Index.csv
        #[arg(long)]
        no_index: bool,

        /// Open the merged document after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge {
            inputs,
            output_dir,
            no_page_numbers,
            watermark,
            watermark_text,
            no_index,
            open,
        } => {
            let settings = AnnotationConfig {
                page_numbers: !no_page_numbers,
                watermark,
                watermark_text,
            };
            cmd_merge(&inputs, output_dir, settings, no_index, open)
        }
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Merge PDFs and write the artifacts
fn cmd_merge(
    inputs: &[String],
    output_dir: PathBuf,
    settings: AnnotationConfig,
    no_index: bool,
    open: bool,
) -> Result<()> {
    let sources = acquire(inputs).context("Failed to collect input files")?;

    let mut session = Session::new();
    session.manifest.add(sources);
    session.settings = settings;

    eprintln!("{}", pdf_master::Status::Processing.message());
    let result = session.merge(&LopdfCodec)?;

    println!("S.No  Pages      File");
    for row in &result.index {
        println!(
            "{:>4}  {:>4}-{:<4}  {}",
            row.serial, row.start_page, row.end_page, row.source_name
        );
    }

    let mut sink = DirectorySink::new(output_dir);
    let document = session
        .save_document(&mut sink)
        .context("Failed to save merged document")?;
    eprintln!("{}", session.status().message());
    eprintln!("Merged to: {}", document.display());

    if !no_index {
        let index = session.save_index(&mut sink).context("Failed to save index")?;
        eprintln!("Index: {}", index.display());
    }

    if open {
        open_file(&document)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
