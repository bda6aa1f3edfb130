use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rollscan::export::{read_raw_csv, Exporter, RawCsvExporter, VoterCsvExporter};
use rollscan::ocr::TesseractOcr;
use rollscan::pipeline::{extract_dataset, Extraction, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "rollscan")]
#[command(version, about = "Voter-record extraction from scanned electoral-roll PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Segment pages, OCR card fields and write the raw CSV
    Extract {
        /// Input PDF file or directory of page images
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering DPI for PDF input
        #[arg(long, default_value_t = 300)]
        dpi: u32,

        /// Tesseract language
        #[arg(long, default_value = "eng")]
        lang: String,

        /// Path to the tesseract binary
        #[arg(long)]
        tesseract: Option<PathBuf>,

        /// Disable per-page progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Normalize a raw CSV into the voter spreadsheet
    Normalize {
        /// Raw extraction CSV (extracted_data.csv)
        input: PathBuf,

        /// Output directory for voters.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract and normalize in one go
    Run {
        /// Input PDF file or directory of page images
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 300)]
        dpi: u32,

        #[arg(long, default_value = "eng")]
        lang: String,

        #[arg(long)]
        tesseract: Option<PathBuf>,

        #[arg(short, long)]
        quiet: bool,
    },

    /// Show information about a PDF file
    Info {
        /// Input PDF file path
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            dpi,
            lang,
            tesseract,
            quiet,
        } => {
            run_extract(input, output, dpi, lang, tesseract, quiet, false)?;
            Ok(())
        }
        Commands::Normalize { input, output } => run_normalize(input, output),
        Commands::Run {
            input,
            output,
            dpi,
            lang,
            tesseract,
            quiet,
        } => {
            run_extract(input, output, dpi, lang, tesseract, quiet, true)?;
            Ok(())
        }
        Commands::Info { input } => show_info(input),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_extract(
    input: PathBuf,
    output: Option<PathBuf>,
    dpi: u32,
    lang: String,
    tesseract: Option<PathBuf>,
    quiet: bool,
    normalize: bool,
) -> Result<Extraction> {
    if !input.exists() {
        anyhow::bail!("Input does not exist: {}", input.display());
    }

    let output_dir = output.unwrap_or_else(|| default_output_dir(&input));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
        println!("[*] DPI: {dpi}");
    }

    let mut config = PipelineConfig::new(input.clone(), output_dir.clone(), dpi);
    config.quiet = quiet;

    let mut engine = TesseractOcr::new(output_dir.join("ocr")).with_lang(lang);
    if let Some(binary) = tesseract {
        engine = engine.with_binary(binary);
    }

    let extraction = extract_dataset(&config, &engine)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    let raw = RawCsvExporter::new(output_dir.clone());
    raw.export(&extraction.dataset)?;

    if normalize {
        let voters = VoterCsvExporter::new(output_dir.clone());
        voters.export(&extraction.dataset)?;
    }

    let summary = extraction.summary;
    if !quiet {
        println!(
            "\n[✓] Done: {} pages, {} cards, {} skipped, {} failed pages",
            summary.pages, summary.cards, summary.skipped, summary.failed_pages
        );
        println!("[✓] Raw data: {}", raw.path().display());
    }

    Ok(extraction)
}

fn run_normalize(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input does not exist: {}", input.display());
    }

    let output_dir = output
        .or_else(|| input.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let dataset = read_raw_csv(&input)?;
    let exporter = VoterCsvExporter::new(output_dir);
    exporter.export(&dataset)?;

    println!(
        "[✓] Normalized {} records to {}",
        dataset.len(),
        exporter.path().display()
    );
    Ok(())
}

fn show_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let pages = rollscan::render::page_count(&input)
        .with_context(|| format!("Failed to read PDF: {}", input.display()))?;

    println!("PDF Information");
    println!("===============");
    println!("File: {}", input.display());
    println!("Pages: {pages}");

    Ok(())
}

fn default_output_dir(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "rollscan".to_string());
    PathBuf::from(format!("{stem}_output"))
}
