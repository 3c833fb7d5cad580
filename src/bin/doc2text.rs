//! CLI binary for doc2text.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doc2text::{batch, extract, extract_to_file, BatchItem, ExtractConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single image to stdout
  doc2text extract receipt.png

  # PDF to a text file, German language pack
  doc2text extract --lang deu contract.pdf -o contract.txt

  # Structured JSON output (per-page results + timings)
  doc2text extract --json invoice.pdf > invoice.json

  # OCR a whole scans directory; one .txt per input plus
  # binarized debug images under out/preprocessed/
  doc2text batch ~/Documents/scans out/

  # Upload form on http://127.0.0.1:5000
  doc2text serve --upload-dir uploads

EXTERNAL TOOLS:
  tesseract   character recognition        (--tesseract-cmd / TESSERACT_CMD)
  pdftoppm    PDF rasterization (Poppler)  (--poppler-path / POPPLER_PATH)

  Both are resolved from $PATH by default. On Windows, point
  TESSERACT_CMD at tesseract.exe and POPPLER_PATH at the Poppler bin
  directory, e.g. C:\poppler\poppler-25.07.0\bin.

ENVIRONMENT VARIABLES:
  TESSERACT_CMD   Tesseract executable override
  POPPLER_PATH    Poppler bin directory override
  DOC2TEXT_PSM    Page segmentation mode (default 6)
  DOC2TEXT_DPI    PDF rasterization DPI (default 200)
  DOC2TEXT_LANG   Recognition language (tesseract -l)
"#;

/// Extract text from images and PDFs with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "doc2text",
    version,
    about = "Extract text from images and PDFs with Tesseract OCR",
    long_about = "Extract text from scanned images (png, jpg, jpeg, tiff, bmp) and PDFs. \
Every page is cleaned up first — grayscale, median denoise, Otsu binarization — then \
recognized by the external tesseract binary. PDFs are rasterized page-by-page via \
Poppler's pdftoppm.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: CommandKind,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2TEXT_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2TEXT_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum CommandKind {
    /// Extract text from a single image or PDF.
    Extract {
        /// Path to a png/jpg/jpeg/tiff/bmp image or a PDF.
        input: PathBuf,

        /// Write text to this file instead of stdout.
        #[arg(short, long, env = "DOC2TEXT_OUTPUT")]
        output: Option<PathBuf>,

        /// Output structured JSON (per-page results + timings) instead of text.
        #[arg(long)]
        json: bool,

        /// Save binarized page images into this directory.
        #[arg(long)]
        debug_images: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrOptions,
    },

    /// OCR every supported file in a directory, one .txt per input.
    Batch {
        /// Directory to scan (non-recursive).
        input_dir: PathBuf,

        /// Directory for the .txt outputs and preprocessed/ debug images.
        output_dir: PathBuf,

        /// Disable the progress bar.
        #[arg(long)]
        no_progress: bool,

        #[command(flatten)]
        ocr: OcrOptions,
    },

    /// Run the upload web server.
    #[cfg(feature = "web")]
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DOC2TEXT_ADDR", default_value = "127.0.0.1:5000")]
        addr: std::net::SocketAddr,

        /// Directory uploaded files are stored in (created if absent).
        #[arg(long, env = "DOC2TEXT_UPLOAD_DIR", default_value = "uploads")]
        upload_dir: PathBuf,

        #[command(flatten)]
        ocr: OcrOptions,
    },
}

/// Flags shared by every subcommand that runs the pipeline.
#[derive(Args, Debug)]
struct OcrOptions {
    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// Directory containing the Poppler binaries (pdftoppm).
    #[arg(long, env = "POPPLER_PATH")]
    poppler_path: Option<PathBuf>,

    /// Tesseract page segmentation mode (6 = single uniform text block).
    #[arg(long, env = "DOC2TEXT_PSM", default_value_t = 6,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// PDF rasterization resolution in DPI.
    #[arg(long, env = "DOC2TEXT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Recognition language, passed to tesseract as -l.
    #[arg(long, env = "DOC2TEXT_LANG")]
    lang: Option<String>,
}

impl OcrOptions {
    fn into_config(self, debug_image_dir: Option<PathBuf>) -> Result<ExtractConfig> {
        let mut builder = ExtractConfig::builder()
            .tesseract_cmd(self.tesseract_cmd)
            .psm(self.psm)
            .dpi(self.dpi);
        if let Some(dir) = self.poppler_path {
            builder = builder.poppler_path(dir);
        }
        if let Some(lang) = self.lang {
            builder = builder.language(lang);
        }
        if let Some(dir) = debug_image_dir {
            builder = builder.debug_image_dir(dir);
        }
        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        CommandKind::Extract {
            input,
            output,
            json,
            debug_images,
            ocr,
        } => run_extract(input, output, json, debug_images, ocr, cli.quiet).await,
        CommandKind::Batch {
            input_dir,
            output_dir,
            no_progress,
            ocr,
        } => run_batch(input_dir, output_dir, no_progress, ocr, cli.quiet).await,
        #[cfg(feature = "web")]
        CommandKind::Serve {
            addr,
            upload_dir,
            ocr,
        } => {
            let config = ocr.into_config(None)?;
            doc2text::server::serve(addr, upload_dir, config)
                .await
                .context("Server failed")
        }
    }
}

async fn run_extract(
    input: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    debug_images: Option<PathBuf>,
    ocr: OcrOptions,
    quiet: bool,
) -> Result<()> {
    let config = ocr.into_config(debug_images)?;

    if let Some(ref output_path) = output {
        let stats = extract_to_file(&input, output_path, &config)
            .await
            .context("Extraction failed")?;
        if !quiet {
            eprintln!(
                "{}  {}/{} pages  {}ms  →  {}",
                if stats.failed_pages == 0 {
                    green("✔")
                } else {
                    red("⚠")
                },
                stats.processed_pages,
                stats.total_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let result = extract(&input, &config).await.context("Extraction failed")?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&result).context("Failed to serialize output")?;
        println!("{serialized}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(result.text.as_bytes())
        .context("Failed to write to stdout")?;
    if !result.text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }

    if !quiet {
        eprintln!(
            "{}",
            dim(&format!(
                "{}/{} pages in {}ms",
                result.stats.processed_pages,
                result.stats.total_pages,
                result.stats.total_duration_ms
            ))
        );
        for page in result.failed_pages() {
            if let Some(ref e) = page.error {
                eprintln!("  {} {}", red("✗"), e);
            }
        }
    }

    Ok(())
}

async fn run_batch(
    input_dir: PathBuf,
    output_dir: PathBuf,
    no_progress: bool,
    ocr: OcrOptions,
    quiet: bool,
) -> Result<()> {
    let config = ocr.into_config(None)?;
    let show_progress = !quiet && !no_progress;

    let bar = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Processing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let summary = {
        let bar_ref = bar.as_ref();
        batch::run_batch(&input_dir, &output_dir, &config, |path| {
            if let Some(bar) = bar_ref {
                bar.set_message(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
        })
        .await
        .context("Batch run failed")?
    };

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if !quiet {
        for item in &summary.items {
            match item {
                BatchItem::Written { input, output } => eprintln!(
                    "  {} {}  →  {}",
                    green("✓"),
                    input.display(),
                    dim(&output.display().to_string())
                ),
                BatchItem::Failed { input, error } => {
                    eprintln!("  {} {}  {}", red("✗"), input.display(), red(&error.to_string()))
                }
            }
        }
        eprintln!(
            "{} {} processed, {} failed, {} skipped",
            if summary.failed == 0 {
                green("✔")
            } else {
                red("⚠")
            },
            bold(&summary.processed.to_string()),
            summary.failed,
            summary.skipped,
        );
    }

    if summary.failed > 0 {
        anyhow::bail!("{} file(s) failed", summary.failed);
    }
    Ok(())
}
