//! # doc2text
//!
//! Extract text from images and PDFs with Tesseract OCR.
//!
//! ## Why this crate?
//!
//! Scanned documents rarely OCR well raw: sensor noise, uneven lighting,
//! and JPEG artefacts all degrade recognition. This crate runs every page
//! through the classic cleanup pipeline — grayscale, 3×3 median denoise,
//! Otsu binarization — before handing it to the external `tesseract`
//! binary, and rasterizes PDFs page-by-page through Poppler's `pdftoppm`
//! so multi-page documents come out as ordered, page-marked text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image / PDF
//!  │
//!  ├─ 1. Input       validate extension, check PDF magic bytes
//!  ├─ 2. Rasterize   PDF pages → PNG via pdftoppm (PDFs only)
//!  ├─ 3. Preprocess  grayscale → median(3×3) → Otsu binary
//!  ├─ 4. Recognize   tesseract --psm 6, one page at a time, in order
//!  ├─ 5. Clean       strip form feeds / CRLF / blank-line runs
//!  └─ 6. Output      page texts + `--- Page N ---` markers for PDFs
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2text::{extract, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default();
//!     let output = extract("scan.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!(
//!         "{}/{} pages in {}ms",
//!         output.stats.processed_pages,
//!         output.stats.total_pages,
//!         output.stats.total_duration_ms
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! | Tool | Used for | Override |
//! |------|----------|----------|
//! | `tesseract` | character recognition | [`ExtractConfig::tesseract_cmd`] |
//! | `pdftoppm` (Poppler) | PDF page rasterization | [`ExtractConfig::poppler_path`] |
//!
//! Neither is bundled; both are resolved from `$PATH` unless the config
//! points elsewhere. The CLI maps the `TESSERACT_CMD` and `POPPLER_PATH`
//! environment variables onto those fields.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `web`   | on      | Enables the upload server module (axum + tower-http + uuid) |
//!
//! Disable both when using only the library:
//! ```toml
//! doc2text = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
#[cfg(feature = "web")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{BatchItem, BatchSummary};
pub use config::{ExtractConfig, ExtractConfigBuilder};
pub use error::{OcrError, PageError};
pub use extract::{extract, extract_sync, extract_to_file};
pub use output::{DocumentKind, ExtractionOutput, ExtractionStats, PageText};
