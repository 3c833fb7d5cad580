//! Error types for the doc2text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrError`] — **Fatal**: the extraction cannot proceed at all
//!   (missing input file, unsupported extension, rasterizer failure).
//!   Returned as `Err(OcrError)` from the top-level `extract*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (tesseract
//!   rejected one rendered page) but all other pages are fine. Stored
//!   inside [`crate::output::PageText`] so callers can inspect partial
//!   success rather than losing the whole document to one bad page.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first page failure via [`crate::output::ExtractionOutput::into_result`],
//! or render the successful pages and report the rest.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2text library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageText`] rather than propagated here.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not in the supported set.
    #[error("unsupported file type '.{extension}' for '{path}'\nSupported: png, jpg, jpeg, tiff, bmp, pdf")]
    UnsupportedExtension { path: PathBuf, extension: String },

    /// The file has a `.pdf` extension but does not start with `%PDF`.
    #[error("file is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The image file could not be decoded.
    #[error("could not read image file '{path}': {detail}\nIt may be corrupt or an unsupported encoding.")]
    CorruptImage { path: PathBuf, detail: String },

    // ── Rasterization errors ──────────────────────────────────────────────
    /// The pdftoppm executable could not be spawned.
    #[error(
        "could not run '{command}': executable not found\n\
         Install Poppler, or point POPPLER_PATH at its bin directory."
    )]
    PopplerNotFound { command: PathBuf },

    /// pdftoppm ran but produced no usable page images.
    #[error("PDF rasterization failed: {detail}")]
    RasterizationFailed { detail: String },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// Every page failed; there is no text to return.
    #[error("all {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    /// Some pages succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::ExtractionOutput::into_result`] when
    /// the caller wants to treat any page failure as an error.
    #[error("{failed}/{total} pages failed during extraction")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageText`] when a page fails.
/// The overall extraction continues unless ALL pages fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The preprocessed page could not be handed to tesseract, or
    /// tesseract rejected it.
    #[error("page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// The page image could not be prepared for recognition.
    #[error("page {page}: preprocessing failed: {detail}")]
    PreprocessFailed { page: usize, detail: String },
}
