//! Output types for one extraction run.
//!
//! [`ExtractionOutput`] is what the `extract*` entry points return: the
//! assembled text plus one [`PageText`] per page, in document order, and
//! timing statistics. A page that failed still produces a `PageText` — its
//! `error` field carries the typed reason and its `text` is empty. This is
//! deliberate: recognized text and failure reports travel in separate
//! fields so no caller ever has to parse an error sentence out of the
//! payload.

use crate::error::{OcrError, PageError};
use serde::{Deserialize, Serialize};

/// What kind of document was ingested.
///
/// Drives output assembly: PDF pages get `--- Page N ---` markers, a
/// plain image does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A single raster image (png, jpg, jpeg, tiff, bmp).
    Image,
    /// A PDF rasterized into one image per page.
    Pdf,
}

/// Recognized text for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number within the source document.
    pub page_num: usize,
    /// Cleaned recognition output. Empty when `error` is set.
    pub text: String,
    /// Wall-clock time spent on this page (preprocess + OCR).
    pub duration_ms: u64,
    /// Set when this page failed; the extraction carried on regardless.
    pub error: Option<PageError>,
}

/// Timing and page-count statistics for an extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages the document contained.
    pub total_pages: usize,
    /// Pages that produced text.
    pub processed_pages: usize,
    /// Pages that failed recognition.
    pub failed_pages: usize,
    /// Time spent rasterizing (zero for plain images).
    pub rasterize_duration_ms: u64,
    /// Time spent in preprocessing + tesseract across all pages.
    pub ocr_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// The result of extracting text from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Assembled text: page texts in document order, PDF pages prefixed
    /// with their `--- Page N ---` marker and joined by a blank line.
    pub text: String,
    /// Per-page results in ascending page order, including failed pages.
    pub pages: Vec<PageText>,
    /// Whether the source was a plain image or a PDF.
    pub kind: DocumentKind,
    /// Page counts and stage timings.
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Treat any page failure as an error.
    ///
    /// `extract` succeeds as long as at least one page produced text; this
    /// converts a partial success into [`OcrError::PartialFailure`] for
    /// callers that need every page or nothing.
    pub fn into_result(self) -> Result<Self, OcrError> {
        if self.stats.failed_pages > 0 {
            return Err(OcrError::PartialFailure {
                success: self.stats.processed_pages,
                failed: self.stats.failed_pages,
                total: self.stats.total_pages,
            });
        }
        Ok(self)
    }

    /// Iterate over the pages that failed, if any.
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageText> {
        self.pages.iter().filter(|p| p.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, text: &str, error: Option<PageError>) -> PageText {
        PageText {
            page_num: n,
            text: text.to_string(),
            duration_ms: 0,
            error,
        }
    }

    #[test]
    fn into_result_passes_full_success() {
        let out = ExtractionOutput {
            text: "hi".into(),
            pages: vec![page(1, "hi", None)],
            kind: DocumentKind::Image,
            stats: ExtractionStats {
                total_pages: 1,
                processed_pages: 1,
                ..Default::default()
            },
        };
        assert!(out.into_result().is_ok());
    }

    #[test]
    fn into_result_rejects_partial_failure() {
        let out = ExtractionOutput {
            text: "hi".into(),
            pages: vec![
                page(1, "hi", None),
                page(
                    2,
                    "",
                    Some(PageError::OcrFailed {
                        page: 2,
                        detail: "exit status 1".into(),
                    }),
                ),
            ],
            kind: DocumentKind::Pdf,
            stats: ExtractionStats {
                total_pages: 2,
                processed_pages: 1,
                failed_pages: 1,
                ..Default::default()
            },
        };
        match out.into_result() {
            Err(OcrError::PartialFailure {
                success,
                failed,
                total,
            }) => {
                assert_eq!((success, failed, total), (1, 1, 2));
            }
            other => panic!("expected PartialFailure, got {other:?}"),
        }
    }

    #[test]
    fn output_round_trips_through_json() {
        let out = ExtractionOutput {
            text: "hello".into(),
            pages: vec![page(1, "hello", None)],
            kind: DocumentKind::Image,
            stats: ExtractionStats::default(),
        };
        let json = serde_json::to_string(&out).unwrap();
        let back: ExtractionOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, "hello");
        assert_eq!(back.kind, DocumentKind::Image);
    }
}
