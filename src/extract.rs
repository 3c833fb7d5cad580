//! Top-level extraction entry points.
//!
//! [`extract`] is the primary API: classify the input, obtain page
//! images (rasterizing PDFs through Poppler), then run each page
//! sequentially through preprocessing and tesseract. Pages are processed
//! strictly in document order — there is no cross-page parallelism, so
//! output order can never diverge from page order.

use crate::config::ExtractConfig;
use crate::error::OcrError;
use crate::output::{DocumentKind, ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::{input, ocr, preprocess, rasterize};
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract text from an image or PDF file.
///
/// # Arguments
/// * `input_path` — path to a png/jpg/jpeg/tiff/bmp image or a PDF
/// * `config` — extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` on success, even if some PDF pages failed
/// (check `output.stats.failed_pages`, or call
/// [`ExtractionOutput::into_result`] to treat partial failure as an error).
///
/// # Errors
/// Returns `Err(OcrError)` only for fatal errors:
/// - File missing / unreadable / unsupported extension
/// - Corrupt image or PDF, rasterizer failure
/// - Every page failed and no text was produced
pub async fn extract(
    input_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractionOutput, OcrError> {
    let total_start = Instant::now();
    let path = input_path.as_ref();
    info!("starting extraction: {}", path.display());

    // ── Step 1: Classify input ───────────────────────────────────────────
    let kind = input::classify(path)?;

    // ── Step 2: Obtain page images ───────────────────────────────────────
    let rasterize_start = Instant::now();
    let page_images = match kind {
        DocumentKind::Pdf => rasterize::rasterize_pdf(path, config).await?,
        DocumentKind::Image => vec![(0, load_image(path).await?)],
    };
    let rasterize_duration_ms = match kind {
        DocumentKind::Pdf => rasterize_start.elapsed().as_millis() as u64,
        DocumentKind::Image => 0,
    };
    let total_pages = page_images.len();
    debug!("{} page image(s) ready", total_pages);

    // ── Step 3: Preprocess + recognize, page by page ─────────────────────
    let ocr_start = Instant::now();
    let mut pages: Vec<PageText> = Vec::with_capacity(total_pages);
    for (idx, img) in page_images {
        let page_num = idx + 1;
        let binary = match tokio::task::spawn_blocking(move || preprocess::binarize(&img)).await {
            Ok(binary) => binary,
            Err(e) => {
                warn!("page {}: preprocessing failed — {e}", page_num);
                pages.push(PageText {
                    page_num,
                    text: String::new(),
                    duration_ms: 0,
                    error: Some(crate::error::PageError::PreprocessFailed {
                        page: page_num,
                        detail: e.to_string(),
                    }),
                });
                continue;
            }
        };

        if let Some(ref debug_dir) = config.debug_image_dir {
            save_debug_image(&binary, debug_dir, path, kind, page_num);
        }

        pages.push(ocr::recognize_page(page_num, &binary, config).await);
    }
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    // ── Step 4: Assemble output text ─────────────────────────────────────
    let text = assemble_text(&pages, kind);

    // ── Step 5: Compute stats ────────────────────────────────────────────
    let processed = pages.iter().filter(|p| p.error.is_none()).count();
    let failed = pages.iter().filter(|p| p.error.is_some()).count();

    if processed == 0 {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(OcrError::AllPagesFailed {
            total: pages.len(),
            first_error,
        });
    }

    let stats = ExtractionStats {
        total_pages,
        processed_pages: processed,
        failed_pages: failed,
        rasterize_duration_ms,
        ocr_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "extraction complete: {}/{} pages, {}ms total",
        processed, total_pages, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        text,
        pages,
        kind,
        stats,
    })
}

/// Extract text and write it directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractionStats, OcrError> {
    let output = extract(input_path, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| OcrError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractionOutput, OcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(extract(input_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Decode a single image file off the async worker threads.
async fn load_image(path: &Path) -> Result<DynamicImage, OcrError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        image::open(&owned).map_err(|e| OcrError::CorruptImage {
            path: owned.clone(),
            detail: e.to_string(),
        })
    })
    .await
    .map_err(|e| OcrError::Internal(format!("decode task panicked: {e}")))?
}

/// Assemble the final text from page results.
///
/// PDF pages are prefixed with a literal `--- Page N ---` marker — every
/// PDF page, including the only page of a one-page document — and joined
/// with a blank line. A plain image is returned as its recognized text
/// alone. Failed pages contribute nothing here; they are reported through
/// `ExtractionOutput::pages`.
fn assemble_text(pages: &[PageText], kind: DocumentKind) -> String {
    let successful = pages.iter().filter(|p| p.error.is_none());
    match kind {
        DocumentKind::Image => successful
            .map(|p| p.text.clone())
            .collect::<Vec<_>>()
            .join("\n\n"),
        DocumentKind::Pdf => successful
            .map(|p| format!("--- Page {} ---\n{}", p.page_num, p.text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Best-effort save of a binarized page for inspection.
///
/// A debug artifact must never fail the extraction; save errors are
/// logged and dropped.
fn save_debug_image(
    binary: &image::GrayImage,
    debug_dir: &Path,
    input_path: &Path,
    kind: DocumentKind,
    page_num: usize,
) {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    let file_name = match kind {
        DocumentKind::Image => format!("{stem}_preprocessed.png"),
        DocumentKind::Pdf => format!("{stem}_page_{page_num}_preprocessed.png"),
    };
    let target = debug_dir.join(file_name);
    if let Err(e) = std::fs::create_dir_all(debug_dir) {
        warn!("could not create debug image dir {}: {e}", debug_dir.display());
        return;
    }
    if let Err(e) = binary.save(&target) {
        warn!("could not save debug image {}: {e}", target.display());
    }
}
