//! Recognition: hand one binarized page to the external tesseract binary.
//!
//! Tesseract is driven through its CLI rather than C-API bindings: the
//! binary is what users already have installed, it isolates crashes in
//! the engine from this process, and the file-in/file-out handshake is
//! trivial to reason about. Each invocation gets its own `TempDir`, so
//! concurrent requests (the web server) can never collide.
//!
//! ## Return Value
//!
//! [`recognize_page`] always returns a [`PageText`] — never an `Err` —
//! so a single bad page doesn't abort a multi-page document. Callers
//! check `result.error` to decide whether to include or report the page.

use crate::config::ExtractConfig;
use crate::error::PageError;
use crate::output::PageText;
use crate::pipeline::postprocess;
use image::GrayImage;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

/// Run tesseract over one preprocessed page.
///
/// The page is written as a PNG into a fresh temp directory, tesseract is
/// invoked as `{tesseract_cmd} input.png out --psm {psm} [-l {lang}]`,
/// and `out.txt` is read back and cleaned. No retries: tesseract either
/// reads the page or it doesn't, and the page-segmentation mode is the
/// only knob that changes the outcome.
pub async fn recognize_page(page_num: usize, image: &GrayImage, config: &ExtractConfig) -> PageText {
    let start = Instant::now();

    match run_tesseract(image, config).await {
        Ok(raw) => {
            let text = postprocess::clean_text(&raw);
            debug!(
                "page {}: recognized {} chars in {}ms",
                page_num,
                text.len(),
                start.elapsed().as_millis()
            );
            PageText {
                page_num,
                text,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(detail) => {
            warn!("page {}: OCR failed — {}", page_num, detail);
            PageText {
                page_num,
                text: String::new(),
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(PageError::OcrFailed {
                    page: page_num,
                    detail,
                }),
            }
        }
    }
}

/// The file-in/file-out handshake with the tesseract binary.
async fn run_tesseract(image: &GrayImage, config: &ExtractConfig) -> Result<String, String> {
    let tmpdir = tempfile::TempDir::with_prefix("doc2text-ocr")
        .map_err(|e| format!("could not create temp dir: {e}"))?;
    let input_path = tmpdir.path().join("input.png");
    let output_base = tmpdir.path().join("out");

    image
        .save(&input_path)
        .map_err(|e| format!("could not write page image: {e}"))?;

    let mut cmd = Command::new(&config.tesseract_cmd);
    cmd.args(tesseract_args(&input_path, &output_base, config));

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            format!(
                "'{}' not found — install tesseract or set --tesseract-cmd",
                config.tesseract_cmd.display()
            )
        } else {
            format!("could not run '{}': {e}", config.tesseract_cmd.display())
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "tesseract exited with {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    // Tesseract appends `.txt` to the output base itself.
    let output_path = output_base.with_extension("txt");
    std::fs::read_to_string(&output_path)
        .map_err(|e| format!("could not read tesseract output: {e}"))
}

/// Argument list for one invocation, kept separate so tests can pin the
/// exact CLI contract without spawning anything.
fn tesseract_args(input: &Path, output_base: &Path, config: &ExtractConfig) -> Vec<String> {
    let mut args = vec![
        input.display().to_string(),
        output_base.display().to_string(),
        "--psm".to_string(),
        config.psm.to_string(),
    ];
    if let Some(ref lang) = config.language {
        args.push("-l".to_string());
        args.push(lang.clone());
    }
    args
}
