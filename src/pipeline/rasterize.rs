//! PDF rasterization: render every page to an image via Poppler's
//! `pdftoppm` binary.
//!
//! ## Why an external process?
//!
//! Poppler is the rasterizer users already have (`apt install
//! poppler-utils`, `brew install poppler`), and keeping it out-of-process
//! means a malformed PDF can at worst fail one invocation. `pdftoppm`
//! writes one numbered PNG per page into a directory we control; page
//! order is recovered from the numeric filename suffix, not directory
//! iteration order.
//!
//! Rasterization failures are fatal for the whole document: without page
//! images there is nothing downstream to recognize.

use crate::config::ExtractConfig;
use crate::error::OcrError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Render every page of `pdf_path` to an image, in ascending page order.
///
/// Returns `(page_index_0based, image)` tuples. The executable is
/// `{poppler_path}/pdftoppm` when a Poppler directory is configured,
/// plain `pdftoppm` (resolved from `$PATH`) otherwise.
pub async fn rasterize_pdf(
    pdf_path: &Path,
    config: &ExtractConfig,
) -> Result<Vec<(usize, DynamicImage)>, OcrError> {
    let tmpdir = TempDir::with_prefix("doc2text-pages")
        .map_err(|e| OcrError::Internal(format!("could not create temp dir: {e}")))?;
    let prefix = tmpdir.path().join("page");
    let command = pdftoppm_command(config.poppler_path.as_deref());

    let output = Command::new(&command)
        .arg("-png")
        .arg("-r")
        .arg(config.dpi.to_string())
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcrError::PopplerNotFound { command: command.clone() }
            } else {
                OcrError::RasterizationFailed {
                    detail: format!("could not run '{}': {e}", command.display()),
                }
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OcrError::RasterizationFailed {
            detail: format!("pdftoppm exited with {}: {}", output.status, stderr.trim()),
        });
    }

    let page_files = collect_page_files(tmpdir.path())?;
    if page_files.is_empty() {
        return Err(OcrError::RasterizationFailed {
            detail: format!("pdftoppm produced no page images for '{}'", pdf_path.display()),
        });
    }
    info!(
        "rasterized {} pages from {} at {} dpi",
        page_files.len(),
        pdf_path.display(),
        config.dpi
    );

    // Decoding the rendered PNGs is CPU-bound; keep it off the async
    // worker threads. The TempDir moves into the closure so the files
    // outlive the await point.
    tokio::task::spawn_blocking(move || {
        let _tmpdir = tmpdir;
        page_files
            .into_iter()
            .map(|(page_num, path)| {
                let img = image::open(&path).map_err(|e| OcrError::RasterizationFailed {
                    detail: format!("could not decode rendered page {page_num}: {e}"),
                })?;
                debug!("decoded page {} → {}x{} px", page_num, img.width(), img.height());
                Ok((page_num - 1, img))
            })
            .collect::<Result<Vec<_>, OcrError>>()
    })
    .await
    .map_err(|e| OcrError::Internal(format!("decode task panicked: {e}")))?
}

/// `pdftoppm`, optionally resolved inside a configured Poppler directory.
fn pdftoppm_command(poppler_dir: Option<&Path>) -> PathBuf {
    match poppler_dir {
        Some(dir) => dir.join("pdftoppm"),
        None => PathBuf::from("pdftoppm"),
    }
}

/// Find the `page-N.png` outputs and sort them by page number.
///
/// `pdftoppm` zero-pads the numeric suffix to the digit count of the last
/// page (`page-07.png` in a 10+ page document), so the number is parsed
/// rather than compared as a string.
fn collect_page_files(dir: &Path) -> Result<Vec<(usize, PathBuf)>, OcrError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| OcrError::Internal(format!("could not list rendered pages: {e}")))?;

    let mut pages: Vec<(usize, PathBuf)> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let page_num = parse_page_number(path.file_name()?.to_str()?)?;
            Some((page_num, path))
        })
        .collect();

    pages.sort_unstable_by_key(|(n, _)| *n);
    Ok(pages)
}

/// Parse the 1-based page number out of a `page-N.png` filename.
fn parse_page_number(file_name: &str) -> Option<usize> {
    let stem = file_name.strip_suffix(".png")?;
    let digits = stem.strip_prefix("page-")?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_unpadded_page_numbers() {
        assert_eq!(parse_page_number("page-1.png"), Some(1));
        assert_eq!(parse_page_number("page-07.png"), Some(7));
        assert_eq!(parse_page_number("page-112.png"), Some(112));
        assert_eq!(parse_page_number("page-.png"), None);
        assert_eq!(parse_page_number("page-1.ppm"), None);
        assert_eq!(parse_page_number("cover.png"), None);
    }

    #[test]
    fn page_files_sort_numerically_not_lexically() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order and with mixed padding on purpose.
        for name in ["page-10.png", "page-2.png", "page-1.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::write(dir.path().join("ignore.txt"), b"").unwrap();

        let pages = collect_page_files(dir.path()).unwrap();
        let order: Vec<usize> = pages.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec![1, 2, 10]);
    }

    #[test]
    fn command_resolution_honors_poppler_dir() {
        assert_eq!(pdftoppm_command(None), PathBuf::from("pdftoppm"));
        assert_eq!(
            pdftoppm_command(Some(Path::new("/opt/poppler/bin"))),
            PathBuf::from("/opt/poppler/bin/pdftoppm")
        );
    }

    #[tokio::test]
    async fn missing_pdftoppm_is_a_typed_error() {
        let config = ExtractConfig::builder()
            .poppler_path("/nonexistent/poppler/bin")
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();

        let err = rasterize_pdf(&pdf, &config).await.unwrap_err();
        assert!(matches!(err, OcrError::PopplerNotFound { .. }));
    }
}
