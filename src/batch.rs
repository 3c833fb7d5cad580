//! Batch mode: OCR every supported file in a directory.
//!
//! For each supported file in `input_dir` (non-recursive, processed in
//! sorted name order) one `.txt` file named after the input lands in
//! `output_dir`, and the binarized intermediate of every page is written
//! under `output_dir/preprocessed/` so threshold problems can be
//! inspected. Unsupported extensions are skipped, counted, and logged —
//! a skipped file never fails the run.

use crate::config::ExtractConfig;
use crate::error::OcrError;
use crate::extract::extract_to_file;
use crate::pipeline::input;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Subdirectory of the output dir that receives binarized page images.
pub const PREPROCESSED_DIR: &str = "preprocessed";

/// Per-file outcome of a batch run.
#[derive(Debug)]
pub enum BatchItem {
    /// Text written to the given path.
    Written { input: PathBuf, output: PathBuf },
    /// Extraction failed; nothing was written for this input.
    Failed { input: PathBuf, error: OcrError },
}

/// Counts and per-file outcomes for one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Files that produced a `.txt` output.
    pub processed: usize,
    /// Files where extraction failed fatally.
    pub failed: usize,
    /// Files skipped because their extension is unsupported.
    pub skipped: usize,
    /// Outcome per attempted file, in processing order.
    pub items: Vec<BatchItem>,
}

/// Run the pipeline over every supported file in `input_dir`.
///
/// `on_file` is invoked with each file name as it is picked up, letting
/// the CLI drive a progress display without this module knowing about
/// terminals.
pub async fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: &ExtractConfig,
    mut on_file: impl FnMut(&Path),
) -> Result<BatchSummary, OcrError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    // Each input's debug images land next to its text output.
    let debug_dir = output_dir.join(PREPROCESSED_DIR);
    let config = ExtractConfig {
        debug_image_dir: Some(debug_dir),
        ..config.clone()
    };

    let mut summary = BatchSummary::default();
    for path in list_input_files(input_dir)? {
        if !input::is_supported(&path) {
            debug!("skipping unsupported file {}", path.display());
            summary.skipped += 1;
            continue;
        }
        on_file(&path);

        let output_path = text_output_path(output_dir, &path);
        match extract_to_file(&path, &output_path, &config).await {
            Ok(stats) => {
                info!(
                    "{} → {} ({}/{} pages, {}ms)",
                    path.display(),
                    output_path.display(),
                    stats.processed_pages,
                    stats.total_pages,
                    stats.total_duration_ms
                );
                summary.processed += 1;
                summary.items.push(BatchItem::Written {
                    input: path,
                    output: output_path,
                });
            }
            Err(e) => {
                error!("{}: {e}", path.display());
                summary.failed += 1;
                summary.items.push(BatchItem::Failed { input: path, error: e });
            }
        }
    }

    info!(
        "batch complete: {} processed, {} failed, {} skipped",
        summary.processed, summary.failed, summary.skipped
    );
    Ok(summary)
}

/// Regular files in `input_dir`, sorted by name for deterministic order.
fn list_input_files(input_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let entries = std::fs::read_dir(input_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OcrError::FileNotFound {
            path: input_dir.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => OcrError::PermissionDenied {
            path: input_dir.to_path_buf(),
        },
        _ => OcrError::Internal(format!("could not list {}: {e}", input_dir.display())),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.is_file().then_some(path)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// `scans/invoice.pdf` → `{output_dir}/invoice.txt`
fn text_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_dir.join(format!("{stem}.txt"))
}
