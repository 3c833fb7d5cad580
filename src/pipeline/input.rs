//! Input validation: classify a user-supplied path as image or PDF.
//!
//! The extension allow-list is the single gate in front of the pipeline —
//! anything else is rejected here with a typed error before any external
//! tool runs. For PDFs we additionally verify the `%PDF` magic bytes so a
//! renamed file produces a meaningful error rather than a pdftoppm crash.

use crate::error::OcrError;
use crate::output::DocumentKind;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Raster image extensions the pipeline accepts directly.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp"];

/// Is this filename's extension in the supported set (images or pdf)?
///
/// Matching is case-insensitive; a file without an extension is not
/// supported.
pub fn is_supported(path: &Path) -> bool {
    match extension_of(path) {
        Some(ext) => ext == "pdf" || IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Validate the file and decide how to ingest it.
///
/// Checks, in order: the extension is allowed, the file exists and is
/// readable, and (for `.pdf`) the content actually starts with `%PDF`.
pub fn classify(path: &Path) -> Result<DocumentKind, OcrError> {
    let ext = extension_of(path).ok_or_else(|| OcrError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: String::new(),
    })?;

    let kind = if ext == "pdf" {
        DocumentKind::Pdf
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        DocumentKind::Image
    } else {
        return Err(OcrError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: ext,
        });
    };

    if !path.exists() {
        return Err(OcrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(path) {
        Ok(mut f) => {
            if kind == DocumentKind::Pdf {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(OcrError::NotAPdf {
                        path: path.to_path_buf(),
                        magic,
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(OcrError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(OcrError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("classified {} as {:?}", path.display(), kind);
    Ok(kind)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
