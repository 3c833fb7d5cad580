//! Pipeline stages for text extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different rasterizer) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ preprocess ──▶ ocr ──▶ postprocess
//! (path)    (pdftoppm,    (gray, median, (tesseract) (cleanup)
//!            PDFs only)    Otsu binary)
//! ```
//!
//! 1. [`input`]      — validate the path and classify it as image or PDF
//! 2. [`rasterize`]  — render PDF pages to images via the external
//!    `pdftoppm` binary; plain images skip this stage
//! 3. [`preprocess`] — grayscale, 3×3 median denoise, Otsu binarization;
//!    CPU-bound, callers run it in `spawn_blocking`
//! 4. [`ocr`]        — drive one tesseract invocation per page; the only
//!    stage allowed to fail per-page instead of per-document
//! 5. [`postprocess`] — deterministic cleanup of raw tesseract output
//!    (form feeds, CRLF, blank-line runs)

pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod preprocess;
pub mod rasterize;
