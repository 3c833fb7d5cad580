//! Configuration types for text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractConfig`], built
//! via its [`ExtractConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across requests, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! Nothing in the library reads the environment: `POPPLER_PATH` and
//! `TESSERACT_CMD` are mapped onto these fields by the CLI and server
//! entry points, so the pipeline itself carries no process-global state.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Highest page segmentation mode tesseract accepts (`--psm 13`).
const MAX_PSM: u8 = 13;

/// Configuration for one extraction run.
///
/// Built via [`ExtractConfig::builder()`] or using
/// [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2text::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .psm(6)
///     .dpi(200)
///     .language("eng")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Tesseract executable. Default: `tesseract` (searched on `$PATH`).
    ///
    /// The CLI maps the `TESSERACT_CMD` environment variable here, which
    /// is how Windows installs with a non-PATH `tesseract.exe` are
    /// supported without any code in the pipeline knowing about it.
    pub tesseract_cmd: PathBuf,

    /// Directory containing the Poppler binaries (`pdftoppm`). Default: `None`.
    ///
    /// `None` means `pdftoppm` is resolved from `$PATH`, which is the
    /// right answer on Linux and macOS. The CLI maps `POPPLER_PATH` here
    /// for systems where Poppler is unpacked somewhere private.
    pub poppler_path: Option<PathBuf>,

    /// Tesseract page segmentation mode. Range: 0–13. Default: 6.
    ///
    /// 6 means "assume a single uniform block of text", which matches
    /// scanned documents and rasterized PDF pages. Lower modes add layout
    /// analysis that hurts accuracy on plain scans.
    pub psm: u8,

    /// Rasterization resolution in DPI for PDF pages. Range: 72–600. Default: 200.
    ///
    /// 200 DPI keeps body text legible to tesseract while a rasterized
    /// A4 page stays under ~4 MP. Raise it for small-print documents at
    /// the cost of slower rasterization and recognition.
    pub dpi: u32,

    /// Recognition language passed to tesseract as `-l`. Default: `None`
    /// (tesseract's own default, English).
    pub language: Option<String>,

    /// Directory to write binarized intermediate images into. Default: `None`.
    ///
    /// When set, every page's preprocessed (black-and-white) image is
    /// saved as `<stem>_preprocessed.png`, or `<stem>_page_N_preprocessed.png`
    /// for PDF pages. Used by the batch CLI to make threshold problems
    /// visible; a failed save is logged and never fails the extraction.
    pub debug_image_dir: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            poppler_path: None,
            psm: 6,
            dpi: 200,
            language: None,
            debug_image_dir: None,
        }
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn poppler_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.poppler_path = Some(dir.into());
        self
    }

    pub fn psm(mut self, psm: u8) -> Self {
        self.config.psm = psm;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = Some(lang.into());
        self
    }

    pub fn debug_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.debug_image_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, OcrError> {
        let c = &self.config;
        if c.psm > MAX_PSM {
            return Err(OcrError::InvalidConfig(format!(
                "page segmentation mode must be 0–{MAX_PSM}, got {}",
                c.psm
            )));
        }
        if c.dpi < 72 || c.dpi > 600 {
            return Err(OcrError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.tesseract_cmd.as_os_str().is_empty() {
            return Err(OcrError::InvalidConfig(
                "tesseract command must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let c = ExtractConfig::default();
        assert_eq!(c.tesseract_cmd, PathBuf::from("tesseract"));
        assert_eq!(c.psm, 6);
        assert_eq!(c.dpi, 200);
        assert!(c.poppler_path.is_none());
        assert!(c.language.is_none());
        assert!(c.debug_image_dir.is_none());
    }

    #[test]
    fn builder_rejects_out_of_range_psm() {
        let err = ExtractConfig::builder().psm(14).build();
        assert!(matches!(err, Err(OcrError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ExtractConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 600);
        let c = ExtractConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn builder_sets_all_fields() {
        let c = ExtractConfig::builder()
            .tesseract_cmd("/opt/tesseract/bin/tesseract")
            .poppler_path("/opt/poppler/bin")
            .psm(11)
            .dpi(300)
            .language("deu")
            .debug_image_dir("/tmp/debug")
            .build()
            .unwrap();
        assert_eq!(c.psm, 11);
        assert_eq!(c.dpi, 300);
        assert_eq!(c.language.as_deref(), Some("deu"));
        assert_eq!(c.poppler_path.as_deref(), Some(std::path::Path::new("/opt/poppler/bin")));
        assert_eq!(c.debug_image_dir.as_deref(), Some(std::path::Path::new("/tmp/debug")));
    }
}
