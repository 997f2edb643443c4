//! Derived-document pipeline.
//!
//! Two transformations over an in-memory PDF: a bounded, watermarked
//! preview with a call-to-action page, and a full copy stamped with the
//! downloading identity. Watermarks are best-effort; anything that cannot
//! be drawn is reported as a [`Degradation`] and the output is still produced.

mod brand;
mod overlay;
mod preview;
mod stamp;

pub use brand::BrandMark;
pub use preview::render_preview;
pub use stamp::stamp_for_delivery;

use thiserror::Error;

pub const DEFAULT_PREVIEW_PAGES: usize = 5;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Leading pages copied into a preview.
    pub preview_pages: usize,
    /// Diagonal text drawn across preview pages.
    pub watermark_text: String,
    pub text_opacity: f32,
    pub image_opacity: f32,
    pub caption_opacity: f32,
    /// Shown on the call-to-action page.
    pub site_name: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preview_pages: DEFAULT_PREVIEW_PAGES,
            watermark_text: "StudyMint".to_string(),
            text_opacity: 0.5,
            image_opacity: 0.2,
            caption_opacity: 0.6,
            site_name: "StudyMint".to_string(),
        }
    }
}

/// A watermark that could not be applied. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    #[error("brand asset not configured, using text watermark only")]
    BrandAssetMissing,

    #[error("brand asset unreadable: {0}")]
    BrandAssetUnreadable(String),

    #[error("watermark skipped on page {page}: {reason}")]
    PageSkipped { page: u32, reason: String },

    #[error("document could not be parsed for stamping, delivered unmodified: {0}")]
    Unstamped(String),
}

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub degradations: Vec<Degradation>,
}

impl Rendered {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
