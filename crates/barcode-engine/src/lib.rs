//! Barcode image rendering for bulk JPEG export.
//!
//! Renders Code-128 bars, stacks a human-readable caption underneath,
//! fits the result into an optional target box and bundles JPEGs into
//! a zip archive.

pub mod archive;
pub mod bars;
pub mod caption;
pub mod compose;
pub mod config;
pub mod encode;
pub mod pipeline;
pub mod resize;
pub mod text;

// Re-exports for convenience
pub use bars::{BarcodeValue, render_bars};
pub use caption::CaptionCompositor;
pub use config::{RenderConfig, TargetBox};
pub use pipeline::{BarcodeRow, BatchOutput, BatchRenderer, BatchReport, RenderOptions};
pub use text::CaptionFont;

/// Background color shared by every generated canvas.
pub const WHITE: image::Rgb<u8> = image::Rgb([255, 255, 255]);

/// Bar and caption ink color.
pub const BLACK: image::Rgb<u8> = image::Rgb([0, 0, 0]);

/// Errors produced while rendering or packaging barcode images.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Barcode encoding failed: {0}")]
    Encoding(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
