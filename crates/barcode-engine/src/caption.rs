//! Caption strip layout and final sizing.
//!
//! Layout:
//! ```text
//! ┌──────────────────────────┐
//! │   ║█║║ █║║█ ║█║║ █║║    │  bars (centered)
//! ├──────────────────────────┤
//! │  T0125123126021725551630 │  caption strip (centered)
//! └──────────────────────────┘
//! ```
//! The stacked canvas is then scaled into the target box and letterboxed.

use image::RgbImage;
use tracing::debug;

use crate::compose::{self, centered_offset};
use crate::config::TargetBox;
use crate::resize::fit_to_box;
use crate::text::{CAPTION_FONT_PX, CaptionFont};
use crate::{BLACK, EngineError, WHITE};

/// Horizontal padding on each side of the caption.
pub const CAPTION_PAD_X: u32 = 10;

/// Vertical padding above and below the caption.
pub const CAPTION_PAD_Y: u32 = 5;

/// Adds a human-readable caption under bar images and sizes the result.
#[derive(Debug)]
pub struct CaptionCompositor {
    font: CaptionFont,
    font_px: f32,
}

impl CaptionCompositor {
    pub fn new(font: CaptionFont) -> Self {
        Self {
            font,
            font_px: CAPTION_FONT_PX,
        }
    }

    /// Caption size in pixels, as (width, height).
    pub fn measure_caption(&self, caption: &str) -> (u32, u32) {
        self.font.measure(self.font_px, caption)
    }

    /// Size of the white strip holding `caption` under bars of `bar_width`.
    pub fn strip_size(&self, bar_width: u32, caption: &str) -> (u32, u32) {
        let (text_w, text_h) = self.measure_caption(caption);
        (
            bar_width.max(text_w + 2 * CAPTION_PAD_X),
            text_h + 2 * CAPTION_PAD_Y,
        )
    }

    /// Render the caption strip for bars of `bar_width`.
    pub fn render_strip(&self, bar_width: u32, caption: &str) -> RgbImage {
        let (text_w, text_h) = self.measure_caption(caption);
        let (width, height) = self.strip_size(bar_width, caption);

        let mut strip = RgbImage::from_pixel(width, height, WHITE);
        let x = centered_offset(width, text_w) as i32;
        let y = centered_offset(height, text_h) as i32;
        self.font.draw(&mut strip, self.font_px, x, y, caption, BLACK);
        strip
    }

    /// Stack `caption` under `bars` without any resizing.
    pub fn stack(&self, bars: &RgbImage, caption: &str) -> Result<RgbImage, EngineError> {
        if bars.width() == 0 || bars.height() == 0 {
            return Err(EngineError::InvalidDimension {
                width: bars.width(),
                height: bars.height(),
            });
        }
        let strip = self.render_strip(bars.width(), caption);
        compose::stack_centered(&[bars, &strip])
    }

    /// Caption the bars, then fit the result into `target`.
    ///
    /// With an empty box the stacked image is returned at natural size.
    /// Otherwise the output matches every requested side exactly.
    pub fn compose(
        &self,
        bars: &RgbImage,
        caption: &str,
        target: TargetBox,
    ) -> Result<RgbImage, EngineError> {
        let combined = self.stack(bars, caption)?;
        debug!(
            width = combined.width(),
            height = combined.height(),
            "Stacked caption under bars"
        );

        if target.is_empty() {
            return Ok(combined);
        }
        fit_to_box(&combined, target)
    }
}
