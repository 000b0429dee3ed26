//! Canvas composition: centered vertical stacking and letterboxing.

use image::RgbImage;
use image::imageops;

use crate::{EngineError, WHITE};

/// Stack images top to bottom on a white canvas.
///
/// The output width equals the widest input; each image is centered
/// horizontally on its own.
pub fn stack_centered(images: &[&RgbImage]) -> Result<RgbImage, EngineError> {
    let max_width = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let total_height: u32 = images.iter().map(|i| i.height()).sum();
    if max_width == 0 || total_height == 0 {
        return Err(EngineError::InvalidDimension {
            width: max_width,
            height: total_height,
        });
    }

    let mut canvas = RgbImage::from_pixel(max_width, total_height, WHITE);
    let mut y_offset = 0u32;
    for img in images {
        let x = centered_offset(max_width, img.width());
        imageops::replace(&mut canvas, *img, i64::from(x), i64::from(y_offset));
        y_offset += img.height();
    }

    Ok(canvas)
}

/// Center `img` on a white canvas of exactly `width` x `height`.
///
/// The image must already fit; anything larger is a caller error.
pub fn letterbox(img: &RgbImage, width: u32, height: u32) -> Result<RgbImage, EngineError> {
    if width == 0 || height == 0 || img.width() > width || img.height() > height {
        return Err(EngineError::InvalidDimension { width, height });
    }
    if img.width() == width && img.height() == height {
        return Ok(img.clone());
    }

    let mut canvas = RgbImage::from_pixel(width, height, WHITE);
    let x = centered_offset(width, img.width());
    let y = centered_offset(height, img.height());
    imageops::replace(&mut canvas, img, i64::from(x), i64::from(y));
    Ok(canvas)
}

/// Left/top offset that centers `inner` within `outer`.
pub fn centered_offset(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}
