//! Aspect-ratio-preserving resize into an optional target box.
//!
//! Uses Lanczos3 filtering so thin bars survive downsampling.

use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::compose::letterbox;
use crate::config::{TargetBox, ensure_canvas_size};
use crate::EngineError;

/// Resolved geometry for fitting an image into a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Work out the scaled content size and the final canvas size.
///
/// Returns `None` for an empty box (no resize wanted).
pub fn plan_fit(
    width: u32,
    height: u32,
    target: TargetBox,
) -> Result<Option<FitPlan>, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimension { width, height });
    }
    let (w, h) = (f64::from(width), f64::from(height));

    let plan = match (target.width, target.height) {
        (None, None) => return Ok(None),
        (Some(tw), Some(th)) => {
            let scale = (f64::from(tw) / w).min(f64::from(th) / h);
            FitPlan {
                scaled_width: scaled_side(w, scale).min(tw),
                scaled_height: scaled_side(h, scale).min(th),
                canvas_width: tw,
                canvas_height: th,
            }
        }
        (Some(tw), None) => {
            let scaled_height = scaled_side(h, f64::from(tw) / w);
            FitPlan {
                scaled_width: tw,
                scaled_height,
                canvas_width: tw,
                canvas_height: scaled_height,
            }
        }
        (None, Some(th)) => {
            let scaled_width = scaled_side(w, f64::from(th) / h);
            FitPlan {
                scaled_width,
                scaled_height: th,
                canvas_width: scaled_width,
                canvas_height: th,
            }
        }
    };

    ensure_canvas_size(plan.canvas_width, plan.canvas_height)?;
    Ok(Some(plan))
}

fn scaled_side(side: f64, scale: f64) -> u32 {
    ((side * scale).round() as u32).max(1)
}

/// Scale `img` into `target` and pad it onto a white canvas.
///
/// An empty box returns a copy of the input.
pub fn fit_to_box(img: &RgbImage, target: TargetBox) -> Result<RgbImage, EngineError> {
    let Some(plan) = plan_fit(img.width(), img.height(), target)? else {
        return Ok(img.clone());
    };

    let scaled = if (plan.scaled_width, plan.scaled_height) == img.dimensions() {
        debug!(
            width = img.width(),
            height = img.height(),
            "Image already at target size, skipping resize"
        );
        img.clone()
    } else {
        debug!(
            orig_w = img.width(),
            orig_h = img.height(),
            new_width = plan.scaled_width,
            new_height = plan.scaled_height,
            "Resizing image into target box"
        );
        imageops::resize(
            img,
            plan.scaled_width,
            plan.scaled_height,
            FilterType::Lanczos3,
        )
    };

    letterbox(&scaled, plan.canvas_width, plan.canvas_height)
}
