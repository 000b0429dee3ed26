//! Render geometry and output sizing parameters.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Millimetres per inch, used to convert physical sizes to pixels.
const MM_PER_INCH: f32 = 25.4;

/// Highest accepted resolution.
pub const MAX_DPI: u32 = 2400;

/// Largest requested side of a target box, in pixels.
pub const MAX_TARGET_SIDE: u32 = 65_535;

/// Upper bound on the pixel count of any canvas the engine allocates.
pub const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Reject canvases with a zero side or more than [`MAX_CANVAS_PIXELS`].
pub fn ensure_canvas_size(width: u32, height: u32) -> Result<(), EngineError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 || pixels > MAX_CANVAS_PIXELS {
        return Err(EngineError::InvalidDimension { width, height });
    }
    Ok(())
}

/// Bar density and geometry handed to the symbology step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub dpi: u32,
    pub module_width_mm: f32,
    pub module_height_mm: f32,
    pub quiet_zone_mm: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            module_width_mm: 0.2,
            module_height_mm: 15.0,
            quiet_zone_mm: 6.5,
        }
    }
}

impl RenderConfig {
    /// Default geometry at a caller-chosen resolution.
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Self::default()
        }
    }

    /// Reject DPI outside `1..=MAX_DPI` and non-positive or non-finite lengths.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(EngineError::InvalidConfig(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                self.dpi
            )));
        }
        let lengths = [
            ("module_width_mm", self.module_width_mm),
            ("module_height_mm", self.module_height_mm),
            ("quiet_zone_mm", self.quiet_zone_mm),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Convert a physical length to whole pixels at this resolution.
    pub fn mm_to_px(&self, mm: f32) -> u32 {
        (mm * self.dpi as f32 / MM_PER_INCH).round() as u32
    }

    /// Width of one narrow module in pixels, never below one.
    pub fn module_px(&self) -> u32 {
        self.mm_to_px(self.module_width_mm).max(1)
    }

    /// Bar height in pixels, never below one.
    pub fn bar_height_px(&self) -> u32 {
        self.mm_to_px(self.module_height_mm).max(1)
    }

    pub fn quiet_zone_px(&self) -> u32 {
        self.mm_to_px(self.quiet_zone_mm)
    }
}

/// Optional bounding box for the final image.
///
/// Either side may be left unset; an empty box means "keep natural size".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBox {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TargetBox {
    /// Build a box, rejecting explicit zero sides and sides above
    /// [`MAX_TARGET_SIDE`].
    pub fn new(width: Option<u32>, height: Option<u32>) -> Result<Self, EngineError> {
        let out_of_range =
            |side: Option<u32>| matches!(side, Some(v) if v == 0 || v > MAX_TARGET_SIDE);
        if out_of_range(width) || out_of_range(height) {
            return Err(EngineError::InvalidDimension {
                width: width.unwrap_or_default(),
                height: height.unwrap_or_default(),
            });
        }
        Ok(Self { width, height })
    }

    /// The no-resize box.
    pub const fn none() -> Self {
        Self {
            width: None,
            height: None,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}
