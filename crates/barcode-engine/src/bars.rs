//! Code-128 bar rendering (bars only, no caption).

use barcoders::sym::code128::Code128;
use image::RgbImage;
use tracing::debug;

use crate::config::{RenderConfig, ensure_canvas_size};
use crate::{BLACK, EngineError, WHITE};

/// Selector for Code-128 character set B, which covers printable ASCII.
const CHARSET_B: char = 'Ɓ';

/// A trimmed, non-empty value that Code-128 set B can encode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarcodeValue(String);

impl BarcodeValue {
    /// Validate and wrap a raw barcode string.
    ///
    /// Surrounding whitespace is trimmed. Empty values and values with
    /// characters outside printable ASCII are rejected.
    pub fn new(raw: &str) -> Result<Self, EngineError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(EngineError::Encoding("barcode value is empty".into()));
        }
        if let Some(bad) = value.chars().find(|c| !is_encodable(*c)) {
            return Err(EngineError::Encoding(format!(
                "character {bad:?} cannot be encoded as Code-128"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BarcodeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_encodable(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Render the bar pattern for `value` as a white RGB image with black bars.
///
/// The quiet zone is added on both sides. The encoder never draws a
/// caption; that is the compositor's job.
pub fn render_bars(value: &BarcodeValue, config: &RenderConfig) -> Result<RgbImage, EngineError> {
    config.validate()?;

    let symbol = Code128::new(format!("{CHARSET_B}{}", value.as_str()))
        .map_err(|e| EngineError::Encoding(format!("{value}: {e}")))?;
    let modules = symbol.encode();
    if modules.is_empty() {
        return Err(EngineError::Encoding(format!(
            "{value}: encoder produced no modules"
        )));
    }

    let module_px = config.module_px();
    let quiet_px = config.quiet_zone_px();
    let height = config.bar_height_px();
    let width = u32::try_from(modules.len())
        .ok()
        .and_then(|n| n.checked_mul(module_px))
        .and_then(|w| quiet_px.checked_mul(2).and_then(|q| w.checked_add(q)))
        .ok_or(EngineError::InvalidDimension {
            width: u32::MAX,
            height,
        })?;
    ensure_canvas_size(width, height)?;

    let mut img = RgbImage::from_pixel(width, height, WHITE);
    for (i, _) in modules.iter().enumerate().filter(|(_, m)| **m == 1) {
        let x0 = quiet_px + i as u32 * module_px;
        for x in x0..x0 + module_px {
            for y in 0..height {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    debug!(
        value = %value,
        modules = modules.len(),
        width,
        height,
        "Rendered barcode bars"
    );

    Ok(img)
}
