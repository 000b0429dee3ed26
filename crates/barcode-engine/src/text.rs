//! Caption text measurement and drawing.
//!
//! An installed outline font is used when one can be found. Otherwise the
//! built-in 8x8 bitmap font takes over, so rendering never depends on the
//! host's font files.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

/// Caption font size in pixels.
pub const CAPTION_FONT_PX: f32 = 40.0;

/// Glyph cell size of the built-in bitmap font.
const BITMAP_CELL: u32 = 8;

/// Font used to draw captions.
pub enum CaptionFont {
    Outline(FontVec),
    Bitmap,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("CaptionFont::Outline"),
            Self::Bitmap => f.write_str("CaptionFont::Bitmap"),
        }
    }
}

impl CaptionFont {
    /// Probe for a usable outline font, falling back to the bitmap font.
    pub fn load(preferred: Option<&Path>) -> Self {
        match load_preferred_font(preferred) {
            Some(font) => Self::Outline(font),
            None => {
                tracing::info!("No outline font available, using built-in bitmap font");
                Self::Bitmap
            }
        }
    }

    /// Pixel size of `text` drawn at `px` size, as (width, height).
    pub fn measure(&self, px: f32, text: &str) -> (u32, u32) {
        match self {
            Self::Outline(font) => {
                let scale = PxScale::from(px);
                (
                    measure_text_width(font, scale, text),
                    line_height(font, scale),
                )
            }
            Self::Bitmap => {
                let cell = BITMAP_CELL * bitmap_scale(px);
                (text.chars().count() as u32 * cell, cell)
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn draw(&self, img: &mut RgbImage, px: f32, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match self {
            Self::Outline(font) => draw_text_mut(img, color, x, y, PxScale::from(px), font, text),
            Self::Bitmap => draw_bitmap_text(img, bitmap_scale(px), x, y, text, color),
        }
    }
}

/// Try the caller's font first, then well-known system fonts.
pub fn load_preferred_font(preferred: Option<&Path>) -> Option<FontVec> {
    let candidates = preferred
        .into_iter()
        .chain(system_font_candidates().iter().map(|p| Path::new(*p)));

    for path in candidates {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                tracing::info!(path = %path.display(), "Using outline font for captions");
                return Some(font);
            }
            Err(_) => {
                tracing::warn!(path = %path.display(), "Ignoring unparseable font file");
            }
        }
    }
    None
}

fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Menlo.ttc",
            "/System/Library/Fonts/Supplemental/Courier New.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &[
            "C:\\Windows\\Fonts\\consola.ttf",
            "C:\\Windows\\Fonts\\cour.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
        ]
    }
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width(font: &impl Font, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Height of one line of text (ascent to descent).
pub fn line_height(font: &impl Font, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent()).ceil() as u32
}

fn bitmap_scale(px: f32) -> u32 {
    ((px / BITMAP_CELL as f32).round() as u32).max(1)
}

fn draw_bitmap_text(img: &mut RgbImage, scale: u32, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    let cell = (BITMAP_CELL * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x + i as i32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if *bits & (1u8 << col) == 0 {
                    continue;
                }
                let px = origin_x + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                fill_block(img, px, py, scale, color);
            }
        }
    }
}

fn fill_block(img: &mut RgbImage, x: i32, y: i32, size: u32, color: Rgb<u8>) {
    for dy in 0..size as i32 {
        for dx in 0..size as i32 {
            let (tx, ty) = (x + dx, y + dy);
            if tx >= 0 && ty >= 0 && (tx as u32) < img.width() && (ty as u32) < img.height() {
                img.put_pixel(tx as u32, ty as u32, color);
            }
        }
    }
}
