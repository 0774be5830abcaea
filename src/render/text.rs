//! Wrapped text layout and glyph coverage.

use ab_glyph::{point, Font, GlyphId, PxScale, PxScaleFont, ScaleFont};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Where and how large to lay out a block of text.
#[derive(Debug, Clone, Copy)]
pub struct TextBox {
    /// Top-left corner of the first line box.
    pub origin: (f32, f32),
    /// Lines wrap before exceeding this width.
    pub wrap_width: f32,
    /// Font size in pixels.
    pub size: f32,
}

/// Tabs advance by this many spaces.
const TAB_SPACES: f32 = 4.0;

/// Break `text` into lines no wider than `wrap_width` where possible.
///
/// Text is kept literally: leading indentation, runs of spaces and tabs
/// stay inside a line. Only the whitespace run at a wrap point is dropped.
/// Explicit newlines always break. A single word wider than the wrap width
/// keeps its own line and overflows.
pub fn wrap_lines<F: Font>(font: &PxScaleFont<&F>, text: &str, wrap_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut rest = paragraph;
        while !rest.is_empty() {
            let word_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
            let (separator, tail) = rest.split_at(word_start);
            let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
            let (word, tail) = tail.split_at(word_end);
            rest = tail;

            let candidate = format!("{current}{separator}{word}");
            let starts_line = current.chars().all(char::is_whitespace);
            if word.is_empty() || starts_line || line_width(font, &candidate) <= wrap_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

/// Horizontal advance of `ch`, or `None` for control characters that take
/// no space.
fn advance<F: Font>(font: &PxScaleFont<&F>, ch: char) -> Option<f32> {
    match ch {
        '\t' => Some(font.h_advance(font.glyph_id(' ')) * TAB_SPACES),
        c if c.is_control() => None,
        c => Some(font.h_advance(font.glyph_id(c))),
    }
}

/// Advance width of a single line, kerning included.
pub fn line_width<F: Font>(font: &PxScaleFont<&F>, line: &str) -> f32 {
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for ch in line.chars() {
        let Some(step) = advance(font, ch) else {
            continue;
        };
        if ch.is_whitespace() {
            previous = None;
        } else {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                width += font.kern(prev, id);
            }
            previous = Some(id);
        }
        width += step;
    }
    width
}

/// Rasterize `text` into `mask` as glyph coverage, left aligned.
///
/// Coverage outside the mask is clipped.
pub fn draw_coverage<F: Font>(mask: &mut GrayImage, font: &F, text: &str, layout: TextBox) {
    let scale = PxScale::from(layout.size);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();
    let (width, height) = mask.dimensions();

    for (row, line) in wrap_lines(&scaled, text, layout.wrap_width).iter().enumerate() {
        let baseline = layout.origin.1 + scaled.ascent() + line_height * row as f32;
        let mut caret = layout.origin.0;
        let mut previous: Option<GlyphId> = None;

        for ch in line.chars() {
            let Some(step) = advance(&scaled, ch) else {
                continue;
            };
            if ch.is_whitespace() {
                caret += step;
                previous = None;
                continue;
            }
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += step;
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    return;
                }
                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = mask.get_pixel_mut(x as u32, y as u32);
                pixel.0[0] = pixel.0[0].max(value);
            });
        }
    }
}

/// Band of width `pen` centered on the edge of the inked area in `mask`.
#[must_use]
pub fn outline(mask: &GrayImage, pen: u8) -> GrayImage {
    let reach = (pen / 2).max(1);
    let outer = dilate(mask, Norm::LInf, reach);
    let inner = erode(mask, Norm::LInf, reach);
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let edge = outer.get_pixel(x, y).0[0] > 0 && inner.get_pixel(x, y).0[0] == 0;
        Luma([if edge { 255 } else { 0 }])
    })
}
