//! Fixed check layout drawn onto an RGBA canvas.
//!
//! Every element is rasterized into its own coverage mask and composited
//! with a multiply blend, so overlapping ink darkens instead of covering.

mod blend;
mod shapes;
mod text;

use ab_glyph::FontVec;
use image::{GrayImage, Rgba, RgbaImage};

use self::blend::multiply_mask;
use self::text::TextBox;

/// Canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1200;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 600;
/// White with partial alpha.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 100]);

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 128, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

const BORDER: (f32, f32, f32, f32) = (50.0, 50.0, 1100.0, 500.0);
const THIN_PEN: f32 = 2.0;

const STAR_CENTER: (f32, f32) = (150.0, 150.0);
const STAR_PRONGS: u32 = 5;
const STAR_INNER_RADIUS: f32 = 20.0;
const STAR_OUTER_RADIUS: f32 = 30.0;
const STAR_PEN: f32 = 3.0;

const SIGNATURE_LINES: [((f32, f32), (f32, f32)); 2] =
    [((100.0, 275.0), (1050.0, 275.0)), ((100.0, 365.0), (1050.0, 365.0))];

const AMOUNT_BOX: TextBox = TextBox { origin: (100.0, 200.0), wrap_width: 1000.0, size: 72.0 };
const AMOUNT_PEN: u8 = 2;

/// Draws checks with a preloaded display font.
pub struct CheckRenderer {
    font: FontVec,
}

impl CheckRenderer {
    /// Create a renderer that draws amounts with `font`.
    #[must_use]
    pub fn new(font: FontVec) -> Self {
        Self { font }
    }

    /// Render a complete check showing `amount`.
    ///
    /// The amount is not validated; text that does not fit is clipped.
    #[must_use]
    pub fn render(&self, amount: &str) -> RgbaImage {
        let mut canvas = blank_canvas();
        draw_decorations(&mut canvas);
        self.draw_amount(&mut canvas, amount);
        canvas
    }

    fn draw_amount(&self, canvas: &mut RgbaImage, amount: &str) {
        let mut fill = empty_mask();
        text::draw_coverage(&mut fill, &self.font, amount, AMOUNT_BOX);
        let stroke = text::outline(&fill, AMOUNT_PEN);
        multiply_mask(canvas, &fill, BLUE);
        multiply_mask(canvas, &stroke, BLACK);
    }
}

/// A fresh canvas filled with [`BACKGROUND`].
#[must_use]
pub fn blank_canvas() -> RgbaImage {
    RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)
}

/// Draw the border, star and signature lines. Independent of the amount.
pub fn draw_decorations(canvas: &mut RgbaImage) {
    let (x, y, w, h) = BORDER;
    let mut border = empty_mask();
    shapes::stroke_path(&mut border, &shapes::rectangle(x, y, w, h), THIN_PEN, true);
    multiply_mask(canvas, &border, BLACK);

    let star = shapes::star(STAR_CENTER, STAR_PRONGS, STAR_INNER_RADIUS, STAR_OUTER_RADIUS);
    let mut star_fill = empty_mask();
    shapes::fill_polygon(&mut star_fill, &star);
    multiply_mask(canvas, &star_fill, RED);
    let mut star_outline = empty_mask();
    shapes::stroke_path(&mut star_outline, &star, STAR_PEN, true);
    multiply_mask(canvas, &star_outline, GREEN);

    for (from, to) in SIGNATURE_LINES {
        let mut line = empty_mask();
        shapes::stroke_path(&mut line, &[from, to], THIN_PEN, false);
        multiply_mask(canvas, &line, BLACK);
    }
}

fn empty_mask() -> GrayImage {
    GrayImage::new(CANVAS_WIDTH, CANVAS_HEIGHT)
}

/// The bundled display font, for tests.
#[cfg(test)]
pub(crate) fn test_font() -> FontVec {
    FontVec::try_from_vec(include_bytes!("../../fonts/DejaVuSerif-BoldItalic.ttf").to_vec())
        .expect("bundled font parses")
}
