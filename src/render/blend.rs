//! Multiply compositing of coverage masks onto the canvas.

use image::{GrayImage, Rgba, RgbaImage};

/// Composite `color` onto `canvas` wherever `mask` has coverage.
///
/// Both images must share dimensions. Mask values are coverage in
/// `0..=255`; zero leaves the canvas pixel untouched.
pub fn multiply_mask(canvas: &mut RgbaImage, mask: &GrayImage, color: Rgba<u8>) {
    debug_assert_eq!(canvas.dimensions(), mask.dimensions());
    for (dst, coverage) in canvas.pixels_mut().zip(mask.pixels()) {
        let c = coverage.0[0];
        if c == 0 {
            continue;
        }
        *dst = multiply_pixel(*dst, color, f32::from(c) / 255.0);
    }
}

/// Blend `src` over `dst` with a multiply blend and source-over alpha.
///
/// `coverage` scales the source alpha (antialiased edges).
#[must_use]
pub fn multiply_pixel(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let a_s = coverage.clamp(0.0, 1.0) * unit(src.0[3]);
    let a_b = unit(dst.0[3]);
    let a_o = a_s + a_b * (1.0 - a_s);
    if a_o <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c_s = unit(src.0[i]);
        let c_b = unit(dst.0[i]);
        // Where the backdrop is transparent the source shows through unblended.
        let mixed = (1.0 - a_b) * c_s + a_b * (c_s * c_b);
        let c_o = (a_s * mixed + a_b * c_b * (1.0 - a_s)) / a_o;
        out[i] = to_byte(c_o);
    }
    out[3] = to_byte(a_o);
    Rgba(out)
}

fn unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn multiply_on_white_yields_source() {
        assert_eq!(multiply_pixel(WHITE, RED, 1.0), RED);
    }

    #[test]
    fn overlapping_ink_darkens() {
        // red * blue has no channel in common
        assert_eq!(multiply_pixel(RED, BLUE, 1.0), BLACK);
        assert_eq!(multiply_pixel(BLACK, WHITE, 1.0), BLACK);
    }

    #[test]
    fn zero_coverage_is_identity() {
        let dst = Rgba([10, 20, 30, 100]);
        assert_eq!(multiply_pixel(dst, RED, 0.0), dst);
    }

    #[test]
    fn translucent_background_becomes_opaque_under_ink() {
        let bg = Rgba([255, 255, 255, 100]);
        assert_eq!(multiply_pixel(bg, BLACK, 1.0), BLACK);
        assert_eq!(multiply_pixel(bg, RED, 1.0), RED);
    }

    #[test]
    fn transparent_backdrop_shows_source() {
        assert_eq!(multiply_pixel(Rgba([0, 0, 0, 0]), BLUE, 1.0), BLUE);
    }

    #[test]
    fn partial_coverage_blends_toward_source() {
        let out = multiply_pixel(WHITE, BLACK, 0.5);
        assert!(out.0[0] > 100 && out.0[0] < 160, "got {out:?}");
        assert_eq!(out.0[3], 255);
    }

    #[test]
    fn mask_only_touches_covered_pixels() {
        let mut canvas = RgbaImage::from_pixel(4, 1, WHITE);
        let mut mask = GrayImage::new(4, 1);
        mask.put_pixel(1, 0, Luma([255]));
        mask.put_pixel(2, 0, Luma([128]));

        multiply_mask(&mut canvas, &mask, BLACK);

        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
        assert_eq!(*canvas.get_pixel(1, 0), BLACK);
        assert!(canvas.get_pixel(2, 0).0[0] < 255);
        assert_eq!(*canvas.get_pixel(3, 0), WHITE);
    }
}
