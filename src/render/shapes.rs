//! Vector shapes rasterized into coverage masks.

use std::f32::consts::PI;

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

const INK: Luma<u8> = Luma([255]);

/// A point in canvas coordinates.
pub type Vertex = (f32, f32);

/// Corners of an axis-aligned rectangle, clockwise from the top left.
#[must_use]
pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Vec<Vertex> {
    vec![(x, y), (x + width, y), (x + width, y + height), (x, y + height)]
}

/// Vertices of a star with `prongs` points, alternating outer and inner
/// radius, starting with an outer point straight below the center.
#[must_use]
pub fn star(center: Vertex, prongs: u32, inner_radius: f32, outer_radius: f32) -> Vec<Vertex> {
    let count = prongs * 2;
    let step = PI / prongs as f32;
    (0..count)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            let angle = PI / 2.0 + step * i as f32;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

/// Fill the interior of a closed polygon.
pub fn fill_polygon(mask: &mut GrayImage, vertices: &[Vertex]) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(vertices.len());
    for &(x, y) in vertices {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return;
    }
    draw_polygon_mut(mask, &points, INK);
}

/// Stroke a path with a pen of the given width, centered on the path.
///
/// Joins are rounded. When `closed` is set the last vertex connects back
/// to the first.
pub fn stroke_path(mask: &mut GrayImage, vertices: &[Vertex], width: f32, closed: bool) {
    if vertices.is_empty() {
        return;
    }
    for pair in vertices.windows(2) {
        stroke_segment(mask, pair[0], pair[1], width);
    }
    if closed && vertices.len() > 2 {
        stroke_segment(mask, vertices[vertices.len() - 1], vertices[0], width);
    }

    let radius = (width / 2.0).round() as i32;
    if radius > 0 {
        for &(x, y) in vertices {
            draw_filled_circle_mut(mask, (x.round() as i32, y.round() as i32), radius, INK);
        }
    }
}

fn stroke_segment(mask: &mut GrayImage, from: Vertex, to: Vertex, width: f32) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= f32::EPSILON {
        return;
    }
    let half = width / 2.0;
    let (nx, ny) = (-dy / length * half, dx / length * half);
    let quad = [
        (from.0 + nx, from.1 + ny),
        (to.0 + nx, to.1 + ny),
        (to.0 - nx, to.1 - ny),
        (from.0 - nx, from.1 - ny),
    ];
    fill_polygon(mask, &quad);
}
