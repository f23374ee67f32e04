//! Debug overlays: polygons drawn over a copy of an image.

use image::{DynamicImage, ImageResult, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_polygon_mut;
use imageproc::point::Point;
use nalgebra::Point2;
use std::path::Path;

pub const OVERLAY_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// RGBA copy of `image` with every polygon outlined in green.
///
/// Repeated and closing vertices are dropped; polygons left with fewer than
/// two distinct points are ignored.
pub fn render_overlay(image: &DynamicImage, polygons: &[Vec<Point2<f32>>]) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    for poly in polygons {
        if let Some(pts) = drawable_outline(poly) {
            draw_hollow_polygon_mut(&mut canvas, &pts, OVERLAY_COLOR);
        }
    }
    canvas
}

fn drawable_outline(poly: &[Point2<f32>]) -> Option<Vec<Point<f32>>> {
    let mut pts: Vec<Point<f32>> = poly.iter().map(|p| Point::new(p.x, p.y)).collect();
    pts.dedup();
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    (pts.len() >= 2).then_some(pts)
}

/// Render and write an overlay as PNG.
pub fn save_overlay(
    path: impl AsRef<Path>,
    image: &DynamicImage,
    polygons: &[Vec<Point2<f32>>],
) -> ImageResult<()> {
    render_overlay(image, polygons).save(path)
}
