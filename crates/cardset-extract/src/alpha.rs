//! Card silhouette transparency.
//!
//! The final alpha channel is the AND of two masks:
//! - a static template (per geometry) that clears a thin border band and
//!   four diagonal notches approximating the rounded corners,
//! - the card outline found in the frame, mapped into canonical
//!   coordinates and filled.

use crate::contour::PixelPoint;
use crate::AlphaParams;
use cardset_core::{CardGeometry, Homography, PixelBuffer};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use nalgebra::Point2;

const OPAQUE: u8 = 255;
const TRANSPARENT: u8 = 0;

/// Static border / corner template for one card geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaMask {
    template: GrayImage,
}

impl AlphaMask {
    pub fn new(geometry: &CardGeometry, params: AlphaParams) -> Self {
        Self {
            template: build_template(geometry.width, geometry.height, params),
        }
    }

    #[inline]
    pub fn template(&self) -> &GrayImage {
        &self.template
    }

    /// Alpha channel of one card: the frame outline mapped through
    /// `h_card_from_img`, filled, then clipped by the template.
    pub fn card_alpha(&self, outline: &[PixelPoint], h_card_from_img: &Homography) -> GrayImage {
        let mut alpha = filled_outline(
            self.template.width(),
            self.template.height(),
            outline,
            h_card_from_img,
        );
        for (a, t) in alpha.iter_mut().zip(self.template.iter()) {
            *a &= *t;
        }
        alpha
    }

    /// Attach `alpha` to a 3-channel canonical buffer.
    ///
    /// Both must have the template's size.
    pub fn compose(&self, rgb: &PixelBuffer, alpha: &GrayImage) -> RgbaImage {
        RgbaImage::from_fn(self.template.width(), self.template.height(), |x, y| {
            let p = rgb.pixel(x as usize, y as usize);
            Rgba([p[0], p[1], p[2], alpha.get_pixel(x, y)[0]])
        })
    }
}

fn build_template(width: u32, height: u32, params: AlphaParams) -> GrayImage {
    let t = params.border;
    let (w, h) = (width as f32, height as f32);
    let inset = (t * params.notch_inset_factor) as f32;
    let notches = [
        (Point2::new(inset, 0.0), Point2::new(0.0, inset)),
        (Point2::new(w - inset, 0.0), Point2::new(w, inset)),
        (Point2::new(0.0, h - inset), Point2::new(inset, h)),
        (Point2::new(w - inset, h), Point2::new(w, h - inset)),
    ];
    let half = (t as f32 / 2.0).max(0.5);

    GrayImage::from_fn(width, height, |x, y| {
        let in_border = x < t || y < t || x + t >= width || y + t >= height;
        let p = Point2::new(x as f32, y as f32);
        let in_notch = t > 0
            && notches
                .iter()
                .any(|(a, b)| distance_to_segment(p, *a, *b) <= half);
        if in_border || in_notch {
            Luma([TRANSPARENT])
        } else {
            Luma([OPAQUE])
        }
    })
}

fn distance_to_segment(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f32::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn filled_outline(
    width: u32,
    height: u32,
    outline: &[PixelPoint],
    h_card_from_img: &Homography,
) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    let mut poly: Vec<Point<i32>> = Vec::with_capacity(outline.len());
    for p in outline {
        let q = h_card_from_img.apply_f64(Point2::new(p.x as f64, p.y as f64));
        if !(q.x.is_finite() && q.y.is_finite()) {
            continue;
        }
        let q = Point::new(q.x as i32, q.y as i32);
        if poly.last() != Some(&q) {
            poly.push(q);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(&mut mask, &poly, Luma([OPAQUE]));
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardset_core::CardSpec;

    fn geometry() -> CardGeometry {
        CardGeometry::new(&CardSpec::french(), 2).unwrap()
    }

    fn box_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<PixelPoint> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn template_is_idempotent() {
        let g = geometry();
        let a = AlphaMask::new(&g, AlphaParams::default());
        let b = AlphaMask::new(&g, AlphaParams::default());
        assert_eq!(a.template().as_raw(), b.template().as_raw());
        assert_eq!(a, b);
    }

    #[test]
    fn template_clears_border_and_corner_notches() {
        let g = geometry();
        let m = AlphaMask::new(&g, AlphaParams::default());
        let t = m.template();
        let (w, h) = (g.width, g.height);
        assert_eq!(t.dimensions(), (w, h));

        // border band of thickness 2
        for (x, y) in [(0, 50), (1, 50), (w - 1, 50), (w - 2, 50), (50, 0), (50, h - 1)] {
            assert_eq!(t.get_pixel(x, y)[0], TRANSPARENT, "({x},{y})");
        }
        // notch diagonal from (6, 0) to (0, 6)
        assert_eq!(t.get_pixel(3, 3)[0], TRANSPARENT);
        assert_eq!(t.get_pixel(w - 4, 3)[0], TRANSPARENT);
        assert_eq!(t.get_pixel(3, h - 4)[0], TRANSPARENT);
        assert_eq!(t.get_pixel(w - 3, h - 3)[0], TRANSPARENT);
        // just inside the border, away from notches
        assert_eq!(t.get_pixel(2, 50)[0], OPAQUE);
        assert_eq!(t.get_pixel(w / 2, h / 2)[0], OPAQUE);
        assert_eq!(t.get_pixel(8, 8)[0], OPAQUE);
    }

    #[test]
    fn card_alpha_is_outline_and_template() {
        let g = geometry();
        let m = AlphaMask::new(&g, AlphaParams::default());
        let (w, h) = (g.width as i32, g.height as i32);

        // outline covering the whole card: alpha equals the template
        let full = m.card_alpha(&box_outline(-5, -5, w + 5, h + 5), &Homography::identity());
        assert_eq!(full.as_raw(), m.template().as_raw());

        // outline covering the left half only
        let half = m.card_alpha(&box_outline(0, 0, w / 2, h), &Homography::identity());
        assert_eq!(half.get_pixel(20, 50)[0], OPAQUE);
        assert_eq!(half.get_pixel((w - 20) as u32, 50)[0], TRANSPARENT);
    }

    #[test]
    fn degenerate_outline_gives_transparent_card() {
        let m = AlphaMask::new(&geometry(), AlphaParams::default());
        let line = vec![Point::new(0, 0), Point::new(10, 10), Point::new(0, 0)];
        let alpha = m.card_alpha(&line, &Homography::identity());
        assert!(alpha.iter().all(|&a| a == TRANSPARENT));
    }

    #[test]
    fn compose_attaches_alpha() {
        let g = geometry();
        let m = AlphaMask::new(&g, AlphaParams::default());
        let rgb = PixelBuffer {
            width: g.width as usize,
            height: g.height as usize,
            channels: 3,
            data: vec![7; (g.width * g.height * 3) as usize],
        };
        let out = m.compose(&rgb, m.template());
        assert_eq!(out.dimensions(), (g.width, g.height));
        assert_eq!(out.get_pixel(0, 0).0, [7, 7, 7, TRANSPARENT]);
        assert_eq!(out.get_pixel(g.width / 2, g.height / 2).0, [7, 7, 7, OPAQUE]);
    }
}
