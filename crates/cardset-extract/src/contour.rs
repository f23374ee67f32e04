//! Card outline localisation.
//!
//! Pipeline: bilateral smoothing (edge preserving) -> Canny -> external
//! outlines -> largest outline -> minimum-area rectangle -> rectangularity
//! test. The card is assumed to dominate the frame.

use crate::{ContourParams, Rejection};
use cardset_core::MinAreaRect;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;
use imageproc::geometry::{contour_area, min_area_rect};
use imageproc::morphology::dilate;
use imageproc::point::Point;
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Integer pixel coordinate as produced by contour tracing.
pub type PixelPoint = Point<i32>;

/// How the fitted rectangle lies in the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// First rectangle edge is the short one: maps onto the card's top edge.
    Upright,
    /// First rectangle edge is the long one: the card lies on its side.
    Rotated,
}

/// Dominant outline of a frame together with its rectangle fit.
#[derive(Clone, Debug)]
pub struct ContourCandidate {
    /// Outline in frame pixel coordinates, in tracing order.
    pub outline: Vec<PixelPoint>,
    pub rect: MinAreaRect,
    /// Area enclosed by `outline`.
    pub area: f64,
    /// `area / rect.area()`.
    pub score: f64,
}

impl ContourCandidate {
    /// Fit the minimum-area rectangle to `outline` and score it. Rectangle
    /// corners snap outward to whole pixels.
    ///
    /// Fails with [`Rejection::DegenerateRectangle`] when either rectangle side
    /// is shorter than `min_rect_side`; the rectangularity score itself is not
    /// checked here.
    pub fn fit(outline: Vec<PixelPoint>, min_rect_side: f64) -> Result<Self, Rejection> {
        if outline.is_empty() {
            return Err(Rejection::DegenerateRectangle {
                width: 0.0,
                height: 0.0,
            });
        }
        let rect = MinAreaRect::from_corners(to_f64(min_area_rect(&outline)));
        if rect.width < min_rect_side || rect.height < min_rect_side {
            return Err(Rejection::DegenerateRectangle {
                width: rect.width,
                height: rect.height,
            });
        }

        let area = contour_area(&outline);
        let score = area / rect.area();
        Ok(Self {
            outline,
            rect,
            area,
            score,
        })
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        if self.rect.is_landscape() {
            Orientation::Rotated
        } else {
            Orientation::Upright
        }
    }

    /// Rectangle corners, clockwise from the one nearest the frame origin.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        self.rect.corners_f32()
    }
}

/// Finds the card outline in a frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContourDetector {
    params: ContourParams,
}

impl ContourDetector {
    pub fn new(params: ContourParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ContourParams {
        &self.params
    }

    /// Smoothed Canny edge map of a grayscale frame.
    pub fn edge_map(&self, gray: &GrayImage) -> GrayImage {
        let p = &self.params;
        let smooth = bilateral_filter(
            gray,
            p.bilateral_diameter,
            p.bilateral_sigma_color,
            p.bilateral_sigma_space,
        );
        let edges = canny(&smooth, p.canny_low, p.canny_high);
        if p.edge_dilation == 0 {
            edges
        } else {
            dilate(&edges, Norm::LInf, p.edge_dilation)
        }
    }

    /// Locate the dominant outline and validate that it is a rectangle.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, gray), fields(width = gray.width(), height = gray.height()))
    )]
    pub fn detect(&self, gray: &GrayImage) -> Result<ContourCandidate, Rejection> {
        let edges = self.edge_map(gray);
        let outline = largest_outline(external_outlines(&edges)).ok_or(Rejection::NoOutline)?;

        let candidate = ContourCandidate::fit(outline, self.params.min_rect_side)?;
        if !self.params.is_rectangular(candidate.score) {
            return Err(Rejection::NotRectangular {
                score: candidate.score,
            });
        }
        log::trace!(
            "card outline: {} points, score {:.3}, rect {:.1}x{:.1} @ {:.1} deg",
            candidate.outline.len(),
            candidate.score,
            candidate.rect.width,
            candidate.rect.height,
            candidate.rect.angle_deg
        );
        Ok(candidate)
    }
}

/// Outer borders of top-level components of a binary map (non-zero = foreground).
pub fn external_outlines(binary: &GrayImage) -> Vec<Vec<PixelPoint>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Outline enclosing the greatest area.
pub fn largest_outline(outlines: Vec<Vec<PixelPoint>>) -> Option<Vec<PixelPoint>> {
    outlines
        .into_iter()
        .map(|o| (contour_area(&o), o))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, o)| o)
}

fn to_f64(corners: [PixelPoint; 4]) -> [Point2<f64>; 4] {
    corners.map(|p| Point2::new(p.x as f64, p.y as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_polygon_mut;

    fn frame_with_polygon(w: u32, h: u32, poly: &[PixelPoint]) -> GrayImage {
        let mut img = GrayImage::from_pixel(w, h, Luma([30]));
        draw_polygon_mut(&mut img, poly, Luma([220]));
        img
    }

    fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<PixelPoint> {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0..y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn rectangular_outline_scores_near_one() {
        let c = ContourCandidate::fit(rect_outline(10, 20, 70, 60), 4.0).unwrap();
        assert!((c.area - 60.0 * 40.0).abs() < 1e-9);
        // fitted corners snap outward to the pixel grid
        assert!(c.score > 0.95 && c.score <= 1.0, "score {}", c.score);
        assert!((c.rect.width - 60.0).abs() <= 1.0, "width {}", c.rect.width);
        assert!((c.rect.height - 40.0).abs() <= 1.0, "height {}", c.rect.height);
        assert_eq!(c.orientation(), Orientation::Rotated);
    }

    #[test]
    fn empty_outline_is_degenerate() {
        assert!(matches!(
            ContourCandidate::fit(Vec::new(), 4.0),
            Err(Rejection::DegenerateRectangle { .. })
        ));
    }

    #[test]
    fn flat_outline_is_degenerate() {
        let line: Vec<PixelPoint> = (0..50).map(|x| Point::new(x, 7)).collect();
        assert!(matches!(
            ContourCandidate::fit(line, 4.0),
            Err(Rejection::DegenerateRectangle { .. })
        ));

        let thin = rect_outline(0, 0, 80, 2);
        assert!(matches!(
            ContourCandidate::fit(thin, 4.0),
            Err(Rejection::DegenerateRectangle { height, .. }) if height < 4.0
        ));
    }

    #[test]
    fn detects_portrait_card_on_uniform_background() {
        let card = [
            Point::new(100, 40),
            Point::new(200, 40),
            Point::new(200, 190),
            Point::new(100, 190),
        ];
        let frame = frame_with_polygon(320, 240, &card);
        let c = ContourDetector::default().detect(&frame).expect("card found");
        assert!(c.score > 0.95);
        assert_eq!(c.orientation(), Orientation::Upright);
        let (w, h) = (c.rect.width, c.rect.height);
        assert!((w - 100.0).abs() < 4.0, "width {w}");
        assert!((h - 150.0).abs() < 4.0, "height {h}");
    }

    #[test]
    fn edge_dilation_grows_the_fitted_rect() {
        let card = [
            Point::new(100, 40),
            Point::new(200, 40),
            Point::new(200, 190),
            Point::new(100, 190),
        ];
        let frame = frame_with_polygon(320, 240, &card);
        assert_eq!(ContourParams::default().edge_dilation, 0);
        let plain = ContourDetector::default().detect(&frame).unwrap();
        let dilated = ContourDetector::new(ContourParams {
            edge_dilation: 1,
            ..ContourParams::default()
        })
        .detect(&frame)
        .unwrap();
        assert!(
            dilated.rect.width >= plain.rect.width + 1.0,
            "{} vs {}",
            dilated.rect.width,
            plain.rect.width
        );
        assert!(dilated.rect.height >= plain.rect.height + 1.0);
    }

    #[test]
    fn triangle_outline_scores_about_one_half() {
        // right triangle traced along its legs and hypotenuse
        let mut outline: Vec<PixelPoint> = (0..=60).map(|x| Point::new(x, 0)).collect();
        outline.extend((1..=60).map(|y| Point::new(60, y)));
        outline.extend((1..60).rev().map(|k| Point::new(k, k)));
        let c = ContourCandidate::fit(outline, 4.0).unwrap();
        assert!((c.score - 0.5).abs() < 0.02, "score {}", c.score);
        assert!(!ContourParams::default().is_rectangular(c.score));
    }

    #[test]
    fn triangle_frame_is_rejected() {
        let tri = [Point::new(40, 200), Point::new(160, 20), Point::new(280, 200)];
        let frame = frame_with_polygon(320, 240, &tri);
        match ContourDetector::default().detect(&frame) {
            Err(Rejection::NotRectangular { score }) => assert!(score < 0.7, "score {score}"),
            Err(Rejection::DegenerateRectangle { .. }) => {}
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn empty_frame_has_no_outline() {
        let frame = GrayImage::from_pixel(64, 64, Luma([90]));
        assert!(matches!(
            ContourDetector::default().detect(&frame),
            Err(Rejection::NoOutline)
        ));
    }
}
