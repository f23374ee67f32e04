use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Minimum-area enclosing rectangle of a point set.
///
/// `corners` start at the corner with the smallest `x + y` and run
/// clockwise in a y-down frame; `width` is the length of the first edge
/// (`corners[0] -> corners[1]`) and `height` of the second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinAreaRect {
    pub corners: [Point2<f64>; 4],
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    /// Direction of the first edge, degrees in `(-180, 180]`.
    pub angle_deg: f64,
}

impl MinAreaRect {
    /// Derive the size and orientation of a rectangle from its four corners,
    /// given in any order.
    ///
    /// Corners from a rectangle fitter that snaps to the pixel grid are only
    /// approximately rectangular; the sides are measured along the first two
    /// edges after ordering.
    pub fn from_corners(corners: [Point2<f64>; 4]) -> Self {
        let corners = order_quad(corners);
        let e0 = corners[1] - corners[0];
        let e1 = corners[2] - corners[1];
        let center = Point2::new(
            corners.iter().map(|p| p.x).sum::<f64>() / 4.0,
            corners.iter().map(|p| p.y).sum::<f64>() / 4.0,
        );
        Self {
            corners,
            center,
            width: e0.norm(),
            height: e1.norm(),
            angle_deg: e0.y.atan2(e0.x).to_degrees(),
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Landscape rectangles are wider (first edge) than tall.
    #[inline]
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn corners_f32(&self) -> [Point2<f32>; 4] {
        self.corners.map(|p| Point2::new(p.x as f32, p.y as f32))
    }
}

fn signed_area(pts: &[Point2<f64>]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    0.5 * acc
}

/// Area centroid of a simple polygon.
///
/// Returns `None` for polygons with (near) zero area, where the centroid
/// is undefined.
pub fn polygon_centroid(pts: &[Point2<f64>]) -> Option<Point2<f64>> {
    let a = signed_area(pts);
    if a.abs() < 1e-9 {
        return None;
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    let k = 1.0 / (6.0 * a);
    Some(Point2::new(cx * k, cy * k))
}

/// Order four corners clockwise (y-down), starting from the one with the
/// smallest `x + y`.
pub fn order_quad(pts: [Point2<f64>; 4]) -> [Point2<f64>; 4] {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mut sorted = pts;
    sorted.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.total_cmp(&tb)
    });
    let start = (0..4)
        .min_by(|&i, &j| {
            let si = sorted[i].x + sorted[i].y;
            let sj = sorted[j].x + sorted[j].y;
            si.total_cmp(&sj).then(sorted[i].y.total_cmp(&sorted[j].y))
        })
        .unwrap_or(0);
    [0, 1, 2, 3].map(|k| sorted[(start + k) % 4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, s: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x, y),
            Point2::new(x + s, y),
            Point2::new(x + s, y + s),
            Point2::new(x, y + s),
        ]
    }

    #[test]
    fn centroid_of_square_is_its_center() {
        let mut sq = square(2.0, 3.0, 10.0);
        let c = polygon_centroid(&sq).unwrap();
        assert_relative_eq!(c.x, 7.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 8.0, epsilon = 1e-9);

        sq.reverse();
        let c = polygon_centroid(&sq).unwrap();
        assert_relative_eq!(c.x, 7.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn rect_from_shuffled_axis_aligned_corners() {
        let sq = square(10.0, 20.0, 30.0);
        let r = MinAreaRect::from_corners([sq[2], sq[0], sq[3], sq[1]]);
        assert_relative_eq!(r.area(), 900.0, epsilon = 1e-9);
        assert_eq!(r.corners[0], Point2::new(10.0, 20.0));
        assert_eq!(r.corners[1], Point2::new(40.0, 20.0));
        assert_relative_eq!(r.center.x, 25.0, epsilon = 1e-9);
        assert_relative_eq!(r.angle_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rect_from_rotated_corners() {
        let (w, h) = (120.0_f64, 60.0_f64);
        let t = 30.0_f64.to_radians();
        let (c, s) = (t.cos(), t.sin());
        let rot = |x: f64, y: f64| Point2::new(200.0 + c * x - s * y, 150.0 + s * x + c * y);
        let r = MinAreaRect::from_corners([
            rot(-w / 2.0, -h / 2.0),
            rot(w / 2.0, -h / 2.0),
            rot(w / 2.0, h / 2.0),
            rot(-w / 2.0, h / 2.0),
        ]);
        assert_relative_eq!(r.area(), w * h, epsilon = 1e-6);
        assert_relative_eq!(r.center.x, 200.0, epsilon = 1e-9);
        assert_relative_eq!(r.center.y, 150.0, epsilon = 1e-9);
        let (long, short) = (r.width.max(r.height), r.width.min(r.height));
        assert_relative_eq!(long, w, epsilon = 1e-6);
        assert_relative_eq!(short, h, epsilon = 1e-6);
    }

    #[test]
    fn collapsed_corners_have_zero_size() {
        let p = Point2::new(4.0, 4.0);
        let r = MinAreaRect::from_corners([p; 4]);
        assert_eq!(r.area(), 0.0);
        assert!(!r.is_landscape());
    }

    #[test]
    fn quad_ordering_is_clockwise_from_top_left() {
        let q = order_quad([
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 0.0),
        ]);
        assert_eq!(q[0], Point2::new(0.0, 0.0));
        assert_eq!(q[1], Point2::new(10.0, 0.0));
        assert_eq!(q[2], Point2::new(10.0, 10.0));
        assert_eq!(q[3], Point2::new(0.0, 10.0));
    }

    #[test]
    fn degenerate_polygons_have_no_centroid() {
        let line = [Point2::new(0.0, 0.0), Point2::new(5.0, 5.0)];
        assert!(polygon_centroid(&line).is_none());
        let collinear = [Point2::new(0.0, 0.0), Point2::new(5.0, 5.0), Point2::new(9.0, 9.0)];
        assert!(polygon_centroid(&collinear).is_none());
    }
}
