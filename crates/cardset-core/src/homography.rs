use crate::{sample_bilinear_u8, ImageView, PixelBuffer};
use nalgebra::{Matrix3, Point2, RowSVector, SMatrix, SVector, Vector2, Vector3};

/// Planar projective transform acting on homogeneous 2-D points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let q = self.apply_f64(Point2::new(p.x as f64, p.y as f64));
        Point2::new(q.x as f32, q.y as f32)
    }

    #[inline]
    pub fn apply_f64(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        Point2::new(v[0] / w, v[1] / w)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

// Similarity that moves the centroid of `pts` to the origin with mean radius sqrt(2).
fn conditioning(pts: &[Point2<f32>; 4]) -> Matrix3<f64> {
    let pts = pts.map(|p| Vector2::new(p.x as f64, p.y as f64));
    let centroid = pts.iter().sum::<Vector2<f64>>() / 4.0;
    let spread = pts.iter().map(|p| (p - centroid).norm()).sum::<f64>() / 4.0;
    let s = if spread > 1e-12 {
        std::f64::consts::SQRT_2 / spread
    } else {
        1.0
    };
    Matrix3::new(
        s, 0.0, -s * centroid.x, //
        0.0, s, -s * centroid.y, //
        0.0, 0.0, 1.0,
    )
}

fn condition(t: &Matrix3<f64>, p: Point2<f32>) -> (f64, f64) {
    let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
    (v.x, v.y)
}

// Any three corners (nearly) collinear, relative to the quad's diameter.
fn is_degenerate_quad(pts: &[Point2<f32>; 4]) -> bool {
    let d = |a: Point2<f32>, b: Point2<f32>| (b - a).cast::<f64>();
    let diameter2 = (0..4)
        .flat_map(|i| (i + 1..4).map(move |j| (i, j)))
        .map(|(i, j)| d(pts[i], pts[j]).norm_squared())
        .fold(0.0_f64, f64::max);
    if diameter2 < 1e-12 {
        return true;
    }
    [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
        .iter()
        .any(|&[a, b, c]| {
            let (u, v) = (d(pts[a], pts[b]), d(pts[a], pts[c]));
            (u.x * v.y - u.y * v.x).abs() / diameter2 < 1e-6
        })
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when three points of either quad are (nearly) collinear.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    if is_degenerate_quad(src) || is_degenerate_quad(dst) {
        return None;
    }
    let t_src = conditioning(src);
    let t_dst = conditioning(dst);

    // h33 fixed to 1; each correspondence contributes one row for u and one for v
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (s, d)) in src.iter().zip(dst).enumerate() {
        let (x, y) = condition(&t_src, *s);
        let (u, v) = condition(&t_dst, *d);
        let row_u = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y];
        let row_v = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y];
        a.set_row(2 * k, &RowSVector::<f64, 8>::from_row_slice(&row_u));
        a.set_row(2 * k + 1, &RowSVector::<f64, 8>::from_row_slice(&row_v));
        b[2 * k] = u;
        b[2 * k + 1] = v;
    }

    let x = a.lu().solve(&b)?;
    let conditioned = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = t_dst.try_inverse()? * conditioned * t_src;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 || h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Homography::new(h / scale))
}

/// Resample `src` into an `out_w x out_h` buffer.
///
/// `h_src_from_dst` maps output pixel coordinates back into the source;
/// samples falling outside the source are black.
pub fn warp_perspective(
    src: &ImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: usize,
    out_h: usize,
) -> PixelBuffer {
    let ch = src.channels;
    let mut out = vec![0u8; out_w * out_h * ch];

    for y in 0..out_h {
        for x in 0..out_w {
            let ps = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            let base = (y * out_w + x) * ch;
            for c in 0..ch {
                out[base + c] = sample_bilinear_u8(src, ps.x, ps.y, c);
            }
        }
    }

    PixelBuffer {
        width: out_w,
        height: out_h,
        channels: ch,
        data: out,
    }
}
