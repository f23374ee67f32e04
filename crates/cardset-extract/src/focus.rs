//! Blur rejection via the variance of the Laplacian.

use crate::{FocusParams, Rejection};
use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::filter3x3;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[rustfmt::skip]
const LAPLACIAN_4: [i32; 9] = [
    0,  1, 0,
    1, -4, 1,
    0,  1, 0];

/// 4-neighbour Laplacian, padded by continuity.
fn laplacian(gray: &GrayImage) -> Image<Luma<i16>> {
    filter3x3(gray, &LAPLACIAN_4)
}

/// Rejects frames that are too blurry to be worth localising a card in.
#[derive(Clone, Copy, Debug, Default)]
pub struct FocusFilter {
    params: FocusParams,
}

impl FocusFilter {
    pub fn new(params: FocusParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &FocusParams {
        &self.params
    }

    /// Sharpness score: population variance of the 4-neighbour Laplacian.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(gray), fields(width = gray.width(), height = gray.height()))
    )]
    pub fn score(gray: &GrayImage) -> f64 {
        let lap = laplacian(gray);
        let n = lap.as_raw().len();
        if n == 0 {
            return 0.0;
        }
        let mean = lap.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        lap.as_raw()
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64
    }

    /// Accept the frame iff its score reaches `min_focus`; returns the score.
    pub fn check(&self, gray: &GrayImage) -> Result<f64, Rejection> {
        let focus = Self::score(gray);
        if focus >= self.params.min_focus {
            Ok(focus)
        } else {
            Err(Rejection::TooBlurry {
                focus,
                min_focus: self.params.min_focus,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([230])
            } else {
                Luma([20])
            }
        })
    }

    #[test]
    fn flat_image_has_zero_focus() {
        let flat = GrayImage::from_pixel(64, 48, Luma([128]));
        assert_eq!(FocusFilter::score(&flat), 0.0);
        assert!(matches!(
            FocusFilter::default().check(&flat),
            Err(Rejection::TooBlurry { .. })
        ));
    }

    #[test]
    fn laplacian_of_single_bright_pixel() {
        let mut img = GrayImage::from_pixel(7, 7, Luma([10]));
        img.put_pixel(3, 3, Luma([110]));
        let lap = laplacian(&img);
        assert_eq!(lap.get_pixel(3, 3)[0], -400);
        assert_eq!(lap.get_pixel(2, 3)[0], 100);
        assert_eq!(lap.get_pixel(3, 4)[0], 100);
        assert_eq!(lap.get_pixel(2, 2)[0], 0);
        assert_eq!(lap.get_pixel(0, 0)[0], 0);

        // 5 non-zero responses out of 49: mean 0, sum of squares 160000 + 4 * 10000.
        let expected = 200_000.0 / 49.0;
        assert!((FocusFilter::score(&img) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharp_pattern_scores_higher_than_blurred_one() {
        let sharp = checkerboard(96, 8);
        let blurred = imageproc::filter::gaussian_blur_f32(&sharp, 3.0);
        let s = FocusFilter::score(&sharp);
        let b = FocusFilter::score(&blurred);
        assert!(s > 120.0, "sharp score {s}");
        assert!(b < s, "blurred {b} vs sharp {s}");
    }

    #[test]
    fn threshold_is_inclusive() {
        let img = checkerboard(64, 4);
        let score = FocusFilter::score(&img);
        assert!(score > 0.0);

        let at = FocusFilter::new(FocusParams { min_focus: score });
        assert_eq!(at.check(&img), Ok(score));

        let just_above = f64::from_bits(score.to_bits() + 1);
        let above = FocusFilter::new(FocusParams {
            min_focus: just_above,
        });
        assert!(matches!(
            above.check(&img),
            Err(Rejection::TooBlurry { focus, min_focus }) if focus == score && min_focus == just_above
        ));
    }
}
