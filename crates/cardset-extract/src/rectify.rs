//! Perspective rectification of a located card into the canonical frame.

use crate::contour::{ContourCandidate, Orientation};
use crate::Rejection;
use cardset_core::{
    homography_from_4pt, warp_perspective, CardGeometry, Homography, ImageView, PixelBuffer,
};
use image::RgbImage;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Projective mapping from frame pixels onto the canonical card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectification {
    /// Maps frame coordinates to canonical card coordinates.
    pub h_card_from_img: Homography,
    /// Maps canonical card coordinates back into the frame.
    pub h_img_from_card: Homography,
    /// Frame corners the mapping was estimated from.
    pub corners: [Point2<f32>; 4],
    pub orientation: Orientation,
}

/// Warps located cards into `geometry.width x geometry.height` portrait buffers.
#[derive(Clone, Debug, Default)]
pub struct CardRectifier {
    geometry: CardGeometry,
}

impl CardRectifier {
    pub fn new(geometry: CardGeometry) -> Self {
        Self { geometry }
    }

    #[inline]
    pub fn geometry(&self) -> &CardGeometry {
        &self.geometry
    }

    /// Estimate the frame -> card mapping for a validated candidate.
    pub fn estimate(&self, candidate: &ContourCandidate) -> Result<Rectification, Rejection> {
        self.estimate_from_corners(candidate.corners(), candidate.orientation())
    }

    /// Estimate from rectangle corners ordered clockwise from the top-left one.
    ///
    /// Upright rectangles map onto [`CardGeometry::card`], rotated ones onto
    /// [`CardGeometry::card_rotated`], so the result is always portrait.
    pub fn estimate_from_corners(
        &self,
        corners: [Point2<f32>; 4],
        orientation: Orientation,
    ) -> Result<Rectification, Rejection> {
        let reference = match orientation {
            Orientation::Upright => self.geometry.card(),
            Orientation::Rotated => self.geometry.card_rotated(),
        };
        let h_card_from_img =
            homography_from_4pt(&corners, &reference).ok_or(Rejection::DegenerateTransform)?;
        let h_img_from_card = h_card_from_img
            .inverse()
            .ok_or(Rejection::DegenerateTransform)?;
        Ok(Rectification {
            h_card_from_img,
            h_img_from_card,
            corners,
            orientation,
        })
    }

    /// Resample `frame` into the canonical card buffer (3 channels).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame, rect), fields(width = self.geometry.width, height = self.geometry.height))
    )]
    pub fn warp(&self, frame: &RgbImage, rect: &Rectification) -> PixelBuffer {
        warp_perspective(
            &rgb_view(frame),
            &rect.h_img_from_card,
            self.geometry.width as usize,
            self.geometry.height as usize,
        )
    }
}

/// Borrow an RGB image as an interleaved pixel view.
pub fn rgb_view(img: &RgbImage) -> ImageView<'_> {
    ImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 3,
        data: img.as_raw(),
    }
}
