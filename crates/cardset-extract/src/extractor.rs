//! Single-frame pipeline: focus -> outline -> rectification -> alpha.

use crate::alpha::AlphaMask;
use crate::contour::{ContourDetector, Orientation};
use crate::focus::FocusFilter;
use crate::rectify::{CardRectifier, Rectification};
use crate::{ExtractParams, Rejection};
use cardset_core::CardGeometry;
use image::imageops::grayscale;
use image::{RgbImage, RgbaImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Canonical RGBA card cut out of one frame.
#[derive(Clone, Debug)]
pub struct RectifiedCard {
    /// `geometry.width x geometry.height`, alpha marks the card silhouette.
    pub image: RgbaImage,
    pub rectification: Rectification,
    pub focus: f64,
    /// Rectangularity score of the outline the card was cut from.
    pub score: f64,
}

impl RectifiedCard {
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.rectification.orientation
    }
}

/// Runs every per-frame stage for one card geometry.
#[derive(Clone, Debug)]
pub struct CardExtractor {
    focus: FocusFilter,
    detector: ContourDetector,
    rectifier: CardRectifier,
    alpha: AlphaMask,
}

impl CardExtractor {
    pub fn new(geometry: CardGeometry, params: &ExtractParams) -> Self {
        let alpha = AlphaMask::new(&geometry, params.alpha);
        Self {
            focus: FocusFilter::new(params.focus),
            detector: ContourDetector::new(params.contour),
            rectifier: CardRectifier::new(geometry),
            alpha,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &CardGeometry {
        self.rectifier.geometry()
    }

    #[inline]
    pub fn alpha_mask(&self) -> &AlphaMask {
        &self.alpha
    }

    /// Cut the dominant card out of `frame`, or say why not.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn extract(&self, frame: &RgbImage) -> Result<RectifiedCard, Rejection> {
        let gray = grayscale(frame);
        let focus = self.focus.check(&gray)?;
        let candidate = self.detector.detect(&gray)?;
        let rectification = self.rectifier.estimate(&candidate)?;

        let rgb = self.rectifier.warp(frame, &rectification);
        let alpha = self
            .alpha
            .card_alpha(&candidate.outline, &rectification.h_card_from_img);
        let image = self.alpha.compose(&rgb, &alpha);

        Ok(RectifiedCard {
            image,
            rectification,
            focus,
            score: candidate.score,
        })
    }
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self::new(CardGeometry::default(), &ExtractParams::default())
    }
}
