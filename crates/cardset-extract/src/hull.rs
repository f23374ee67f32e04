//! Convex hull of the rank/suit glyphs inside an identifier box.
//!
//! All area thresholds live in [`HullParams`] and are calibrated for zoom 4
//! (see [`HullParams::scaled_for_zoom`]).

use crate::contour::{external_outlines, PixelPoint};
use crate::{HullParams, HullRejection};
use cardset_core::{polygon_centroid, BoxCorner, CardGeometry, PixelRect, RankCategory};
use image::imageops::{crop_imm, grayscale};
use image::RgbaImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::geometry::{contour_area, convex_hull};
use imageproc::morphology::dilate;
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convex polygon enclosing the identifier glyphs, in full-image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SymbolHull {
    pub points: Vec<Point2<f32>>,
    pub area: f64,
    /// Identifier box the hull was searched in.
    pub region: PixelRect,
}

/// Shape measurements of one outline, in box-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineStats {
    pub area: f64,
    pub hull_area: f64,
    /// `area / hull_area`; 1 for convex shapes.
    pub solidity: f64,
    pub centroid: Point2<f64>,
}

impl OutlineStats {
    /// `None` for outlines enclosing no area.
    pub fn of(outline: &[PixelPoint]) -> Option<Self> {
        let pts: Vec<Point2<f64>> = outline
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        let centroid = polygon_centroid(&pts)?;
        let area = contour_area(outline);
        let hull_area = contour_area(&convex_hull(outline));
        if hull_area <= 0.0 {
            return None;
        }
        Some(Self {
            area,
            hull_area,
            solidity: area / hull_area,
            centroid,
        })
    }

    /// Glyph-like: large enough, close to the box centre, not too concave.
    pub fn is_glyph(&self, params: &HullParams, box_w: f64, box_h: f64) -> bool {
        let dx = (self.centroid.x - box_w / 2.0).abs();
        let dy = (self.centroid.y - box_h / 2.0).abs();
        self.area >= params.min_outline_area
            && dx < params.max_center_dx_frac * box_w
            && dy < params.max_center_dy_frac * box_h
            && self.solidity > params.min_solidity
    }
}

/// Finds glyph hulls in canonical card images of one geometry.
#[derive(Clone, Debug, Default)]
pub struct SymbolHullExtractor {
    geometry: CardGeometry,
    params: HullParams,
}

impl SymbolHullExtractor {
    pub fn new(geometry: CardGeometry, params: HullParams) -> Self {
        Self { geometry, params }
    }

    #[inline]
    pub fn params(&self) -> &HullParams {
        &self.params
    }

    /// Pixel region of the identifier box for `category` at `corner`.
    pub fn region(&self, category: RankCategory, corner: BoxCorner) -> PixelRect {
        self.geometry
            .box_rect(self.geometry.identifier_box_for(category), corner)
    }

    /// Hull in the top-left identifier box for `category`.
    pub fn extract(&self, card: &RgbaImage, category: RankCategory) -> Option<SymbolHull> {
        self.extract_in(card, self.region(category, BoxCorner::TopLeft))
    }

    /// Hull inside `region`, or `None` when no reliable hull exists.
    pub fn extract_in(&self, card: &RgbaImage, region: PixelRect) -> Option<SymbolHull> {
        match self.try_extract_in(card, region) {
            Ok(hull) => Some(hull),
            Err(reason) => {
                log::debug!("no symbol hull in {region:?}: {reason:?}");
                None
            }
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, card), fields(x = region.x, y = region.y))
    )]
    pub fn try_extract_in(
        &self,
        card: &RgbaImage,
        region: PixelRect,
    ) -> Result<SymbolHull, HullRejection> {
        let fits = region.width > 0
            && region.height > 0
            && region.x.saturating_add(region.width) <= card.width()
            && region.y.saturating_add(region.height) <= card.height();
        if !fits {
            return Err(HullRejection::EmptyRegion);
        }

        let crop = crop_imm(card, region.x, region.y, region.width, region.height).to_image();
        let gray = grayscale(&crop);
        let edges = canny(&gray, self.params.canny_low, self.params.canny_high);
        let edges = dilate(&edges, Norm::LInf, 1);

        let (bw, bh) = (region.width as f64, region.height as f64);
        let merged: Vec<PixelPoint> = external_outlines(&edges)
            .into_iter()
            .filter(|o| {
                OutlineStats::of(o).is_some_and(|s| s.is_glyph(&self.params, bw, bh))
            })
            .flatten()
            .collect();
        if merged.is_empty() {
            return Err(HullRejection::NoGlyphOutline);
        }

        let hull = convex_hull(&merged);
        let area = contour_area(&hull);
        if !self.params.hull_area_in_band(area) {
            return Err(HullRejection::AreaOutOfBand { area });
        }

        let (ox, oy) = (region.x as f32, region.y as f32);
        Ok(SymbolHull {
            points: hull
                .iter()
                .map(|p| Point2::new(p.x as f32 + ox, p.y as f32 + oy))
                .collect(),
            area,
            region,
        })
    }
}
