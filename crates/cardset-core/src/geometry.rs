//! Canonical card geometry.
//!
//! Physical measurements are given in millimetres and scaled by an integer
//! zoom factor to obtain pixel dimensions of the canonical (upright, portrait)
//! card frame every detected card is rectified into.

use crate::label::{Rank, RankCategory};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Default magnification from millimetres to pixels.
pub const DEFAULT_ZOOM: u32 = 4;

/// Placement of an identifier box measured from the nearest card corner.
///
/// The box spans `x_border..x_width` horizontally and `y_border..y_height`
/// vertically; `x_width`/`y_height` are far-edge offsets, not extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub x_border: f32,
    pub x_width: f32,
    pub y_border: f32,
    pub y_height: f32,
}

/// Identifier box placement per rank family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentifierLayout {
    pub face: BoxSpec,
    pub ace: BoxSpec,
    pub numeral: BoxSpec,
}

impl IdentifierLayout {
    /// Corner-index layout of a standard French-suited deck.
    pub fn french() -> Self {
        Self {
            face: BoxSpec {
                x_border: 2.0,
                x_width: 10.5,
                y_border: 2.5,
                y_height: 23.0,
            },
            ace: BoxSpec {
                x_border: 2.0,
                x_width: 9.0,
                y_border: 2.5,
                y_height: 21.0,
            },
            numeral: BoxSpec {
                x_border: 2.0,
                x_width: 10.0,
                y_border: 2.5,
                y_height: 22.0,
            },
        }
    }

    pub fn get(&self, category: RankCategory) -> &BoxSpec {
        match category {
            RankCategory::Face => &self.face,
            RankCategory::Ace => &self.ace,
            RankCategory::Numeral => &self.numeral,
        }
    }
}

impl Default for IdentifierLayout {
    fn default() -> Self {
        Self::french()
    }
}

/// Physical card description (millimetres).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSpec {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub layout: IdentifierLayout,
}

impl CardSpec {
    /// 57 x 87 mm French card.
    pub fn french() -> Self {
        Self {
            width: 57.0,
            height: 87.0,
            layout: IdentifierLayout::french(),
        }
    }
}

impl Default for CardSpec {
    fn default() -> Self {
        Self::french()
    }
}

/// Geometry validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("zoom must be >= 1")]
    InvalidZoom,
    #[error("card dimensions must be finite and > 0 (width={width}, height={height})")]
    InvalidCardSize { width: f32, height: f32 },
    #[error("{category:?} identifier box is empty or lies outside the card")]
    InvalidBox { category: RankCategory },
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which of the two symmetric card corners an identifier box refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxCorner {
    #[default]
    TopLeft,
    BottomRight,
}

/// Identifier box in canonical pixel units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierBox {
    pub x_border: u32,
    pub x_width: u32,
    pub y_border: u32,
    pub y_height: u32,
}

impl IdentifierBox {
    fn scaled(spec: &BoxSpec, zoom: u32) -> Self {
        Self {
            x_border: scale(spec.x_border, zoom),
            x_width: scale(spec.x_width, zoom),
            y_border: scale(spec.y_border, zoom),
            y_height: scale(spec.y_height, zoom),
        }
    }
}

#[inline]
fn scale(mm: f32, zoom: u32) -> u32 {
    // truncation matches the calibrated pixel layouts
    (mm * zoom as f32) as u32
}

/// Canonical card geometry at a fixed zoom. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardGeometry {
    pub zoom: u32,
    pub width: u32,
    pub height: u32,
    face: IdentifierBox,
    ace: IdentifierBox,
    numeral: IdentifierBox,
}

impl CardGeometry {
    /// Validate `spec` and scale it by `zoom`.
    pub fn new(spec: &CardSpec, zoom: u32) -> Result<Self, GeometryError> {
        if zoom == 0 {
            return Err(GeometryError::InvalidZoom);
        }
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(spec.width) || !valid(spec.height) {
            return Err(GeometryError::InvalidCardSize {
                width: spec.width,
                height: spec.height,
            });
        }

        let width = scale(spec.width, zoom);
        let height = scale(spec.height, zoom);

        let mut boxes = [IdentifierBox {
            x_border: 0,
            x_width: 0,
            y_border: 0,
            y_height: 0,
        }; 3];
        let categories = [RankCategory::Face, RankCategory::Ace, RankCategory::Numeral];
        for (slot, category) in boxes.iter_mut().zip(categories) {
            let b = spec.layout.get(category);
            let fields_ok = [b.x_border, b.x_width, b.y_border, b.y_height]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0);
            let scaled = IdentifierBox::scaled(b, zoom);
            if !fields_ok
                || scaled.x_border >= scaled.x_width
                || scaled.y_border >= scaled.y_height
                || scaled.x_width > width
                || scaled.y_height > height
            {
                return Err(GeometryError::InvalidBox { category });
            }
            *slot = scaled;
        }

        Ok(Self {
            zoom,
            width,
            height,
            face: boxes[0],
            ace: boxes[1],
            numeral: boxes[2],
        })
    }

    /// French card at [`DEFAULT_ZOOM`].
    pub fn french() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            width: 57 * DEFAULT_ZOOM,
            height: 87 * DEFAULT_ZOOM,
            face: IdentifierBox::scaled(&IdentifierLayout::french().face, DEFAULT_ZOOM),
            ace: IdentifierBox::scaled(&IdentifierLayout::french().ace, DEFAULT_ZOOM),
            numeral: IdentifierBox::scaled(&IdentifierLayout::french().numeral, DEFAULT_ZOOM),
        }
    }

    /// Canonical corners of an upright card, TL, TR, BR, BL.
    pub fn card(&self) -> [Point2<f32>; 4] {
        let (w, h) = (self.width as f32, self.height as f32);
        [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    /// Canonical corners for a card lying on its side.
    ///
    /// Same cycle as [`Self::card`] shifted by one, so a landscape quad given
    /// as TL, TR, BR, BL maps onto a portrait card.
    pub fn card_rotated(&self) -> [Point2<f32>; 4] {
        let [tl, tr, br, bl] = self.card();
        [tr, br, bl, tl]
    }

    pub fn identifier_box_for(&self, category: RankCategory) -> &IdentifierBox {
        match category {
            RankCategory::Face => &self.face,
            RankCategory::Ace => &self.ace,
            RankCategory::Numeral => &self.numeral,
        }
    }

    pub fn identifier_box(&self, rank: Rank) -> &IdentifierBox {
        self.identifier_box_for(rank.category())
    }

    /// Four corners of an identifier box in canonical coordinates.
    ///
    /// The bottom-right box is the point reflection of the top-left one
    /// through the card centre.
    pub fn box_corners(&self, b: &IdentifierBox, corner: BoxCorner) -> [Point2<f32>; 4] {
        let (x0, x1) = (b.x_border as f32, b.x_width as f32);
        let (y0, y1) = (b.y_border as f32, b.y_height as f32);
        let tl = [
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ];
        match corner {
            BoxCorner::TopLeft => tl,
            BoxCorner::BottomRight => {
                let (w, h) = (self.width as f32, self.height as f32);
                tl.map(|p| Point2::new(w - p.x, h - p.y))
            }
        }
    }

    /// Pixel rectangle covered by an identifier box, for cropping.
    pub fn box_rect(&self, b: &IdentifierBox, corner: BoxCorner) -> PixelRect {
        let width = b.x_width - b.x_border;
        let height = b.y_height - b.y_border;
        match corner {
            BoxCorner::TopLeft => PixelRect {
                x: b.x_border,
                y: b.y_border,
                width,
                height,
            },
            BoxCorner::BottomRight => PixelRect {
                x: self.width - b.x_width,
                y: self.height - b.y_height,
                width,
                height,
            },
        }
    }
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self::french()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(zoom: u32) -> CardGeometry {
        CardGeometry::new(&CardSpec::french(), zoom).expect("valid geometry")
    }

    #[test]
    fn french_shortcut_matches_validated_constructor() {
        assert_eq!(CardGeometry::french(), geometry(DEFAULT_ZOOM));
        assert_eq!(CardGeometry::french().width, 228);
        assert_eq!(CardGeometry::french().height, 348);
    }

    #[test]
    fn dimensions_scale_linearly_with_zoom() {
        for (k, m) in [(2, 4), (4, 8), (2, 6)] {
            let a = geometry(k);
            let b = geometry(m);
            let f = m / k;
            assert_eq!(b.width, a.width * f);
            assert_eq!(b.height, a.height * f);
            for category in [RankCategory::Face, RankCategory::Ace, RankCategory::Numeral] {
                let ba = a.identifier_box_for(category);
                let bb = b.identifier_box_for(category);
                assert_eq!(bb.x_border, ba.x_border * f);
                assert_eq!(bb.x_width, ba.x_width * f);
                assert_eq!(bb.y_border, ba.y_border * f);
                assert_eq!(bb.y_height, ba.y_height * f);
            }
        }
    }

    #[test]
    fn rotated_corners_are_an_adjacency_preserving_permutation() {
        let g = geometry(4);
        let upright = g.card();
        let rotated = g.card_rotated();

        let shift = (0..4)
            .find(|&s| (0..4).all(|i| rotated[i] == upright[(i + s) % 4]))
            .expect("rotated corners are a cyclic shift of upright ones");
        assert_ne!(shift, 0);

        // consecutive corners stay adjacent: they share one coordinate
        for i in 0..4 {
            let a = rotated[i];
            let b = rotated[(i + 1) % 4];
            assert!(a.x == b.x || a.y == b.y);
        }
    }

    #[test]
    fn rank_categories_use_distinct_boxes() {
        let g = geometry(4);
        assert_ne!(g.identifier_box(Rank::King), g.identifier_box(Rank::Ace));
        assert_ne!(g.identifier_box(Rank::Ace), g.identifier_box(Rank::Seven));
        assert_eq!(g.identifier_box(Rank::Seven), g.identifier_box(Rank::Ten));
    }

    #[test]
    fn bottom_right_box_mirrors_top_left() {
        let g = geometry(4);
        let b = *g.identifier_box(Rank::Seven);
        let tl = g.box_corners(&b, BoxCorner::TopLeft);
        let br = g.box_corners(&b, BoxCorner::BottomRight);
        for (p, q) in tl.iter().zip(br.iter()) {
            assert_eq!(p.x + q.x, g.width as f32);
            assert_eq!(p.y + q.y, g.height as f32);
        }

        let r_tl = g.box_rect(&b, BoxCorner::TopLeft);
        let r_br = g.box_rect(&b, BoxCorner::BottomRight);
        assert_eq!((r_tl.width, r_tl.height), (r_br.width, r_br.height));
        assert_eq!(r_br.x + r_br.width, g.width - b.x_border);
        assert_eq!(r_br.y + r_br.height, g.height - b.y_border);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            CardGeometry::new(&CardSpec::french(), 0),
            Err(GeometryError::InvalidZoom)
        );

        let mut spec = CardSpec::french();
        spec.height = -1.0;
        assert!(matches!(
            CardGeometry::new(&spec, 4),
            Err(GeometryError::InvalidCardSize { .. })
        ));

        let mut spec = CardSpec::french();
        spec.layout.ace.x_width = 80.0;
        assert_eq!(
            CardGeometry::new(&spec, 4),
            Err(GeometryError::InvalidBox {
                category: RankCategory::Ace
            })
        );
    }
}
