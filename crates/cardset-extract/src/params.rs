//! Stage parameters.
//!
//! Defaults are calibrated for zoom 4 with a 57 x 87 mm French deck. Area
//! thresholds are in squared canonical pixels and therefore grow with the
//! square of the zoom; use [`HullParams::scaled_for_zoom`] when working at a
//! different zoom.

use cardset_core::DEFAULT_ZOOM;
use serde::{Deserialize, Serialize};

/// Sharpness gate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusParams {
    /// Minimal variance of the Laplacian; frames scoring lower are dropped.
    pub min_focus: f64,
}

impl Default for FocusParams {
    fn default() -> Self {
        Self { min_focus: 120.0 }
    }
}

/// Card outline localisation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Bilateral filter window side (pixels).
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// L-inf dilation radius applied to the edge map before outline tracing.
    /// Each step grows the fitted rectangle by one pixel per side. Off (0)
    /// by default; raise it only for footage whose card edges break up.
    pub edge_dilation: u8,
    /// Outline area / min-area-rectangle area must be strictly above this.
    pub min_rectangularity: f64,
    /// Fitted rectangles with a side shorter than this are rejected before
    /// any transform is estimated.
    pub min_rect_side: f64,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            bilateral_diameter: 11,
            bilateral_sigma_color: 17.0,
            bilateral_sigma_space: 17.0,
            canny_low: 30.0,
            canny_high: 200.0,
            edge_dilation: 0,
            min_rectangularity: 0.95,
            min_rect_side: 4.0,
        }
    }
}

impl ContourParams {
    /// Strict acceptance test on the rectangularity score.
    #[inline]
    pub fn is_rectangular(&self, score: f64) -> bool {
        score > self.min_rectangularity
    }
}

/// Static border / corner-notch transparency template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaParams {
    /// Thickness of the transparent border band and of the corner notches.
    pub border: u32,
    /// Notch endpoints sit `border * notch_inset_factor` pixels from each corner.
    pub notch_inset_factor: u32,
}

impl Default for AlphaParams {
    fn default() -> Self {
        Self {
            border: 2,
            notch_inset_factor: 3,
        }
    }
}

/// Glyph convex-hull extraction inside an identifier box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullParams {
    pub canny_low: f32,
    pub canny_high: f32,
    /// Outlines smaller than this are treated as noise.
    pub min_outline_area: f64,
    /// Max |centroid.x - box centre.x| as a fraction of the box width.
    pub max_center_dx_frac: f64,
    /// Max |centroid.y - box centre.y| as a fraction of the box height.
    pub max_center_dy_frac: f64,
    /// Outline area / hull area must be strictly above this.
    pub min_solidity: f64,
    /// Accepted band for the merged hull area.
    pub min_hull_area: f64,
    pub max_hull_area: f64,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            canny_low: 30.0,
            canny_high: 200.0,
            min_outline_area: 30.0,
            max_center_dx_frac: 0.3,
            max_center_dy_frac: 0.4,
            min_solidity: 0.3,
            min_hull_area: 520.0,
            max_hull_area: 2120.0,
        }
    }
}

impl HullParams {
    /// Defaults rescaled from the zoom-4 calibration to `zoom`.
    pub fn scaled_for_zoom(zoom: u32) -> Self {
        let base = Self::default();
        let k = (zoom as f64 / DEFAULT_ZOOM as f64).powi(2);
        Self {
            min_outline_area: base.min_outline_area * k,
            min_hull_area: base.min_hull_area * k,
            max_hull_area: base.max_hull_area * k,
            ..base
        }
    }

    #[inline]
    pub fn hull_area_in_band(&self, area: f64) -> bool {
        area >= self.min_hull_area && area <= self.max_hull_area
    }
}

/// Frame sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    /// Process one frame out of `stride` (adjacent frames are near-duplicates).
    pub stride: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self { stride: 5 }
    }
}

/// Parameters of the whole extraction pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    pub focus: FocusParams,
    pub contour: ContourParams,
    pub alpha: AlphaParams,
    pub hull: HullParams,
    pub sampler: SamplerParams,
}

impl ExtractParams {
    /// Defaults with zoom-dependent thresholds rescaled for `zoom`.
    pub fn for_zoom(zoom: u32) -> Self {
        Self {
            hull: HullParams::scaled_for_zoom(zoom),
            ..Self::default()
        }
    }
}
