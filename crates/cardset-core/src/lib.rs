//! Core types and utilities for playing-card dataset extraction.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image type or image-processing library:
//! - [`CardGeometry`]: canonical card size and identifier boxes at a zoom factor,
//! - [`CardLabel`], [`Rank`], [`Suit`]: the `{rank}{suit}` naming convention,
//! - [`Homography`]: planar projective transforms and 4-point estimation,
//! - [`ImageView`] / [`PixelBuffer`]: row-major interleaved pixel buffers with
//!   bilinear sampling and perspective warping,
//! - [`MinAreaRect`] and polygon centroids shared by the detection stages.

mod geometry;
mod homography;
mod image;
mod label;
mod logger;
mod polygon;

pub use geometry::{
    BoxCorner, BoxSpec, CardGeometry, CardSpec, GeometryError, IdentifierBox, IdentifierLayout,
    PixelRect, DEFAULT_ZOOM,
};
pub use homography::{homography_from_4pt, warp_perspective, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, ImageView, PixelBuffer};
pub use label::{CardLabel, LabelError, Rank, RankCategory, Suit};
pub use polygon::{order_quad, polygon_centroid, MinAreaRect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
