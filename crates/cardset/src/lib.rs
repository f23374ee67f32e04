//! High-level facade for the `cardset-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry (`cardset-core`) and pipeline
//!   (`cardset-extract`) crates,
//! - [`DatasetBuilder`]: one extraction run per `{rank}{suit}` label,
//! - [`BackgroundPool`]: background textures from a tarball or directory,
//! - hull batches over stored cards and debug overlays.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cardset::{CardExtractor, CardLabel, DatasetBuilder, SamplerParams};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = CardExtractor::default();
//! let summary = DatasetBuilder::new(&extractor, SamplerParams::default()).run(
//!     Path::new("data/raw/frames"),
//!     Path::new("data/processed/cards"),
//!     &CardLabel::all(),
//! )?;
//! println!("{} cards", summary.total_cards());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `cardset::core`: card geometry, labels, homographies, pixel views.
//! - `cardset::extract`: focus, outline, rectification, alpha, hulls, sampling.
//! - `cardset::dataset`, `cardset::backgrounds`, `cardset::hulls`,
//!   `cardset::debug`: batch tooling used by the `cardset` CLI.

pub use cardset_core as core;
pub use cardset_extract as extract;

pub use cardset_core::{BoxCorner, CardGeometry, CardLabel, CardSpec, Rank, RankCategory, Suit};
pub use cardset_extract::{
    CardExtractor, CardStore, ExtractConfig, ExtractParams, FrameSampler, ImageSequenceSource,
    RectifiedCard, SamplerParams, SamplingReport, SymbolHull, SymbolHullExtractor,
};

pub mod backgrounds;
pub mod dataset;
pub mod debug;
pub mod hulls;

pub use backgrounds::{BackgroundError, BackgroundPool};
pub use dataset::{DatasetBuilder, DatasetError, DatasetSummary, LabelSummary};
