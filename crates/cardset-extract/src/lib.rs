//! Card extraction pipeline for playing-card datasets.
//!
//! Per sampled frame: [`FocusFilter`] -> [`ContourDetector`] ->
//! [`CardRectifier`] -> [`AlphaMask`], bundled by [`CardExtractor`] and driven
//! across a [`FrameSource`] by [`FrameSampler`]. [`SymbolHullExtractor`] runs
//! afterwards on canonical card images.
//!
//! ```no_run
//! use cardset_extract::{CardExtractor, CardStore, FrameSampler, ImageSequenceSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = CardExtractor::default();
//! let mut frames = ImageSequenceSource::open("frames/As")?;
//! let store = CardStore::prepare("cards/As")?;
//! let out = FrameSampler::new(&extractor, Default::default())
//!     .with_store(store)
//!     .run(&mut frames);
//! println!("{} cards", out.report.accepted);
//! # Ok(())
//! # }
//! ```

mod alpha;
mod contour;
mod error;
mod extractor;
mod focus;
mod hull;
mod io;
mod params;
mod rectify;
mod sampler;
mod source;
mod store;

pub use alpha::AlphaMask;
pub use contour::{
    external_outlines, largest_outline, ContourCandidate, ContourDetector, Orientation,
    PixelPoint,
};
pub use error::{ConfigError, HullRejection, Rejection, RejectionKind, SamplerError, StoreError};
pub use extractor::{CardExtractor, RectifiedCard};
pub use focus::FocusFilter;
pub use hull::{OutlineStats, SymbolHull, SymbolHullExtractor};
pub use io::ExtractConfig;
pub use params::{
    AlphaParams, ContourParams, ExtractParams, FocusParams, HullParams, SamplerParams,
};
pub use rectify::{rgb_view, CardRectifier, Rectification};
pub use sampler::{FrameSampler, SamplingOutcome, SamplingReport};
pub use source::{FrameSource, ImageSequenceSource, MemoryFrameSource};
pub use store::{card_file_name, CardStore, CARD_EXTENSION};
