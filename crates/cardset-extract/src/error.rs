use serde::Serialize;
use std::path::PathBuf;

/// Why a sampled frame produced no card. Non-fatal: the frame is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Variance of the Laplacian below the configured minimum.
    TooBlurry { focus: f64, min_focus: f64 },
    /// The edge map contains no outline at all.
    NoOutline,
    /// The largest outline fills too little of its min-area rectangle.
    NotRectangular { score: f64 },
    /// The fitted rectangle is (nearly) flat.
    DegenerateRectangle { width: f64, height: f64 },
    /// No projective transform could be estimated from the fitted corners.
    DegenerateTransform,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::TooBlurry { .. } => RejectionKind::TooBlurry,
            Rejection::NoOutline => RejectionKind::NoOutline,
            Rejection::NotRectangular { .. } => RejectionKind::NotRectangular,
            Rejection::DegenerateRectangle { .. } | Rejection::DegenerateTransform => {
                RejectionKind::Degenerate
            }
        }
    }
}

/// Coarse rejection buckets used for counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    TooBlurry,
    NoOutline,
    NotRectangular,
    Degenerate,
}

/// Why no glyph hull was reported for an identifier box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HullRejection {
    /// The crop is empty or lies outside the image.
    EmptyRegion,
    /// No outline passed the area / centring / solidity filters.
    NoGlyphOutline,
    /// The merged hull area fell outside the configured band.
    AreaOutOfBand { area: f64 },
}

/// Failure to persist a rectified card. Fatal for that card only.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("cannot write {path}: {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot prepare output directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure that aborts a whole sampling session.
#[derive(thiserror::Error, Debug)]
pub enum SamplerError {
    #[error("frame source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Geometry(#[from] cardset_core::GeometryError),
}
