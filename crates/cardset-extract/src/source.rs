//! Sequential frame providers.
//!
//! Videos are consumed as directories of sequentially named frame images;
//! decoding containers is left to external tools.

use crate::SamplerError;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tif"];

/// Yields frames in order until exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;

    /// Frame positions passed over without yielding an image so far, e.g.
    /// unreadable files. Samplers count them toward their stride.
    fn skipped(&self) -> usize {
        0
    }

    /// Number of frames left, when known up front.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// Frames stored as image files in one directory, read in file-name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    root: PathBuf,
    files: VecDeque<PathBuf>,
    skipped: usize,
}

impl ImageSequenceSource {
    /// List the frame files of `dir`.
    ///
    /// Fails with [`SamplerError::SourceUnavailable`] when `dir` cannot be
    /// listed; an empty directory is a valid, empty source.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SamplerError> {
        let root = dir.as_ref().to_path_buf();
        let unavailable = |reason: String| SamplerError::SourceUnavailable {
            path: root.clone(),
            reason,
        };
        if !root.is_dir() {
            return Err(unavailable("not a directory".to_string()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&root).map_err(|e| unavailable(e.to_string()))? {
            let path = entry.map_err(|e| unavailable(e.to_string()))?.path();
            if path.is_file() && is_frame_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        log::debug!("{}: {} frame files", root.display(), files.len());

        Ok(Self {
            root,
            files: files.into(),
            skipped: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        while let Some(path) = self.files.pop_front() {
            match image::open(&path) {
                Ok(img) => return Some(img.to_rgb8()),
                Err(e) => {
                    log::warn!("skipping unreadable frame {}: {e}", path.display());
                    self.skipped += 1;
                }
            }
        }
        None
    }

    fn skipped(&self) -> usize {
        self.skipped
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.files.len())
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.as_str()))
}

/// Frames already in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<RgbImage>,
}

impl MemoryFrameSource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// `count` copies of one frame.
    pub fn repeat(frame: &RgbImage, count: usize) -> Self {
        Self::new(std::iter::repeat_n(frame.clone(), count))
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.frames.pop_front()
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}
