//! Background texture pool for compositing synthetic scenes.
//!
//! Textures come from a local `.tar.gz` archive (e.g. a texture dataset
//! release) or from a directory tree of images.

use flate2::read::GzDecoder;
use image::RgbImage;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const TEXTURE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

#[derive(thiserror::Error, Debug)]
pub enum BackgroundError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no background images found in {0}")]
    Empty(PathBuf),
}

/// In-memory set of background images, addressed by index.
#[derive(Clone, Debug, Default)]
pub struct BackgroundPool {
    images: Vec<RgbImage>,
}

impl BackgroundPool {
    pub fn from_images(images: Vec<RgbImage>) -> Self {
        Self { images }
    }

    /// Load from a directory or a gzipped tarball, depending on `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackgroundError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_archive(path)
        }
    }

    /// Every texture image in a `.tar.gz` archive; undecodable entries are skipped.
    pub fn from_archive(path: impl AsRef<Path>) -> Result<Self, BackgroundError> {
        let path = path.as_ref();
        let io_err = |source| BackgroundError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));

        let mut images = Vec::new();
        for entry in archive.entries().map_err(io_err)? {
            let mut entry = entry.map_err(io_err)?;
            let entry_path = entry.path().map_err(io_err)?.into_owned();
            if !entry.header().entry_type().is_file() || !is_texture(&entry_path) {
                continue;
            }
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(io_err)?;
            match image::load_from_memory(&bytes) {
                Ok(img) => images.push(img.to_rgb8()),
                Err(e) => log::warn!("skipping {}: {e}", entry_path.display()),
            }
        }
        Self::finish(path, images)
    }

    /// Every texture image below `dir` (recursively), in path order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, BackgroundError> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        collect_textures(dir, &mut files)?;
        files.sort();

        let images = files
            .iter()
            .filter_map(|f| match image::open(f) {
                Ok(img) => Some(img.to_rgb8()),
                Err(e) => {
                    log::warn!("skipping {}: {e}", f.display());
                    None
                }
            })
            .collect();
        Self::finish(dir, images)
    }

    fn finish(source: &Path, images: Vec<RgbImage>) -> Result<Self, BackgroundError> {
        if images.is_empty() {
            return Err(BackgroundError::Empty(source.to_path_buf()));
        }
        log::info!("{} background images loaded from {}", images.len(), source.display());
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RgbImage> {
        self.images.get(index)
    }

    /// Image at `index` modulo the pool size, for caller-driven random picks.
    pub fn get_wrapping(&self, index: usize) -> Option<&RgbImage> {
        if self.images.is_empty() {
            return None;
        }
        self.images.get(index % self.images.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RgbImage> {
        self.images.iter()
    }
}

fn is_texture(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| TEXTURE_EXTENSIONS.contains(&e.as_str()))
}

fn collect_textures(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), BackgroundError> {
    let io_err = |source| BackgroundError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_textures(&path, out)?;
        } else if is_texture(&path) {
            out.push(path);
        }
    }
    Ok(())
}
