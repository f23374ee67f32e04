//! Output directory for one labelled batch of rectified cards.

use crate::StoreError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const CARD_EXTENSION: &str = "png";

/// Collision-free card file name (`{uuid-v4}.png`).
pub fn card_file_name() -> String {
    format!("{}.{CARD_EXTENSION}", Uuid::new_v4())
}

/// Writes cards into a single batch directory.
#[derive(Clone, Debug)]
pub struct CardStore {
    dir: PathBuf,
}

impl CardStore {
    /// Start a fresh batch at `dir`: any existing content is removed.
    pub fn prepare(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        let fail = |source| StoreError::Directory {
            path: dir.clone(),
            source,
        };
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(fail)?;
        }
        std::fs::create_dir_all(&dir).map_err(fail)?;
        Ok(Self { dir })
    }

    /// Use `dir` as is, creating it when missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Directory {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `card` under a fresh unique name and return its path.
    pub fn write(&self, card: &RgbaImage) -> Result<PathBuf, StoreError> {
        let path = self.dir.join(card_file_name());
        card.save(&path)
            .map_err(|source| StoreError::OutputUnwritable {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn file_names_are_unique_pngs() {
        let a = card_file_name();
        let b = card_file_name();
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), 36 + 4);
    }

    #[test]
    fn prepare_clears_previous_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("As");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.png"), b"old").unwrap();

        let store = CardStore::prepare(&dir).unwrap();
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);

        let card = RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 255]));
        let path = store.write(&card).unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back, card);
    }

    #[test]
    fn unwritable_output_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CardStore::prepare(tmp.path().join("out")).unwrap();
        std::fs::remove_dir_all(store.dir()).unwrap();
        let card = RgbaImage::new(2, 2);
        assert!(matches!(
            store.write(&card),
            Err(StoreError::OutputUnwritable { .. })
        ));
    }
}
