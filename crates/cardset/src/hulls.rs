//! Glyph hulls for every stored card of a label directory.

use cardset_core::{BoxCorner, CardLabel, RankCategory};
use cardset_extract::{SymbolHull, SymbolHullExtractor, CARD_EXTENSION};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Hull search result for one card file.
#[derive(Clone, Debug, Serialize)]
pub struct HullRecord {
    pub file: PathBuf,
    /// `None` when no reliable hull was found.
    pub hull: Option<SymbolHull>,
}

/// Rank category implied by a `{rank}{suit}` directory name.
pub fn category_for_dir(dir: &Path) -> Option<RankCategory> {
    let name = dir.file_name()?.to_str()?;
    name.parse::<CardLabel>()
        .ok()
        .map(|label| label.rank.category())
}

/// Run `extractor` over every card PNG directly inside `dir`, in name order.
///
/// Unreadable images are logged and left out of the result.
pub fn hulls_in_dir(
    dir: &Path,
    extractor: &SymbolHullExtractor,
    category: RankCategory,
    corner: BoxCorner,
) -> std::io::Result<Vec<HullRecord>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == CARD_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    let region = extractor.region(category, corner);
    let mut records = Vec::with_capacity(files.len());
    for file in files {
        let card = match image::open(&file) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                log::warn!("skipping {}: {e}", file.display());
                continue;
            }
        };
        let hull = extractor.extract_in(&card, region);
        records.push(HullRecord { file, hull });
    }

    let found = records.iter().filter(|r| r.hull.is_some()).count();
    log::info!("{}: {found} hulls in {} cards", dir.display(), records.len());
    Ok(records)
}
