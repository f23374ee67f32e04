//! JSON configuration for extraction runs.

use crate::{ConfigError, ExtractParams};
use cardset_core::{CardGeometry, CardSpec, DEFAULT_ZOOM};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

fn default_zoom() -> u32 {
    DEFAULT_ZOOM
}

/// Card description, zoom and stage parameters of an extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_zoom")]
    pub zoom: u32,
    #[serde(default)]
    pub card: CardSpec,
    /// Stage parameters; zoom-scaled defaults when absent.
    #[serde(default)]
    pub params: Option<ExtractParams>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            card: CardSpec::default(),
            params: None,
        }
    }
}

impl ExtractConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Same config with every parameter spelled out.
    pub fn resolved(&self) -> Self {
        Self {
            params: Some(self.params()),
            ..self.clone()
        }
    }

    pub fn params(&self) -> ExtractParams {
        self.params
            .unwrap_or_else(|| ExtractParams::for_zoom(self.zoom))
    }

    pub fn build_geometry(&self) -> Result<CardGeometry, ConfigError> {
        Ok(CardGeometry::new(&self.card, self.zoom)?)
    }
}
