//! JSON configuration for the whole pipeline.

use std::{fs, path::Path};

use handfont_font::FontConfig;
use handfont_outline::OutlineParams;
use handfont_raster::{BinarizeParams, ExtractParams, SegmentParams};
use serde::{Deserialize, Serialize};

use crate::IoError;

/// Settings for every stage. Missing sections fall back to their defaults,
/// so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Binarization for photographed phrases.
    pub photo: BinarizeParams,
    /// Binarization for drawn characters.
    pub canvas: BinarizeParams,
    pub segment: SegmentParams,
    pub extract: ExtractParams,
    pub outline: OutlineParams,
    pub font: FontConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            photo: BinarizeParams::photo(),
            canvas: BinarizeParams::canvas(),
            segment: SegmentParams::default(),
            extract: ExtractParams::default(),
            outline: OutlineParams::default(),
            font: FontConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
