//! Map generation configuration.
//!
//! A `MapConfig` is an immutable value handed to each generation call. It can
//! be built in code, loaded from JSON, or assembled by the command line.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridges::{BridgeConnector, VerticalProbe};
use crate::noise_field::NoiseParams;
use crate::regions::{default_regions, RegionError, RegionTable, TerrainRegion};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("lacunarity must be >= 1, got {0}")]
    InvalidLacunarity(f32),
    #[error("invalid region table: {0}")]
    InvalidRegions(#[from] RegionError),
    #[error("height source produced a {got_width}x{got_height} grid, expected {width}x{height}")]
    SourceDimensions {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything one map build needs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub noise: NoiseParams,
    /// How far past the valley a bridge search reaches
    pub max_bridge_length: usize,
    pub vertical_probe: VerticalProbe,
    /// Re-run classification after bridging so bridges show as the top region
    pub reclassify_bridges: bool,
    pub regions: Vec<TerrainRegion>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            noise: NoiseParams::default(),
            max_bridge_length: 5,
            vertical_probe: VerticalProbe::default(),
            reclassify_bridges: false,
            regions: default_regions(),
        }
    }
}

impl MapConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the preconditions of a build without changing anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.noise.lacunarity >= 1.0) {
            return Err(ConfigError::InvalidLacunarity(self.noise.lacunarity));
        }
        RegionTable::new(self.regions.clone())?;
        Ok(())
    }

    /// Clamp user-facing values into range: size at least 1x1, lacunarity
    /// at least 1. Octave counts are unsigned and need no clamping.
    pub fn clamped(mut self) -> Self {
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        if !(self.noise.lacunarity >= 1.0) {
            self.noise.lacunarity = 1.0;
        }
        self
    }

    pub fn region_table(&self) -> Result<RegionTable, ConfigError> {
        Ok(RegionTable::new(self.regions.clone())?)
    }

    pub fn bridge_connector(&self) -> BridgeConnector {
        BridgeConnector::new(self.max_bridge_length).with_vertical_probe(self.vertical_probe)
    }
}
