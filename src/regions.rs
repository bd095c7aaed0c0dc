//! Terrain regions: height thresholds mapped to named, coloured categories.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower bound of the mountain band that can anchor a bridge.
pub const BRIDGE_TRIGGER_MIN: f32 = 0.7;
/// Upper bound of the mountain band that can anchor a bridge.
pub const BRIDGE_TRIGGER_MAX: f32 = 0.8;

/// A named terrain category. Cells at or below `height` belong to it
/// unless an earlier (lower) region already claimed them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRegion {
    pub name: String,
    pub height: f32,
    pub colour: [u8; 3],
}

impl TerrainRegion {
    pub fn new(name: impl Into<String>, height: f32, colour: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            height,
            colour,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RegionError {
    #[error("region list is empty")]
    Empty,
    #[error("region '{name}' has a non-finite height threshold")]
    NonFiniteThreshold { name: String },
}

/// Ordered region rules, evaluated first-match-wins.
///
/// The table is always sorted ascending by threshold; regions sharing a
/// threshold keep their input order.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionTable {
    regions: Vec<TerrainRegion>,
}

impl RegionTable {
    pub fn new(mut regions: Vec<TerrainRegion>) -> Result<Self, RegionError> {
        if regions.is_empty() {
            return Err(RegionError::Empty);
        }
        if let Some(bad) = regions.iter().find(|r| !r.height.is_finite()) {
            return Err(RegionError::NonFiniteThreshold {
                name: bad.name.clone(),
            });
        }
        regions.sort_by(|a, b| a.height.total_cmp(&b.height));
        Ok(Self { regions })
    }

    /// Index of the region a height falls into.
    ///
    /// Heights above every threshold (and NaN) fall back to the highest region.
    pub fn classify(&self, height: f32) -> usize {
        self.regions
            .iter()
            .position(|region| height <= region.height)
            .unwrap_or(self.regions.len() - 1)
    }

    pub fn region(&self, index: usize) -> &TerrainRegion {
        &self.regions[index]
    }

    pub fn regions(&self) -> &[TerrainRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Index of the region with the given name, if any.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }
}

/// Default presets, from deep water up to the bridge marker at exactly 1.0.
pub fn default_regions() -> Vec<TerrainRegion> {
    vec![
        TerrainRegion::new("water", 0.4, [50, 99, 195]),
        TerrainRegion::new("sand", 0.45, [210, 208, 125]),
        TerrainRegion::new("land", 0.6, [86, 152, 23]),
        TerrainRegion::new("mountain", 0.7, [94, 68, 63]),
        TerrainRegion::new("mountain2", 0.8, [75, 60, 55]),
        TerrainRegion::new("mountain3", 0.9, [60, 50, 48]),
        TerrainRegion::new("snow", 0.99999, [255, 255, 255]),
        TerrainRegion::new("bridge", 1.0, [160, 82, 45]),
    ]
}

impl Default for RegionTable {
    fn default() -> Self {
        Self {
            regions: default_regions(),
        }
    }
}

/// Whether a height lies in the mountain band that anchors bridges.
pub fn is_bridge_trigger(height: f32) -> bool {
    (BRIDGE_TRIGGER_MIN..=BRIDGE_TRIGGER_MAX).contains(&height)
}
