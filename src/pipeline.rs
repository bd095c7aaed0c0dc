//! Map build pipeline: noise, then one row-major classify-and-bridge scan.
//!
//! Bridging writes into the height grid while the scan is still running, so
//! cells later in scan order see the raised heights of earlier bridges. The
//! scan order is part of the output contract.

use crate::bridges::{BridgeConnector, BridgeStats};
use crate::config::{ConfigError, MapConfig};
use crate::noise_field::HeightSource;
use crate::regions::{is_bridge_trigger, RegionTable, TerrainRegion};
use crate::tilemap::Tilemap;

/// The finished map: final heights plus the region picked for each cell.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub heights: Tilemap<f32>,
    pub regions: Tilemap<usize>,
    pub table: RegionTable,
    pub bridge_stats: BridgeStats,
}

/// Generate a map from the noise parameters in `config`.
pub fn generate_map(config: &MapConfig) -> Result<GeneratedMap, ConfigError> {
    generate_map_with(config, &config.noise)
}

/// Generate a map from an arbitrary height source.
pub fn generate_map_with<S: HeightSource + ?Sized>(
    config: &MapConfig,
    source: &S,
) -> Result<GeneratedMap, ConfigError> {
    config.validate()?;
    let table = config.region_table()?;

    let heights = source.height_grid(config.width, config.height);
    if heights.width != config.width || heights.height != config.height {
        return Err(ConfigError::SourceDimensions {
            width: config.width,
            height: config.height,
            got_width: heights.width,
            got_height: heights.height,
        });
    }

    let mut builder = MapBuilder::new(heights, table, config.bridge_connector());
    builder.classify_and_bridge();
    if config.reclassify_bridges {
        builder.reclassify();
    }
    Ok(builder.finish())
}

/// Sole owner of the height grid while it is being mutated.
struct MapBuilder {
    heights: Tilemap<f32>,
    regions: Tilemap<usize>,
    table: RegionTable,
    connector: BridgeConnector,
    stats: BridgeStats,
}

impl MapBuilder {
    fn new(heights: Tilemap<f32>, table: RegionTable, connector: BridgeConnector) -> Self {
        let regions = Tilemap::new(heights.width, heights.height);
        Self {
            heights,
            regions,
            table,
            connector,
            stats: BridgeStats::default(),
        }
    }

    fn classify_and_bridge(&mut self) {
        for y in 0..self.heights.height {
            for x in 0..self.heights.width {
                let h = *self.heights.get(x, y);
                self.regions.set(x, y, self.table.classify(h));

                if is_bridge_trigger(h) {
                    self.stats += self.connector.connect(&mut self.heights, x, y);
                }
            }
        }
    }

    fn reclassify(&mut self) {
        for (x, y, &h) in self.heights.iter() {
            self.regions.set(x, y, self.table.classify(h));
        }
    }

    fn finish(self) -> GeneratedMap {
        GeneratedMap {
            heights: self.heights,
            regions: self.regions,
            table: self.table,
            bridge_stats: self.stats,
        }
    }
}

impl GeneratedMap {
    pub fn width(&self) -> usize {
        self.heights.width
    }

    pub fn height(&self) -> usize {
        self.heights.height
    }

    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        *self.heights.get(x, y)
    }

    pub fn region_at(&self, x: usize, y: usize) -> &TerrainRegion {
        self.table.region(*self.regions.get(x, y))
    }

    /// Cell count per region, in table order.
    pub fn region_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.table.len()];
        for &idx in self.regions.as_slice() {
            counts[idx] += 1;
        }
        counts
    }

    /// Row-major colour of every cell.
    pub fn colour_map(&self) -> Vec<[u8; 3]> {
        self.regions
            .as_slice()
            .iter()
            .map(|&idx| self.table.region(idx).colour)
            .collect()
    }

    /// Print height range, bridge totals and a per-region histogram.
    pub fn print_summary(&self) {
        let count = self.width() * self.height();
        let (min_h, max_h) = self.heights.min_max();
        let bar_max_width = 40;
        let counts = self.region_counts();
        let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

        println!("Map: {}x{} ({} cells)", self.width(), self.height(), count);
        println!("Height range: {:.3} to {:.3}", min_h, max_h);
        println!(
            "Bridges: {} built, {} cells raised",
            self.bridge_stats.bridges, self.bridge_stats.cells_raised
        );
        for (region, &n) in self.table.regions().iter().zip(&counts) {
            let bar_len = n * bar_max_width / max_count;
            println!(
                "  {:<12} <= {:<7.5} │{:<40}│{:>6.1}%",
                region.name,
                region.height,
                "█".repeat(bar_len),
                100.0 * n as f64 / count as f64
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridges::VerticalProbe;
    use crate::noise_field::NoiseParams;

    fn three_regions() -> Vec<TerrainRegion> {
        vec![
            TerrainRegion::new("water", 0.4, [0, 0, 255]),
            TerrainRegion::new("land", 0.6, [0, 255, 0]),
            TerrainRegion::new("mountain", 1.0, [128, 128, 128]),
        ]
    }

    fn config(width: usize, height: usize, max_bridge_length: usize) -> MapConfig {
        MapConfig {
            width,
            height,
            max_bridge_length,
            regions: three_regions(),
            ..MapConfig::default()
        }
    }

    fn names(map: &GeneratedMap) -> Vec<String> {
        (0..map.height())
            .flat_map(|y| (0..map.width()).map(move |x| (x, y)))
            .map(|(x, y)| map.region_at(x, y).name.clone())
            .collect()
    }

    #[test]
    fn test_end_to_end_row() {
        let row = vec![0.75, 0.75, 0.5, 0.5, 0.5, 0.75, 0.2, 0.2, 0.2, 0.2];
        let source: Tilemap<f32> = Tilemap::from_vec(10, 1, row).unwrap();

        let map = generate_map_with(&config(10, 1, 5), &source).unwrap();

        // The anchor at x=1 bridges to the trigger at x=5; x=0 never searches
        // because its neighbour is still mountain.
        assert_eq!(
            map.heights.as_slice(),
            &[0.75, 1.0, 1.0, 1.0, 1.0, 0.75, 0.2, 0.2, 0.2, 0.2]
        );
        let mut expected = vec!["mountain"; 6];
        expected.extend(["water"; 4]);
        assert_eq!(names(&map), expected);
        assert_eq!(map.bridge_stats, BridgeStats { bridges: 1, cells_raised: 4 });
    }

    #[test]
    fn test_bridged_cells_classified_after_raise() {
        // Valley cells are visited after the bridge is built, so they see 1.0
        let row = vec![0.2, 0.75, 0.3, 0.3, 0.75, 0.2];
        let source: Tilemap<f32> = Tilemap::from_vec(6, 1, row).unwrap();

        let map = generate_map_with(&config(6, 1, 3), &source).unwrap();

        assert_eq!(map.heights.as_slice(), &[0.2, 1.0, 1.0, 1.0, 0.75, 0.2]);
        assert_eq!(names(&map), ["water", "mountain", "mountain", "mountain", "mountain", "water"]);
    }

    #[test]
    fn test_no_triggers_leaves_heights_unchanged() {
        let cells = vec![
            0.1, 0.35, 0.5, 0.65, //
            0.69, 0.81, 0.9, 1.0, //
            0.0, 0.4, 0.6, 0.2, //
        ];
        let source: Tilemap<f32> = Tilemap::from_vec(4, 3, cells.clone()).unwrap();

        let map = generate_map_with(&config(4, 3, 5), &source).unwrap();

        assert_eq!(map.heights.as_slice(), cells.as_slice());
        assert_eq!(map.bridge_stats, BridgeStats::default());
        assert_eq!(map.region_at(2, 0).name, "land");
        assert_eq!(map.region_at(1, 1).name, "mountain");
        assert_eq!(map.region_at(1, 2).name, "water");
    }

    #[test]
    fn test_earlier_bridge_seen_by_later_rows() {
        // The vertical bridge from (0,0) raises (0,1) before row 1 is scanned,
        // so (0,1) is classified at bridge height
        let cells = vec![
            0.75, 0.1, 0.1, //
            0.5, 0.1, 0.1, //
            0.75, 0.5, 0.75, //
        ];
        let source: Tilemap<f32> = Tilemap::from_vec(3, 3, cells).unwrap();

        let map = generate_map_with(&config(3, 3, 2), &source).unwrap();

        assert_eq!(map.height_at(0, 0), 1.0);
        assert_eq!(map.height_at(0, 1), 1.0);
        assert_eq!(map.region_at(0, 1).name, "mountain");
        // Row 2 bridges horizontally from (0,2)
        assert_eq!(map.height_at(0, 2), 1.0);
        assert_eq!(map.height_at(1, 2), 1.0);
        assert_eq!(map.height_at(2, 2), 0.75);
        assert_eq!(map.bridge_stats.bridges, 2);
    }

    #[test]
    fn test_reclassify_updates_bridge_anchor() {
        let regions = vec![
            TerrainRegion::new("water", 0.4, [0, 0, 255]),
            TerrainRegion::new("mountain", 0.8, [128, 128, 128]),
            TerrainRegion::new("bridge", 1.0, [160, 82, 45]),
        ];
        let source: Tilemap<f32> = Tilemap::from_vec(4, 1, vec![0.75, 0.3, 0.3, 0.75]).unwrap();

        let plain = MapConfig {
            regions: regions.clone(),
            ..config(4, 1, 3)
        };
        let map = generate_map_with(&plain, &source).unwrap();
        assert_eq!(names(&map), ["mountain", "bridge", "bridge", "mountain"]);

        let reclassified = MapConfig {
            reclassify_bridges: true,
            ..plain
        };
        let map = generate_map_with(&reclassified, &source).unwrap();
        assert_eq!(names(&map), ["bridge", "bridge", "bridge", "mountain"]);
    }

    #[test]
    fn test_source_size_mismatch_rejected() {
        let source = Tilemap::new_with(3, 3, 0.5f32);
        let result = generate_map_with(&config(4, 3, 5), &source);
        assert!(matches!(
            result,
            Err(ConfigError::SourceDimensions { got_width: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = generate_map(&config(0, 10, 5));
        assert!(matches!(result, Err(ConfigError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_noise_map_is_deterministic() {
        let mut cfg = config(40, 30, 5);
        cfg.regions = crate::regions::default_regions();
        cfg.noise = NoiseParams {
            seed: 77,
            scale: 12.0,
            octaves: 5,
            ..NoiseParams::default()
        };
        cfg.vertical_probe = VerticalProbe::Legacy;

        let a = generate_map(&cfg).unwrap();
        let b = generate_map(&cfg).unwrap();
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.regions, b.regions);
        assert_eq!(a.bridge_stats, b.bridge_stats);
        assert_eq!(a.region_counts().iter().sum::<usize>(), 40 * 30);
        assert!(a.heights.as_slice().iter().all(|h| (0.0..=1.0).contains(h)));
    }

    #[test]
    fn test_colour_map_follows_regions() {
        let source: Tilemap<f32> = Tilemap::from_vec(3, 1, vec![0.1, 0.5, 0.9]).unwrap();
        let map = generate_map_with(&config(3, 1, 5), &source).unwrap();
        assert_eq!(map.colour_map(), vec![[0, 0, 255], [0, 255, 0], [128, 128, 128]]);
    }
}
