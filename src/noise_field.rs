//! Layered coherent noise for the base heightmap.
//!
//! The field is a fractal sum of Perlin octaves. Each octave samples the same
//! Perlin generator at a different seed-derived offset, so one seed fully
//! determines the output.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Scale used in place of a non-positive (or NaN) noise scale.
pub const MIN_SCALE: f32 = 0.0001;

/// Range of the per-octave offsets drawn from the seed.
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Parameters for noise synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Seed for the octave offsets and the Perlin permutation table
    pub seed: u64,
    /// Zoom level of the field (higher = larger features)
    pub scale: f32,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
    /// Pan offset added to every octave's sample position
    pub offset: [f32; 2],
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 25.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
        }
    }
}

impl NoiseParams {
    /// The scale actually used for sampling.
    pub fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 {
            self.scale as f64
        } else {
            MIN_SCALE as f64
        }
    }

    /// Per-octave sample offsets, seed offset plus the user offset.
    pub fn octave_offsets(&self) -> Vec<[f64; 2]> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.octaves)
            .map(|_| {
                let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                [ox + self.offset[0] as f64, oy + self.offset[1] as f64]
            })
            .collect()
    }
}

// =============================================================================
// HEIGHT SOURCES
// =============================================================================

/// Anything that can produce a height grid for the map builder.
pub trait HeightSource {
    fn height_grid(&self, width: usize, height: usize) -> Tilemap<f32>;
}

impl HeightSource for NoiseParams {
    fn height_grid(&self, width: usize, height: usize) -> Tilemap<f32> {
        generate_noise_map(width, height, self)
    }
}

/// A pre-computed grid is its own source. The requested size is ignored;
/// the builder checks the dimensions.
impl HeightSource for Tilemap<f32> {
    fn height_grid(&self, _width: usize, _height: usize) -> Tilemap<f32> {
        self.clone()
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Generate a normalized (0.0-1.0) noise map.
pub fn generate_noise_map(width: usize, height: usize, params: &NoiseParams) -> Tilemap<f32> {
    let perlin = Perlin::new(params.seed as u32);
    let offsets = params.octave_offsets();
    let scale = params.effective_scale();

    // Zoom around the centre of the map instead of the top-left corner
    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut noise_map = Tilemap::new_with(width, height, 0.0f32);

    for y in 0..height {
        for x in 0..width {
            let nx = (x as f64 - half_width) / scale;
            let ny = (y as f64 - half_height) / scale;
            let value = fbm(
                &perlin,
                nx,
                ny,
                &offsets,
                params.persistence as f64,
                params.lacunarity as f64,
            );
            noise_map.set(x, y, value as f32);
        }
    }

    normalize_in_place(&mut noise_map);
    noise_map
}

/// Fractional Brownian Motion over pre-computed octave offsets.
fn fbm(
    noise: &Perlin,
    x: f64,
    y: f64,
    offsets: &[[f64; 2]],
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;

    for offset in offsets {
        let sample_x = x * frequency + offset[0];
        let sample_y = y * frequency + offset[1];
        total += amplitude * noise.get([sample_x, sample_y]);
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total
}

/// Remap values to 0.0-1.0 using the observed range.
/// A flat map (no range) becomes all zeros.
fn normalize_in_place(map: &mut Tilemap<f32>) {
    let (min_val, max_val) = map.min_max();
    let range = max_val - min_val;

    if !(range > 0.0) {
        map.fill(0.0);
        return;
    }

    for (_, _, val) in map.iter_mut() {
        *val = ((*val - min_val) / range).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> NoiseParams {
        NoiseParams {
            seed,
            ..NoiseParams::default()
        }
    }

    #[test]
    fn test_same_params_same_grid() {
        let a = generate_noise_map(48, 32, &params(12345));
        let b = generate_noise_map(48, 32, &params(12345));

        let bits_a: Vec<u32> = a.as_slice().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.as_slice().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_noise_map(32, 32, &params(1));
        let b = generate_noise_map(32, 32, &params(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_offset_changes_output() {
        let base = params(7);
        let panned = NoiseParams {
            offset: [13.5, -4.25],
            ..base.clone()
        };
        assert_ne!(generate_noise_map(32, 16, &base), generate_noise_map(32, 16, &panned));
    }

    #[test]
    fn test_values_normalized() {
        let map = generate_noise_map(64, 40, &params(99));
        assert_eq!(map.width, 64);
        assert_eq!(map.height, 40);

        let (min_h, max_h) = map.min_max();
        assert_eq!(min_h, 0.0);
        assert_eq!(max_h, 1.0);
        assert!(map.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_non_positive_scale_does_not_panic() {
        for scale in [0.0, -3.0, f32::NAN] {
            let p = NoiseParams {
                scale,
                ..params(5)
            };
            assert_eq!(p.effective_scale(), MIN_SCALE as f64);
            let map = generate_noise_map(16, 16, &p);
            assert!(map.as_slice().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let p = NoiseParams {
            octaves: 0,
            ..params(3)
        };
        let map = generate_noise_map(8, 8, &p);
        assert!(map.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_cell_map() {
        let map = generate_noise_map(1, 1, &params(42));
        assert_eq!(map.as_slice(), &[0.0]);
    }

    #[test]
    fn test_octave_offsets_are_seeded() {
        let p = params(2024);
        assert_eq!(p.octave_offsets(), p.octave_offsets());
        assert_eq!(p.octave_offsets().len(), p.octaves as usize);
        assert_ne!(p.octave_offsets(), params(2025).octave_offsets());
    }

    #[test]
    fn test_fixed_grid_source() {
        let grid: Tilemap<f32> = Tilemap::from_vec(3, 1, vec![0.1, 0.5, 0.9]).unwrap();
        assert_eq!(grid.height_grid(3, 1), grid);
    }
}
