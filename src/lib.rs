//! Bridged terrain map generation library
//!
//! Noise heightmaps classified into terrain regions, with nearby mountain
//! ranges joined by bridges. Re-exports modules for use by the binary.

pub mod ascii;
pub mod bridges;
pub mod config;
pub mod export;
pub mod noise_field;
pub mod pipeline;
pub mod regions;
pub mod tilemap;

pub use config::{ConfigError, MapConfig};
pub use pipeline::{generate_map, generate_map_with, GeneratedMap};
