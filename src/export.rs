//! PNG export of finished maps.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

use crate::bridges::BRIDGE_HEIGHT;
use crate::pipeline::GeneratedMap;

/// Export the region colours, one pixel per cell.
pub fn export_region_map(map: &GeneratedMap, path: &str) -> Result<(), image::ImageError> {
    region_image(map).save(path)
}

/// Export the final heights as 8-bit grayscale (0.0 = black, 1.0 = white).
pub fn export_heightmap(map: &GeneratedMap, path: &str) -> Result<(), image::ImageError> {
    heightmap_image(map).save(path)
}

/// Export the region colours with bridge cells painted over in `colour`.
pub fn export_bridge_overlay(
    map: &GeneratedMap,
    colour: [u8; 3],
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img = region_image(map);
    for (x, y, &h) in map.heights.iter() {
        if h == BRIDGE_HEIGHT {
            img.put_pixel(x as u32, y as u32, Rgb(colour));
        }
    }
    img.save(path)
}

pub fn region_image(map: &GeneratedMap) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(map.width() as u32, map.height() as u32);
    for (x, y, _) in map.regions.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(map.region_at(x, y).colour));
    }
    img
}

pub fn heightmap_image(map: &GeneratedMap) -> GrayImage {
    let mut img: GrayImage = ImageBuffer::new(map.width() as u32, map.height() as u32);
    for (x, y, &h) in map.heights.iter() {
        let level = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
        img.put_pixel(x as u32, y as u32, Luma([level]));
    }
    img
}
