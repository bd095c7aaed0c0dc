//! ASCII rendering of finished maps for terminal previews.

use crate::bridges::BRIDGE_HEIGHT;
use crate::pipeline::GeneratedMap;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// First letter of each cell's region name
    Region,
    /// Ten-step elevation ramp
    Height,
}

const HEIGHT_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character for a region, taken from the first letter of its name.
fn region_char(name: &str) -> char {
    name.chars().next().unwrap_or('?')
}

fn height_char(h: f32) -> char {
    let idx = (h.clamp(0.0, 1.0) * (HEIGHT_RAMP.len() - 1) as f32).round() as usize;
    HEIGHT_RAMP[idx]
}

/// Render the map, one line per row. Bridge cells are drawn as `=` in
/// region mode so they stand out from the range they connect.
pub fn render(map: &GeneratedMap, mode: AsciiMode) -> String {
    let mut out = String::with_capacity((map.width() + 1) * map.height());
    for y in 0..map.height() {
        for x in 0..map.width() {
            let h = map.height_at(x, y);
            let c = match mode {
                AsciiMode::Region if h == BRIDGE_HEIGHT => '=',
                AsciiMode::Region => region_char(&map.region_at(x, y).name),
                AsciiMode::Height => height_char(h),
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}
