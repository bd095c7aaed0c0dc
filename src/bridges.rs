//! Bridge construction between nearby mountain ranges.
//!
//! A bridge starts at a trigger cell whose neighbour has dropped out of the
//! mountain band and ends at the next trigger cell within reach. Every cell
//! from the anchor up to (not including) the far trigger is raised to
//! [`BRIDGE_HEIGHT`].

use serde::{Deserialize, Serialize};

use crate::regions::{is_bridge_trigger, BRIDGE_TRIGGER_MAX, BRIDGE_TRIGGER_MIN};
use crate::tilemap::Tilemap;

/// Height written into bridge cells.
pub const BRIDGE_HEIGHT: f32 = 1.0;

/// Which cells the downward search tests against the trigger band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalProbe {
    /// Both band bounds are tested on the column cell (x, y+i).
    #[default]
    Column,
    /// Lower bound on (x, y+i), upper bound on the row cell (x+i, y).
    /// Running off the grid in either direction also ends the whole search.
    /// Reproduces maps made with the legacy check.
    Legacy,
}

/// Totals for one map build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Bridges built (a horizontal and a vertical bridge from one anchor count twice)
    pub bridges: usize,
    /// Cells whose height actually changed to [`BRIDGE_HEIGHT`]
    pub cells_raised: usize,
}

impl std::ops::AddAssign for BridgeStats {
    fn add_assign(&mut self, other: Self) {
        self.bridges += other.bridges;
        self.cells_raised += other.cells_raised;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Down,
}

impl Direction {
    /// Cell `step` tiles away from (x, y), or `None` past the grid edge.
    fn step(self, grid: &Tilemap<f32>, x: usize, y: usize, step: usize) -> Option<(usize, usize)> {
        let (nx, ny) = match self {
            Direction::Right => (x.checked_add(step)?, y),
            Direction::Down => (x, y.checked_add(step)?),
        };
        grid.try_get(nx, ny).map(|_| (nx, ny))
    }
}

/// What one probe along a direction found.
enum Probe {
    /// Far trigger found at this distance.
    Found,
    /// Nothing here, keep extending.
    Continue,
    /// Ran off the grid; this direction is done.
    OutOfBounds,
}

#[derive(Clone, Copy, Debug)]
pub struct BridgeConnector {
    pub max_length: usize,
    pub vertical_probe: VerticalProbe,
}

impl BridgeConnector {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            vertical_probe: VerticalProbe::default(),
        }
    }

    pub fn with_vertical_probe(mut self, probe: VerticalProbe) -> Self {
        self.vertical_probe = probe;
        self
    }

    /// Search right and down from the trigger cell at (x, y) and build any
    /// bridges found. Returns the stats for this anchor.
    ///
    /// Probes outside the grid end the search in that direction only, or
    /// the whole search with [`VerticalProbe::Legacy`].
    pub fn connect(&self, grid: &mut Tilemap<f32>, x: usize, y: usize) -> BridgeStats {
        let mut stats = BridgeStats::default();
        let mut right_open = true;
        let mut down_open = true;
        let legacy = self.vertical_probe == VerticalProbe::Legacy;

        // No far cell lies further away than the longest grid side
        let reach = self.max_length.saturating_add(2).min(grid.width.max(grid.height));

        for i in 2..reach {
            if !right_open && !down_open {
                break;
            }

            if right_open {
                match self.probe(grid, Direction::Right, x, y, i) {
                    Probe::Found => {
                        stats.cells_raised += raise(grid, Direction::Right, x, y, i);
                        stats.bridges += 1;
                    }
                    Probe::Continue => {}
                    Probe::OutOfBounds if legacy => return stats,
                    Probe::OutOfBounds => right_open = false,
                }
            }

            if down_open {
                match self.probe(grid, Direction::Down, x, y, i) {
                    Probe::Found => {
                        stats.cells_raised += raise(grid, Direction::Down, x, y, i);
                        stats.bridges += 1;
                    }
                    Probe::Continue => {}
                    Probe::OutOfBounds if legacy => return stats,
                    Probe::OutOfBounds => down_open = false,
                }
            }
        }

        stats
    }

    fn probe(&self, grid: &Tilemap<f32>, dir: Direction, x: usize, y: usize, i: usize) -> Probe {
        let Some((nx, ny)) = dir.step(grid, x, y, 1) else {
            return Probe::OutOfBounds;
        };
        // The range has to end right next to the anchor; NaN is not a valley
        if !(*grid.get(nx, ny) < BRIDGE_TRIGGER_MIN) {
            return Probe::Continue;
        }

        let Some((fx, fy)) = dir.step(grid, x, y, i) else {
            return Probe::OutOfBounds;
        };
        let far = *grid.get(fx, fy);

        let found = match (dir, self.vertical_probe) {
            (Direction::Down, VerticalProbe::Legacy) => {
                if !(far >= BRIDGE_TRIGGER_MIN) {
                    return Probe::Continue;
                }
                let Some((rx, ry)) = Direction::Right.step(grid, x, y, i) else {
                    return Probe::OutOfBounds;
                };
                *grid.get(rx, ry) <= BRIDGE_TRIGGER_MAX
            }
            _ => is_bridge_trigger(far),
        };

        if found {
            Probe::Found
        } else {
            Probe::Continue
        }
    }
}

/// Raise cells [0, length) along `dir` to bridge height and return how many
/// changed. The probe that found the far end already bounds-checked them.
fn raise(grid: &mut Tilemap<f32>, dir: Direction, x: usize, y: usize, length: usize) -> usize {
    let mut raised = 0;
    for j in 0..length {
        let (cx, cy) = match dir {
            Direction::Right => (x + j, y),
            Direction::Down => (x, y + j),
        };
        let cell = grid.get_mut(cx, cy);
        if *cell != BRIDGE_HEIGHT {
            *cell = BRIDGE_HEIGHT;
            raised += 1;
        }
    }
    raised
}
