//! Sensor catalogue: read-only environmental inputs to the neural network.
//!
//! Every reading is a pure function of the creature, the grid, the
//! population and the tick, and lies in -1.0..=1.0.

use crate::creature::Creature;
use crate::genetics::similarity;
use crate::grid::{Grid, BARRIER};
use crate::population::Population;

/// Cells scanned ahead by the forward probes
pub const PROBE_RANGE: i16 = 8;
/// Radius of the population density neighbourhood
pub const DENSITY_RADIUS: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// East-west position, 0 at the west edge
    LocX,
    /// North-south position, 0 at the top edge
    LocY,
    /// Closeness to the nearest east/west edge
    BoundaryDistX,
    BoundaryDistY,
    BoundaryDist,
    LastMoveDirX,
    LastMoveDirY,
    Age,
    Oscillator,
    Energy,
    PopulationDensity,
    PopulationForward,
    BarrierForward,
    BirthDistance,
    GeneticSimilarityForward,
}

impl Sensor {
    pub const COUNT: usize = 15;

    pub const ALL: [Sensor; Sensor::COUNT] = [
        Sensor::LocX,
        Sensor::LocY,
        Sensor::BoundaryDistX,
        Sensor::BoundaryDistY,
        Sensor::BoundaryDist,
        Sensor::LastMoveDirX,
        Sensor::LastMoveDirY,
        Sensor::Age,
        Sensor::Oscillator,
        Sensor::Energy,
        Sensor::PopulationDensity,
        Sensor::PopulationForward,
        Sensor::BarrierForward,
        Sensor::BirthDistance,
        Sensor::GeneticSimilarityForward,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Sensor> {
        Sensor::ALL.get(idx).copied()
    }
}

/// Immutable view of the world for one tick's decision phase
#[derive(Clone, Copy)]
pub struct SensorContext<'a> {
    pub grid: &'a Grid,
    pub population: &'a Population,
    pub tick: u32,
    pub ticks_per_generation: u32,
}

impl<'a> SensorContext<'a> {
    /// Reading of sensor `idx` for `creature`. Indices are in range by
    /// construction; an unknown index reads 0.
    pub fn read(&self, idx: usize, creature: &Creature) -> f32 {
        match Sensor::from_index(idx) {
            Some(sensor) => self.sense(sensor, creature).clamp(-1.0, 1.0),
            None => 0.0,
        }
    }

    fn sense(&self, sensor: Sensor, creature: &Creature) -> f32 {
        let grid = self.grid;
        let w = grid.width() as f32;
        let h = grid.height() as f32;
        let loc = creature.loc;

        match sensor {
            Sensor::LocX => loc.x as f32 / (w - 1.0).max(1.0),
            Sensor::LocY => loc.y as f32 / (h - 1.0).max(1.0),
            Sensor::BoundaryDistX => edge_closeness(loc.x, grid.width()),
            Sensor::BoundaryDistY => edge_closeness(loc.y, grid.height()),
            Sensor::BoundaryDist => edge_closeness(loc.x, grid.width())
                .max(edge_closeness(loc.y, grid.height())),
            Sensor::LastMoveDirX => creature.last_move_dir.x as f32,
            Sensor::LastMoveDirY => creature.last_move_dir.y as f32,
            Sensor::Age => creature.age as f32 / self.ticks_per_generation.max(1) as f32,
            Sensor::Oscillator => creature.oscillator(self.tick),
            Sensor::Energy => creature.energy,
            Sensor::PopulationDensity => {
                let side = (2 * DENSITY_RADIUS + 1) as f32;
                grid.count_occupied_near(loc, DENSITY_RADIUS) as f32 / (side * side - 1.0)
            }
            Sensor::PopulationForward => {
                probe_closeness(grid.probe(loc, creature.last_move_dir, PROBE_RANGE, |v| v > BARRIER))
            }
            Sensor::BarrierForward => {
                probe_closeness(grid.probe(loc, creature.last_move_dir, PROBE_RANGE, |v| v == BARRIER))
            }
            Sensor::BirthDistance => loc.distance(creature.birth_loc) as f32 / w.max(h),
            Sensor::GeneticSimilarityForward => grid
                .occupant(loc.offset(creature.last_move_dir))
                .filter(|&id| id != creature.id)
                .and_then(|id| self.population.creature_by_id(id))
                .map_or(0.0, |other| similarity(&creature.genome, &other.genome)),
        }
    }
}

/// 1.0 on an edge, 0.0 at the middle
fn edge_closeness(pos: i16, extent: usize) -> f32 {
    let half = (extent as f32 - 1.0) / 2.0;
    if half <= 0.0 {
        return 1.0;
    }
    let to_edge = (pos as f32).min(extent as f32 - 1.0 - pos as f32);
    1.0 - to_edge / half
}

/// 1.0 when the hit is adjacent, falling off with distance; 0.0 for no hit
fn probe_closeness(hit: Option<i16>) -> f32 {
    hit.map_or(0.0, |steps| 1.0 - (steps - 1) as f32 / PROBE_RANGE as f32)
}
