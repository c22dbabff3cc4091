//! Cell-occupancy grid, coordinates and compass directions.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell value for an unoccupied cell
pub const EMPTY: u16 = 0;
/// Cell value for a barrier cell
pub const BARRIER: u16 = 1;

/// Grid location. Row 0 is the top edge, so north is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    #[inline]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Location one step away in `dir`
    #[inline]
    pub fn offset(self, dir: Dir) -> Coord {
        Coord {
            x: self.x + dir.x as i16,
            y: self.y + dir.y as i16,
        }
    }

    /// Chebyshev distance
    #[inline]
    pub fn distance(self, other: Coord) -> i16 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions, or `CENTER` for no movement.
/// Each component is in -1..=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dir {
    pub x: i8,
    pub y: i8,
}

impl Dir {
    pub const CENTER: Dir = Dir { x: 0, y: 0 };
    pub const NORTH: Dir = Dir { x: 0, y: -1 };
    pub const NORTH_EAST: Dir = Dir { x: 1, y: -1 };
    pub const EAST: Dir = Dir { x: 1, y: 0 };
    pub const SOUTH_EAST: Dir = Dir { x: 1, y: 1 };
    pub const SOUTH: Dir = Dir { x: 0, y: 1 };
    pub const SOUTH_WEST: Dir = Dir { x: -1, y: 1 };
    pub const WEST: Dir = Dir { x: -1, y: 0 };
    pub const NORTH_WEST: Dir = Dir { x: -1, y: -1 };

    pub const COMPASS: [Dir; 8] = [
        Dir::NORTH,
        Dir::NORTH_EAST,
        Dir::EAST,
        Dir::SOUTH_EAST,
        Dir::SOUTH,
        Dir::SOUTH_WEST,
        Dir::WEST,
        Dir::NORTH_WEST,
    ];

    /// Clamp an arbitrary offset to a unit compass step
    #[inline]
    pub fn from_offset(dx: i16, dy: i16) -> Dir {
        Dir {
            x: dx.signum() as i8,
            y: dy.signum() as i8,
        }
    }

    /// Direction of travel from `from` to `to`
    #[inline]
    pub fn between(from: Coord, to: Coord) -> Dir {
        Dir::from_offset(to.x - from.x, to.y - from.y)
    }

    #[inline]
    pub fn rotate90_cw(self) -> Dir {
        Dir {
            x: -self.y,
            y: self.x,
        }
    }

    #[inline]
    pub fn rotate90_ccw(self) -> Dir {
        Dir {
            x: self.y,
            y: -self.x,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Dir {
        Dir::COMPASS[rng.gen_range(0..Dir::COMPASS.len())]
    }

    #[inline]
    pub fn is_center(self) -> bool {
        self == Dir::CENTER
    }
}

/// Fixed cell layouts rebuilt after every grid reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierKind {
    #[default]
    None,
    /// Vertical wall, 5 cells wide, centred horizontally over the middle half of the height
    CenterWall,
}

impl BarrierKind {
    /// Cells covered by this barrier on a grid of the given size
    pub fn cells(self, width: usize, height: usize) -> Vec<Coord> {
        match self {
            BarrierKind::None => Vec::new(),
            BarrierKind::CenterWall => {
                let center = width as i32 / 2;
                let x_min = (center - 2).max(0);
                let x_max = (center + 2).min(width as i32 - 1);
                let y_min = height as i32 / 4;
                let y_max = y_min + height as i32 / 2;

                let mut cells = Vec::new();
                for y in y_min..y_max {
                    for x in x_min..=x_max {
                        cells.push(Coord::new(x as i16, y as i16));
                    }
                }
                cells
            }
        }
    }
}

/// 2-D occupancy array. A cell holds `EMPTY`, `BARRIER` or a creature id.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u16>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, c: Coord) -> usize {
        c.y as usize * self.width + c.x as usize
    }

    #[inline]
    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.width && (c.y as usize) < self.height
    }

    /// Cell value; out-of-bounds reads as `BARRIER`
    #[inline]
    pub fn at(&self, c: Coord) -> u16 {
        if self.in_bounds(c) {
            self.cells[self.index(c)]
        } else {
            BARRIER
        }
    }

    /// Write a cell. Caller guarantees `c` is in bounds.
    #[inline]
    pub fn set(&mut self, c: Coord, value: u16) {
        debug_assert!(self.in_bounds(c), "write outside grid at {}", c);
        let idx = self.index(c);
        self.cells[idx] = value;
    }

    #[inline]
    pub fn is_empty_at(&self, c: Coord) -> bool {
        self.in_bounds(c) && self.cells[self.index(c)] == EMPTY
    }

    #[inline]
    pub fn is_barrier_at(&self, c: Coord) -> bool {
        self.at(c) == BARRIER
    }

    #[inline]
    pub fn is_occupied_at(&self, c: Coord) -> bool {
        self.in_bounds(c) && self.cells[self.index(c)] > BARRIER
    }

    /// Creature id at `c`, if any
    #[inline]
    pub fn occupant(&self, c: Coord) -> Option<u16> {
        let value = self.at(c);
        (value > BARRIER).then_some(value)
    }

    /// Clear every cell
    pub fn zero_fill(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Stamp barrier cells
    pub fn create_barrier(&mut self, kind: BarrierKind) {
        for c in kind.cells(self.width, self.height) {
            self.set(c, BARRIER);
        }
    }

    /// Clear the grid and rebuild its fixed cells
    pub fn reset(&mut self, kind: BarrierKind) {
        self.zero_fill();
        self.create_barrier(kind);
    }

    /// All empty cells in row-major order
    pub fn empty_locations(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == EMPTY)
            .map(|(i, _)| Coord::new((i % self.width) as i16, (i / self.width) as i16))
            .collect()
    }

    /// All empty cells in a uniformly shuffled order
    pub fn shuffled_empty_locations<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Coord> {
        let mut cells = self.empty_locations();
        cells.shuffle(rng);
        cells
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == EMPTY).count()
    }

    /// Cells holding a creature id
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().filter(|&&v| v > BARRIER).count()
    }

    /// Occupied cells within `radius` (Chebyshev) of `center`, excluding the center
    pub fn count_occupied_near(&self, center: Coord, radius: i16) -> usize {
        let mut count = 0;
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let c = Coord::new(x, y);
                if c != center && self.is_occupied_at(c) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Steps taken in `dir` from `start` before hitting a cell matching `stop`,
    /// or `None` within `range` steps
    pub fn probe(&self, start: Coord, dir: Dir, range: i16, stop: impl Fn(u16) -> bool) -> Option<i16> {
        if dir.is_center() {
            return None;
        }
        let mut c = start;
        for step in 1..=range {
            c = c.offset(dir);
            if !self.in_bounds(c) {
                return None;
            }
            if stop(self.at(c)) {
                return Some(step);
            }
        }
        None
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &cell in row {
                let ch = match cell {
                    EMPTY => '.',
                    BARRIER => '#',
                    _ => 'o',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_bounds_and_set() {
        let mut grid = Grid::new(10, 5);
        let c = Coord::new(9, 4);

        assert!(grid.in_bounds(c));
        assert!(!grid.in_bounds(Coord::new(10, 4)));
        assert!(!grid.in_bounds(Coord::new(-1, 0)));

        grid.set(c, 7);
        assert_eq!(grid.at(c), 7);
        assert_eq!(grid.occupant(c), Some(7));
        assert!(!grid.is_empty_at(c));
        assert!(grid.is_occupied_at(c));
    }

    #[test]
    fn test_out_of_bounds_reads_as_barrier() {
        let grid = Grid::new(4, 4);
        assert!(grid.is_barrier_at(Coord::new(-1, 2)));
        assert!(!grid.is_empty_at(Coord::new(4, 0)));
    }

    #[test]
    fn test_rotation() {
        assert_eq!(Dir::NORTH.rotate90_cw(), Dir::EAST);
        assert_eq!(Dir::EAST.rotate90_cw(), Dir::SOUTH);
        assert_eq!(Dir::NORTH.rotate90_ccw(), Dir::WEST);
        assert_eq!(Dir::NORTH_EAST.rotate90_cw(), Dir::SOUTH_EAST);
        for d in Dir::COMPASS {
            assert_eq!(d.rotate90_cw().rotate90_ccw(), d);
        }
        assert_eq!(Dir::CENTER.rotate90_cw(), Dir::CENTER);
    }

    #[test]
    fn test_direction_between() {
        let from = Coord::new(5, 5);
        assert_eq!(Dir::between(from, Coord::new(6, 5)), Dir::EAST);
        assert_eq!(Dir::between(from, Coord::new(4, 4)), Dir::NORTH_WEST);
        assert_eq!(Dir::between(from, from), Dir::CENTER);
    }

    #[test]
    fn test_center_wall() {
        let mut grid = Grid::new(40, 40);
        grid.reset(BarrierKind::CenterWall);

        assert!(grid.is_barrier_at(Coord::new(20, 20)));
        assert!(grid.is_barrier_at(Coord::new(18, 10)));
        assert!(grid.is_barrier_at(Coord::new(22, 29)));
        assert!(grid.is_empty_at(Coord::new(20, 9)));
        assert!(grid.is_empty_at(Coord::new(20, 30)));
        assert!(grid.is_empty_at(Coord::new(17, 20)));
        assert_eq!(grid.count_empty(), 40 * 40 - 5 * 20);
    }

    #[test]
    fn test_reset_clears_occupants() {
        let mut grid = Grid::new(8, 8);
        grid.set(Coord::new(1, 1), 5);
        grid.reset(BarrierKind::None);
        assert_eq!(grid.count_empty(), 64);
    }

    #[test]
    fn test_shuffled_empty_locations() {
        let mut grid = Grid::new(6, 6);
        grid.set(Coord::new(0, 0), 9);
        grid.set(Coord::new(3, 3), BARRIER);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cells = grid.shuffled_empty_locations(&mut rng);

        assert_eq!(cells.len(), 34);
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(unique.len(), 34);
        assert!(cells.iter().all(|&c| grid.is_empty_at(c)));
        assert_ne!(cells, grid.empty_locations());
    }

    #[test]
    fn test_probe() {
        let mut grid = Grid::new(10, 1);
        grid.set(Coord::new(6, 0), 4);

        let hit = grid.probe(Coord::new(2, 0), Dir::EAST, 8, |v| v > BARRIER);
        assert_eq!(hit, Some(4));
        let miss = grid.probe(Coord::new(2, 0), Dir::WEST, 8, |v| v > BARRIER);
        assert_eq!(miss, None);
    }

    #[test]
    fn test_count_occupied_near() {
        let mut grid = Grid::new(5, 5);
        grid.set(Coord::new(2, 2), 3);
        grid.set(Coord::new(1, 1), 4);
        grid.set(Coord::new(4, 4), 5);

        assert_eq!(grid.count_occupied_near(Coord::new(2, 2), 1), 1);
        assert_eq!(grid.count_occupied_near(Coord::new(2, 2), 2), 2);
    }

    #[test]
    fn test_display() {
        let mut grid = Grid::new(3, 2);
        grid.set(Coord::new(0, 0), BARRIER);
        grid.set(Coord::new(2, 1), 8);
        assert_eq!(grid.to_string(), "#..\n..o\n");
    }
}
