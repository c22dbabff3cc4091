//! Survival challenges: which creatures get to reproduce at turnover.

use crate::creature::Creature;
use crate::grid::{Coord, Grid};
use serde::{Deserialize, Serialize};

/// Decides, from a creature's final state, whether it survives the generation
pub trait SurvivalPredicate: Send + Sync {
    fn passes(&self, creature: &Creature, grid: &Grid) -> bool;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Built-in location-based challenges
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Challenge {
    /// Every living creature survives
    All,
    #[default]
    RightHalf,
    LeftHalf,
    /// Eastmost quarter of the grid
    RightQuarter,
    /// Within `radius` cells of the grid centre
    CenterCircle { radius: f32 },
    /// Within `radius` cells of any grid corner
    Corners { radius: f32 },
    /// Within `width` cells of any grid edge
    Border { width: i16 },
}

impl SurvivalPredicate for Challenge {
    fn passes(&self, creature: &Creature, grid: &Grid) -> bool {
        if !creature.alive {
            return false;
        }
        let w = grid.width() as i16;
        let h = grid.height() as i16;
        let Coord { x, y } = creature.loc;

        match *self {
            Challenge::All => true,
            Challenge::RightHalf => x >= w / 2,
            Challenge::LeftHalf => x < w / 2,
            Challenge::RightQuarter => x >= w - w / 4,
            Challenge::CenterCircle { radius } => {
                let cx = (w - 1) as f32 / 2.0;
                let cy = (h - 1) as f32 / 2.0;
                euclidean(x as f32 - cx, y as f32 - cy) <= radius
            }
            Challenge::Corners { radius } => [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)]
                .iter()
                .any(|&(cx, cy)| euclidean((x - cx) as f32, (y - cy) as f32) <= radius),
            Challenge::Border { width } => {
                x < width || y < width || x >= w - width || y >= h - width
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Challenge::All => "all",
            Challenge::RightHalf => "right_half",
            Challenge::LeftHalf => "left_half",
            Challenge::RightQuarter => "right_quarter",
            Challenge::CenterCircle { .. } => "center_circle",
            Challenge::Corners { .. } => "corners",
            Challenge::Border { .. } => "border",
        }
    }
}

#[inline]
fn euclidean(dx: f32, dy: f32) -> f32 {
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::Genome;
    use crate::grid::Dir;

    fn at(x: i16, y: i16) -> Creature {
        let genome = Genome {
            genes: Vec::new(),
            max_energy: 0,
            osc_period: 2,
            responsiveness: 0,
            neuron_count: 1,
        };
        Creature::new(2, Coord::new(x, y), Dir::EAST, genome)
    }

    #[test]
    fn test_halves() {
        let grid = Grid::new(10, 10);
        assert!(Challenge::RightHalf.passes(&at(5, 0), &grid));
        assert!(!Challenge::RightHalf.passes(&at(4, 0), &grid));
        assert!(Challenge::LeftHalf.passes(&at(4, 9), &grid));
        assert!(!Challenge::LeftHalf.passes(&at(5, 9), &grid));
    }

    #[test]
    fn test_right_quarter() {
        let grid = Grid::new(12, 4);
        assert!(Challenge::RightQuarter.passes(&at(9, 1), &grid));
        assert!(!Challenge::RightQuarter.passes(&at(8, 1), &grid));
    }

    #[test]
    fn test_center_and_corners() {
        let grid = Grid::new(11, 11);
        let circle = Challenge::CenterCircle { radius: 2.0 };
        assert!(circle.passes(&at(5, 5), &grid));
        assert!(circle.passes(&at(5, 7), &grid));
        assert!(!circle.passes(&at(7, 7), &grid));

        let corners = Challenge::Corners { radius: 1.5 };
        assert!(corners.passes(&at(1, 1), &grid));
        assert!(corners.passes(&at(10, 9), &grid));
        assert!(!corners.passes(&at(5, 0), &grid));
    }

    #[test]
    fn test_border() {
        let grid = Grid::new(10, 10);
        let border = Challenge::Border { width: 2 };
        assert!(border.passes(&at(1, 5), &grid));
        assert!(border.passes(&at(5, 8), &grid));
        assert!(!border.passes(&at(5, 5), &grid));
    }

    #[test]
    fn test_dead_never_passes() {
        let grid = Grid::new(10, 10);
        let mut c = at(5, 5);
        c.alive = false;
        assert!(!Challenge::All.passes(&c, &grid));
    }

    #[test]
    fn test_yaml_form() {
        let c: Challenge = serde_yaml::from_str("kind: center_circle\nradius: 12.5\n").unwrap();
        assert_eq!(c, Challenge::CenterCircle { radius: 12.5 });
        let c: Challenge = serde_yaml::from_str("kind: right_half\n").unwrap();
        assert_eq!(c, Challenge::RightHalf);
        assert_eq!(c.name(), "right_half");
    }
}
