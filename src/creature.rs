//! Creature structure and per-tick state.

use crate::genetics::Genome;
use crate::grid::{Coord, Dir};
use crate::neural::NeuralNet;

/// Creature id; also the value its grid cell holds
pub type CreatureId = u16;

/// An agent on the grid
#[derive(Clone, Debug)]
pub struct Creature {
    // Identity
    pub id: CreatureId,

    // Physical state
    pub loc: Coord,
    pub birth_loc: Coord,
    pub last_move_dir: Dir,
    pub energy: f32,
    pub age: u32,
    pub alive: bool,

    // Internal state
    /// Changed only through the set-responsiveness action
    pub responsiveness: f32,
    /// Oscillator period in ticks, always >= 2
    pub clock: u32,

    // Heredity and brain
    pub genome: Genome,
    pub net: NeuralNet,
}

impl Creature {
    /// Create a creature and compile its brain. The genome is owned, never
    /// shared with a parent or sibling.
    pub fn new(id: CreatureId, loc: Coord, last_move_dir: Dir, genome: Genome) -> Self {
        let net = NeuralNet::from_genome(&genome);

        Self {
            id,
            loc,
            birth_loc: loc,
            last_move_dir,
            energy: genome.max_energy as f32 / u8::MAX as f32,
            age: 0,
            alive: true,
            responsiveness: genome.responsiveness_f32() / 2.0,
            clock: genome.osc_period.max(2) as u32,
            genome,
            net,
        }
    }

    /// Oscillator phase in 0.0..=1.0 at `tick`
    pub fn oscillator(&self, tick: u32) -> f32 {
        let phase = (tick % self.clock) as f32 / self.clock as f32;
        (-(phase * std::f32::consts::TAU).cos() + 1.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> Genome {
        Genome {
            genes: Vec::new(),
            max_energy: 255,
            osc_period: 10,
            responsiveness: 255,
            neuron_count: 1,
        }
    }

    #[test]
    fn test_birth_state_from_traits() {
        let c = Creature::new(5, Coord::new(3, 4), Dir::NORTH, genome());

        assert_eq!(c.id, 5);
        assert_eq!(c.birth_loc, Coord::new(3, 4));
        assert_eq!(c.energy, 1.0);
        assert_eq!(c.responsiveness, 0.5);
        assert_eq!(c.clock, 10);
        assert_eq!(c.age, 0);
        assert!(c.alive);
        assert!(c.net.is_inert());
    }

    #[test]
    fn test_oscillator_cycle() {
        let c = Creature::new(2, Coord::new(0, 0), Dir::EAST, genome());

        assert!(c.oscillator(0).abs() < 1e-6);
        assert!((c.oscillator(5) - 1.0).abs() < 1e-6);
        assert!(c.oscillator(10).abs() < 1e-6);
    }
}
