//! Live creature collection and deferred end-of-tick instruction queues.

use crate::config::{GenomeConfig, MutationConfig};
use crate::creature::{Creature, CreatureId};
use crate::genetics::{sampled_diversity, Genome};
use crate::grid::{Coord, Dir, Grid, EMPTY};
use crate::neural::Scratch;
use rand::seq::SliceRandom;
use rand::Rng;

/// Move `creature` (population index) to `to` at tick end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInstruction {
    pub creature: usize,
    pub to: Coord,
}

/// Creatures in birth order plus their evaluation buffers.
///
/// `creatures[i]` has id `reserved_ids + i` and owns `scratch[i]`.
#[derive(Clone, Debug)]
pub struct Population {
    pub creatures: Vec<Creature>,
    pub scratch: Vec<Scratch>,
    reserved_ids: u16,
    move_queue: Vec<MoveInstruction>,
    death_queue: Vec<usize>,
    reproduction_queue: Vec<usize>,
}

impl Population {
    pub fn new(reserved_ids: u16) -> Self {
        Self {
            creatures: Vec::new(),
            scratch: Vec::new(),
            reserved_ids,
            move_queue: Vec::new(),
            death_queue: Vec::new(),
            reproduction_queue: Vec::new(),
        }
    }

    /// Add a creature at `loc` and mark its cell. `loc` must be empty.
    pub fn spawn(&mut self, grid: &mut Grid, loc: Coord, last_move_dir: Dir, genome: Genome) -> CreatureId {
        debug_assert!(grid.is_empty_at(loc), "spawn on non-empty cell {}", loc);
        let id = self.reserved_ids + self.creatures.len() as u16;
        let creature = Creature::new(id, loc, last_move_dir, genome);
        self.scratch.push(Scratch::for_net(&creature.net));
        self.creatures.push(creature);
        grid.set(loc, id);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn living(&self) -> usize {
        self.creatures.iter().filter(|c| c.alive).count()
    }

    #[inline]
    pub fn index_of(&self, id: CreatureId) -> Option<usize> {
        let idx = id.checked_sub(self.reserved_ids)? as usize;
        (idx < self.creatures.len()).then_some(idx)
    }

    pub fn creature_by_id(&self, id: CreatureId) -> Option<&Creature> {
        self.index_of(id).map(|idx| &self.creatures[idx])
    }

    // === Move queue ===

    pub fn queue_for_move(&mut self, creature: usize, to: Coord) {
        self.move_queue.push(MoveInstruction { creature, to });
    }

    #[inline]
    pub fn pending_moves(&self) -> &[MoveInstruction] {
        &self.move_queue
    }

    /// Apply queued moves in insertion order. A move succeeds only if its
    /// target is empty when it is reached, so the first of several
    /// creatures aiming at one cell wins. Returns the number applied.
    pub fn process_move_queue(&mut self, grid: &mut Grid) -> usize {
        let mut applied = 0;
        for MoveInstruction { creature, to } in self.move_queue.drain(..) {
            let c = &mut self.creatures[creature];
            if !c.alive || !grid.is_empty_at(to) {
                continue;
            }
            grid.set(c.loc, EMPTY);
            grid.set(to, c.id);
            c.last_move_dir = Dir::between(c.loc, to);
            c.loc = to;
            applied += 1;
        }
        applied
    }

    // === Death queue ===

    pub fn queue_for_death(&mut self, creature: usize) {
        self.death_queue.push(creature);
    }

    /// Mark queued creatures dead and free their cells
    pub fn process_death_queue(&mut self, grid: &mut Grid) -> usize {
        let mut died = 0;
        for idx in self.death_queue.drain(..) {
            let c = &mut self.creatures[idx];
            if !c.alive {
                continue;
            }
            c.alive = false;
            if grid.at(c.loc) == c.id {
                grid.set(c.loc, EMPTY);
            }
            died += 1;
        }
        died
    }

    // === Reproduction queue ===

    pub fn queue_for_reproduction(&mut self, creature: usize) {
        self.reproduction_queue.push(creature);
    }

    /// Spawn one mutated offspring per queued parent on a random empty
    /// neighbouring cell. Parents with no free neighbour are skipped, and
    /// nothing spawns once the population holds `max_population` creatures.
    pub fn process_reproduction_queue<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        mutation: &MutationConfig,
        limits: &GenomeConfig,
        max_population: usize,
        rng: &mut R,
    ) -> usize {
        let queue = std::mem::take(&mut self.reproduction_queue);
        let mut born = 0;

        for parent in queue {
            if self.creatures.len() >= max_population {
                log::debug!("Reproduction capped at {} creatures", max_population);
                break;
            }
            let p = &self.creatures[parent];
            if !p.alive {
                continue;
            }
            let free: Vec<Coord> = Dir::COMPASS
                .iter()
                .map(|&d| p.loc.offset(d))
                .filter(|&c| grid.is_empty_at(c))
                .collect();
            let Some(&loc) = free.choose(rng) else {
                continue;
            };

            let genome = p.genome.offspring(mutation, limits, rng);
            let dir = Dir::random(rng);
            self.spawn(grid, loc, dir, genome);
            born += 1;
        }
        born
    }

    // === Analysis ===

    /// Sampled mean pairwise genome dissimilarity
    pub fn genetic_diversity<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let genomes: Vec<&Genome> = self.creatures.iter().map(|c| &c.genome).collect();
        sampled_diversity(&genomes, rng)
    }

    /// Every living creature sits on a cell holding its id, and no other
    /// cell holds a creature id
    pub fn occupancy_consistent(&self, grid: &Grid) -> bool {
        let mut living = 0;
        for c in self.creatures.iter().filter(|c| c.alive) {
            if !grid.in_bounds(c.loc) || grid.at(c.loc) != c.id {
                return false;
            }
            living += 1;
        }
        grid.count_occupied() == living
    }
}
