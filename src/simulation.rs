//! Simulation engine - tick loop and generational turnover.

use crate::actions::{plan_actions, ActionSettings, Decision};
use crate::config::Config;
use crate::error::SimError;
use crate::genetics::Genome;
use crate::grid::{Dir, Grid};
use crate::population::Population;
use crate::sensors::SensorContext;
use crate::stats::{GenerationStats, StatsHistory};
use crate::survival::SurvivalPredicate;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fmt;

/// Outcome of [`Simulation::update`]. Both non-`Continuing` values are
/// terminal: once reached, the simulation does no further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continuing,
    /// No creature passed the challenge at turnover
    Extinct,
    GenerationLimitReached,
}

impl Status {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Status::Continuing
    }
}

/// The simulation: grid, population and the generation clock
pub struct Simulation {
    grid: Grid,
    population: Population,

    // Clock
    tick: u32,
    generation: u32,
    status: Status,

    config: Config,
    action_settings: ActionSettings,
    predicate: Box<dyn SurvivalPredicate>,

    // Statistics
    diversity: f32,
    stats_history: StatsHistory,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulation {
    /// Create a simulation with a random seed
    pub fn new(config: Config) -> Result<Self, SimError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed for reproducibility.
    ///
    /// Builds the grid with its barrier and seeds generation 0 with random
    /// genomes on shuffled empty cells.
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        log::info!(
            "Initializing {}x{} grid, seed {}",
            config.world.grid_width,
            config.world.grid_height,
            seed
        );
        let mut grid = Grid::new(config.world.grid_width, config.world.grid_height);
        grid.create_barrier(config.world.barrier);

        let genomes: Vec<Genome> = (0..config.population.starting_population)
            .map(|_| Genome::random(&mut rng, &config.genome))
            .collect();
        let population = populate(&mut grid, genomes.iter().cloned(), genomes.len(), &config, &mut rng)?;
        log::info!("Initialized first generation: {} creatures", population.len());

        Ok(Self {
            grid,
            population,
            tick: 0,
            generation: 0,
            status: Status::Continuing,
            action_settings: ActionSettings::from_config(&config.actions),
            predicate: Box::new(config.selection.challenge),
            config,
            diversity: 0.0,
            stats_history: StatsHistory::new(),
            rng,
            seed,
        })
    }

    /// Replace the configured challenge with a custom survival rule
    pub fn set_predicate(&mut self, predicate: impl SurvivalPredicate + 'static) {
        self.predicate = Box::new(predicate);
    }

    /// Advance one tick, or run turnover once the generation's ticks are
    /// used up
    pub fn update(&mut self) -> Result<Status, SimError> {
        if self.status.is_terminal() {
            return Ok(self.status);
        }

        if self.tick < self.config.generation.ticks_per_generation {
            self.step();
        } else if self.turnover()? == Status::Extinct {
            return Ok(self.status);
        }

        if self.generation >= self.config.generation.max_generations {
            log::info!("Simulation ended: reached generation {}", self.generation);
            self.status = Status::GenerationLimitReached;
        }
        Ok(self.status)
    }

    /// One tick: parallel decisions against a snapshot, sequential effects,
    /// then the end-of-tick queues (moves, reproductions, deaths)
    pub fn step(&mut self) {
        let decisions = self.compute_decisions();
        self.execute_actions(&decisions);

        let moved = self.population.process_move_queue(&mut self.grid);
        let born = self.population.process_reproduction_queue(
            &mut self.grid,
            &self.config.mutation,
            &self.config.genome,
            self.config.population.max_population,
            &mut self.rng,
        );
        let died = self.population.process_death_queue(&mut self.grid);

        log::debug!(
            "Generation {} tick {}: {} moved, {} born, {} died",
            self.generation,
            self.tick,
            moved,
            born,
            died
        );
        self.tick += 1;
    }

    /// Feed-forward and action planning for every living creature.
    ///
    /// Creature `i` draws from its own generator (the tick seed on stream
    /// `i`), so results do not depend on thread scheduling.
    fn compute_decisions(&mut self) -> Vec<Option<Decision>> {
        let tick_seed: u64 = self.rng.gen();
        let mut scratch = std::mem::take(&mut self.population.scratch);

        let ctx = SensorContext {
            grid: &self.grid,
            population: &self.population,
            tick: self.tick,
            ticks_per_generation: self.config.generation.ticks_per_generation,
        };
        let settings = &self.action_settings;

        let decisions: Vec<Option<Decision>> = scratch
            .par_iter_mut()
            .enumerate()
            .map(|(i, buffers)| {
                let creature = &ctx.population.creatures[i];
                if !creature.alive {
                    return None;
                }
                let mut rng = ChaCha8Rng::seed_from_u64(tick_seed);
                rng.set_stream(i as u64);

                let levels = creature.net.feed_forward(buffers, |s| ctx.read(s, creature));
                Some(plan_actions(creature, levels, ctx.grid, settings, &mut rng))
            })
            .collect();

        self.population.scratch = scratch;
        decisions
    }

    /// Apply decisions in creature order: age, responsiveness, oscillator
    /// period, then queue the move
    fn execute_actions(&mut self, decisions: &[Option<Decision>]) {
        for (i, decision) in decisions.iter().enumerate() {
            let Some(decision) = decision else {
                continue;
            };
            let creature = &mut self.population.creatures[i];
            creature.age += 1;
            if let Some(r) = decision.responsiveness {
                creature.responsiveness = r;
            }
            if let Some(clock) = decision.clock {
                creature.clock = clock;
            }
            if let Some(to) = decision.move_to {
                self.population.queue_for_move(i, to);
            }
        }
    }

    /// End the generation: select, reproduce and respawn on a fresh grid
    fn turnover(&mut self) -> Result<Status, SimError> {
        self.diversity = self.population.genetic_diversity(&mut self.rng);

        let children: Vec<Genome> = self
            .population
            .creatures
            .iter()
            .filter(|c| self.predicate.passes(c, &self.grid))
            .map(|c| {
                c.genome
                    .offspring(&self.config.mutation, &self.config.genome, &mut self.rng)
            })
            .collect();

        let stats = GenerationStats::collect(
            self.generation,
            &self.population.creatures,
            children.len(),
            self.diversity,
        );
        let interval = self.config.logging.stats_interval.max(1);
        if self.generation % interval == 0 {
            log::info!("{}", stats.summary());
        }
        self.stats_history.record(stats);

        if children.is_empty() {
            log::warn!(
                "Extinction at generation {}: no creature passed '{}'",
                self.generation,
                self.predicate.name()
            );
            self.status = Status::Extinct;
            return Ok(self.status);
        }

        self.grid.reset(self.config.world.barrier);
        let target = self.config.population.max_population;
        let genomes = children.iter().cycle().cloned();
        self.population = populate(&mut self.grid, genomes, target, &self.config, &mut self.rng)?;

        self.tick = 0;
        self.generation += 1;
        log::debug!("Generation {} placed: {} creatures", self.generation, self.population.len());
        Ok(Status::Continuing)
    }

    /// Run until `generations` more turnovers happened or a terminal status
    pub fn run_generations(&mut self, generations: u32) -> Result<Status, SimError> {
        let target = self.generation.saturating_add(generations);
        while self.generation < target {
            let status = self.update()?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
        Ok(self.status)
    }

    /// Run until a terminal status
    pub fn run_to_end(&mut self) -> Result<Status, SimError> {
        loop {
            let status = self.update()?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }

    /// Sampled genetic diversity of the current population
    pub fn genetic_diversity(&mut self) -> f32 {
        self.population.genetic_diversity(&mut self.rng)
    }

    /// Dump the grid and population size to stdout
    pub fn print(&self) {
        println!("{}", self);
    }

    // === Accessors ===

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Mutable access for driving the instruction queues directly
    #[inline]
    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Diversity measured at the last turnover
    #[inline]
    pub fn last_diversity(&self) -> f32 {
        self.diversity
    }

    pub fn stats_history(&self) -> &StatsHistory {
        &self.stats_history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Place `count` creatures with the given genomes on shuffled empty cells
fn populate<I, R>(
    grid: &mut Grid,
    genomes: I,
    count: usize,
    config: &Config,
    rng: &mut R,
) -> Result<Population, SimError>
where
    I: Iterator<Item = Genome>,
    R: Rng + ?Sized,
{
    let cells = grid.shuffled_empty_locations(rng);
    if cells.len() < count {
        return Err(SimError::InsufficientSpace {
            needed: count,
            available: cells.len(),
        });
    }

    let mut population = Population::new(config.population.reserved_ids);
    for (loc, genome) in cells.into_iter().zip(genomes).take(count) {
        let dir = Dir::random(rng);
        population.spawn(grid, loc, dir, genome);
    }
    Ok(population)
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        write!(
            f,
            "Generation: {} Tick: {} Population Size: {}",
            self.generation,
            self.tick,
            self.population.living()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Creature;
    use crate::grid::BarrierKind;
    use crate::survival::Challenge;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.world.grid_width = 32;
        config.world.grid_height = 32;
        config.world.barrier = BarrierKind::None;
        config.population.starting_population = 60;
        config.population.max_population = 80;
        config.generation.ticks_per_generation = 20;
        config.generation.max_generations = 3;
        config.genome.initial_length_min = 8;
        config.genome.initial_length_max = 8;
        config.selection.challenge = Challenge::All;
        config
    }

    struct Nobody;

    impl SurvivalPredicate for Nobody {
        fn passes(&self, _: &Creature, _: &Grid) -> bool {
            false
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new_with_seed(test_config(), 1).unwrap();

        assert_eq!(sim.population().len(), 60);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.generation(), 0);
        assert!(sim.population().occupancy_consistent(sim.grid()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.population.max_population = 32 * 32 + 1;
        assert!(matches!(
            Simulation::new_with_seed(config, 1),
            Err(SimError::InsufficientSpace { .. })
        ));
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = Simulation::new_with_seed(test_config(), 2).unwrap();
        sim.step();
        sim.step();

        assert_eq!(sim.tick(), 2);
        assert!(sim.population().creatures.iter().all(|c| c.age == 2));
        assert!(sim.population().occupancy_consistent(sim.grid()));
    }

    #[test]
    fn test_turnover_fills_population() {
        let mut sim = Simulation::new_with_seed(test_config(), 3).unwrap();
        for _ in 0..=20 {
            assert_eq!(sim.update().unwrap(), Status::Continuing);
        }

        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.population().len(), 80);
        assert!(sim.population().occupancy_consistent(sim.grid()));
        assert_eq!(sim.stats_history().generations.len(), 1);
        assert_eq!(sim.stats_history().generations[0].survivors, 60);
    }

    #[test]
    fn test_extinction_is_terminal() {
        let mut sim = Simulation::new_with_seed(test_config(), 4).unwrap();
        sim.set_predicate(Nobody);

        let status = sim.run_to_end().unwrap();
        assert_eq!(status, Status::Extinct);
        assert_eq!(sim.generation(), 0);
        // Nothing replaced
        assert_eq!(sim.population().len(), 60);

        let tick = sim.tick();
        assert_eq!(sim.update().unwrap(), Status::Extinct);
        assert_eq!(sim.tick(), tick);
    }

    #[test]
    fn test_generation_limit() {
        let mut sim = Simulation::new_with_seed(test_config(), 5).unwrap();
        let status = sim.run_to_end().unwrap();

        assert_eq!(status, Status::GenerationLimitReached);
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.update().unwrap(), Status::GenerationLimitReached);
    }

    #[test]
    fn test_run_generations() {
        let mut sim = Simulation::new_with_seed(test_config(), 6).unwrap();
        assert_eq!(sim.run_generations(2).unwrap(), Status::Continuing);
        assert_eq!(sim.generation(), 2);
    }

    #[test]
    fn test_display() {
        let sim = Simulation::new_with_seed(test_config(), 7).unwrap();
        let dump = sim.to_string();
        assert!(dump.ends_with("Population Size: 60"));
        assert_eq!(dump.lines().count(), 33);
    }
}
