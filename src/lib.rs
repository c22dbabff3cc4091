//! # evogrid
//!
//! Evolutionary grid simulator: creatures driven by small neural networks
//! compiled from their genomes, selected by a survival challenge at the end
//! of every generation.
//!
//! ## Features
//!
//! - **Genome-wired brains**: packed 32-bit genes compiled into pruned nets
//! - **Parallel**: decision phase runs on all CPU cores via Rayon
//! - **Reproducible**: seeded, scheduling-independent random streams
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evogrid::{Config, Simulation, Status};
//!
//! let mut sim = Simulation::new(Config::default()).unwrap();
//!
//! // Advance until extinction or the generation limit
//! let status = sim.run_to_end().unwrap();
//! println!("Finished at generation {}: {:?}", sim.generation(), status);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use evogrid::Config;
//! use evogrid::survival::Challenge;
//!
//! let mut config = Config::default();
//! config.population.max_population = 500;
//! config.selection.challenge = Challenge::CenterCircle { radius: 20.0 };
//! assert!(config.validate().is_ok());
//! ```

pub mod actions;
pub mod config;
pub mod creature;
pub mod error;
pub mod genetics;
pub mod grid;
pub mod neural;
pub mod population;
pub mod sensors;
pub mod simulation;
pub mod stats;
pub mod survival;

// Re-export main types
pub use config::Config;
pub use creature::Creature;
pub use error::SimError;
pub use genetics::Genome;
pub use simulation::{Simulation, Status};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark: `ticks` steps with `population` creatures on the
/// default grid, without generational turnover
pub fn benchmark(ticks: u32, population: usize) -> Result<BenchmarkResult, SimError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.starting_population = population;
    config.population.max_population = population;

    let mut sim = Simulation::new(config)?;

    let start = Instant::now();
    for _ in 0..ticks {
        sim.step();
    }
    let elapsed = start.elapsed();

    let edges: usize = sim.population().creatures.iter().map(|c| c.net.edge_count()).sum();

    Ok(BenchmarkResult {
        ticks,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
        edges_mean: edges as f64 / population.max(1) as f64,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u32,
    pub population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub edges_mean: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Mean compiled edges: {:.1}", self.edges_mean)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}
