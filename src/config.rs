//! Configuration system for the evogrid simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::actions::Action;
use crate::error::SimError;
use crate::grid::BarrierKind;
use crate::survival::Challenge;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hidden neuron indices are 7-bit in the packed gene encoding.
pub const MAX_NEURONS_LIMIT: usize = 128;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub generation: GenerationConfig,
    pub genome: GenomeConfig,
    pub mutation: MutationConfig,
    #[serde(default)]
    pub actions: ActionConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World/grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Fixed cells rebuilt after every grid reset
    #[serde(default)]
    pub barrier: BarrierKind,
}

/// Population sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of generation 0
    pub starting_population: usize,
    /// Size of every respawned generation
    pub max_population: usize,
    /// Cell values below this are never handed out as creature ids
    pub reserved_ids: u16,
}

/// Generation lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Ticks each generation lives before selection
    pub ticks_per_generation: u32,
    /// Simulation stops once this many turnovers happened
    pub max_generations: u32,
}

/// Genome shape limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeConfig {
    pub initial_length_min: usize,
    pub initial_length_max: usize,
    pub max_length: usize,
    /// Upper bound for the neuron-count trait
    pub max_neurons: usize,
}

/// Mutation rates applied during asexual reproduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Per-gene probability of a single bit flip
    pub point_mutation_rate: f32,
    /// Per-genome probability of inserting or deleting a gene
    pub insertion_deletion_rate: f32,
    /// Share of insertion/deletion events that delete
    pub deletion_ratio: f32,
    /// Per-trait probability of a trait byte being perturbed
    pub trait_mutation_rate: f32,
}

/// Action interpretation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Actions the effect phase listens to; all others read as zero
    pub enabled: Vec<Action>,
    /// Steepness of the responsiveness response curve
    pub response_curve_k: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub challenge: Challenge,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Generations between info-level summaries
    pub stats_interval: u32,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            generation: GenerationConfig::default(),
            genome: GenomeConfig::default(),
            mutation: MutationConfig::default(),
            actions: ActionConfig::default(),
            selection: SelectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_width: 128,
            grid_height: 128,
            barrier: BarrierKind::CenterWall,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            starting_population: 1000,
            max_population: 1000,
            reserved_ids: 2,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ticks_per_generation: 300,
            max_generations: 200,
        }
    }
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            initial_length_min: 24,
            initial_length_max: 24,
            max_length: 300,
            max_neurons: 5,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            point_mutation_rate: 0.001,
            insertion_deletion_rate: 0.0,
            deletion_ratio: 0.5,
            trait_mutation_rate: 0.01,
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            enabled: Action::ALL.to_vec(),
            response_curve_k: 2.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: &str| Err(SimError::InvalidConfig(msg.to_string()));

        if self.world.grid_width == 0
            || self.world.grid_height == 0
            || self.world.grid_width > i16::MAX as usize
            || self.world.grid_height > i16::MAX as usize
        {
            return invalid("grid dimensions must be between 1 and 32767");
        }
        if self.population.reserved_ids < 2 {
            return invalid("reserved_ids must leave room for the empty and barrier markers");
        }
        if self.population.starting_population == 0 || self.population.max_population == 0 {
            return invalid("populations must be > 0");
        }
        let largest = self
            .population
            .starting_population
            .max(self.population.max_population);
        if largest + self.population.reserved_ids as usize > u16::MAX as usize {
            return invalid("population does not fit in 16-bit cell ids");
        }
        let available = self.open_cells();
        if largest > available {
            return Err(SimError::InsufficientSpace {
                needed: largest,
                available,
            });
        }
        if self.genome.max_neurons == 0 || self.genome.max_neurons > MAX_NEURONS_LIMIT {
            return invalid("max_neurons must be between 1 and 128");
        }
        if self.genome.initial_length_min == 0
            || self.genome.initial_length_min > self.genome.initial_length_max
            || self.genome.initial_length_max > self.genome.max_length
        {
            return invalid("genome lengths must satisfy 0 < min <= max <= max_length");
        }
        if self.actions.enabled.is_empty() {
            return invalid("at least one action must be enabled");
        }
        if self.generation.ticks_per_generation == 0 || self.generation.max_generations == 0 {
            return invalid("ticks_per_generation and max_generations must be > 0");
        }
        let k = self.actions.response_curve_k;
        if k.is_nan() || k < 0.0 {
            return invalid("response_curve_k must be >= 0");
        }
        if self.logging.log_level.parse::<log::LevelFilter>().is_err() {
            return invalid("log_level must be one of off, error, warn, info, debug, trace");
        }
        Ok(())
    }

    /// Number of cells left free once the barrier is built
    pub fn open_cells(&self) -> usize {
        let total = self.world.grid_width * self.world.grid_height;
        total.saturating_sub(
            self.world
                .barrier
                .cells(self.world.grid_width, self.world.grid_height)
                .len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.grid_width, loaded.world.grid_width);
        assert_eq!(config.actions.enabled, loaded.actions.enabled);
        assert_eq!(config.selection.challenge, loaded.selection.challenge);
    }

    #[test]
    fn test_overcrowded_grid_rejected() {
        let mut config = Config::default();
        config.world.grid_width = 10;
        config.world.grid_height = 10;
        config.world.barrier = BarrierKind::None;
        config.population.max_population = 101;

        assert!(matches!(
            config.validate(),
            Err(SimError::InsufficientSpace {
                needed: 101,
                available: 100
            })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.generation.max_generations = 7;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.generation.max_generations, 7);
    }

    #[test]
    fn test_neuron_limit() {
        let mut config = Config::default();
        config.genome.max_neurons = MAX_NEURONS_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_generation_limit_rejected() {
        let mut config = Config::default();
        config.generation.max_generations = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_response_curve_rejected() {
        let mut config = Config::default();
        config.actions.response_curve_k = -1.0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
        config.actions.response_curve_k = f32::NAN;
        assert!(config.validate().is_err());
        config.actions.response_curve_k = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_checked() {
        let mut config = Config::default();
        config.logging.log_level = "debug".to_string();
        assert!(config.validate().is_ok());
        config.logging.log_level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }
}
