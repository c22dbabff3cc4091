//! Statistics tracking for the simulation.

use crate::creature::Creature;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot taken at each generational turnover
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation that just ended
    pub generation: u32,
    /// Creatures alive at the end of the generation
    pub population: usize,
    /// Creatures that passed the survival challenge
    pub survivors: usize,
    /// Survivors as a percentage of the outgoing population
    pub survival_percentage: f32,
    /// Sampled genetic diversity of the outgoing population
    pub diversity: f32,
    /// Mean number of genes
    pub genome_length_mean: f32,
    /// Mean number of edges kept after compilation
    pub edge_count_mean: f32,
}

impl GenerationStats {
    /// Build a snapshot from the outgoing generation
    pub fn collect(generation: u32, creatures: &[Creature], survivors: usize, diversity: f32) -> Self {
        let alive: Vec<&Creature> = creatures.iter().filter(|c| c.alive).collect();
        let n = alive.len();

        let (genome_length_mean, edge_count_mean) = if n == 0 {
            (0.0, 0.0)
        } else {
            (
                alive.iter().map(|c| c.genome.len()).sum::<usize>() as f32 / n as f32,
                alive.iter().map(|c| c.net.edge_count()).sum::<usize>() as f32 / n as f32,
            )
        };

        let survival_percentage = if creatures.is_empty() {
            0.0
        } else {
            survivors as f32 / creatures.len() as f32 * 100.0
        };

        Self {
            generation,
            population: n,
            survivors,
            survival_percentage,
            diversity,
            genome_length_mean,
            edge_count_mean,
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:5} | Pop:{:5} | Survived:{:6.2}% | Div:{:.3} | Genes:{:.1} | Edges:{:.1}",
            self.generation,
            self.population,
            self.survival_percentage,
            self.diversity,
            self.genome_length_mean,
            self.edge_count_mean,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsHistory {
    pub generations: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    #[inline]
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.generations.last()
    }

    /// Survival percentage per generation
    pub fn survival_series(&self) -> Vec<(u32, f32)> {
        self.generations
            .iter()
            .map(|s| (s.generation, s.survival_percentage))
            .collect()
    }

    /// Diversity per generation
    pub fn diversity_series(&self) -> Vec<(u32, f32)> {
        self.generations.iter().map(|s| (s.generation, s.diversity)).collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
