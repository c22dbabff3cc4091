//! Asexual reproduction: copy a genome and mutate the copy.

use super::genome::{Gene, Genome};
use crate::config::{GenomeConfig, MutationConfig};
use rand::Rng;

impl Genome {
    /// Offspring genome: a mutated copy. The parent is untouched.
    pub fn offspring<R: Rng + ?Sized>(
        &self,
        mutation: &MutationConfig,
        limits: &GenomeConfig,
        rng: &mut R,
    ) -> Genome {
        let mut child = self.clone();
        child.mutate(mutation, limits, rng);
        child
    }

    /// Apply all mutations according to config, then restore index invariants
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        mutation: &MutationConfig,
        limits: &GenomeConfig,
        rng: &mut R,
    ) {
        self.mutate_points(mutation.point_mutation_rate, rng);

        if rng.gen::<f32>() < mutation.insertion_deletion_rate {
            if rng.gen::<f32>() < mutation.deletion_ratio {
                self.delete_gene(rng);
            } else if self.genes.len() < limits.max_length {
                self.insert_gene(rng);
            }
        }

        self.mutate_traits(mutation.trait_mutation_rate, rng);
        self.normalize(limits.max_neurons);
    }

    /// Flip one random bit in each gene selected with probability `rate`
    pub fn mutate_points<R: Rng + ?Sized>(&mut self, rate: f32, rng: &mut R) {
        for gene in &mut self.genes {
            if rng.gen::<f32>() < rate {
                let bit = rng.gen_range(0..32);
                *gene = Gene::unpack(gene.pack() ^ (1 << bit));
            }
        }
    }

    /// Remove a random gene, keeping at least one
    pub fn delete_gene<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.genes.len() > 1 {
            let idx = rng.gen_range(0..self.genes.len());
            self.genes.remove(idx);
        }
    }

    /// Insert a random gene at a random position
    pub fn insert_gene<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let idx = rng.gen_range(0..=self.genes.len());
        let gene = Gene::random(rng, self.neuron_count);
        self.genes.insert(idx, gene);
    }

    /// Perturb each trait byte with probability `rate`
    pub fn mutate_traits<R: Rng + ?Sized>(&mut self, rate: f32, rng: &mut R) {
        for byte in [
            &mut self.max_energy,
            &mut self.osc_period,
            &mut self.responsiveness,
        ] {
            if rng.gen::<f32>() < rate {
                *byte ^= 1 << rng.gen_range(0..8);
            }
        }

        // Neuron count walks by one so existing wiring mostly survives
        if rng.gen::<f32>() < rate {
            self.neuron_count = if rng.gen() {
                self.neuron_count.saturating_add(1)
            } else {
                self.neuron_count.saturating_sub(1)
            };
        }
    }
}
