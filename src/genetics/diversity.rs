//! Genome similarity and sampled population diversity.

use super::genome::Genome;
use rand::Rng;

/// Upper bound on sampled pairs per diversity estimate
pub const DIVERSITY_SAMPLE_PAIRS: usize = 200;

/// Bitwise agreement of packed genes, in 0.0..=1.0.
///
/// Genes are compared position by position; positions past the end of the
/// shorter genome count as fully different. Traits are not compared.
pub fn similarity(a: &Genome, b: &Genome) -> f32 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let matching_bits: u32 = a
        .words()
        .zip(b.words())
        .map(|(x, y)| 32 - (x ^ y).count_ones())
        .sum();

    matching_bits as f32 / (longest as f32 * 32.0)
}

/// Mean dissimilarity over randomly sampled distinct pairs.
///
/// Advisory only: returns 0.0 for fewer than two genomes.
pub fn sampled_diversity<R: Rng + ?Sized>(genomes: &[&Genome], rng: &mut R) -> f32 {
    let n = genomes.len();
    if n < 2 {
        log::debug!("Diversity: {} genome(s), nothing to compare", n);
        return 0.0;
    }

    let samples = DIVERSITY_SAMPLE_PAIRS.min(n);
    let mut total = 0.0f32;

    for _ in 0..samples {
        let i = rng.gen_range(0..n);
        // Second index drawn from the other n-1 slots
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        total += 1.0 - similarity(genomes[i], genomes[j]);
    }

    let diversity = total / samples as f32;
    log::debug!("Diversity: {:.4} over {} pairs", diversity, samples);
    diversity
}
