//! Genetics module - genomes, asexual reproduction and diversity.

pub mod diversity;
pub mod genome;
mod mutations;

pub use diversity::{sampled_diversity, similarity};
pub use genome::{Gene, Genome, GenomeParseError, SinkKind, SourceKind};
