//! Genes, genomes and their packed/hex encodings.

use crate::actions::Action;
use crate::config::GenomeConfig;
use crate::sensors::Sensor;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where a connection reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Sensor,
    Neuron,
}

/// Where a connection writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SinkKind {
    Neuron,
    Action,
}

/// One wiring instruction: source -> sink with a fixed-point weight.
///
/// Indices are always within range for their kind (sensor, neuron or action
/// count); they are reduced when a gene is created or mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub source_kind: SourceKind,
    pub source: u8,
    pub sink_kind: SinkKind,
    pub sink: u8,
    pub weight: i16,
}

impl Gene {
    /// Fixed-point scale: weights span roughly -4.0..4.0
    pub const WEIGHT_SCALE: f32 = 8192.0;

    #[inline]
    pub fn weight_f32(&self) -> f32 {
        self.weight as f32 / Self::WEIGHT_SCALE
    }

    /// Random gene with indices reduced for `neuron_count` hidden neurons
    pub fn random<R: Rng + ?Sized>(rng: &mut R, neuron_count: u8) -> Gene {
        Gene::unpack(rng.gen::<u32>()).reduced(neuron_count)
    }

    /// Wrap indices into range for their kinds
    pub fn reduced(mut self, neuron_count: u8) -> Gene {
        let neurons = neuron_count.max(1);
        self.source %= match self.source_kind {
            SourceKind::Sensor => Sensor::COUNT as u8,
            SourceKind::Neuron => neurons,
        };
        self.sink %= match self.sink_kind {
            SinkKind::Neuron => neurons,
            SinkKind::Action => Action::COUNT as u8,
        };
        self
    }

    /// Pack into 32 bits:
    /// `[source kind:1][source:7][sink kind:1][sink:7][weight:16]`
    pub fn pack(&self) -> u32 {
        let source_bit = matches!(self.source_kind, SourceKind::Neuron) as u32;
        let sink_bit = matches!(self.sink_kind, SinkKind::Action) as u32;
        (source_bit << 31)
            | ((self.source as u32 & 0x7f) << 24)
            | (sink_bit << 23)
            | ((self.sink as u32 & 0x7f) << 16)
            | (self.weight as u16 as u32)
    }

    pub fn unpack(word: u32) -> Gene {
        Gene {
            source_kind: if word >> 31 == 1 {
                SourceKind::Neuron
            } else {
                SourceKind::Sensor
            },
            source: ((word >> 24) & 0x7f) as u8,
            sink_kind: if (word >> 23) & 1 == 1 {
                SinkKind::Action
            } else {
                SinkKind::Neuron
            },
            sink: ((word >> 16) & 0x7f) as u8,
            weight: (word & 0xffff) as u16 as i16,
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source_kind {
            SourceKind::Sensor => Sensor::from_index(self.source as usize)
                .map(|s| format!("{:?}", s))
                .unwrap_or_else(|| format!("S{}", self.source)),
            SourceKind::Neuron => format!("N{}", self.source),
        };
        let sink = match self.sink_kind {
            SinkKind::Neuron => format!("N{}", self.sink),
            SinkKind::Action => Action::from_index(self.sink as usize)
                .map(|a| format!("{:?}", a))
                .unwrap_or_else(|| format!("A{}", self.sink)),
        };
        write!(f, "{} -> {} ({:+.3})", source, sink, self.weight_f32())
    }
}

/// Errors while parsing a hex genome
#[derive(Debug, Error, PartialEq)]
pub enum GenomeParseError {
    #[error("invalid gene word '{0}'")]
    InvalidGene(String),
    #[error("expected 4 trait bytes after '|', found {0}")]
    TraitCount(usize),
    #[error("invalid trait byte '{0}'")]
    InvalidTrait(String),
    #[error("missing '|' trait separator")]
    MissingTraits,
    #[error("neuron count must be at least 1")]
    NoNeurons,
    #[error("gene {0} has an index outside its range")]
    IndexOutOfRange(usize),
}

/// Heritable description of a creature: brain wiring plus scalar traits.
///
/// A genome is never edited once a creature carries it; reproduction works
/// on a copy. Deserialization goes through the same range checks as
/// [`Genome::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGenome")]
pub struct Genome {
    pub genes: Vec<Gene>,
    pub max_energy: u8,
    pub osc_period: u8,
    pub responsiveness: u8,
    /// Hidden neurons addressable by genes, at least 1
    pub neuron_count: u8,
}

/// Unchecked wire form of [`Genome`]
#[derive(Deserialize)]
struct RawGenome {
    genes: Vec<Gene>,
    max_energy: u8,
    osc_period: u8,
    responsiveness: u8,
    neuron_count: u8,
}

impl TryFrom<RawGenome> for Genome {
    type Error = GenomeParseError;

    fn try_from(raw: RawGenome) -> Result<Self, Self::Error> {
        let genome = Genome {
            genes: raw.genes,
            max_energy: raw.max_energy,
            osc_period: raw.osc_period,
            responsiveness: raw.responsiveness,
            neuron_count: raw.neuron_count,
        };
        genome.check()?;
        Ok(genome)
    }
}

impl Genome {
    /// Random generation-0 genome
    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &GenomeConfig) -> Genome {
        let neuron_count = rng.gen_range(1..=config.max_neurons) as u8;
        let length = rng.gen_range(config.initial_length_min..=config.initial_length_max);
        let genes = (0..length).map(|_| Gene::random(rng, neuron_count)).collect();

        Genome {
            genes,
            max_energy: rng.gen(),
            osc_period: rng.gen_range(2..=u8::MAX),
            responsiveness: rng.gen(),
            neuron_count,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Responsiveness trait mapped onto 0.0..=1.0
    #[inline]
    pub fn responsiveness_f32(&self) -> f32 {
        self.responsiveness as f32 / u8::MAX as f32
    }

    /// Clamp traits into range and re-reduce every gene index
    pub fn normalize(&mut self, max_neurons: usize) {
        let max_neurons = max_neurons.clamp(1, u8::MAX as usize) as u8;
        self.neuron_count = self.neuron_count.clamp(1, max_neurons);
        self.osc_period = self.osc_period.max(2);
        let neurons = self.neuron_count;
        for gene in &mut self.genes {
            *gene = gene.reduced(neurons);
        }
    }

    /// Verify every gene index is in range for its kind
    pub fn check(&self) -> Result<(), GenomeParseError> {
        if self.neuron_count == 0 {
            return Err(GenomeParseError::NoNeurons);
        }
        match self.genes.iter().position(|g| g.reduced(self.neuron_count) != *g) {
            Some(i) => Err(GenomeParseError::IndexOutOfRange(i)),
            None => Ok(()),
        }
    }

    /// Packed gene words
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.genes.iter().map(Gene::pack)
    }

    /// Text form: space separated 8-digit hex gene words, `|`, then the
    /// four trait bytes (max energy, oscillator period, responsiveness,
    /// neuron count).
    pub fn to_hex(&self) -> String {
        let mut out: Vec<String> = self.words().map(|w| format!("{:08x}", w)).collect();
        out.push("|".to_string());
        for byte in [
            self.max_energy,
            self.osc_period,
            self.responsiveness,
            self.neuron_count,
        ] {
            out.push(format!("{:02x}", byte));
        }
        out.join(" ")
    }

    /// Parse the `to_hex` form. Out-of-range gene indices are rejected.
    pub fn from_hex(text: &str) -> Result<Genome, GenomeParseError> {
        let (genes_part, traits_part) = text.split_once('|').ok_or(GenomeParseError::MissingTraits)?;

        let genes = genes_part
            .split_whitespace()
            .map(|word| {
                u32::from_str_radix(word, 16)
                    .map(Gene::unpack)
                    .map_err(|_| GenomeParseError::InvalidGene(word.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let traits = traits_part
            .split_whitespace()
            .map(|byte| {
                u8::from_str_radix(byte, 16).map_err(|_| GenomeParseError::InvalidTrait(byte.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let &[max_energy, osc_period, responsiveness, neuron_count] = traits.as_slice() else {
            return Err(GenomeParseError::TraitCount(traits.len()));
        };

        let genome = Genome {
            genes,
            max_energy,
            osc_period,
            responsiveness,
            neuron_count,
        };
        genome.check()?;
        Ok(genome)
    }
}
