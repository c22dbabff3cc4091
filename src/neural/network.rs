//! Neural network compiled from a genome's wiring.

use crate::genetics::{Gene, Genome, SinkKind, SourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A hidden neuron that survived pruning
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenNeuron {
    /// Index this neuron had in the genome before renumbering
    pub genome_index: u8,
    /// Has at least one incoming edge. Undriven neurons always output 0.
    pub driven: bool,
}

/// Pruned, renumbered edge list plus hidden-neuron table.
///
/// Built once per creature. Edge order follows the genome and is
/// significant for evaluation (see [`NeuralNet::feed_forward`]).
/// Neuron indices in `edges` address `neurons` densely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeuralNet {
    pub edges: Vec<Gene>,
    pub neurons: Vec<HiddenNeuron>,
}

impl NeuralNet {
    /// Compile a genome: drop every edge touching a neuron with no path to
    /// an action, renumber the remaining neurons, mark driven ones.
    pub fn from_genome(genome: &Genome) -> Self {
        let neuron_slots = genome.neuron_count.max(1) as usize;
        // No-op for checked genomes; guards hand-built ones
        let genes: Vec<Gene> = genome
            .genes
            .iter()
            .map(|g| g.reduced(genome.neuron_count))
            .collect();
        let useful = useful_neurons(&genes, neuron_slots);

        // Dense renumbering in ascending genome order
        let mut remap = vec![u8::MAX; neuron_slots];
        let mut neurons = Vec::new();
        for (old, _) in useful.iter().enumerate().filter(|(_, &u)| u) {
            remap[old] = neurons.len() as u8;
            neurons.push(HiddenNeuron {
                genome_index: old as u8,
                driven: false,
            });
        }

        let mut edges = Vec::with_capacity(genes.len());
        for gene in &genes {
            let source_ok = match gene.source_kind {
                SourceKind::Sensor => true,
                SourceKind::Neuron => useful[gene.source as usize],
            };
            let sink_ok = match gene.sink_kind {
                SinkKind::Action => true,
                SinkKind::Neuron => useful[gene.sink as usize],
            };
            if !(source_ok && sink_ok) {
                continue;
            }

            let mut edge = *gene;
            if edge.source_kind == SourceKind::Neuron {
                edge.source = remap[edge.source as usize];
            }
            if edge.sink_kind == SinkKind::Neuron {
                edge.sink = remap[edge.sink as usize];
                neurons[edge.sink as usize].driven = true;
            }
            edges.push(edge);
        }

        Self { edges, neurons }
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// No edges: every action level is always zero
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Neurons with a path to an action sink, transitively through
/// neuron-to-neuron edges. A self-loop alone does not make a neuron useful.
fn useful_neurons(genes: &[Gene], neuron_slots: usize) -> Vec<bool> {
    let mut useful = vec![false; neuron_slots];

    for gene in genes {
        if gene.source_kind == SourceKind::Neuron && gene.sink_kind == SinkKind::Action {
            useful[gene.source as usize] = true;
        }
    }

    loop {
        let mut changed = false;
        for gene in genes {
            if gene.source_kind == SourceKind::Neuron
                && gene.sink_kind == SinkKind::Neuron
                && gene.source != gene.sink
                && useful[gene.sink as usize]
                && !useful[gene.source as usize]
            {
                useful[gene.source as usize] = true;
                changed = true;
            }
        }
        if !changed {
            return useful;
        }
    }
}

impl fmt::Display for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "NeuralNet: {} edges, {} hidden neurons",
            self.edges.len(),
            self.neurons.len()
        )?;
        for edge in &self.edges {
            writeln!(f, "  {}", edge)?;
        }
        Ok(())
    }
}
