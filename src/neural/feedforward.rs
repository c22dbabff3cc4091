//! Single-pass feed-forward over a compiled net.

use super::network::NeuralNet;
use crate::actions::Action;
use crate::genetics::{SinkKind, SourceKind};

/// Per-creature evaluation buffers, sized once from the compiled net.
///
/// `action_levels` and `accumulators` are zeroed at the start of every
/// evaluation. `outputs` persist between evaluations so that neurons read
/// before being finalized in a pass see the previous tick's value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scratch {
    pub action_levels: Vec<f32>,
    pub accumulators: Vec<f32>,
    pub outputs: Vec<f32>,
}

impl Scratch {
    pub fn for_net(net: &NeuralNet) -> Self {
        let n = net.neuron_count();
        Self {
            action_levels: vec![0.0; Action::COUNT],
            accumulators: vec![0.0; n],
            outputs: vec![0.0; n],
        }
    }
}

impl NeuralNet {
    /// Compute one level per action.
    ///
    /// Edges are visited in genome order. On the first edge that writes to
    /// an action, every driven neuron's output is set to `tanh` of what it
    /// has accumulated so far; later edges read those outputs. `sense` maps
    /// a sensor index to its reading.
    ///
    /// The returned slice borrows `scratch` and is overwritten by the next call.
    pub fn feed_forward<'s, F>(&self, scratch: &'s mut Scratch, mut sense: F) -> &'s [f32]
    where
        F: FnMut(usize) -> f32,
    {
        scratch.action_levels.fill(0.0);
        scratch.accumulators.fill(0.0);

        let mut outputs_finalized = false;

        for edge in &self.edges {
            if edge.sink_kind == SinkKind::Action && !outputs_finalized {
                outputs_finalized = true;
                for (i, neuron) in self.neurons.iter().enumerate() {
                    if neuron.driven {
                        scratch.outputs[i] = scratch.accumulators[i].tanh();
                    }
                }
            }

            let input = match edge.source_kind {
                SourceKind::Sensor => sense(edge.source as usize),
                SourceKind::Neuron => scratch.outputs[edge.source as usize],
            };
            let value = input * edge.weight_f32();

            match edge.sink_kind {
                SinkKind::Action => scratch.action_levels[edge.sink as usize] += value,
                SinkKind::Neuron => scratch.accumulators[edge.sink as usize] += value,
            }
        }

        &scratch.action_levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Gene, Genome};

    fn gene(source_kind: SourceKind, source: u8, sink_kind: SinkKind, sink: u8, weight: i16) -> Gene {
        Gene {
            source_kind,
            source,
            sink_kind,
            sink,
            weight,
        }
    }

    fn compile(genes: Vec<Gene>, neuron_count: u8) -> NeuralNet {
        NeuralNet::from_genome(&Genome {
            genes,
            max_energy: 0,
            osc_period: 2,
            responsiveness: 0,
            neuron_count,
        })
    }

    #[test]
    fn test_inert_net_returns_zeros() {
        let net = compile(Vec::new(), 1);
        let mut scratch = Scratch::for_net(&net);
        let levels = net.feed_forward(&mut scratch, |_| 1.0);

        assert_eq!(levels.len(), Action::COUNT);
        assert!(levels.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn test_sensor_weighted_into_action() {
        let net = compile(
            vec![
                gene(SourceKind::Sensor, 0, SinkKind::Action, 4, 8192),
                gene(SourceKind::Sensor, 1, SinkKind::Action, 4, -4096),
            ],
            1,
        );
        let mut scratch = Scratch::for_net(&net);
        let levels = net.feed_forward(&mut scratch, |i| if i == 0 { 0.5 } else { 1.0 });

        assert!((levels[4] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_neuron_finalized_on_first_action_edge() {
        let net = compile(
            vec![
                gene(SourceKind::Sensor, 0, SinkKind::Neuron, 0, 8192),
                gene(SourceKind::Neuron, 0, SinkKind::Action, 2, 8192),
            ],
            1,
        );
        let mut scratch = Scratch::for_net(&net);
        let levels = net.feed_forward(&mut scratch, |_| 0.5);

        assert!((levels[2] - 0.5f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_late_neuron_input_applies_next_tick() {
        // The second sensor edge arrives after the first action edge, so it
        // only shows up in the neuron's output on the following evaluation.
        let net = compile(
            vec![
                gene(SourceKind::Neuron, 0, SinkKind::Action, 0, 8192),
                gene(SourceKind::Sensor, 0, SinkKind::Neuron, 0, 8192),
            ],
            1,
        );
        let mut scratch = Scratch::for_net(&net);

        let first = net.feed_forward(&mut scratch, |_| 1.0)[0];
        assert_eq!(first, 0.0);

        let second = net.feed_forward(&mut scratch, |_| 1.0)[0];
        assert!((second - 1.0f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_undriven_neuron_reads_zero() {
        let net = compile(vec![gene(SourceKind::Neuron, 0, SinkKind::Action, 1, 8192)], 1);
        let mut scratch = Scratch::for_net(&net);

        for _ in 0..3 {
            assert_eq!(net.feed_forward(&mut scratch, |_| 1.0)[1], 0.0);
        }
    }

    #[test]
    fn test_deterministic() {
        let net = compile(
            vec![
                gene(SourceKind::Sensor, 3, SinkKind::Neuron, 0, 3000),
                gene(SourceKind::Neuron, 0, SinkKind::Neuron, 1, -2000),
                gene(SourceKind::Neuron, 1, SinkKind::Action, 5, 7000),
                gene(SourceKind::Sensor, 2, SinkKind::Action, 6, 1000),
            ],
            2,
        );
        let sense = |i: usize| i as f32 / 10.0;

        let mut a = Scratch::for_net(&net);
        let mut b = Scratch::for_net(&net);
        let la = net.feed_forward(&mut a, sense).to_vec();
        let lb = net.feed_forward(&mut b, sense).to_vec();
        assert_eq!(la, lb);
    }
}
