//! Neural network module for creature brains.
//!
//! A genome's gene list is compiled once into a pruned [`NeuralNet`];
//! each tick the net is evaluated in a single genome-ordered pass into
//! per-creature [`Scratch`] buffers.

mod feedforward;
mod network;

pub use feedforward::Scratch;
pub use network::{HiddenNeuron, NeuralNet};
