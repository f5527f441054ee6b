use crate::prelude::*;

/// Shape and learning rate of a [`NeuralNet`](super::NeuralNet).
///
/// The defaults describe the digit classifier: 28x28 pixel inputs,
/// 100 hidden nodes, one output per digit and a learning rate of 0.3.
#[derive(Debug, Clone, PartialEq)]
pub struct NetConfig {
    pub input_nodes: usize,
    pub hidden_nodes: usize,
    pub output_nodes: usize,
    pub learning_rate: f64,
    /// Seed for weight initialization, `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            input_nodes: 784,
            hidden_nodes: 100,
            output_nodes: 10,
            learning_rate: 0.3,
            seed: None,
        }
    }
}

impl NetConfig {
    pub fn new(input_nodes: usize, hidden_nodes: usize, output_nodes: usize, learning_rate: f64) -> Self {
        Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate,
            seed: None,
        }
    }

    pub fn with_hidden_nodes(mut self, hidden_nodes: usize) -> Self {
        self.hidden_nodes = hidden_nodes;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Rejects empty layers and negative or non-finite learning rates.
    pub fn validate(&self) -> Result<()> {
        let layers = [
            ("input", self.input_nodes),
            ("hidden", self.hidden_nodes),
            ("output", self.output_nodes),
        ];
        for (name, nodes) in layers {
            if nodes == 0 {
                return Err(Error::ConfigErr(format!("{name} layer needs at least one node")));
            }
        }

        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(Error::ConfigErr(format!(
                "learning rate must be a non-negative number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
