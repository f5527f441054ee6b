pub mod activations;
pub mod config;
pub mod data;
pub mod trainer;
mod utils;

use crate::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::matrix::{
    ops::{Dot, Transpose},
    Matrix2,
};

use self::config::NetConfig;

/// Sigmoid network with a single hidden layer.
///
/// Weights are laid out so that a `1 x input` row is multiplied from the left:
/// `weight_input_hidden` is `input x hidden` and `weight_hidden_output`
/// is `hidden x output`. They are the only learned state.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNet {
    input_nodes: usize,
    hidden_nodes: usize,
    output_nodes: usize,
    learning_rate: f64,
    weight_input_hidden: Matrix2<f64>,
    weight_hidden_output: Matrix2<f64>,
}

impl NeuralNet {
    /// Creates a network with weights drawn from the thread RNG.
    pub fn new(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        learning_rate: f64,
    ) -> Result<Self> {
        Self::with_rng(
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate,
            &mut rand::thread_rng(),
        )
    }

    /// Creates a network with weights drawn uniformly from [-0.5, 0.5) using `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        input_nodes: usize,
        hidden_nodes: usize,
        output_nodes: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Self> {
        NetConfig::new(input_nodes, hidden_nodes, output_nodes, learning_rate).validate()?;

        log::debug!(
            "initializing {input_nodes}x{hidden_nodes}x{output_nodes} network, rate {learning_rate}"
        );

        Ok(Self {
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate,
            weight_input_hidden: Matrix2::random(input_nodes, hidden_nodes, rng),
            weight_hidden_output: Matrix2::random(hidden_nodes, output_nodes, rng),
        })
    }

    pub fn from_config(config: &NetConfig) -> Result<Self> {
        let NetConfig {
            input_nodes,
            hidden_nodes,
            output_nodes,
            learning_rate,
            seed,
        } = *config;

        match seed {
            Some(seed) => Self::with_rng(
                input_nodes,
                hidden_nodes,
                output_nodes,
                learning_rate,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => Self::new(input_nodes, hidden_nodes, output_nodes, learning_rate),
        }
    }

    pub fn input_nodes(&self) -> usize {
        self.input_nodes
    }

    pub fn hidden_nodes(&self) -> usize {
        self.hidden_nodes
    }

    pub fn output_nodes(&self) -> usize {
        self.output_nodes
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn weight_input_hidden(&self) -> &Matrix2<f64> {
        &self.weight_input_hidden
    }

    pub fn weight_hidden_output(&self) -> &Matrix2<f64> {
        &self.weight_hidden_output
    }

    /// Propagates a `1 x input` row, returning the hidden and output activations.
    fn forward(&self, inputs: &Matrix2<f64>) -> Result<(Matrix2<f64>, Matrix2<f64>)> {
        if inputs.cols() != self.input_nodes {
            return Err(Error::DimensionErr);
        }

        let hidden = inputs.dot(&self.weight_input_hidden)?.sigmoid();
        let output = hidden.dot(&self.weight_hidden_output)?.sigmoid();
        Ok((hidden, output))
    }

    /// Output activations for `inputs`, each in (0, 1).
    pub fn query(&self, inputs: &Matrix2<f64>) -> Result<Matrix2<f64>> {
        self.forward(inputs).map(|(_, output)| output)
    }

    /// Index of the strongest output activation.
    pub fn predict(&self, inputs: &Matrix2<f64>) -> Result<usize> {
        let output = self.query(inputs)?;

        let mut best = 0;
        for (i, &x) in output.iter().enumerate() {
            if x > output.as_slice()[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Sum of squared differences between `targets` and the network output.
    pub fn squared_error(&self, inputs: &Matrix2<f64>, targets: &Matrix2<f64>) -> Result<f64> {
        let errors = (targets - &self.query(inputs)?)?;
        Ok(errors.iter().map(|e| e * e).sum())
    }

    /// One backpropagation step on a single example. Both weight matrices
    /// are updated in place.
    pub fn train(&mut self, inputs: &Matrix2<f64>, targets: &Matrix2<f64>) -> Result<()> {
        let (hidden, output) = self.forward(inputs)?;

        let output_errors = (targets - &output)?;
        let hidden_errors = output_errors.dot(&self.weight_hidden_output.transpose())?;

        update_weights(
            &mut self.weight_hidden_output,
            &output_errors,
            &output,
            &hidden,
            self.learning_rate,
        )?;
        update_weights(
            &mut self.weight_input_hidden,
            &hidden_errors,
            &hidden,
            inputs,
            self.learning_rate,
        )
    }

    /// Replaces every weight with the mean of the same weight across `nets`.
    /// All nets must share this network's shape.
    pub(crate) fn average_from(&mut self, nets: &[NeuralNet]) -> Result<()> {
        if nets.is_empty() {
            return Ok(());
        }

        let mut input_hidden = Matrix2::<f64>::new(self.input_nodes, self.hidden_nodes);
        let mut hidden_output = Matrix2::<f64>::new(self.hidden_nodes, self.output_nodes);
        for net in nets {
            input_hidden = (&input_hidden + &net.weight_input_hidden)?;
            hidden_output = (&hidden_output + &net.weight_hidden_output)?;
        }

        let n = nets.len() as f64;
        input_hidden.apply(|x| x / n);
        hidden_output.apply(|x| x / n);

        self.weight_input_hidden = input_hidden;
        self.weight_hidden_output = hidden_output;
        Ok(())
    }
}

/// Delta rule for one layer of sigmoid units:
/// `W += rate * prev^T . (errors * out * (1 - out))`,
/// where `out * (1 - out)` is the sigmoid's slope at `out`.
fn update_weights(
    weights: &mut Matrix2<f64>,
    errors: &Matrix2<f64>,
    layer_outputs: &Matrix2<f64>,
    prev_outputs: &Matrix2<f64>,
    rate: f64,
) -> Result<()> {
    let gradient = (&(errors * layer_outputs)? * &(1.0 - layer_outputs))?;
    let delta = prev_outputs.transpose().dot(&gradient)?;

    if delta.dim() != weights.dim() {
        return Err(Error::DimensionErr);
    }

    for row in 0..weights.rows() {
        for col in 0..weights.cols() {
            weights[(row, col)] += delta[(row, col)] * rate;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::data::{normalize_pixels, one_hot};

    fn seeded(input: usize, hidden: usize, output: usize, rate: f64, seed: u64) -> NeuralNet {
        NeuralNet::with_rng(input, hidden, output, rate, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    fn digit_pixels() -> Vec<u8> {
        (0..784).map(|i| ((i * 37) % 256) as u8).collect()
    }

    #[test]
    fn construction_shapes_and_range() {
        let net = NeuralNet::new(784, 100, 10, 0.3).unwrap();

        assert_eq!(net.weight_input_hidden().dim(), (784, 100));
        assert_eq!(net.weight_hidden_output().dim(), (100, 10));
        assert!(net
            .weight_input_hidden()
            .iter()
            .chain(net.weight_hidden_output().iter())
            .all(|&w| (-0.5..0.5).contains(&w)));
    }

    #[test]
    fn construction_rejects_bad_config() {
        assert!(matches!(NeuralNet::new(0, 3, 2, 0.3), Err(Error::ConfigErr(_))));
        assert!(matches!(NeuralNet::new(3, 0, 2, 0.3), Err(Error::ConfigErr(_))));
        assert!(matches!(NeuralNet::new(3, 3, 0, 0.3), Err(Error::ConfigErr(_))));
        assert!(matches!(NeuralNet::new(3, 3, 2, -0.3), Err(Error::ConfigErr(_))));
    }

    #[test]
    fn seeded_networks_match() {
        let config = NetConfig::new(6, 4, 3, 0.3).with_seed(Some(11));

        let a = NeuralNet::from_config(&config).unwrap();
        let b = NeuralNet::from_config(&config).unwrap();
        let c = NeuralNet::from_config(&config.clone().with_seed(Some(12))).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn query_is_pure() {
        let net = seeded(4, 3, 2, 0.3, 1);
        let before = net.clone();

        let input = Matrix2::from_array([[0.1, 0.5, 0.9, 0.3]]);
        let out1 = net.query(&input).unwrap();
        let out2 = net.query(&input).unwrap();

        assert_eq!(out1.dim(), (1, 2));
        assert!(out1.iter().all(|&x| x > 0.0 && x < 1.0));
        assert_eq!(out1, out2);
        assert_eq!(net, before);
    }

    #[test]
    fn query_matches_hand_computation() {
        let mut net = seeded(2, 2, 1, 0.3, 5);
        net.weight_input_hidden = Matrix2::from_array([[0.1, -0.2], [0.3, 0.4]]);
        net.weight_hidden_output = Matrix2::from_array([[0.5], [-0.5]]);

        let out = net.query(&Matrix2::from_array([[1.0, 0.5]])).unwrap();

        let h0 = activations::sigmoid(0.1 + 0.15);
        let h1 = activations::sigmoid(-0.2 + 0.2);
        let expected = activations::sigmoid(0.5 * h0 - 0.5 * h1);
        assert!((out[(0, 0)] - expected).abs() < 1e-12);
    }

    #[test]
    fn query_rejects_wrong_width() {
        let net = seeded(4, 3, 2, 0.3, 1);
        let input = Matrix2::from_array([[0.1, 0.5, 0.9]]);

        assert_eq!(net.query(&input), Err(Error::DimensionErr));
    }

    #[test]
    fn train_rejects_wrong_target_width() {
        let mut net = seeded(4, 3, 2, 0.3, 1);
        let before = net.clone();
        let input = Matrix2::from_array([[0.1, 0.5, 0.9, 0.3]]);
        let target = Matrix2::from_array([[0.01, 0.99, 0.01]]);

        assert_eq!(net.train(&input, &target), Err(Error::DimensionErr));
        assert_eq!(net, before);
    }

    #[test]
    fn train_updates_both_layers() {
        let mut net = seeded(4, 3, 2, 0.3, 9);
        let before = net.clone();

        let input = Matrix2::from_array([[0.1, 0.5, 0.9, 0.3]]);
        let target = Matrix2::from_array([[0.99, 0.01]]);
        net.train(&input, &target).unwrap();

        assert_ne!(net.weight_input_hidden(), before.weight_input_hidden());
        assert_ne!(net.weight_hidden_output(), before.weight_hidden_output());
        assert_eq!(net.weight_input_hidden().dim(), (4, 3));
        assert_eq!(net.weight_hidden_output().dim(), (3, 2));
    }

    #[test]
    fn zero_rate_leaves_weights() {
        let mut net = seeded(4, 3, 2, 0.0, 9);
        let before = net.clone();

        let input = Matrix2::from_array([[0.1, 0.5, 0.9, 0.3]]);
        net.train(&input, &Matrix2::from_array([[0.99, 0.01]])).unwrap();

        assert_eq!(net, before);
    }

    #[test]
    fn single_step_reduces_error() {
        let input = Matrix2::from_array([[0.2, 0.7, 0.01, 0.95, 0.4]]);
        let target = Matrix2::from_array([[0.01, 0.99, 0.01]]);

        for seed in 0..20 {
            for rate in [0.05, 0.3, 1.0] {
                let mut net = seeded(5, 4, 3, rate, seed);
                let before = net.squared_error(&input, &target).unwrap();
                assert!(before > 0.0);

                net.train(&input, &target).unwrap();
                let after = net.squared_error(&input, &target).unwrap();

                assert!(after < before, "seed {seed} rate {rate}: {before} -> {after}");
            }
        }
    }

    #[test]
    fn learns_a_repeated_digit() {
        let mut net = seeded(784, 100, 10, 0.3, 2024);
        let input = normalize_pixels(&digit_pixels());
        let target = one_hot(5, 10).unwrap();

        for _ in 0..1000 {
            net.train(&input, &target).unwrap();
        }

        let out = net.query(&input).unwrap();
        assert!(out[(0, 5)] > 0.5);
        for i in (0..10).filter(|&i| i != 5) {
            assert!(out[(0, 5)] > out[(0, i)], "output {i} beats 5: {:?}", out);
        }
        assert_eq!(net.predict(&input), Ok(5));
    }

    #[test]
    fn averaging_weights() {
        let mut net = seeded(2, 2, 1, 0.3, 1);
        let mut a = net.clone();
        let mut b = net.clone();
        a.weight_input_hidden = Matrix2::from_array([[1.0, 2.0], [3.0, 4.0]]);
        a.weight_hidden_output = Matrix2::from_array([[1.0], [0.0]]);
        b.weight_input_hidden = Matrix2::from_array([[3.0, 2.0], [1.0, 0.0]]);
        b.weight_hidden_output = Matrix2::from_array([[0.0], [-1.0]]);

        net.average_from(&[a, b]).unwrap();

        assert_eq!(net.weight_input_hidden().clone().to_vec(), [[2.0, 2.0], [2.0, 2.0]]);
        assert_eq!(net.weight_hidden_output().clone().to_vec(), [[0.5], [-0.5]]);
    }

    #[test]
    fn averaging_rejects_other_shapes() {
        let mut net = seeded(2, 2, 1, 0.3, 1);
        let other = seeded(3, 2, 1, 0.3, 1);

        assert_eq!(net.average_from(&[other]), Err(Error::DimensionErr));
    }
}
