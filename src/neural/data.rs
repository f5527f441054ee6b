use std::str::FromStr;

use crate::{matrix::Matrix2, neural::NeuralNet, prelude::*};

/// Target activation for the true class.
pub const ON: f64 = 0.99;
/// Target activation for every other class.
pub const OFF: f64 = 0.01;
/// An output above this counts as a positive answer.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// One labelled example: `label,pixel_0,...,pixel_n`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub label: usize,
    pub pixels: Vec<u8>,
}

impl TrainingRow {
    pub fn new(label: usize, pixels: Vec<u8>) -> Self {
        Self { label, pixels }
    }

    /// Parses a comma separated line. Pixels must be integers in 0..=255.
    pub fn from_csv(line: &str) -> Result<Self> {
        let mut values = line.trim().split(',').map(str::trim);

        let label = match values.next() {
            Some(v) if !v.is_empty() => v
                .parse::<usize>()
                .map_err(|e| Error::DataFormatErr(format!("label {v:?}: {e}")))?,
            _ => return Err(Error::DataFormatErr("empty row".to_string())),
        };

        let pixels = values
            .enumerate()
            .map(|(i, v)| {
                v.parse::<u8>()
                    .map_err(|e| Error::DataFormatErr(format!("pixel {i} {v:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { label, pixels })
    }

    /// Normalized `(inputs, targets)` pair ready for [`NeuralNet::train`].
    pub fn to_sample(
        &self,
        input_nodes: usize,
        output_nodes: usize,
    ) -> Result<(Matrix2<f64>, Matrix2<f64>)> {
        if self.pixels.len() != input_nodes {
            return Err(Error::DimensionErr);
        }
        Ok((normalize_pixels(&self.pixels), one_hot(self.label, output_nodes)?))
    }
}

impl FromStr for TrainingRow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_csv(s)
    }
}

/// Maps intensities in 0..=255 onto a `1 x n` row in [0.01, 1.0].
pub fn normalize_pixels(pixels: &[u8]) -> Matrix2<f64> {
    Matrix2::from_row(
        pixels
            .iter()
            .map(|&p| p as f64 / 255.0 * 0.99 + 0.01)
            .collect(),
    )
}

/// `1 x classes` target row with [`ON`] at `label` and [`OFF`] elsewhere.
pub fn one_hot(label: usize, classes: usize) -> Result<Matrix2<f64>> {
    if label >= classes {
        return Err(Error::DataFormatErr(format!(
            "label {label} out of range for {classes} classes"
        )));
    }

    let mut targets = Matrix2::from_row(vec![OFF; classes]);
    targets.set(0, label, ON)?;
    Ok(targets)
}

/// Tally of a network's answers over held-out rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluation {
    pub total: usize,
    /// Rows whose output at the true label exceeds [`DECISION_THRESHOLD`].
    pub correct: usize,
    /// Rows whose strongest output is the true label.
    pub argmax_correct: usize,
}

impl Evaluation {
    pub fn run<'a, I>(net: &NeuralNet, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TrainingRow>,
    {
        let mut eval = Evaluation::default();
        for row in rows {
            eval.record(net, row)?;
        }

        log::info!(
            "evaluated {} rows: {} above threshold, {} by argmax",
            eval.total,
            eval.correct,
            eval.argmax_correct
        );
        Ok(eval)
    }

    /// Scores a single row.
    pub fn record(&mut self, net: &NeuralNet, row: &TrainingRow) -> Result<()> {
        let (inputs, _) = row.to_sample(net.input_nodes(), net.output_nodes())?;
        let output = net.query(&inputs)?;

        self.total += 1;
        if *output.get(0, row.label)? > DECISION_THRESHOLD {
            self.correct += 1;
        }
        if net.predict(&inputs)? == row.label {
            self.argmax_correct += 1;
        }
        Ok(())
    }

    /// Fraction of rows above the decision threshold, 0 when nothing was scored.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}
