//! A two-layer sigmoid network trained by per-example backpropagation.
//!
//! [`matrix::Matrix2`] carries the arithmetic, [`neural::NeuralNet`] owns the
//! weights and [`neural::trainer::Trainer`] spreads a training set over
//! worker threads.

pub mod matrix;
pub mod neural;
pub mod prelude;

pub use matrix::Matrix2;
pub use neural::{
    config::NetConfig,
    data::{Evaluation, TrainingRow},
    trainer::{Slicing, SyncStrategy, TrainReport, Trainer},
    NeuralNet,
};
