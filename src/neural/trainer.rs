use std::{
    num::NonZeroUsize,
    ops::Range,
    sync::{mpsc, Mutex},
    thread,
};

use crate::{
    matrix::Matrix2,
    neural::{data::TrainingRow, NeuralNet},
    prelude::*,
};

pub use super::utils::partition;

/// What happens to rows past `workers * (rows / workers)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slicing {
    /// Leave the remainder untrained.
    #[default]
    Truncate,
    /// Give the remainder to the last worker.
    Inclusive,
}

/// How concurrent workers share the network's weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// All workers update the same network. Each training step holds a lock,
    /// so steps from different workers interleave in no particular order.
    #[default]
    Locked,
    /// Every worker trains a private copy; the copies are averaged after the join.
    Averaged,
}

/// Summary of a [`Trainer::train`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainReport {
    pub workers: usize,
    pub slice_len: usize,
    /// Training steps taken across all epochs.
    pub rows_trained: usize,
    /// Rows left out of every epoch.
    pub rows_dropped: usize,
    pub epochs: usize,
}

/// Trains a [`NeuralNet`] on a set of rows split across worker threads.
pub struct Trainer {
    workers: usize,
    slicing: Slicing,
    strategy: SyncStrategy,
    epochs: usize,
    rows_per_log: Option<usize>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer {
    /// One worker per available core, one epoch, truncated slices, locked updates.
    pub fn new() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            slicing: Slicing::default(),
            strategy: SyncStrategy::default(),
            epochs: 1,
            rows_per_log: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_slicing(mut self, slicing: Slicing) -> Self {
        self.slicing = slicing;
        self
    }

    pub fn with_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Log each worker's progress every `rows_per_log` rows.
    pub fn with_log(mut self, rows_per_log: Option<usize>) -> Self {
        self.rows_per_log = rows_per_log;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every epoch over `rows`. Returns once all workers have joined.
    ///
    /// When any worker fails, the first failure in worker order is returned.
    /// With [`SyncStrategy::Averaged`] the network is then left untouched for
    /// that epoch, with [`SyncStrategy::Locked`] it keeps the steps already taken.
    pub fn train(&self, net: &mut NeuralNet, rows: &[TrainingRow]) -> Result<TrainReport> {
        if self.epochs == 0 {
            return Err(Error::ConfigErr("at least one epoch is required".to_string()));
        }

        let slices = partition(rows.len(), self.workers, self.slicing)?;
        let covered: usize = slices.iter().map(|r| r.len()).sum();
        let report = TrainReport {
            workers: self.workers,
            slice_len: rows.len() / self.workers,
            rows_trained: covered * self.epochs,
            rows_dropped: rows.len() - covered,
            epochs: self.epochs,
        };

        log::info!(
            "training on {covered} of {} rows with {} workers ({:?}), {} epochs",
            rows.len(),
            self.workers,
            self.strategy,
            self.epochs
        );

        for epoch in 1..=self.epochs {
            match self.strategy {
                SyncStrategy::Locked => self.train_locked(net, rows, &slices)?,
                SyncStrategy::Averaged => self.train_averaged(net, rows, &slices)?,
            }
            log::debug!("epoch {epoch} done");
        }

        log::info!("training finished: {report:?}");
        Ok(report)
    }

    fn train_locked(
        &self,
        net: &mut NeuralNet,
        rows: &[TrainingRow],
        slices: &[Range<usize>],
    ) -> Result<()> {
        let dims = (net.input_nodes(), net.output_nodes());
        let shared = Mutex::new(net);

        self.run_workers(slices, |k, range| {
            self.train_slice(k, &rows[range], dims, |inputs, targets| {
                shared
                    .lock()
                    .map_err(|_| Error::ThreadErr)?
                    .train(inputs, targets)
            })
        })?;
        Ok(())
    }

    fn train_averaged(
        &self,
        net: &mut NeuralNet,
        rows: &[TrainingRow],
        slices: &[Range<usize>],
    ) -> Result<()> {
        let base: &NeuralNet = net;
        let dims = (base.input_nodes(), base.output_nodes());

        let trained = self.run_workers(slices, |k, range| {
            if range.is_empty() {
                return Ok(None);
            }

            let mut local = base.clone();
            self.train_slice(k, &rows[range], dims, |inputs, targets| {
                local.train(inputs, targets)
            })?;
            Ok(Some(local))
        })?;

        let trained: Vec<NeuralNet> = trained.into_iter().flatten().collect();
        net.average_from(&trained)
    }

    /// Normalizes each row of one worker's slice and hands it to `step`.
    fn train_slice<F>(
        &self,
        worker: usize,
        rows: &[TrainingRow],
        (input_nodes, output_nodes): (usize, usize),
        mut step: F,
    ) -> Result<()>
    where
        F: FnMut(&Matrix2<f64>, &Matrix2<f64>) -> Result<()>,
    {
        for (i, row) in rows.iter().enumerate() {
            let (inputs, targets) = row.to_sample(input_nodes, output_nodes)?;
            step(&inputs, &targets)?;

            if self
                .rows_per_log
                .is_some_and(|n| n > 0 && (i + 1) % n == 0)
            {
                log::info!("worker {worker}: {} of {} rows", i + 1, rows.len());
            }
        }
        Ok(())
    }

    /// Spawns one scoped thread per slice and joins them all.
    ///
    /// Each worker reports over a channel once it is running; the caller waits
    /// for those reports before joining. Nothing is returned before every
    /// worker has finished.
    fn run_workers<T, F>(&self, slices: &[Range<usize>], work: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize, Range<usize>) -> Result<T> + Sync,
    {
        thread::scope(|scope| {
            let (ready_tx, ready_rx) = mpsc::channel();
            let work = &work;

            let handles: Vec<_> = slices
                .iter()
                .cloned()
                .enumerate()
                .map(|(k, range)| {
                    let ready_tx = ready_tx.clone();
                    scope.spawn(move || {
                        log::debug!("worker {k} starts at index {}", range.start);
                        let _ = ready_tx.send(k);
                        work(k, range)
                    })
                })
                .collect();
            drop(ready_tx);

            let started = ready_rx.iter().take(handles.len()).count();
            log::debug!("{started} of {} workers started", handles.len());

            let mut outputs = Vec::with_capacity(handles.len());
            let mut failure = None;
            for (k, handle) in handles.into_iter().enumerate() {
                let err = match handle.join() {
                    Ok(Ok(out)) => {
                        outputs.push(out);
                        continue;
                    }
                    Ok(Err(e)) => e,
                    Err(_) => Error::ThreadErr,
                };

                log::error!("worker {k} failed: {err}");
                if failure.is_none() {
                    failure = Some(err);
                }
            }

            match failure {
                Some(err) => Err(err),
                None => Ok(outputs),
            }
        })
    }
}
