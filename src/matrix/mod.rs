use crate::prelude::*;
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use std::ops::{Index, IndexMut};

pub mod ops;

/// Dense `rows x cols` matrix stored row-major.
#[derive(Debug, PartialEq, Clone)]
pub struct Matrix2<T> {
    data: Vec<T>,
    dim: (usize, usize),
}

impl<T: Default + Clone> Matrix2<T> {
    /// Creates a matrix with every entry set to `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            dim: (rows, cols),
        }
    }
}

impl Matrix2<f64> {
    /// Fills a matrix with values drawn independently and uniformly from [-0.5, 0.5).
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let die = Uniform::from(-0.5..0.5);

        Self {
            data: (0..rows * cols).map(|_| die.sample(rng)).collect(),
            dim: (rows, cols),
        }
    }
}

impl<T> Matrix2<T> {
    pub fn from_array<const R: usize, const C: usize>(arr: [[T; C]; R]) -> Self {
        let mut data = Vec::with_capacity(R * C);

        for row in arr {
            for x in row {
                data.push(x);
            }
        }

        Self { data, dim: (R, C) }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim.0
    }

    pub fn cols(&self) -> usize {
        self.dim.1
    }

    /// Builds a `1 x n` matrix.
    pub fn from_row(row_vec: Vec<T>) -> Self {
        Self {
            dim: (1, row_vec.len()),
            data: row_vec,
        }
    }

    pub fn from_vec(vec: Vec<Vec<T>>) -> Result<Self> {
        let rows = vec.len();
        let cols = vec.first().map(|row| row.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(rows * cols);
        for row in vec {
            if cols != row.len() {
                return Err(Error::DimensionErr);
            }

            data.extend(row);
        }

        Ok(Self {
            data,
            dim: (rows, cols),
        })
    }

    pub fn to_vec(self) -> Vec<Vec<T>> {
        let cols = self.cols();
        let mut res = Vec::with_capacity(self.rows());
        let mut entries = self.data.into_iter();
        for _ in 0..self.dim.0 {
            res.push(entries.by_ref().take(cols).collect());
        }
        res
    }

    /// Entries in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexErr {
                row,
                col,
                dim: self.dim,
            });
        }
        Ok(row * self.cols() + col)
    }

    /// Checked read of a single entry.
    pub fn get(&self, row: usize, col: usize) -> Result<&T> {
        let idx = self.offset(row, col)?;
        Ok(&self.data[idx])
    }

    /// Checked write of a single entry.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let idx = self.offset(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Returns a new matrix with `f` applied to every element
    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Matrix2<U> {
        Matrix2 {
            data: self.data.iter().map(f).collect(),
            dim: self.dim,
        }
    }
}

impl<T> Matrix2<T>
where
    T: Default,
{
    /// Applies a function to every element of the matrix
    pub fn apply<F: Fn(T) -> T>(&mut self, f: F) {
        for x in &mut self.data {
            let old = std::mem::take(x);
            *x = f(old);
        }
    }
}

/// Unchecked access, panics when `(row, col)` is outside the matrix.
impl<T> Index<(usize, usize)> for Matrix2<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(
            i < self.rows() && j < self.cols(),
            "index ({i}, {j}) out of range for {:?}",
            self.dim
        );
        &self.data[i * self.cols() + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix2<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        assert!(
            i < self.rows() && j < self.cols(),
            "index ({i}, {j}) out of range for {:?}",
            self.dim
        );
        let idx = i * self.cols() + j;
        &mut self.data[idx]
    }
}
