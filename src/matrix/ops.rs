use super::Matrix2;
use crate::neural::activations::sigmoid;
use crate::prelude::*;
use std::ops::{Add, AddAssign, Mul, Sub};

pub trait Dot<I> {
    type Output;
    fn dot(self, rhs: I) -> Result<Self::Output>;
}

pub trait Transpose {
    fn transpose(&self) -> Self;
}

impl<T: Default + Copy> Transpose for Matrix2<T> {
    fn transpose(&self) -> Self {
        let mut transposed = Matrix2::new(self.cols(), self.rows());

        for row in 0..self.rows() {
            for col in 0..self.cols() {
                transposed[(col, row)] = self[(row, col)];
            }
        }
        transposed
    }
}

impl<'a, T> Dot<&Matrix2<T>> for &'a Matrix2<T>
where
    T: Mul<Output = T> + Default + AddAssign + Copy,
{
    type Output = Matrix2<T>;
    fn dot(self, rhs: &Matrix2<T>) -> Result<Self::Output> {
        if self.cols() != rhs.rows() {
            return Err(Error::DimensionErr);
        }

        let mut data = Vec::with_capacity(self.rows() * rhs.cols());

        for lhs_row in 0..self.rows() {
            for rhs_col in 0..rhs.cols() {
                let mut sum = T::default();
                for n in 0..self.cols() {
                    sum += self[(lhs_row, n)] * rhs[(n, rhs_col)]
                }
                data.push(sum);
            }
        }

        Ok(Matrix2 {
            data,
            dim: (self.rows(), rhs.cols()),
        })
    }
}

impl<T> Matrix2<T> {
    /// Combines two equally shaped matrices entry by entry.
    fn zip_with<'a, F>(&'a self, rhs: &'a Matrix2<T>, f: F) -> Result<Matrix2<T>>
    where
        F: Fn(&'a T, &'a T) -> T,
    {
        if self.dim != rhs.dim {
            return Err(Error::DimensionErr);
        }

        Ok(Matrix2 {
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| f(a, b)).collect(),
            dim: self.dim,
        })
    }
}

/// Adds two Matrix2s element-wise.
impl<'a, T> Add for &'a Matrix2<T>
where
    &'a T: Add<Output = T>,
{
    type Output = Result<Matrix2<T>>;
    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

/// Subs two Matrix2s element-wise.
impl<'a, T> Sub for &'a Matrix2<T>
where
    &'a T: Sub<Output = T>,
{
    type Output = Result<Matrix2<T>>;
    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

/// Multiplies two Matrix2s element-wise. Use [`Dot`] for the matrix product.
impl<'a, T> Mul for &'a Matrix2<T>
where
    &'a T: Mul<Output = T>,
{
    type Output = Result<Matrix2<T>>;
    fn mul(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a * b)
    }
}

/// `k - m` for every entry of `m`.
impl Sub<&Matrix2<f64>> for f64 {
    type Output = Matrix2<f64>;
    fn sub(self, rhs: &Matrix2<f64>) -> Self::Output {
        rhs.map(|&x| self - x)
    }
}

impl Matrix2<f64> {
    /// Elementwise logistic function.
    pub fn sigmoid(&self) -> Matrix2<f64> {
        self.map(|&x| sigmoid(x))
    }
}
