//! Mathematical utilities: lagged design matrices and least squares.

pub mod ols;

pub use ols::*;
