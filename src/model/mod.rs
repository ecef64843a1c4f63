//! Return-prediction models.
//!
//! The forecasting core only depends on [`ReturnModel`]. The default
//! implementation ([`ArtifactModel`]) loads per-leg autoregressive artifacts
//! produced by `fxc train`.

pub mod artifact;
pub mod train;

pub use artifact::*;
pub use train::*;

use crate::error::AppError;

/// Predicts fractional daily returns for one EUR leg.
pub trait ReturnModel: Send + Sync {
    /// Predict `steps` next-day returns given the most recent `window` of
    /// returns (oldest first). Each prediction is fed back as input for the next.
    ///
    /// Fails with `ModelUnavailable` when no trained model exists for `pair_code`.
    fn predict_next_day_returns(
        &self,
        pair_code: &str,
        window: &[f64],
        steps: usize,
    ) -> Result<Vec<f64>, AppError>;
}

impl<M: ReturnModel + ?Sized> ReturnModel for &M {
    fn predict_next_day_returns(
        &self,
        pair_code: &str,
        window: &[f64],
        steps: usize,
    ) -> Result<Vec<f64>, AppError> {
        (**self).predict_next_day_returns(pair_code, window, steps)
    }
}
