//! Training of per-leg autoregressive artifacts.
//!
//! Workflow per leg: fetch closes -> clean -> returns -> min-max scale ->
//! lagged least squares -> artifact.

use chrono::NaiveDate;
use tracing::info;

use crate::data::RateProvider;
use crate::domain::Currency;
use crate::error::{AppError, ErrorKind};
use crate::math::{lagged_design, solve_least_squares};
use crate::model::ModelArtifact;

/// Number of lagged returns used by trained models.
pub const DEFAULT_LAGS: usize = 5;

/// Closes at or below this are treated as bad ticks.
const MIN_VALID_CLOSE: f64 = 0.0001;

/// Daily returns outside `(-MAX_ABS_RETURN, MAX_ABS_RETURN)` are dropped as outliers.
const MAX_ABS_RETURN: f64 = 0.2;

const MIN_CLOSES: usize = 300;
const MIN_RETURNS: usize = 200;

/// Fractional daily returns `close[t] / close[t-1] - 1`.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Fit an AR(`lags`) model for `currency` from its history starting at `start_date`.
pub fn train_leg<P: RateProvider + ?Sized>(
    provider: &P,
    currency: Currency,
    start_date: NaiveDate,
    trained_on: NaiveDate,
    lags: usize,
) -> Result<ModelArtifact, AppError> {
    if currency.is_eur() {
        return Err(AppError::new(ErrorKind::InvalidPair, "EUR has no leg model to train."));
    }
    let pair = currency.leg_code();

    let history = provider.fetch_daily_closes(currency, start_date)?;
    if history.len() < MIN_CLOSES {
        return Err(AppError::new(
            ErrorKind::InsufficientHistory,
            format!("Not enough data for {pair} ({} closes).", history.len()),
        ));
    }

    let closes: Vec<f64> = history
        .iter()
        .map(|&(_, c)| c)
        .filter(|c| *c > MIN_VALID_CLOSE)
        .collect();
    let returns: Vec<f64> = daily_returns(&closes)
        .into_iter()
        .filter(|r| r.is_finite() && r.abs() < MAX_ABS_RETURN)
        .collect();
    if returns.len() < MIN_RETURNS {
        return Err(AppError::new(
            ErrorKind::InsufficientHistory,
            format!("Data too short after cleaning for {pair} ({} returns).", returns.len()),
        ));
    }

    let scale_min = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let scale_max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = scale_max - scale_min;
    if !(span.is_finite() && span > 0.0) {
        return Err(AppError::invalid_input(format!("Degenerate return series for {pair}.")));
    }
    let scaled: Vec<f64> = returns.iter().map(|r| (r - scale_min) / span).collect();

    let (x, y) = lagged_design(&scaled, lags)
        .ok_or_else(|| AppError::invalid_input(format!("Invalid lag count {lags}.")))?;
    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::invalid_input(format!("Least squares failed for {pair}.")))?;

    info!(pair = %pair, samples = y.len(), lags, "trained leg model");

    Ok(ModelArtifact {
        pair,
        lags,
        coefficients: beta.iter().copied().collect(),
        scale_min,
        scale_max,
        trained_on,
        n_samples: y.len(),
    })
}
