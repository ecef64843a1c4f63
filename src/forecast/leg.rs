//! Per-leg forecast construction.
//!
//! A leg is real EUR→currency history plus `days` absolute forecast prices,
//! compounded from the latest close using model-predicted returns.

use chrono::NaiveDate;
use tracing::info;

use crate::data::RateProvider;
use crate::domain::{Currency, Leg, RealLeg};
use crate::error::{AppError, ErrorKind};
use crate::model::{ReturnModel, daily_returns};

/// Inputs shared by both legs of one forecast.
#[derive(Debug, Clone, Copy)]
pub struct LegParams {
    pub history_start: NaiveDate,
    /// Model input window `W`.
    pub window: usize,
    pub days: usize,
}

/// Build the leg for `currency`. EUR yields [`Leg::Identity`] without any I/O.
pub fn build_leg<P, M>(
    currency: Currency,
    provider: &P,
    model: &M,
    params: LegParams,
) -> Result<Leg, AppError>
where
    P: RateProvider + ?Sized,
    M: ReturnModel + ?Sized,
{
    if currency.is_eur() {
        return Ok(Leg::Identity);
    }
    let pair_code = currency.leg_code();

    let history = provider.fetch_daily_closes(currency, params.history_start)?;
    if history.len() < params.window.max(1) {
        return Err(AppError::new(
            ErrorKind::InsufficientHistory,
            format!(
                "Insufficient history for {pair_code}: {} observations, need {}.",
                history.len(),
                params.window
            ),
        ));
    }

    let closes: Vec<f64> = history.iter().map(|&(_, c)| c).collect();
    let returns = daily_returns(&closes);
    let window = &returns[returns.len().saturating_sub(params.window)..];

    let predicted = model.predict_next_day_returns(&pair_code, window, params.days)?;
    if predicted.len() != params.days {
        return Err(AppError::new(
            ErrorKind::ModelUnavailable,
            format!(
                "Model for {pair_code} returned {} steps, expected {}.",
                predicted.len(),
                params.days
            ),
        ));
    }

    let latest = closes[closes.len() - 1];
    let forecast = compound(latest, &predicted);

    info!(
        pair = %pair_code,
        observations = history.len(),
        latest_close = latest,
        "built forecast leg"
    );

    Ok(Leg::Real(RealLeg {
        currency,
        history,
        forecast,
    }))
}

/// Turn a sequence of returns into absolute prices starting from `start`.
pub fn compound(start: f64, returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(start, |price, r| {
            *price *= 1.0 + r;
            Some(*price)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use approx::assert_relative_eq;

    struct Flat(usize);

    impl RateProvider for Flat {
        fn fetch_daily_closes(&self, _: Currency, start: NaiveDate) -> Result<Vec<Observation>, AppError> {
            Ok(start.iter_days().take(self.0).map(|d| (d, 2.0)).collect())
        }
    }

    struct Constant(f64);

    impl ReturnModel for Constant {
        fn predict_next_day_returns(&self, _: &str, window: &[f64], steps: usize) -> Result<Vec<f64>, AppError> {
            assert!(window.iter().all(|r| *r == 0.0));
            Ok(vec![self.0; steps])
        }
    }

    fn params(window: usize, days: usize) -> LegParams {
        LegParams {
            history_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            window,
            days,
        }
    }

    #[test]
    fn eur_is_identity() {
        let leg = build_leg(Currency::Eur, &Flat(0), &Constant(0.0), params(10, 3)).unwrap();
        assert!(leg.is_identity());
    }

    #[test]
    fn compounds_from_latest_close() {
        let leg = build_leg(Currency::Gbp, &Flat(20), &Constant(0.01), params(10, 3)).unwrap();
        let Leg::Real(real) = leg else {
            panic!("expected real leg");
        };
        assert_eq!(real.history.len(), 20);
        assert_relative_eq!(real.forecast[0], 2.02);
        assert_relative_eq!(real.forecast[2], 2.0 * 1.01f64.powi(3));
    }

    #[test]
    fn short_history_fails() {
        let err = build_leg(Currency::Gbp, &Flat(5), &Constant(0.0), params(10, 3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    }
}
