//! Cross-rate synthesis from two EUR-relative legs.
//!
//! With both legs quoted against EUR, `EUR→quote / EUR→base` is the
//! `base→quote` rate. History is joined on date; forecasts are divided
//! step by step.

use crate::domain::{CrossRateSeries, Leg, Observation};
use crate::error::{AppError, ErrorKind};

/// Derive the base→quote series from its two legs.
///
/// Fails with `InvalidPair` when both legs are EUR.
pub fn synthesize(base: &Leg, quote: &Leg) -> Result<CrossRateSeries, AppError> {
    match (base, quote) {
        (Leg::Identity, Leg::Identity) => Err(AppError::new(
            ErrorKind::InvalidPair,
            "EUR/EUR is an identity pair.",
        )),
        (Leg::Real(b), Leg::Real(q)) => {
            check_forecast_len(b.forecast.len(), q.forecast.len())?;
            Ok(CrossRateSeries {
                history: merge_join_divide(&q.history, &b.history),
                forecast: q
                    .forecast
                    .iter()
                    .zip(&b.forecast)
                    .map(|(q, b)| q / b)
                    .collect(),
            })
        }
        (Leg::Real(b), Leg::Identity) => Ok(CrossRateSeries {
            history: b.history.iter().map(|&(d, close)| (d, 1.0 / close)).collect(),
            forecast: b.forecast.iter().map(|p| 1.0 / p).collect(),
        }),
        (Leg::Identity, Leg::Real(q)) => Ok(CrossRateSeries {
            history: q.history.clone(),
            forecast: q.forecast.clone(),
        }),
    }
}

fn check_forecast_len(base: usize, quote: usize) -> Result<(), AppError> {
    if base != quote {
        return Err(AppError::invalid_input(format!(
            "Leg forecasts differ in length (base={base}, quote={quote})."
        )));
    }
    Ok(())
}

/// Merge-join two ascending series on date and divide `numer / denom`.
///
/// Dates missing from either side are dropped.
fn merge_join_divide(numer: &[Observation], denom: &[Observation]) -> Vec<Observation> {
    let mut out = Vec::with_capacity(numer.len().min(denom.len()));
    let (mut i, mut j) = (0, 0);
    while i < numer.len() && j < denom.len() {
        let (dn, vn) = numer[i];
        let (dd, vd) = denom[j];
        match dn.cmp(&dd) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((dn, vn / vd));
                i += 1;
                j += 1;
            }
        }
    }
    out
}
