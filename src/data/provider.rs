//! Historical price provider contract.

use chrono::NaiveDate;

use crate::domain::{Currency, Observation};
use crate::error::AppError;

/// Source of daily EUR→currency closes.
///
/// Implementations return observations sorted ascending by date, starting at
/// or after `start_date`. "No data" is an empty vector; transient failures are
/// `ProviderUnavailable` errors.
pub trait RateProvider: Send + Sync {
    fn fetch_daily_closes(
        &self,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Result<Vec<Observation>, AppError>;
}

impl<P: RateProvider + ?Sized> RateProvider for &P {
    fn fetch_daily_closes(
        &self,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Result<Vec<Observation>, AppError> {
        (**self).fetch_daily_closes(currency, start_date)
    }
}

/// Constant 1.0 daily series for EUR from `start_date` through `end_date`.
pub fn identity_series(start_date: NaiveDate, end_date: NaiveDate) -> Vec<Observation> {
    start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .map(|d| (d, 1.0))
        .collect()
}
