//! Timeline bridging: recent history -> indicative gap fill -> business-day forecast.
//!
//! Real history usually lags the present (feed latency, weekends) while the
//! model's first prediction is "the day after the last observation". The
//! bridge ramps from the last real rate towards the first forecast across the
//! gap, then lays the forecast out on business days only.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::{Observation, PointKind, TimelinePoint};
use crate::error::{AppError, ErrorKind};

/// Number of trailing history points emitted.
pub const HISTORY_POINTS: usize = 30;

/// Ramp slope per elapsed day, as a fraction of the gap.
const RAMP_PER_DAY: f64 = 0.33;

/// The ramp never covers more than this fraction of the gap.
const RAMP_CAP: f64 = 0.90;

/// Build the emitted timeline.
///
/// `today` is the caller's current date: the indicative ramp runs through it
/// (inclusive) and forecast placement starts the day after, unless history is
/// already ahead of `today`.
pub fn bridge(
    history: &[Observation],
    forecast: &[f64],
    today: NaiveDate,
) -> Result<Vec<TimelinePoint>, AppError> {
    let Some(&(latest_date, friday_rate)) = history.last() else {
        return Err(AppError::new(
            ErrorKind::InsufficientHistory,
            "No cross-rate history to bridge from.",
        ));
    };
    let Some(&monday_rate) = forecast.first() else {
        return Err(AppError::invalid_input("Forecast is empty."));
    };

    let recent = &history[history.len().saturating_sub(HISTORY_POINTS)..];
    let mut out = Vec::with_capacity(recent.len() + forecast.len() + 7);

    out.extend(recent.iter().map(|&(date, rate)| point(date, rate, PointKind::History)));

    let gap = monday_rate - friday_rate;
    let mut day = latest_date + Duration::days(1);
    while day <= today {
        let days_passed = (day - latest_date).num_days() as f64;
        let rate = friday_rate + gap * (days_passed * RAMP_PER_DAY).min(RAMP_CAP);
        out.push(point(day, rate, PointKind::Indicative));
        day += Duration::days(1);
    }

    let mut day = (today + Duration::days(1)).max(latest_date + Duration::days(1));
    let mut remaining = forecast.iter();
    let mut next = remaining.next();
    while let Some(&rate) = next {
        if is_business_day(day) {
            out.push(point(day, rate, PointKind::Forecast));
            next = remaining.next();
        }
        day += Duration::days(1);
    }

    Ok(out)
}

/// Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Round to 4 decimals.
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn point(date: NaiveDate, rate: f64, kind: PointKind) -> TimelinePoint {
    TimelinePoint {
        date,
        rate: round4(rate),
        kind,
    }
}
