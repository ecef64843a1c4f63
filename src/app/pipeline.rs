//! Shared forecast and scoreboard workflows.
//!
//! Keeping this in one place avoids duplicating the core workflow between the
//! terminal and JSON front-ends:
//! legs -> synthesis -> bridging (forecast), resolve -> aggregate (scoreboard).

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::audit::{AuditStore, ResolutionSummary, resolve_pending, scoreboard};
use crate::config::AppConfig;
use crate::data::RateProvider;
use crate::domain::{
    CrossRateSeries, ForecastRequest, ForecastResult, NewAudit, PointKind, ScoreboardResult,
};
use crate::error::{AppError, ErrorKind};
use crate::forecast::{LegParams, bridge, build_leg, synthesize};
use crate::model::ReturnModel;

/// Maximum forecast horizon in business days.
pub const MAX_DAYS: usize = 365;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub result: ForecastResult,
    pub series: CrossRateSeries,
}

/// Execute the full forecast pipeline for one pair.
pub fn run_forecast<P, M>(
    request: &ForecastRequest,
    config: &AppConfig,
    provider: &P,
    model: &M,
) -> Result<ForecastOutput, AppError>
where
    P: RateProvider + ?Sized,
    M: ReturnModel + ?Sized,
{
    let pair = request.pair;
    if pair.base.is_eur() && pair.quote.is_eur() {
        return Err(AppError::new(ErrorKind::InvalidPair, "EUR/EUR is an identity pair."));
    }
    if request.days == 0 || request.days > MAX_DAYS {
        return Err(AppError::invalid_input(format!(
            "Forecast days must be in 1..={MAX_DAYS} (got {}).",
            request.days
        )));
    }

    let params = LegParams {
        history_start: config.history_start,
        window: config.window,
        days: request.days,
    };

    // The legs are independent; both must succeed before synthesis.
    let (base, quote) = rayon::join(
        || build_leg(pair.base, provider, model, params),
        || build_leg(pair.quote, provider, model, params),
    );
    let series = synthesize(&base?, &quote?)?;
    let timeline = bridge(&series.history, &series.forecast, request.today)?;

    info!(pair = %pair, days = request.days, points = timeline.len(), "forecast complete");

    Ok(ForecastOutput {
        result: ForecastResult {
            pair: pair.code(),
            forecast: timeline,
        },
        series,
    })
}

/// Audit record for the first forecast point, measured against the last real
/// cross-rate.
///
/// Rates come from the unrounded `series`; the timeline only supplies the
/// target date. Returns `None` if either side is missing or the last real rate
/// is not positive.
pub fn audit_for_forecast(output: &ForecastOutput, created_at: DateTime<Utc>) -> Option<NewAudit> {
    let &(_, last_real) = output.series.history.last()?;
    let predicted_rate = *output.series.forecast.first()?;
    let target = output
        .result
        .forecast
        .iter()
        .find(|p| p.kind == PointKind::Forecast)?;
    if !(last_real > 0.0 && predicted_rate.is_finite()) {
        return None;
    }

    Some(NewAudit {
        currency_pair: output.result.pair.clone(),
        created_at,
        target_date: target.date,
        predicted_rate,
        predicted_change_pct: (predicted_rate - last_real) / last_real,
    })
}

/// Resolve pending audits, then build the scoreboard.
pub fn run_scoreboard<S, P>(
    store: &mut S,
    provider: &P,
    today: NaiveDate,
) -> Result<(ScoreboardResult, ResolutionSummary), AppError>
where
    S: AuditStore + ?Sized,
    P: RateProvider + ?Sized,
{
    let summary = resolve_pending(store, provider, today)?;
    let rows = scoreboard(store)?;
    Ok((ScoreboardResult { scoreboard: rows }, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditStore;
    use crate::domain::{Currency, CurrencyPair, Observation, TrustLabel};
    use crate::forecast::bridge::is_business_day;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    /// GBP at 0.80, INR at 88.0 and IDR at 17000 on every business day up to
    /// Friday 2025-01-03.
    struct Market;

    impl RateProvider for Market {
        fn fetch_daily_closes(&self, currency: Currency, start: NaiveDate) -> Result<Vec<Observation>, AppError> {
            let last = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
            let close = match currency {
                Currency::Gbp => 0.80,
                Currency::Inr => 88.0,
                Currency::Idr => 17000.0,
                Currency::Jpy => return Ok(Vec::new()),
                _ => return Err(AppError::provider("down")),
            };
            Ok(start
                .iter_days()
                .take_while(|d| *d <= last)
                .filter(|d| is_business_day(*d))
                .map(|d| (d, close))
                .collect())
        }
    }

    /// INR and IDR drift up 1% a day, everything else flat.
    struct Drift;

    impl ReturnModel for Drift {
        fn predict_next_day_returns(&self, pair: &str, _: &[f64], steps: usize) -> Result<Vec<f64>, AppError> {
            let r = if pair == "EUR_INR" || pair == "EUR_IDR" { 0.01 } else { 0.0 };
            Ok(vec![r; steps])
        }
    }

    fn config() -> AppConfig {
        let mut cfg = AppConfig::from_lookup(|_| None).unwrap();
        cfg.history_start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        cfg.window = 20;
        cfg
    }

    fn request(base: Currency, quote: Currency, days: usize) -> ForecastRequest {
        ForecastRequest {
            pair: CurrencyPair::new(base, quote),
            days,
            // Monday after the last Friday observation.
            today: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        }
    }

    #[test]
    fn forecast_bridges_weekend_into_business_days() {
        let out = run_forecast(&request(Currency::Gbp, Currency::Inr, 5), &config(), &Market, &Drift).unwrap();
        let points = &out.result.forecast;
        assert_eq!(out.result.pair, "GBP_INR");

        let kinds = |k| points.iter().filter(|p| p.kind == k).count();
        assert_eq!(kinds(PointKind::History), 30);
        assert_eq!(kinds(PointKind::Indicative), 3);
        assert_eq!(kinds(PointKind::Forecast), 5);

        // 88 / 0.8 = 110 history, first forecast 110 * 1.01.
        let last_hist = points.iter().rfind(|p| p.kind == PointKind::History).unwrap();
        assert_relative_eq!(last_hist.rate, 110.0);
        let first_fc = points.iter().find(|p| p.kind == PointKind::Forecast).unwrap();
        assert_relative_eq!(first_fc.rate, 111.1);
        assert_eq!(first_fc.date, NaiveDate::from_ymd_opt(2025, 1, 7).unwrap());

        for w in points.windows(2) {
            assert!(w[0].date < w[1].date);
        }
    }

    #[test]
    fn eur_quote_inverts_base_leg() {
        let out = run_forecast(&request(Currency::Gbp, Currency::Eur, 2), &config(), &Market, &Drift).unwrap();
        assert_relative_eq!(out.series.forecast[0], 1.25);
        assert_relative_eq!(out.series.history[0].1, 1.25);
    }

    #[test]
    fn request_level_errors() {
        let cfg = config();
        let err = run_forecast(&request(Currency::Eur, Currency::Eur, 5), &cfg, &Market, &Drift).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPair);

        let err = run_forecast(&request(Currency::Gbp, Currency::Jpy, 5), &cfg, &Market, &Drift).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientHistory);

        let err = run_forecast(&request(Currency::Usd, Currency::Gbp, 5), &cfg, &Market, &Drift).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);

        let err = run_forecast(&request(Currency::Gbp, Currency::Inr, 0), &cfg, &Market, &Drift).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn recorded_forecast_resolves_on_scoreboard() {
        let out = run_forecast(&request(Currency::Gbp, Currency::Inr, 3), &config(), &Market, &Drift).unwrap();
        let created = Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        let new = audit_for_forecast(&out, created).unwrap();
        assert_relative_eq!(new.predicted_change_pct, 0.01, max_relative = 1e-9);

        let mut store = MemoryAuditStore::new();
        store.insert(new.clone()).unwrap();

        // Before the target date passes nothing is shown.
        let (board, summary) = run_scoreboard(&mut store, &Market, new.target_date).unwrap();
        assert!(board.scoreboard.is_empty());
        assert_eq!(summary, ResolutionSummary::default());

        // Market data ends on Jan 3, so Jan 7 has no close yet: stays pending.
        let later = new.target_date + Duration::days(1);
        let (board, summary) = run_scoreboard(&mut store, &Market, later).unwrap();
        assert!(board.scoreboard.is_empty());
        assert_eq!(summary.skipped, 1);
        assert!(!store.records()[0].is_resolved);

        // Once resolved, the pair shows up.
        let mut record = store.records()[0].clone();
        record.actual_change_pct = Some(0.0);
        record.actual_rate = Some(110.0);
        record.trust_label = Some(TrustLabel::DirectionAccuratePrecision);
        record.is_resolved = true;
        store.update(&record).unwrap();
        let (board, _) = run_scoreboard(&mut store, &Market, later).unwrap();
        assert_eq!(board.scoreboard.len(), 1);
        assert_eq!(board.scoreboard[0].currency, "GBP/INR");
        assert_eq!(board.scoreboard[0].pred, "+1.00%");
        assert_eq!(board.scoreboard[0].status, "danger");
    }

    #[test]
    fn recorded_audit_keeps_full_precision_for_tiny_rates() {
        // IDR/EUR is ~5.9e-5, below what the 4 dp timeline can represent.
        let out = run_forecast(&request(Currency::Idr, Currency::Eur, 3), &config(), &Market, &Drift).unwrap();
        let first_fc = out.result.forecast.iter().find(|p| p.kind == PointKind::Forecast).unwrap();
        assert_relative_eq!(first_fc.rate, 0.0001);

        let created = Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap();
        let new = audit_for_forecast(&out, created).unwrap();
        assert_eq!(new.currency_pair, "IDR_EUR");
        assert_eq!(new.target_date, first_fc.date);
        assert_relative_eq!(new.predicted_rate, 1.0 / (17000.0 * 1.01), max_relative = 1e-9);
        assert_relative_eq!(new.predicted_change_pct, 1.0 / 1.01 - 1.0, max_relative = 1e-9);
    }
}
