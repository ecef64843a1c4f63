//! Resolution of pending predictions against realized cross-rates.
//!
//! Each record resolves independently into a [`ResolutionOutcome`]. A record
//! whose target-date closes are not yet available is skipped and retried on
//! the next run; it never aborts the batch.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::audit::store::AuditStore;
use crate::audit::trust::classify;
use crate::data::RateProvider;
use crate::domain::{Currency, CurrencyPair, PredictionAudit};
use crate::error::AppError;

/// Result of attempting to resolve one record.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved(PredictionAudit),
    Skipped { id: u64, reason: String },
}

/// Aggregate of one resolver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub skipped: usize,
}

/// Resolve every pending record whose target date is before `today`.
///
/// Closes for different records are fetched in parallel; the resolved records
/// are then written back as one batch. If that write fails the whole batch
/// stays pending and counts as skipped. Only a failure to list pending records
/// is returned as an error.
pub fn resolve_pending<S, P>(
    store: &mut S,
    provider: &P,
    today: NaiveDate,
) -> Result<ResolutionSummary, AppError>
where
    S: AuditStore + ?Sized,
    P: RateProvider + ?Sized,
{
    let pending = store.list_unresolved(today)?;
    if pending.is_empty() {
        return Ok(ResolutionSummary::default());
    }

    let outcomes: Vec<ResolutionOutcome> = pending
        .par_iter()
        .map(|record| resolve_record(record, provider))
        .collect();

    let mut summary = ResolutionSummary::default();
    let mut resolved = Vec::new();
    for outcome in outcomes {
        match outcome {
            ResolutionOutcome::Resolved(record) => resolved.push(record),
            ResolutionOutcome::Skipped { id, reason } => {
                warn!(id, reason = %reason, "audit resolution skipped");
                summary.skipped += 1;
            }
        }
    }

    if !resolved.is_empty() {
        match store.update_many(&resolved) {
            Ok(()) => summary.resolved += resolved.len(),
            Err(e) => {
                warn!(records = resolved.len(), error = %e, "failed to persist resolved audits");
                summary.skipped += resolved.len();
            }
        }
    }

    info!(resolved = summary.resolved, skipped = summary.skipped, "audit resolution finished");
    Ok(summary)
}

/// Attempt to resolve a single record. Never fails; problems become `Skipped`.
pub fn resolve_record<P: RateProvider + ?Sized>(
    record: &PredictionAudit,
    provider: &P,
) -> ResolutionOutcome {
    let attempt = || -> Result<PredictionAudit, AppError> {
        let pair: CurrencyPair = record.currency_pair.parse()?;
        let base_close = close_on(provider, pair.base, record.target_date)?;
        let quote_close = close_on(provider, pair.quote, record.target_date)?;
        apply_resolution(record, base_close, quote_close)
    };

    match attempt() {
        Ok(resolved) => ResolutionOutcome::Resolved(resolved),
        Err(e) => ResolutionOutcome::Skipped {
            id: record.id,
            reason: e.to_string(),
        },
    }
}

/// Fill in the realized fields of `record` given both legs' closes.
///
/// A close that is not positive counts as unavailable.
pub fn apply_resolution(
    record: &PredictionAudit,
    base_close: f64,
    quote_close: f64,
) -> Result<PredictionAudit, AppError> {
    if !(base_close > 0.0 && quote_close > 0.0) {
        return Err(AppError::provider(format!(
            "No usable close for audit {} (base={base_close}, quote={quote_close}).",
            record.id
        )));
    }

    let actual_rate = quote_close / base_close;
    let implied_start = implied_start_rate(record.predicted_rate, record.predicted_change_pct);
    let actual_change_pct = (actual_rate - implied_start) / implied_start;

    if !(actual_rate.is_finite() && actual_change_pct.is_finite()) {
        return Err(AppError::invalid_input(format!(
            "Non-finite resolution for audit {} (base={base_close}, quote={quote_close}).",
            record.id
        )));
    }

    let mut resolved = record.clone();
    resolved.actual_rate = Some(actual_rate);
    resolved.actual_change_pct = Some(actual_change_pct);
    resolved.trust_label = Some(classify(record.predicted_change_pct, actual_change_pct));
    resolved.is_resolved = true;
    Ok(resolved)
}

/// Rate at prediction time, recovered from the stored prediction.
///
/// Assumes `predicted_change_pct` was measured against the rate on the day
/// the prediction was made.
pub fn implied_start_rate(predicted_rate: f64, predicted_change_pct: f64) -> f64 {
    predicted_rate / (1.0 + predicted_change_pct)
}

/// EUR→`currency` close on `date`: the first observation at or after it.
fn close_on<P: RateProvider + ?Sized>(
    provider: &P,
    currency: Currency,
    date: NaiveDate,
) -> Result<f64, AppError> {
    if currency.is_eur() {
        return Ok(1.0);
    }
    provider
        .fetch_daily_closes(currency, date)?
        .into_iter()
        .find(|(d, _)| *d >= date)
        .map(|(_, close)| close)
        .ok_or_else(|| AppError::provider(format!("No {currency} close available for {date}.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::scoreboard::scoreboard;
    use crate::audit::store::{JsonAuditStore, MemoryAuditStore};
    use crate::domain::{NewAudit, Observation, TrustLabel};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    struct Closes(HashMap<Currency, Vec<Observation>>);

    impl RateProvider for Closes {
        fn fetch_daily_closes(&self, currency: Currency, start: NaiveDate) -> Result<Vec<Observation>, AppError> {
            match self.0.get(&currency) {
                Some(obs) => Ok(obs.iter().copied().filter(|(d, _)| *d >= start).collect()),
                None => Err(AppError::provider("unavailable")),
            }
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn pending(pair: &str, target: u32, rate: f64, change: f64) -> NewAudit {
        NewAudit {
            currency_pair: pair.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            target_date: d(target),
            predicted_rate: rate,
            predicted_change_pct: change,
        }
    }

    #[test]
    fn implied_start_round_trips() {
        for (rate, pct) in [(105.5, 0.005), (1.27, -0.003), (145.0, 0.0)] {
            let start = implied_start_rate(rate, pct);
            assert_relative_eq!(start * (1.0 + pct), rate, max_relative = 1e-12);
        }
    }

    #[test]
    fn resolves_cross_rate_and_classifies() {
        // Predicted GBP->INR 105.0 from a start of 100.0 (+5%).
        let record = PredictionAudit {
            id: 1,
            currency_pair: "GBP_INR".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            target_date: d(6),
            predicted_rate: 105.0,
            predicted_change_pct: 0.05,
            actual_rate: None,
            actual_change_pct: None,
            trust_label: None,
            is_resolved: false,
        };
        // Actual: 0.8 GBP, 84.0 INR per EUR => 105.0, exactly as predicted.
        let resolved = apply_resolution(&record, 0.8, 84.0).unwrap();
        assert_relative_eq!(resolved.actual_rate.unwrap(), 105.0, max_relative = 1e-12);
        assert_relative_eq!(resolved.actual_change_pct.unwrap(), 0.05, max_relative = 1e-9);
        assert_eq!(resolved.trust_label, Some(TrustLabel::DirectionMatchedHighTrust));
        assert!(resolved.is_resolved);
    }

    #[test]
    fn batch_skips_unavailable_without_aborting() {
        let mut store = MemoryAuditStore::new();
        store.insert(pending("GBP_EUR", 6, 1.2, 0.01)).unwrap();
        store.insert(pending("USD_JPY", 6, 160.0, 0.01)).unwrap();
        store.insert(pending("GBP_USD", 20, 1.2, 0.01)).unwrap();

        let mut closes = HashMap::new();
        closes.insert(Currency::Gbp, vec![(d(3), 0.80), (d(7), 0.83)]);
        // USD/JPY legs unavailable: JPY missing entirely.
        closes.insert(Currency::Usd, vec![(d(7), 1.05)]);
        let provider = Closes(closes);

        let summary = resolve_pending(&mut store, &provider, d(10)).unwrap();
        assert_eq!(summary, ResolutionSummary { resolved: 1, skipped: 1 });

        let records = store.records();
        // GBP_EUR: close on Jan 7 (first at/after Jan 6) => 1/0.83.
        assert!(records[0].is_resolved);
        assert_relative_eq!(records[0].actual_rate.unwrap(), 1.0 / 0.83);
        assert!(!records[1].is_resolved);
        assert!(records[1].trust_label.is_none());
        // Target date not yet passed: untouched.
        assert!(!records[2].is_resolved);
    }

    #[test]
    fn unparseable_pair_is_skipped() {
        let record = PredictionAudit {
            id: 7,
            currency_pair: "garbage".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            target_date: d(2),
            predicted_rate: 1.0,
            predicted_change_pct: 0.0,
            actual_rate: None,
            actual_change_pct: None,
            trust_label: None,
            is_resolved: false,
        };
        let outcome = resolve_record(&record, &Closes(HashMap::new()));
        assert!(matches!(outcome, ResolutionOutcome::Skipped { id: 7, .. }));
    }

    #[test]
    fn zero_or_negative_close_leaves_record_pending() {
        let record = PredictionAudit {
            id: 3,
            currency_pair: "GBP_INR".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            target_date: d(6),
            predicted_rate: 105.0,
            predicted_change_pct: 0.05,
            actual_rate: None,
            actual_change_pct: None,
            trust_label: None,
            is_resolved: false,
        };
        assert!(apply_resolution(&record, 0.8, 0.0).is_err());
        assert!(apply_resolution(&record, 0.0, 84.0).is_err());
        assert!(apply_resolution(&record, 0.8, -1.0).is_err());

        let mut closes = HashMap::new();
        closes.insert(Currency::Gbp, vec![(d(6), 0.80)]);
        closes.insert(Currency::Inr, vec![(d(6), 0.0)]);
        let outcome = resolve_record(&record, &Closes(closes));
        assert!(matches!(outcome, ResolutionOutcome::Skipped { id: 3, .. }));
    }

    #[test]
    fn failed_batch_write_keeps_records_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let mut store = JsonAuditStore::open(&path).unwrap();
        store.insert(pending("GBP_EUR", 6, 1.2, 0.01)).unwrap();
        store.insert(pending("GBP_USD", 6, 1.2, 0.01)).unwrap();
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let mut closes = HashMap::new();
        closes.insert(Currency::Gbp, vec![(d(7), 0.83)]);
        closes.insert(Currency::Usd, vec![(d(7), 1.05)]);
        let summary = resolve_pending(&mut store, &Closes(closes), d(10)).unwrap();

        assert_eq!(summary, ResolutionSummary { resolved: 0, skipped: 2 });
        assert!(scoreboard(&store).unwrap().is_empty());
        let on_disk = JsonAuditStore::open(&path).unwrap().list_all().unwrap();
        assert!(on_disk.iter().all(|r| !r.is_resolved));
    }

    #[test]
    fn resolved_batch_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let mut store = JsonAuditStore::open(&path).unwrap();
        store.insert(pending("GBP_EUR", 6, 1.2, 0.01)).unwrap();
        store.insert(pending("GBP_USD", 6, 1.2, 0.01)).unwrap();

        let mut closes = HashMap::new();
        closes.insert(Currency::Gbp, vec![(d(7), 0.83)]);
        closes.insert(Currency::Usd, vec![(d(7), 1.05)]);
        let summary = resolve_pending(&mut store, &Closes(closes), d(10)).unwrap();

        assert_eq!(summary, ResolutionSummary { resolved: 2, skipped: 0 });
        let on_disk = JsonAuditStore::open(&path).unwrap().list_all().unwrap();
        assert!(on_disk.iter().all(|r| r.is_resolved));
        assert_eq!(scoreboard(&store).unwrap().len(), 2);
    }
}
