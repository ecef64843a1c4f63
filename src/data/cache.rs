//! TTL response cache in front of a [`RateProvider`].
//!
//! Only successful responses are cached; failures always go back to the
//! underlying provider on the next call.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::debug;

use crate::data::provider::RateProvider;
use crate::domain::{Currency, Observation};
use crate::error::AppError;

type CacheKey = (Currency, NaiveDate);

pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, Vec<Observation>)>>,
}

impl<P: RateProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Vec<Observation>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, obs)| obs.clone())
    }
}

impl<P: RateProvider> RateProvider for CachedProvider<P> {
    fn fetch_daily_closes(
        &self,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Result<Vec<Observation>, AppError> {
        let key = (currency, start_date);
        if let Some(hit) = self.lookup(&key) {
            debug!(currency = %currency, start = %start_date, "rate cache hit");
            return Ok(hit);
        }

        // The lock is not held across the fetch; concurrent misses may both fetch.
        let obs = self.inner.fetch_daily_closes(currency, start_date)?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, (Instant::now(), obs.clone()));
        Ok(obs)
    }
}
