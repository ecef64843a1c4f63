//! ECB SDMX API integration for daily EUR reference rates.
//!
//! Series key: `D.{CCY}.EUR.SP00.A` (daily, spot, average), requested as CSV.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::data::provider::{RateProvider, identity_series};
use crate::domain::{Currency, Observation};
use crate::error::AppError;

const USER_AGENT: &str = concat!("fx-cortex/", env!("CARGO_PKG_VERSION"), " (daily reference rates)");

const COL_DATE: &str = "TIME_PERIOD";
const COL_VALUE: &str = "OBS_VALUE";

pub struct EcbClient {
    client: Client,
    base_url: String,
}

impl EcbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/csv"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::provider(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.ecb_base_url.clone(), config.http_timeout)
    }

    fn series_url(&self, currency: Currency) -> String {
        format!("{}/D.{}.EUR.SP00.A", self.base_url, currency.code())
    }
}

impl RateProvider for EcbClient {
    fn fetch_daily_closes(
        &self,
        currency: Currency,
        start_date: NaiveDate,
    ) -> Result<Vec<Observation>, AppError> {
        if currency.is_eur() {
            return Ok(identity_series(start_date, Utc::now().date_naive()));
        }

        info!(currency = %currency, start = %start_date, "fetching ECB rates");

        let resp = self
            .client
            .get(self.series_url(currency))
            .query(&[
                ("startPeriod", start_date.to_string().as_str()),
                ("format", "csvdata"),
            ])
            .send()
            .map_err(|e| AppError::provider(format!("ECB request failed for {currency}: {e}")))?;

        // ECB answers "no observations in range" with 404.
        if resp.status() == StatusCode::NOT_FOUND {
            warn!(currency = %currency, start = %start_date, "ECB returned no observations");
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(AppError::provider(format!(
                "ECB request for {currency} failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::provider(format!("Failed to read ECB response: {e}")))?;
        let out = parse_ecb_csv(&body)?;

        info!(currency = %currency, rows = out.len(), "fetched ECB rates");
        Ok(out)
    }
}

/// Parse an ECB `csvdata` body into ascending `(date, close)` observations.
///
/// Rows with missing or non-numeric values are skipped.
pub fn parse_ecb_csv(body: &str) -> Result<Vec<Observation>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::provider(format!("Failed to read ECB CSV headers: {e}")))?
        .clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| AppError::provider(format!("Unexpected ECB format: missing {name} column.")))
    };
    let date_idx = find(COL_DATE)?;
    let value_idx = find(COL_VALUE)?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::provider(format!("ECB CSV parse error: {e}")))?;
        let (Some(raw_date), Some(raw_value)) = (record.get(date_idx), record.get(value_idx)) else {
            continue;
        };
        let Some(value) = parse_value(raw_value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| AppError::provider(format!("Invalid ECB date '{raw_date}': {e}")))?;
        out.push((date, value));
    }

    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NaN" {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
