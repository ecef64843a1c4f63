//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during synthesis and bridging
//! - persisted in the audit store
//! - emitted as JSON for downstream consumers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Supported currencies. Every non-EUR currency is modeled as a EUR-relative leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Chf,
    Usd,
    Inr,
    Jpy,
    Czk,
    Dkk,
    Huf,
    Pln,
    Ron,
    Sek,
    Isk,
    Nok,
    Try,
    Aud,
    Brl,
    Cad,
    Cny,
    Hkd,
    Idr,
    Ils,
    Krw,
    Mxn,
    Myr,
    Nzd,
    Php,
    Sgd,
    Thb,
    Zar,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 30] = [
        Currency::Gbp,
        Currency::Chf,
        Currency::Usd,
        Currency::Inr,
        Currency::Jpy,
        Currency::Czk,
        Currency::Dkk,
        Currency::Huf,
        Currency::Pln,
        Currency::Ron,
        Currency::Sek,
        Currency::Isk,
        Currency::Nok,
        Currency::Try,
        Currency::Aud,
        Currency::Brl,
        Currency::Cad,
        Currency::Cny,
        Currency::Hkd,
        Currency::Idr,
        Currency::Ils,
        Currency::Krw,
        Currency::Mxn,
        Currency::Myr,
        Currency::Nzd,
        Currency::Php,
        Currency::Sgd,
        Currency::Thb,
        Currency::Zar,
        Currency::Eur,
    ];

    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Czk => "CZK",
            Currency::Dkk => "DKK",
            Currency::Huf => "HUF",
            Currency::Pln => "PLN",
            Currency::Ron => "RON",
            Currency::Sek => "SEK",
            Currency::Isk => "ISK",
            Currency::Nok => "NOK",
            Currency::Try => "TRY",
            Currency::Aud => "AUD",
            Currency::Brl => "BRL",
            Currency::Cad => "CAD",
            Currency::Cny => "CNY",
            Currency::Hkd => "HKD",
            Currency::Idr => "IDR",
            Currency::Ils => "ILS",
            Currency::Krw => "KRW",
            Currency::Mxn => "MXN",
            Currency::Myr => "MYR",
            Currency::Nzd => "NZD",
            Currency::Php => "PHP",
            Currency::Sgd => "SGD",
            Currency::Thb => "THB",
            Currency::Zar => "ZAR",
            Currency::Eur => "EUR",
        }
    }

    pub fn is_eur(self) -> bool {
        self == Currency::Eur
    }

    /// Code of the EUR-relative leg model, e.g. `EUR_GBP`.
    pub fn leg_code(self) -> String {
        format!("EUR_{}", self.code())
    }

    /// Every currency that has its own EUR leg (everything except EUR).
    pub fn legs() -> impl Iterator<Item = Currency> {
        Currency::ALL.into_iter().filter(|c| !c.is_eur())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::UnsupportedCurrency,
                    format!("Unsupported currency '{trimmed}'."),
                )
            })
    }
}

/// A base/quote pair. Stored as `BASE_QUOTE`, displayed as `BASE/QUOTE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    pub fn code(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }

    pub fn display_name(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s.split_once('_').ok_or_else(|| {
            AppError::invalid_input(format!("Invalid currency pair '{s}' (expected BASE_QUOTE)."))
        })?;
        Ok(Self {
            base: base.parse()?,
            quote: quote.parse()?,
        })
    }
}

/// A single dated observation.
pub type Observation = (NaiveDate, f64);

/// One currency's relationship to EUR over time.
#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    /// EUR itself: constant 1.0 history and forecast.
    Identity,
    Real(RealLeg),
}

impl Leg {
    pub fn is_identity(&self) -> bool {
        matches!(self, Leg::Identity)
    }
}

/// A non-EUR leg: real history plus absolute forecast prices.
#[derive(Debug, Clone, PartialEq)]
pub struct RealLeg {
    pub currency: Currency,
    /// Ascending by date.
    pub history: Vec<Observation>,
    pub forecast: Vec<f64>,
}

/// The derived base→quote series.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossRateSeries {
    pub history: Vec<Observation>,
    pub forecast: Vec<f64>,
}

/// Kind of an emitted timeline point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    History,
    Indicative,
    Forecast,
}

impl PointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::History => "history",
            PointKind::Indicative => "indicative",
            PointKind::Forecast => "forecast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    /// Rounded to 4 decimals.
    pub rate: f64,
    #[serde(rename = "type")]
    pub kind: PointKind,
}

/// Classification of a resolved prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustLabel {
    #[serde(rename = "Direction Accurate (Precision)")]
    DirectionAccuratePrecision,
    #[serde(rename = "Direction Missed (Warning)")]
    DirectionMissedWarning,
    #[serde(rename = "Direction Matched (High Trust)")]
    DirectionMatchedHighTrust,
    #[serde(rename = "Direction Matched (Conservative)")]
    DirectionMatchedConservative,
    #[serde(rename = "Direction Matched (Optimistic)")]
    DirectionMatchedOptimistic,
}

impl TrustLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            TrustLabel::DirectionAccuratePrecision => "Direction Accurate (Precision)",
            TrustLabel::DirectionMissedWarning => "Direction Missed (Warning)",
            TrustLabel::DirectionMatchedHighTrust => "Direction Matched (High Trust)",
            TrustLabel::DirectionMatchedConservative => "Direction Matched (Conservative)",
            TrustLabel::DirectionMatchedOptimistic => "Direction Matched (Optimistic)",
        }
    }

    /// True for the three "Direction Matched" labels.
    pub fn is_matched(self) -> bool {
        matches!(
            self,
            TrustLabel::DirectionMatchedHighTrust
                | TrustLabel::DirectionMatchedConservative
                | TrustLabel::DirectionMatchedOptimistic
        )
    }
}

impl fmt::Display for TrustLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A persisted past forecast for one pair and target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAudit {
    pub id: u64,
    /// `BASE_QUOTE`.
    pub currency_pair: String,
    pub created_at: DateTime<Utc>,
    pub target_date: NaiveDate,
    pub predicted_rate: f64,
    /// Fractional change vs. the rate at creation time (0.005 = 0.5%).
    pub predicted_change_pct: f64,
    pub actual_rate: Option<f64>,
    pub actual_change_pct: Option<f64>,
    pub trust_label: Option<TrustLabel>,
    pub is_resolved: bool,
}

/// Fields supplied when inserting a new audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAudit {
    pub currency_pair: String,
    pub created_at: DateTime<Utc>,
    pub target_date: NaiveDate,
    pub predicted_rate: f64,
    pub predicted_change_pct: f64,
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// `BASE/QUOTE`.
    pub currency: String,
    pub pred: String,
    pub actual: String,
    pub label: TrustLabel,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub pair: String,
    pub forecast: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardResult {
    pub scoreboard: Vec<ScoreRow>,
}

/// A single forecast request as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub pair: CurrencyPair,
    pub days: usize,
    /// The caller's current date (upper bound of the indicative bridge).
    pub today: NaiveDate,
}
