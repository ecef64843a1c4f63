//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - currencies and pairs (`Currency`, `CurrencyPair`)
//! - per-leg and cross-rate series (`Leg`, `CrossRateSeries`)
//! - emitted outputs (`TimelinePoint`, `ScoreRow`, `ForecastResult`)
//! - persisted audit records (`PredictionAudit`, `TrustLabel`)

pub mod types;

pub use types::*;
