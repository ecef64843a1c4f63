//! Runtime configuration from environment variables (`.env` supported).
//!
//! Per-command knobs (forecast horizon, output mode) are CLI flags; this covers
//! the deployment-level settings shared by every command.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::AppError;

pub const DEFAULT_ECB_BASE_URL: &str = "https://data-api.ecb.europa.eu/service/data/EXR";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ecb_base_url: String,
    /// First date requested when building leg history and training.
    pub history_start: NaiveDate,
    pub model_dir: PathBuf,
    pub audit_path: PathBuf,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    /// Model input window `W` (number of trailing returns).
    pub window: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let history_start = match lookup("FXC_HISTORY_START") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                AppError::invalid_input(format!("Invalid FXC_HISTORY_START '{raw}': {e}"))
            })?,
            None => NaiveDate::from_ymd_opt(2000, 1, 1)
                .ok_or_else(|| AppError::invalid_input("Invalid default history start."))?,
        };

        let window: usize = parse_or(&lookup, "FXC_WINDOW", 180)?;
        if window == 0 {
            return Err(AppError::invalid_input("FXC_WINDOW must be > 0."));
        }

        Ok(Self {
            ecb_base_url: lookup("FXC_ECB_BASE_URL").unwrap_or_else(|| DEFAULT_ECB_BASE_URL.to_string()),
            history_start,
            model_dir: lookup("FXC_MODEL_DIR").map_or_else(|| PathBuf::from("models"), PathBuf::from),
            audit_path: lookup("FXC_AUDIT_PATH").map_or_else(|| PathBuf::from("audit.json"), PathBuf::from),
            cache_ttl: Duration::from_secs(parse_or(&lookup, "FXC_CACHE_TTL_SECS", 3600)?),
            http_timeout: Duration::from_secs(parse_or(&lookup, "FXC_HTTP_TIMEOUT_SECS", 30)?),
            window,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::invalid_input(format!("Invalid {key} '{raw}': {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.ecb_base_url, DEFAULT_ECB_BASE_URL);
        assert_eq!(cfg.window, 180);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.history_start, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(cfg.audit_path, PathBuf::from("audit.json"));
    }

    #[test]
    fn overrides_and_validation() {
        let cfg = config(&[("FXC_WINDOW", "60"), ("FXC_HISTORY_START", "2015-06-01")]).unwrap();
        assert_eq!(cfg.window, 60);
        assert_eq!(cfg.history_start, NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());

        assert!(config(&[("FXC_WINDOW", "0")]).is_err());
        assert!(config(&[("FXC_CACHE_TTL_SECS", "soon")]).is_err());
        assert!(config(&[("FXC_HISTORY_START", "01/06/2015")]).is_err());
    }
}
