//! Autoregressive model artifacts.
//!
//! An artifact is a linear AR(p) model over min-max scaled daily returns:
//!
//! ```text
//! s_t = β0 + β1 s_{t-1} + ... + βp s_{t-p}
//! s   = (r - scale_min) / (scale_max - scale_min)
//! ```
//!
//! Artifacts are stored as JSON, one file per leg (`EUR_GBP.json`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, ErrorKind};
use crate::io::artifact::read_artifact_json;
use crate::model::ReturnModel;

/// A trained per-leg model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Leg code, e.g. `EUR_GBP`.
    pub pair: String,
    pub lags: usize,
    /// Intercept first, then lag 1 (most recent) through lag `lags`.
    pub coefficients: Vec<f64>,
    pub scale_min: f64,
    pub scale_max: f64,
    pub trained_on: NaiveDate,
    pub n_samples: usize,
}

impl ModelArtifact {
    fn scale(&self, r: f64) -> f64 {
        let span = self.scale_max - self.scale_min;
        if span > 0.0 { (r - self.scale_min) / span } else { 0.0 }
    }

    fn unscale(&self, s: f64) -> f64 {
        s * (self.scale_max - self.scale_min) + self.scale_min
    }

    /// Iterated multi-step prediction.
    pub fn predict(&self, window: &[f64], steps: usize) -> Result<Vec<f64>, AppError> {
        if self.coefficients.len() != self.lags + 1 {
            return Err(AppError::new(
                ErrorKind::ModelUnavailable,
                format!("Corrupt model artifact for {}: coefficient count mismatch.", self.pair),
            ));
        }
        if window.len() < self.lags {
            return Err(AppError::invalid_input(format!(
                "Window of {} returns is shorter than {} lags.",
                window.len(),
                self.lags
            )));
        }

        let mut scaled: Vec<f64> = window[window.len() - self.lags..]
            .iter()
            .map(|&r| self.scale(r))
            .collect();

        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            let n = scaled.len();
            let mut s = self.coefficients[0];
            for k in 1..=self.lags {
                s += self.coefficients[k] * scaled[n - k];
            }
            out.push(self.unscale(s));
            scaled.remove(0);
            scaled.push(s);
        }
        Ok(out)
    }
}

/// File name of a leg's artifact inside the model directory.
pub fn artifact_path(model_dir: &Path, pair_code: &str) -> PathBuf {
    model_dir.join(format!("{pair_code}.json"))
}

/// [`ReturnModel`] backed by JSON artifacts on disk.
///
/// Loaded artifacts are cached for the lifetime of the instance.
pub struct ArtifactModel {
    model_dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<ModelArtifact>>>,
}

impl ArtifactModel {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn load(&self, pair_code: &str) -> Result<Arc<ModelArtifact>, AppError> {
        if let Some(found) = self.lock_cache().get(pair_code) {
            return Ok(Arc::clone(found));
        }

        let path = artifact_path(&self.model_dir, pair_code);
        if !path.exists() {
            return Err(AppError::new(
                ErrorKind::ModelUnavailable,
                format!("Model for {pair_code} not initialized (missing {}).", path.display()),
            ));
        }
        let artifact = Arc::new(read_artifact_json(&path)?);
        debug!(pair = pair_code, path = %path.display(), "loaded model artifact");

        self.lock_cache()
            .insert(pair_code.to_string(), Arc::clone(&artifact));
        Ok(artifact)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<ModelArtifact>>> {
        // A poisoned cache only means another thread panicked mid-insert; the map is still usable.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ReturnModel for ArtifactModel {
    fn predict_next_day_returns(
        &self,
        pair_code: &str,
        window: &[f64],
        steps: usize,
    ) -> Result<Vec<f64>, AppError> {
        self.load(pair_code)?.predict(window, steps)
    }
}
