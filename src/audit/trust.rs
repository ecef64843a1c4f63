//! Trust classification of a resolved prediction.
//!
//! Compares the predicted fractional change with the realized one:
//! direction first, then magnitude.

use crate::domain::TrustLabel;

/// A realized move smaller than this (0.05%) counts as flat.
const FLAT_THRESHOLD: f64 = 0.0005;

/// Same-direction predictions within this distance (0.15%) are a bullseye.
const HIGH_TRUST_THRESHOLD: f64 = 0.0015;

/// Classify a prediction against the realized change.
pub fn classify(predicted_change_pct: f64, actual_change_pct: f64) -> TrustLabel {
    let same_direction = (predicted_change_pct > 0.0 && actual_change_pct > 0.0)
        || (predicted_change_pct < 0.0 && actual_change_pct < 0.0);

    if !same_direction {
        // A flat market is not held against a directional call.
        if actual_change_pct.abs() < FLAT_THRESHOLD {
            return TrustLabel::DirectionAccuratePrecision;
        }
        return TrustLabel::DirectionMissedWarning;
    }

    let diff = (predicted_change_pct - actual_change_pct).abs();
    if diff < HIGH_TRUST_THRESHOLD {
        return TrustLabel::DirectionMatchedHighTrust;
    }

    if actual_change_pct.abs() > predicted_change_pct.abs() {
        TrustLabel::DirectionMatchedConservative
    } else {
        TrustLabel::DirectionMatchedOptimistic
    }
}
